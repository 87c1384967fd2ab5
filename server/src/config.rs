//! Server configuration.
//!
//! Loaded from a TOML file; every section has sensible defaults so an
//! empty file (or no file at all) yields a runnable server.

use std::net::SocketAddr;
use std::path::Path;

use paged_cache::{EvictionPolicy, PlacementStrategy};
use serde::Deserialize;

/// Default number of worker threads.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Server configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Worker thread configuration.
    #[serde(default)]
    pub workers: WorkersConfig,

    /// Listener configuration.
    #[serde(default)]
    pub listener: ListenerConfig,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Worker thread configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkersConfig {
    /// Number of worker threads (default: 4).
    pub threads: Option<usize>,
}

/// Listener configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Total arena size (e.g., "100MB").
    #[serde(default = "default_cache_size", deserialize_with = "deserialize_size")]
    pub cache_size: usize,

    /// Page size (e.g., "40KB").
    #[serde(default = "default_page_size", deserialize_with = "deserialize_size")]
    pub page_size: usize,

    /// Eviction policy: "lru", "fifo", "sieve", or "clock".
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Free-list placement: "best-fit" or "first-fit".
    #[serde(default)]
    pub placement: PlacementConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_size: default_cache_size(),
            page_size: default_page_size(),
            policy: PolicyConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

/// Eviction policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyConfig {
    /// Least recently used.
    #[default]
    Lru,
    /// First in, first out.
    Fifo,
    /// SIEVE second-chance sweep.
    Sieve,
    /// CLOCK second-chance ring.
    Clock,
}

impl PolicyConfig {
    /// Map to the cache crate's policy type.
    pub fn to_policy(self) -> EvictionPolicy {
        match self {
            Self::Lru => EvictionPolicy::Lru,
            Self::Fifo => EvictionPolicy::Fifo,
            Self::Sieve => EvictionPolicy::Sieve,
            Self::Clock => EvictionPolicy::Clock,
        }
    }
}

/// Free-list placement selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum PlacementConfig {
    /// Smallest extent that fits.
    #[default]
    #[serde(rename = "best-fit", alias = "bestfit")]
    BestFit,
    /// First extent that fits.
    #[serde(rename = "first-fit", alias = "firstfit")]
    FirstFit,
}

impl PlacementConfig {
    /// Map to the cache crate's placement type.
    pub fn to_placement(self) -> PlacementStrategy {
        match self {
            Self::BestFit => PlacementStrategy::BestFit,
            Self::FirstFit => PlacementStrategy::FirstFit,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable with ANSI colors.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
    /// Compact single-line format.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level filter (overridden by RUST_LOG when set).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include timestamps.
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// Include the event's module target.
    #[serde(default)]
    pub target: bool,

    /// Include thread names.
    #[serde(default = "default_true")]
    pub thread_names: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            timestamps: true,
            target: false,
            thread_names: true,
        }
    }
}

// Default value functions

fn default_listen_address() -> SocketAddr {
    "127.0.0.1:7171".parse().unwrap()
}

fn default_cache_size() -> usize {
    100 * 1024 * 1024 // 100MB
}

fn default_page_size() -> usize {
    40 * 1024 // 40KB
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Deserialize a size string like "64MB" or a plain byte count.
fn deserialize_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeValue {
        Number(usize),
        String(String),
    }

    match SizeValue::deserialize(deserializer)? {
        SizeValue::Number(n) => Ok(n),
        SizeValue::String(s) => parse_size(&s).map_err(D::Error::custom),
    }
}

/// Parse a size string like "40KB", "64MB", "4GB" into bytes.
pub fn parse_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| c.is_alphabetic()) {
        Some(idx) => (&s[..idx], s[idx..].to_uppercase()),
        None => (s, String::new()),
    };

    let num: usize = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let multiplier: usize = match suffix.as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1024,
        "M" | "MB" | "MIB" => 1024 * 1024,
        "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
        _ => return Err(format!("unknown size suffix: {}", suffix)),
    };

    num.checked_mul(multiplier)
        .ok_or_else(|| "size overflow".to_string())
}

/// Format a byte count as a human-readable string.
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;
    const GB: usize = 1024 * MB;

    if bytes >= GB && bytes % GB == 0 {
        format!("{} GB", bytes / GB)
    } else if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{} KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.cache.page_size == 0 {
            return Err("page_size must be non-zero".into());
        }

        if self.cache.cache_size < self.cache.page_size {
            return Err(format!(
                "cache_size ({}) must be at least page_size ({})",
                self.cache.cache_size, self.cache.page_size
            )
            .into());
        }

        if self.workers.threads == Some(0) {
            return Err("workers.threads must be at least 1".into());
        }

        Ok(())
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.workers.threads.unwrap_or(DEFAULT_WORKER_THREADS)
    }
}
