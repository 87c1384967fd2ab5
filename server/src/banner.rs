//! Startup banner utilities.

use std::fmt::Write;
use std::net::SocketAddr;

use paged_cache::{EvictionPolicy, PlacementStrategy};

use crate::config::format_size;

/// Configuration for the startup banner.
pub struct BannerConfig<'a> {
    /// Version string.
    pub version: &'a str,
    /// Eviction policy.
    pub policy: EvictionPolicy,
    /// Free-list placement strategy.
    pub placement: PlacementStrategy,
    /// Number of worker threads.
    pub workers: usize,
    /// Listener address.
    pub address: SocketAddr,
    /// Arena size in bytes.
    pub cache_size: usize,
    /// Page size in bytes.
    pub page_size: usize,
}

/// Print a startup banner to stdout.
pub fn print_banner(config: &BannerConfig) {
    let mut output = String::with_capacity(512);

    let name = "paged-cache-server";
    writeln!(output, "{} v{}", name, config.version).unwrap();
    writeln!(
        output,
        "{}",
        "=".repeat(name.len() + config.version.len() + 2)
    )
    .unwrap();
    writeln!(output).unwrap();

    let placement = match config.placement {
        PlacementStrategy::BestFit => "best-fit",
        PlacementStrategy::FirstFit => "first-fit",
    };
    writeln!(output, "Listener:  {}", config.address).unwrap();
    writeln!(output, "Workers:   {}", config.workers).unwrap();
    writeln!(output, "Policy:    {}", config.policy).unwrap();
    writeln!(output, "Placement: {}", placement).unwrap();
    writeln!(output).unwrap();

    writeln!(output, "Cache Config:").unwrap();
    writeln!(output, "  Arena: {}", format_size(config.cache_size)).unwrap();
    writeln!(output, "  Page:  {}", format_size(config.page_size)).unwrap();
    writeln!(
        output,
        "  Pages: {}",
        config.cache_size / config.page_size
    )
    .unwrap();
    writeln!(output).unwrap();

    print!("{}", output);
}
