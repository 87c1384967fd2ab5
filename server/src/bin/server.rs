//! Paged cache server binary.

use std::path::PathBuf;

use clap::Parser;

use server::banner::{BannerConfig, print_banner};
use server::config::Config;
use server::{logging, signal};

#[derive(Parser)]
#[command(name = "paged-cache-server")]
#[command(about = "In-memory page-arena cache server with online defragmentation")]
struct Args {
    /// Path to configuration file (defaults apply when omitted)
    config: Option<PathBuf>,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    let args = Args::parse();

    if args.print_config {
        print_default_config();
        return;
    }

    let config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    logging::init(&config.logging);

    if let Err(e) = run(config) {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let cache = paged_cache::PagedCache::builder()
        .cache_size(config.cache.cache_size)
        .page_size(config.cache.page_size)
        .eviction_policy(config.cache.policy.to_policy())
        .placement(config.cache.placement.to_placement())
        .build()?;

    print_banner(&BannerConfig {
        version: env!("CARGO_PKG_VERSION"),
        policy: cache.eviction_policy(),
        placement: config.cache.placement.to_placement(),
        workers: config.threads(),
        address: config.listener.address,
        cache_size: config.cache.cache_size,
        page_size: config.cache.page_size,
    });

    let shutdown = signal::install_signal_handler();
    server::run(&config, cache, shutdown)?;
    Ok(())
}

fn print_default_config() {
    let config = r#"# Paged cache server configuration

[workers]
# Number of worker threads
threads = 4

[listener]
# Address to listen on
address = "127.0.0.1:7171"

[cache]
# Total arena size (e.g., "100MB", "1GB")
cache_size = "100MB"

# Page size (e.g., "40KB")
page_size = "40KB"

# Eviction policy: "lru", "fifo", "sieve", or "clock"
policy = "lru"

# Free-list placement: "best-fit" or "first-fit"
placement = "best-fit"

[logging]
# Log level: "trace", "debug", "info", "warn", "error"
level = "info"

# Output format: "pretty", "json", or "compact"
format = "pretty"

# Include timestamps
timestamps = true
"#;
    print!("{}", config);
}
