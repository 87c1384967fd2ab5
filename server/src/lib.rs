//! Paged cache TCP server.
//!
//! A line-protocol front end over [`paged_cache`]: a mio readiness loop
//! drains client sockets into per-connection buffers and a fixed pool of
//! worker threads parses, executes, and responds.
//!
//! ```text
//!  clients ──► Dispatcher (mio poll) ──► WorkQueue ──► workers ──► PagedCache
//!                 reads sockets           FIFO +         parse,
//!                 into buffers            condvar        execute,
//!                                                        respond
//! ```

pub mod banner;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod execute;
pub mod logging;
pub mod metrics;
pub mod queue;
pub mod signal;
pub mod workers;

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use paged_cache::PagedCache;

pub use config::Config;

use dispatcher::Dispatcher;
use queue::WorkQueue;
use workers::{join_workers, spawn_workers};

/// Run the server until the shutdown flag is raised.
///
/// Spawns the worker pool, runs the dispatcher on the calling thread,
/// and on shutdown drains the work queue and joins every worker before
/// returning.
pub fn run(config: &Config, cache: PagedCache, shutdown: Arc<AtomicBool>) -> io::Result<()> {
    let cache = Arc::new(cache);
    let queue = Arc::new(WorkQueue::new());

    let mut dispatcher = Dispatcher::bind(config.listener.address, queue.clone(), shutdown)?;
    tracing::info!(
        address = %dispatcher.local_addr()?,
        workers = config.threads(),
        policy = %cache.eviction_policy(),
        pages = cache.total_pages(),
        "server listening"
    );

    let workers = spawn_workers(config.threads(), &queue, &cache);
    let result = dispatcher.run();

    // In-flight commands complete: workers drain the queue before they
    // observe the shutdown flag.
    queue.shutdown();
    join_workers(workers);
    tracing::info!("server stopped");

    result
}
