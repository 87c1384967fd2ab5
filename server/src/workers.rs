//! Worker thread pool consuming the shared work queue.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use paged_cache::PagedCache;
use tracing::debug;

use crate::queue::WorkQueue;

/// Handle to a spawned worker thread.
pub struct WorkerHandle {
    /// The thread handle.
    pub handle: JoinHandle<()>,
    /// The worker ID (0-indexed).
    pub worker_id: usize,
}

/// Spawn the worker pool.
pub fn spawn_workers(
    num_workers: usize,
    queue: &Arc<WorkQueue>,
    cache: &Arc<PagedCache>,
) -> Vec<WorkerHandle> {
    (0..num_workers)
        .map(|worker_id| {
            let queue = queue.clone();
            let cache = cache.clone();
            let handle = thread::Builder::new()
                .name(format!("worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, &queue, &cache))
                .expect("failed to spawn worker thread");
            WorkerHandle { handle, worker_id }
        })
        .collect()
}

/// Wait for all worker threads to complete.
pub fn join_workers(handles: Vec<WorkerHandle>) {
    for handle in handles {
        if handle.handle.join().is_err() {
            tracing::error!(worker_id = handle.worker_id, "worker thread panicked");
        }
    }
}

/// Pop work items until the queue shuts down and drains.
fn worker_loop(worker_id: usize, queue: &WorkQueue, cache: &PagedCache) {
    debug!(worker_id, "worker started");

    while let Some(item) = queue.pop() {
        let mut state = item.conn.lock();
        if let Err(e) = state.process(cache) {
            debug!(worker_id, error = %e, "connection error");
            state.closing = true;
        }
        if state.closing {
            // Wake the dispatcher so it reaps the connection.
            let _ = state.stream.shutdown(std::net::Shutdown::Both);
        }
    }

    debug!(worker_id, "worker stopped");
}
