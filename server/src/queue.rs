//! Shared FIFO work queue feeding the worker pool.
//!
//! The dispatcher pushes one item per readable socket; workers block on
//! the condition variable when idle. The queue is unbounded by design.
//! Shutdown semantics: once the flag is raised and the queue drains,
//! [`WorkQueue::pop`] returns `None` and workers terminate; items already
//! queued are still handed out so in-flight commands complete.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::connection::Connection;

/// A unit of work: a connection with freshly received bytes to process.
pub struct WorkItem {
    /// The connection to drain.
    pub conn: Arc<Connection>,
}

/// Unbounded FIFO queue with blocking consumers.
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    available: Condvar,
    shutdown: AtomicBool,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Enqueue a work item and wake one waiting worker.
    pub fn push(&self, item: WorkItem) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Dequeue the next item, blocking while the queue is empty.
    ///
    /// Returns `None` once shutdown has been requested and the queue is
    /// drained.
    pub fn pop(&self) -> Option<WorkItem> {
        let mut items = self.items.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return Some(item);
            }
            if self.shutdown.load(Ordering::Acquire) {
                return None;
            }
            self.available.wait(&mut items);
        }
    }

    /// Raise the shutdown flag and wake every waiting worker.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.available.notify_all();
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
