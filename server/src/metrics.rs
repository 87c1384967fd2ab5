//! Server-level metrics.
//!
//! Socket-layer counters exposed through metriken. Cache operation
//! counters live in the cache itself and are reported over the `stats`
//! protocol command.

use metriken::{Counter, Gauge, metric};

#[metric(
    name = "connections_accepted",
    description = "Total number of connections accepted"
)]
pub static CONNECTIONS_ACCEPTED: Counter = Counter::new();

#[metric(
    name = "connections_active",
    description = "Number of currently active connections"
)]
pub static CONNECTIONS_ACTIVE: Gauge = Gauge::new();

#[metric(name = "protocol_errors", description = "Total protocol parse errors")]
pub static PROTOCOL_ERRORS: Counter = Counter::new();

#[metric(
    name = "auth_failures",
    description = "Commands rejected because the connection was not authenticated"
)]
pub static AUTH_FAILURES: Counter = Counter::new();

#[metric(
    name = "work_items_queued",
    description = "Work items handed to the worker pool"
)]
pub static WORK_ITEMS_QUEUED: Counter = Counter::new();
