//! Socket readiness dispatcher.
//!
//! A single thread owns the mio poll loop: it accepts connections, drains
//! readable sockets into per-connection buffers, and hands work items to
//! the queue for the worker pool. No command parsing or cache access
//! happens here.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use slab::Slab;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::metrics::{CONNECTIONS_ACCEPTED, CONNECTIONS_ACTIVE, WORK_ITEMS_QUEUED};
use crate::queue::{WorkItem, WorkQueue};

const LISTENER: Token = Token(usize::MAX);

/// Maximum readiness events drained per poll.
const MAX_EVENTS: usize = 64;

/// Poll timeout; bounds how long shutdown can go unnoticed.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// The readiness loop feeding the worker pool.
pub struct Dispatcher {
    poll: Poll,
    listener: TcpListener,
    connections: Slab<Arc<Connection>>,
    queue: Arc<WorkQueue>,
    shutdown: Arc<AtomicBool>,
}

impl Dispatcher {
    /// Bind the listener and register it with the poll.
    pub fn bind(
        addr: SocketAddr,
        queue: Arc<WorkQueue>,
        shutdown: Arc<AtomicBool>,
    ) -> io::Result<Self> {
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)?;

        Ok(Self {
            poll,
            listener,
            connections: Slab::with_capacity(256),
            queue,
            shutdown,
        })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run until the shutdown flag is raised, then tear down every
    /// remaining connection.
    pub fn run(&mut self) -> io::Result<()> {
        let mut events = Events::with_capacity(MAX_EVENTS);

        while !self.shutdown.load(Ordering::Acquire) {
            match self.poll.poll(&mut events, Some(POLL_TIMEOUT)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            for event in events.iter() {
                match event.token() {
                    LISTENER => self.accept_ready(),
                    token => self.socket_ready(token),
                }
            }
        }

        self.close_all();
        Ok(())
    }

    /// Accept every pending connection.
    fn accept_ready(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, addr)) => {
                    let entry = self.connections.vacant_entry();
                    let token = Token(entry.key());
                    if let Err(e) =
                        self.poll
                            .registry()
                            .register(&mut stream, token, Interest::READABLE)
                    {
                        warn!(error = %e, "failed to register connection");
                        continue;
                    }
                    entry.insert(Arc::new(Connection::new(stream)));
                    CONNECTIONS_ACCEPTED.increment();
                    CONNECTIONS_ACTIVE.increment();
                    debug!(%addr, token = token.0, "connection accepted");
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    break;
                }
            }
        }
    }

    /// Drain a readable socket and enqueue work for the pool.
    fn socket_ready(&mut self, token: Token) {
        let Some(conn) = self.connections.get(token.0).cloned() else {
            return;
        };

        let (received, eof) = {
            let mut state = conn.lock();
            match state.fill_read_buf() {
                Ok(result) => result,
                Err(e) => {
                    debug!(token = token.0, error = %e, "read failed");
                    (false, true)
                }
            }
        };

        // Hand buffered bytes to a worker before tearing anything down,
        // so a final burst before EOF still gets its responses.
        if received {
            WORK_ITEMS_QUEUED.increment();
            self.queue.push(WorkItem { conn: conn.clone() });
        }

        let peer_closed = {
            let state = conn.lock();
            state.closing
        };

        if eof || peer_closed {
            self.close(token);
        }
    }

    fn close(&mut self, token: Token) {
        if let Some(conn) = self.connections.try_remove(token.0) {
            let mut state = conn.lock();
            let _ = self.poll.registry().deregister(&mut state.stream);
            state.closing = true;
            CONNECTIONS_ACTIVE.decrement();
            debug!(token = token.0, "connection closed");
        }
    }

    fn close_all(&mut self) {
        let tokens: Vec<usize> = self.connections.iter().map(|(key, _)| key).collect();
        for key in tokens {
            self.close(Token(key));
        }
    }
}
