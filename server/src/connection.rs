//! Per-connection state for the cache server.
//!
//! The dispatcher appends received bytes to the read buffer under the
//! connection lock and enqueues a work item; a worker later takes the
//! same lock, drains complete commands, and writes responses back to the
//! socket. Work items for one connection may race between workers, but
//! whoever wins the lock drains the buffer and the loser finds it empty.

use std::io::{self, Read, Write};
use std::time::Duration;

use bytes::{Buf, BytesMut};
use mio::net::TcpStream;
use parking_lot::{Mutex, MutexGuard};
use protocol_text::{Command, ParseError};

use paged_cache::PagedCache;

use crate::execute::execute;
use crate::metrics::PROTOCOL_ERRORS;

/// How long a worker will retry a non-blocking write before giving up on
/// a connection that refuses to drain.
const WRITE_STALL_LIMIT: Duration = Duration::from_secs(5);

/// A client connection shared between the dispatcher and the workers.
pub struct Connection {
    state: Mutex<ConnState>,
}

/// The lockable interior of a [`Connection`].
pub struct ConnState {
    /// The underlying non-blocking socket.
    pub stream: TcpStream,
    /// Bytes received but not yet parsed.
    pub read_buf: BytesMut,
    /// Client id established by `auth`; `None` until then.
    pub client_id: Option<Box<[u8]>>,
    /// Set when the connection should be torn down.
    pub closing: bool,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            state: Mutex::new(ConnState {
                stream,
                read_buf: BytesMut::with_capacity(4096),
                client_id: None,
                closing: false,
            }),
        }
    }

    /// Lock the connection state.
    pub fn lock(&self) -> MutexGuard<'_, ConnState> {
        self.state.lock()
    }
}

impl ConnState {
    /// Parse and execute every complete command in the read buffer,
    /// writing responses to the socket as they are produced.
    pub fn process(&mut self, cache: &PagedCache) -> io::Result<()> {
        let mut out = BytesMut::with_capacity(1024);

        loop {
            if self.read_buf.is_empty() {
                break;
            }

            match Command::parse(&self.read_buf) {
                Ok((cmd, consumed)) => {
                    if execute(&cmd, &mut self.client_id, cache, &mut out) {
                        self.closing = true;
                    }
                    self.read_buf.advance(consumed);
                    if self.closing {
                        break;
                    }
                }
                Err(ParseError::Incomplete) => break,
                Err(e) => {
                    PROTOCOL_ERRORS.increment();
                    out.extend_from_slice(b"CLIENT_ERROR ");
                    out.extend_from_slice(e.to_string().as_bytes());
                    out.extend_from_slice(b"\r\n");
                    // Desynchronized input cannot be re-framed reliably.
                    self.read_buf.clear();
                    self.closing = true;
                    break;
                }
            }
        }

        if !out.is_empty() {
            self.write_all(&out)?;
        }
        Ok(())
    }

    /// Write the full response, spinning briefly on `WouldBlock`. The
    /// socket is non-blocking; responses are small, so a persistently
    /// full send buffer means the peer has stalled.
    fn write_all(&mut self, mut data: &[u8]) -> io::Result<()> {
        let deadline = std::time::Instant::now() + WRITE_STALL_LIMIT;
        while !data.is_empty() {
            match self.stream.write(data) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection closed mid-response",
                    ));
                }
                Ok(n) => data = &data[n..],
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if std::time::Instant::now() >= deadline {
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            "send buffer stalled",
                        ));
                    }
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Drain the socket into the read buffer. Returns
    /// `(received_any, hit_eof)`; both can be true when the peer sent a
    /// final burst and closed.
    pub fn fill_read_buf(&mut self) -> io::Result<(bool, bool)> {
        let mut chunk = [0u8; 4096];
        let mut received = false;
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok((received, true)),
                Ok(n) => {
                    self.read_buf.extend_from_slice(&chunk[..n]);
                    received = true;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok((received, false))
    }
}
