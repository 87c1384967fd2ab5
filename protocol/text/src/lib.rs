//! Line-oriented text protocol for the paged cache server.
//!
//! Commands are a single ASCII line, optionally followed by a binary data
//! chunk whose length is announced on the line:
//!
//! ```text
//! auth <client-id>\r\n                -> OK\r\n
//! add <key> <bytes>\r\n<data>\r\n     -> STORED\r\n | EXISTS\r\n | ...
//! update <key> <bytes>\r\n<data>\r\n  -> STORED\r\n | NOT_FOUND\r\n | ...
//! get <key>\r\n                       -> VALUE <key> <bytes>\r\n<data>\r\nEND\r\n | END\r\n
//! delete <key>\r\n                    -> DELETED\r\n | NOT_FOUND\r\n
//! stats\r\n                           -> STAT <name> <value>\r\n ... END\r\n
//! frag\r\n                            -> STAT <name> <value>\r\n ... END\r\n
//! reset\r\n                           -> RESET\r\n
//! ping\r\n                            -> PONG\r\n
//! quit\r\n                            -> connection close
//! ```
//!
//! Command verbs are case-insensitive. Keys and client ids are at most
//! 255 bytes and may not contain whitespace or control bytes. Parsing is
//! zero-copy: the returned [`Command`] borrows the input buffer.

mod command;

pub use command::{Command, MAX_KEY_LEN};

/// Parse error types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// Need more data to complete parsing.
    #[error("incomplete")]
    Incomplete,
    /// Malformed request.
    #[error("{0}")]
    Protocol(String),
    /// Known command with the wrong number of arguments.
    #[error("{0}")]
    WrongArity(String),
    /// Key or client id longer than [`MAX_KEY_LEN`] bytes.
    #[error("key too long (max {MAX_KEY_LEN} bytes)")]
    KeyTooLong,
    /// Data chunk not terminated by CRLF.
    #[error("bad data chunk")]
    BadDataChunk,
}
