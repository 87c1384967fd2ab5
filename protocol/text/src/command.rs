//! Server-side command parsing.
//!
//! Parses one command at a time from a byte buffer, returning the parsed
//! command and the number of bytes consumed so callers can process
//! pipelined input incrementally.

use crate::ParseError;

/// Maximum length of a key or client id, in bytes.
pub const MAX_KEY_LEN: usize = 255;

/// A parsed command with references into the original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// `auth <client-id>` - identify the connection.
    Auth {
        /// The client's chosen id; becomes the owner of written entries.
        client_id: &'a [u8],
    },
    /// `add <key> <bytes>` followed by a data chunk.
    Add {
        /// Entry key.
        key: &'a [u8],
        /// Value bytes.
        data: &'a [u8],
    },
    /// `update <key> <bytes>` followed by a data chunk.
    Update {
        /// Entry key.
        key: &'a [u8],
        /// Replacement value bytes.
        data: &'a [u8],
    },
    /// `get <key>`.
    Get {
        /// Entry key.
        key: &'a [u8],
    },
    /// `delete <key>`.
    Delete {
        /// Entry key.
        key: &'a [u8],
    },
    /// `stats` - operation counters.
    Stats,
    /// `frag` - fragmentation figures.
    Frag,
    /// `reset` - zero the operation counters.
    Reset,
    /// `ping`.
    Ping,
    /// `quit` - close the connection.
    Quit,
}

impl<'a> Command<'a> {
    /// Parse a command from a byte buffer.
    ///
    /// Returns the parsed command and the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Incomplete`] if more data is needed; other
    /// errors for malformed or unknown commands.
    pub fn parse(buffer: &'a [u8]) -> Result<(Self, usize), ParseError> {
        let Some(newline) = buffer.iter().position(|&b| b == b'\n') else {
            // Refuse to buffer unbounded garbage while waiting for a
            // newline.
            if buffer.len() > MAX_KEY_LEN + 64 {
                return Err(ParseError::Protocol("command line too long".to_string()));
            }
            return Err(ParseError::Incomplete);
        };

        let line_len = newline + 1;
        let line = strip_crlf(&buffer[..newline]);

        let mut parts = line.split(|&b| b == b' ').filter(|part| !part.is_empty());
        let Some(verb) = parts.next() else {
            return Err(ParseError::Protocol("empty command".to_string()));
        };

        let command = match () {
            _ if verb.eq_ignore_ascii_case(b"auth") => {
                let client_id = expect_token(&mut parts, "auth requires a client id")?;
                expect_end(&mut parts, "auth takes exactly 1 argument")?;
                Command::Auth { client_id }
            }

            _ if verb.eq_ignore_ascii_case(b"add") => {
                let (key, data, consumed) = parse_storage(buffer, line_len, &mut parts, "add")?;
                return Ok((Command::Add { key, data }, consumed));
            }

            _ if verb.eq_ignore_ascii_case(b"update") => {
                let (key, data, consumed) = parse_storage(buffer, line_len, &mut parts, "update")?;
                return Ok((Command::Update { key, data }, consumed));
            }

            _ if verb.eq_ignore_ascii_case(b"get") => {
                let key = expect_token(&mut parts, "get requires a key")?;
                expect_end(&mut parts, "get takes exactly 1 argument")?;
                Command::Get { key }
            }

            _ if verb.eq_ignore_ascii_case(b"delete") => {
                let key = expect_token(&mut parts, "delete requires a key")?;
                expect_end(&mut parts, "delete takes exactly 1 argument")?;
                Command::Delete { key }
            }

            _ if verb.eq_ignore_ascii_case(b"stats") => {
                expect_end(&mut parts, "stats takes no arguments")?;
                Command::Stats
            }

            _ if verb.eq_ignore_ascii_case(b"frag") => {
                expect_end(&mut parts, "frag takes no arguments")?;
                Command::Frag
            }

            _ if verb.eq_ignore_ascii_case(b"reset") => {
                expect_end(&mut parts, "reset takes no arguments")?;
                Command::Reset
            }

            _ if verb.eq_ignore_ascii_case(b"ping") => {
                expect_end(&mut parts, "ping takes no arguments")?;
                Command::Ping
            }

            _ if verb.eq_ignore_ascii_case(b"quit") => {
                expect_end(&mut parts, "quit takes no arguments")?;
                Command::Quit
            }

            _ => {
                return Err(ParseError::Protocol(format!(
                    "unknown command: {}",
                    String::from_utf8_lossy(verb)
                )));
            }
        };

        Ok((command, line_len))
    }
}

/// Strip a trailing `\r` left over after splitting on `\n`.
fn strip_crlf(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

/// Pull the next token and validate it as a key / client id.
fn expect_token<'a, I>(parts: &mut I, arity_msg: &str) -> Result<&'a [u8], ParseError>
where
    I: Iterator<Item = &'a [u8]>,
{
    let token = parts
        .next()
        .ok_or_else(|| ParseError::WrongArity(arity_msg.to_string()))?;
    if token.len() > MAX_KEY_LEN {
        return Err(ParseError::KeyTooLong);
    }
    if token.iter().any(|b| b.is_ascii_control()) {
        return Err(ParseError::Protocol("key contains control bytes".to_string()));
    }
    Ok(token)
}

fn expect_end<'a, I>(parts: &mut I, arity_msg: &str) -> Result<(), ParseError>
where
    I: Iterator<Item = &'a [u8]>,
{
    match parts.next() {
        Some(_) => Err(ParseError::WrongArity(arity_msg.to_string())),
        None => Ok(()),
    }
}

/// Parse the tail of an `add`/`update` line plus its data chunk.
///
/// The chunk is `<bytes>` bytes of binary data terminated by CRLF (a bare
/// LF is also accepted).
fn parse_storage<'a, I>(
    buffer: &'a [u8],
    line_len: usize,
    parts: &mut I,
    verb: &str,
) -> Result<(&'a [u8], &'a [u8], usize), ParseError>
where
    I: Iterator<Item = &'a [u8]>,
{
    let key = expect_token(parts, &format!("{} requires a key and a length", verb))?;
    let len_token = parts
        .next()
        .ok_or_else(|| ParseError::WrongArity(format!("{} requires a length", verb)))?;
    expect_end(parts, &format!("{} takes exactly 2 arguments", verb))?;

    let len: usize = std::str::from_utf8(len_token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            ParseError::Protocol(format!(
                "invalid length: {}",
                String::from_utf8_lossy(len_token)
            ))
        })?;

    // The chunk ends with "\r\n" (2 bytes) or "\n" (1 byte).
    let data_start = line_len;
    if buffer.len() < data_start + len + 1 {
        return Err(ParseError::Incomplete);
    }
    let data = &buffer[data_start..data_start + len];

    match &buffer[data_start + len..] {
        rest if rest.starts_with(b"\r\n") => Ok((key, data, data_start + len + 2)),
        rest if rest.starts_with(b"\n") => Ok((key, data, data_start + len + 1)),
        rest if rest == b"\r" => Err(ParseError::Incomplete),
        _ => Err(ParseError::BadDataChunk),
    }
}
