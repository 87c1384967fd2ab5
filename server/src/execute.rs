//! Command execution - bridges protocol commands to cache operations.

use bytes::BytesMut;
use paged_cache::{CacheError, PagedCache};
use protocol_text::Command;

use crate::metrics::AUTH_FAILURES;

/// Execute a single command against the cache, appending the response to
/// `out`. Returns true if the connection should be closed.
pub fn execute(
    cmd: &Command<'_>,
    client_id: &mut Option<Box<[u8]>>,
    cache: &PagedCache,
    out: &mut BytesMut,
) -> bool {
    match cmd {
        Command::Ping => {
            out.extend_from_slice(b"PONG\r\n");
            return false;
        }
        Command::Quit => return true,
        Command::Auth { client_id: id } => {
            tracing::debug!(client = %String::from_utf8_lossy(id), "client authenticated");
            *client_id = Some((*id).into());
            out.extend_from_slice(b"OK\r\n");
            return false;
        }
        _ => {}
    }

    // Every other command requires an identified client.
    let Some(owner) = client_id.as_deref() else {
        AUTH_FAILURES.increment();
        out.extend_from_slice(b"CLIENT_ERROR authenticate first\r\n");
        return false;
    };

    match cmd {
        Command::Add { key, data } => match cache.add(key, data, owner) {
            Ok(()) => out.extend_from_slice(b"STORED\r\n"),
            Err(CacheError::KeyExists) => out.extend_from_slice(b"EXISTS\r\n"),
            Err(CacheError::PayloadTooLarge) => {
                out.extend_from_slice(b"CLIENT_ERROR value too large\r\n")
            }
            Err(_) => out.extend_from_slice(b"SERVER_ERROR out of capacity\r\n"),
        },

        Command::Update { key, data } => match cache.update(key, data, owner) {
            Ok(()) => out.extend_from_slice(b"STORED\r\n"),
            Err(CacheError::NotFound) => out.extend_from_slice(b"NOT_FOUND\r\n"),
            Err(CacheError::PayloadTooLarge) => {
                out.extend_from_slice(b"CLIENT_ERROR value too large\r\n")
            }
            Err(_) => out.extend_from_slice(b"SERVER_ERROR out of capacity\r\n"),
        },

        Command::Get { key } => match cache.get(key, owner) {
            Ok(value) => {
                out.extend_from_slice(b"VALUE ");
                out.extend_from_slice(key);
                out.extend_from_slice(b" ");
                let mut len_buf = itoa::Buffer::new();
                out.extend_from_slice(len_buf.format(value.len()).as_bytes());
                out.extend_from_slice(b"\r\n");
                out.extend_from_slice(&value);
                out.extend_from_slice(b"\r\nEND\r\n");
            }
            Err(_) => out.extend_from_slice(b"END\r\n"),
        },

        Command::Delete { key } => match cache.delete(key, owner) {
            Ok(()) => out.extend_from_slice(b"DELETED\r\n"),
            Err(_) => out.extend_from_slice(b"NOT_FOUND\r\n"),
        },

        Command::Stats => write_stats(cache, out),

        Command::Frag => write_frag_stats(cache, out),

        Command::Reset => {
            cache.reset_stats();
            out.extend_from_slice(b"RESET\r\n");
        }

        // Handled above.
        Command::Ping | Command::Quit | Command::Auth { .. } => unreachable!(),
    }

    false
}

fn write_stat_u64(out: &mut BytesMut, name: &str, value: u64) {
    out.extend_from_slice(b"STAT ");
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b" ");
    let mut buf = itoa::Buffer::new();
    out.extend_from_slice(buf.format(value).as_bytes());
    out.extend_from_slice(b"\r\n");
}

fn write_stat_ratio(out: &mut BytesMut, name: &str, value: f64) {
    out.extend_from_slice(b"STAT ");
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(format!(" {:.4}\r\n", value).as_bytes());
}

fn write_stats(cache: &PagedCache, out: &mut BytesMut) {
    let snap = cache.stats().snapshot();
    write_stat_u64(out, "total_requests", snap.total_requests);
    write_stat_u64(out, "hits", snap.hits);
    write_stat_u64(out, "misses", snap.misses);
    write_stat_u64(out, "evictions", snap.evictions);
    write_stat_u64(out, "adds", snap.adds);
    write_stat_u64(out, "updates", snap.updates);
    write_stat_u64(out, "deletes", snap.deletes);
    write_stat_u64(out, "defragmentations", snap.defragmentations);
    write_stat_u64(out, "coalesces", snap.coalesces);
    write_stat_ratio(out, "hit_ratio", snap.hit_ratio());
    out.extend_from_slice(b"END\r\n");
}

fn write_frag_stats(cache: &PagedCache, out: &mut BytesMut) {
    let frag = cache.fragmentation_stats();
    write_stat_u64(out, "total_free_pages", frag.total_free_pages as u64);
    write_stat_u64(out, "largest_free_block", frag.largest_free_block as u64);
    write_stat_u64(out, "num_free_blocks", frag.num_free_blocks as u64);
    write_stat_ratio(out, "fragmentation_ratio", frag.fragmentation_ratio);
    out.extend_from_slice(b"END\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> PagedCache {
        PagedCache::builder()
            .cache_size(64 * 1024)
            .page_size(1024)
            .build()
            .unwrap()
    }

    fn run(cmd: &Command<'_>, client_id: &mut Option<Box<[u8]>>, cache: &PagedCache) -> Vec<u8> {
        let mut out = BytesMut::new();
        let close = execute(cmd, client_id, cache, &mut out);
        assert!(!close || matches!(cmd, Command::Quit));
        out.to_vec()
    }

    #[test]
    fn test_auth_gate() {
        let cache = test_cache();
        let mut client_id = None;

        let response = run(&Command::Get { key: b"k" }, &mut client_id, &cache);
        assert_eq!(response, b"CLIENT_ERROR authenticate first\r\n");

        let response = run(
            &Command::Auth {
                client_id: b"c-9",
            },
            &mut client_id,
            &cache,
        );
        assert_eq!(response, b"OK\r\n");
        assert_eq!(client_id.as_deref(), Some(&b"c-9"[..]));
    }

    #[test]
    fn test_add_get_delete_flow() {
        let cache = test_cache();
        let mut client_id = Some(Box::from(&b"c"[..]));

        let response = run(
            &Command::Add {
                key: b"k",
                data: b"hello",
            },
            &mut client_id,
            &cache,
        );
        assert_eq!(response, b"STORED\r\n");

        let response = run(&Command::Get { key: b"k" }, &mut client_id, &cache);
        assert_eq!(response, b"VALUE k 5\r\nhello\r\nEND\r\n");

        let response = run(&Command::Delete { key: b"k" }, &mut client_id, &cache);
        assert_eq!(response, b"DELETED\r\n");

        let response = run(&Command::Get { key: b"k" }, &mut client_id, &cache);
        assert_eq!(response, b"END\r\n");
    }

    #[test]
    fn test_add_duplicate_and_update_missing() {
        let cache = test_cache();
        let mut client_id = Some(Box::from(&b"c"[..]));

        run(
            &Command::Add {
                key: b"k",
                data: b"v",
            },
            &mut client_id,
            &cache,
        );
        let response = run(
            &Command::Add {
                key: b"k",
                data: b"v2",
            },
            &mut client_id,
            &cache,
        );
        assert_eq!(response, b"EXISTS\r\n");

        let response = run(
            &Command::Update {
                key: b"other",
                data: b"v",
            },
            &mut client_id,
            &cache,
        );
        assert_eq!(response, b"NOT_FOUND\r\n");
    }

    #[test]
    fn test_value_too_large() {
        let cache = test_cache();
        let mut client_id = Some(Box::from(&b"c"[..]));

        let huge = vec![0u8; 128 * 1024];
        let response = run(
            &Command::Add {
                key: b"k",
                data: &huge,
            },
            &mut client_id,
            &cache,
        );
        assert_eq!(response, b"CLIENT_ERROR value too large\r\n");
    }

    #[test]
    fn test_stats_render() {
        let cache = test_cache();
        let mut client_id = Some(Box::from(&b"c"[..]));

        run(
            &Command::Add {
                key: b"k",
                data: b"v",
            },
            &mut client_id,
            &cache,
        );
        let response = run(&Command::Stats, &mut client_id, &cache);
        let text = String::from_utf8(response).unwrap();
        assert!(text.contains("STAT adds 1\r\n"));
        assert!(text.contains("STAT hit_ratio"));
        assert!(text.ends_with("END\r\n"));

        let response = run(&Command::Frag, &mut client_id, &cache);
        let text = String::from_utf8(response).unwrap();
        assert!(text.contains("STAT total_free_pages 63\r\n"));
        assert!(text.contains("STAT num_free_blocks 1\r\n"));

        let response = run(&Command::Reset, &mut client_id, &cache);
        assert_eq!(response, b"RESET\r\n");
        assert_eq!(cache.stats().snapshot().adds, 0);
    }

    #[test]
    fn test_quit_closes() {
        let cache = test_cache();
        let mut client_id = None;
        let mut out = BytesMut::new();
        assert!(execute(&Command::Quit, &mut client_id, &cache, &mut out));
    }
}
