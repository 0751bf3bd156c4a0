//! Request head reading and request-line parsing.

use std::io::{self, Read};

/// Largest request head accepted before answering 400.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Outcome of reading a request head off the wire.
#[derive(Debug, PartialEq, Eq)]
pub enum HeadRead {
    /// Bytes up to (not including) the blank line ending the head. A peer
    /// that half-closes early yields whatever arrived.
    Complete(Vec<u8>),
    /// No terminator within [`MAX_HEAD_BYTES`].
    TooLarge,
    /// The peer closed or timed out before sending anything.
    Closed,
}

/// Method and target of a request line. The version is validated only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    /// Raw request target, still percent-encoded.
    pub target: String,
}

/// Read until the blank line that ends the head.
pub fn read_head<R: Read>(reader: &mut R) -> io::Result<HeadRead> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(end) = head_end(&buf) {
            if end > MAX_HEAD_BYTES {
                return Ok(HeadRead::TooLarge);
            }
            buf.truncate(end);
            return Ok(HeadRead::Complete(buf));
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Ok(HeadRead::TooLarge);
        }
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                break;
            },
            Err(e) => return Err(e),
        }
    }

    if buf.iter().all(|b| b.is_ascii_whitespace()) {
        Ok(HeadRead::Closed)
    } else if buf.len() > MAX_HEAD_BYTES {
        Ok(HeadRead::TooLarge)
    } else {
        Ok(HeadRead::Complete(buf))
    }
}

/// Offset of the head terminator (`\r\n\r\n` or bare `\n\n`).
fn head_end(buf: &[u8]) -> Option<usize> {
    let crlf = find_subsequence(buf, b"\r\n\r\n");
    let lf = find_subsequence(buf, b"\n\n");
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Find the position of a byte subsequence in a slice.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse the first line of a request head. `None` means 400.
pub fn parse_request_line(head: &[u8]) -> Option<RequestLine> {
    // Tolerate stray blank lines before the request line.
    let start = head.iter().position(|b| !matches!(b, b'\r' | b'\n'))?;
    let head = &head[start..];
    let line_end = head.iter().position(|&b| b == b'\n').unwrap_or(head.len());
    let line = std::str::from_utf8(&head[..line_end]).ok()?.trim_end_matches('\r');

    let mut parts = line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    let version = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if !method.bytes().all(|b| b.is_ascii_alphabetic() || b == b'-') {
        return None;
    }
    if !version.starts_with("HTTP/") {
        return None;
    }

    Some(RequestLine {
        method: method.to_string(),
        target: target.to_string(),
    })
}
