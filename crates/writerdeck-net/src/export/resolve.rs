//! Mapping request targets onto the export root.
//!
//! Resolution is purely lexical: `..` may climb inside the root but never
//! out of it. Symlinks are checked separately against the canonical root
//! once the path is known to exist.

use std::path::{Component, Path, PathBuf};

/// Split a request target into its path and query, dropping any fragment.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    let target = target.split_once('#').map_or(target, |(before, _)| before);
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept literally; invalid
/// UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Percent-encode raw bytes for use in a URL path segment. Unreserved
/// characters pass through.
pub fn percent_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Join a decoded URL path onto `root`. Returns `None` when the path would
/// leave the root or contains a NUL byte.
pub fn resolve_under(root: &Path, url_path: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();
    for seg in url_path.split('/') {
        match seg {
            "" | "." => {},
            ".." => {
                segments.pop()?;
            },
            s if s.contains('\0') => return None,
            s => segments.push(s),
        }
    }
    let mut path = root.to_path_buf();
    path.extend(segments);
    Some(path)
}

/// Lexically normalize an absolute path: drop `.`, fold `..`.
pub fn normalize_absolute(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
