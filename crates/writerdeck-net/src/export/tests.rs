//! Loopback tests for the export server.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use super::*;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Case-insensitive header lookup.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let name_lower = name.to_lowercase();
    headers
        .iter()
        .find(|(k, _)| k == &name_lower)
        .map(|(_, v)| v.as_str())
}

/// Parse raw bytes into status code, headers, and body.
fn parse_reply(data: &[u8]) -> Reply {
    let header_end = data
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header terminator");
    let head = std::str::from_utf8(&data[..header_end]).unwrap();
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let status = status_line.split(' ').nth(1).unwrap().parse().unwrap();
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();
    Reply {
        status,
        headers,
        body: data[header_end + 4..].to_vec(),
    }
}

fn start(config: ExportConfig) -> ServerHandle {
    let config = ExportConfig {
        bind: "127.0.0.1".to_string(),
        port: 0,
        ..config
    };
    ExportServer::bind(config).unwrap().spawn().unwrap()
}

fn send_raw(server: &ServerHandle, raw: &[u8]) -> Reply {
    let mut stream = TcpStream::connect(server.local_addr()).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(3))).unwrap();
    stream.write_all(raw).unwrap();
    let mut data = Vec::new();
    stream.read_to_end(&mut data).unwrap();
    parse_reply(&data)
}

fn request(server: &ServerHandle, method: &str, path: &str) -> Reply {
    let raw = format!("{method} {path} HTTP/1.1\r\nHost: deck\r\n\r\n");
    send_raw(server, raw.as_bytes())
}

fn get(server: &ServerHandle, path: &str) -> Reply {
    request(server, "GET", path)
}

fn single_file(dir: &Path, file: &Path) -> ExportConfig {
    ExportConfig {
        single_file: Some(file.to_path_buf()),
        ..ExportConfig::new(dir)
    }
}

fn listing(dir: &Path, allow: bool) -> ExportConfig {
    ExportConfig {
        allow_listing: allow,
        ..ExportConfig::new(dir)
    }
}

// ---------------------------------------------------------------------------
// Single-file mode
// ---------------------------------------------------------------------------

#[test]
fn single_file_download_headers_and_body() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("parcel.txt");
    std::fs::write(&target, b"hello-world\n").unwrap();
    let server = start(single_file(dir.path(), &target));

    let reply = get(&server, "/anything/ignored");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, b"hello-world\n");
    let cd = reply.header("content-disposition").unwrap();
    assert!(cd.contains("attachment;"));
    assert!(cd.contains("filename=\"parcel.txt\""));
    assert_eq!(reply.header("cache-control"), Some("no-store"));
    assert_eq!(reply.header("content-type"), Some("text/plain"));
    assert_eq!(reply.header("content-length"), Some("12"));
    assert_eq!(reply.header("connection"), Some("close"));

    server.shutdown();
}

#[test]
fn single_file_ignores_traversal_paths() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("parcel.txt");
    std::fs::write(&target, b"p").unwrap();
    let server = start(single_file(dir.path(), &target));

    let reply = get(&server, "/../../etc/passwd");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, b"p");
}

#[test]
fn single_file_head_has_length_but_no_body() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("draft.md");
    std::fs::write(&target, b"# title\n").unwrap();
    let server = start(single_file(dir.path(), &target));

    let reply = request(&server, "HEAD", "/");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.header("content-length"), Some("8"));
    assert!(reply.body.is_empty());
}

#[test]
fn single_file_removed_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("parcel.txt");
    std::fs::write(&target, b"p").unwrap();
    let server = start(single_file(dir.path(), &target));
    std::fs::remove_file(&target).unwrap();

    let reply = get(&server, "/");
    assert_eq!(reply.status, 404);
    assert!(String::from_utf8_lossy(&reply.body).contains("File not found"));
}

// ---------------------------------------------------------------------------
// Directory mode
// ---------------------------------------------------------------------------

#[test]
fn directory_listing_disabled_returns_403() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let server = start(listing(dir.path(), false));

    let reply = get(&server, "/sub/");
    assert_eq!(reply.status, 403);
    assert!(String::from_utf8_lossy(&reply.body).contains("Directory listing disabled"));
}

#[test]
fn directory_listing_enabled_shows_entries() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), "note").unwrap();
    std::fs::create_dir(dir.path().join("drafts")).unwrap();
    let server = start(listing(dir.path(), true));

    let reply = get(&server, "/");
    assert_eq!(reply.status, 200);
    assert!(reply.header("content-type").unwrap().starts_with("text/html"));
    let body = String::from_utf8(reply.body).unwrap();
    assert!(body.contains("Directory listing for /"));
    assert!(body.contains("readme.txt"));
    assert!(body.contains("drafts/"));
}

#[test]
fn directory_without_slash_redirects() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    let server = start(listing(dir.path(), true));

    let reply = get(&server, "/sub?sort=name");
    assert_eq!(reply.status, 301);
    assert_eq!(reply.header("location"), Some("/sub/?sort=name"));
}

#[test]
fn index_file_is_served_inline() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>deck</h1>").unwrap();
    let server = start(listing(dir.path(), false));

    let reply = get(&server, "/");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, b"<h1>deck</h1>");
    assert_eq!(reply.header("content-type"), Some("text/html"));
    assert!(reply.header("content-disposition").is_none());
}

#[test]
fn file_in_directory_is_an_attachment() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("drafts")).unwrap();
    std::fs::write(dir.path().join("drafts").join("my notes.txt"), "words").unwrap();
    let server = start(listing(dir.path(), false));

    let reply = get(&server, "/drafts/my%20notes.txt?download=1#frag");
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, b"words");
    assert_eq!(
        reply.header("content-disposition"),
        Some("attachment; filename=\"my notes.txt\"")
    );
    assert_eq!(reply.header("cache-control"), Some("no-store"));
}

#[test]
fn path_traversal_is_blocked() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(listing(dir.path(), true));

    assert_eq!(get(&server, "/../../etc/passwd").status, 403);
    assert_eq!(get(&server, "/%2e%2e/%2e%2e/etc/passwd").status, 403);
    assert_eq!(get(&server, "/a/../../etc/passwd").status, 403);
}

#[test]
fn symlink_out_of_root_is_blocked() {
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "s").unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("leak.txt"))
        .unwrap();
    std::fs::write(dir.path().join("ok.txt"), "ok").unwrap();
    std::os::unix::fs::symlink(dir.path().join("ok.txt"), dir.path().join("alias.txt")).unwrap();
    let server = start(listing(dir.path(), false));

    assert_eq!(get(&server, "/leak.txt").status, 403);
    let alias = get(&server, "/alias.txt");
    assert_eq!(alias.status, 200);
    assert_eq!(alias.body, b"ok");
}

#[test]
fn missing_file_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(listing(dir.path(), false));
    assert_eq!(get(&server, "/nope.txt").status, 404);
}

#[test]
fn favicon_is_quiet_404() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("favicon.ico"), "icon").unwrap();
    let server = start(listing(dir.path(), true));

    let reply = get(&server, "/favicon.ico");
    assert_eq!(reply.status, 404);
    assert!(String::from_utf8_lossy(&reply.body).contains("Not found"));
}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

#[test]
fn unsupported_method_is_501() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(listing(dir.path(), false));
    let reply = request(&server, "POST", "/");
    assert_eq!(reply.status, 501);
    assert_eq!(request(&server, "DELETE", "/x").status, 501);
}

#[test]
fn malformed_request_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(listing(dir.path(), false));
    let reply = send_raw(&server, b"nonsense\r\n\r\n");
    assert_eq!(reply.status, 400);
    assert!(reply.header("content-type").unwrap().starts_with("text/html"));
}

#[test]
fn oversized_head_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(listing(dir.path(), false));
    let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
    raw.extend_from_slice(format!("X-Big: {}\r\n\r\n", "a".repeat(MAX_HEAD_BYTES)).as_bytes());
    assert_eq!(send_raw(&server, &raw).status, 400);
}

// ---------------------------------------------------------------------------
// Lifecycle and configuration
// ---------------------------------------------------------------------------

#[test]
fn shutdown_stops_accepting() {
    let dir = tempfile::tempdir().unwrap();
    let server = start(listing(dir.path(), false));
    let addr = server.local_addr();
    assert_eq!(get(&server, "/missing").status, 404);

    server.shutdown();
    let mut refused = false;
    for _ in 0..20 {
        if TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_err() {
            refused = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    assert!(refused, "listener still accepting after shutdown");
}

#[test]
fn bind_conflict_is_http_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        bind: "127.0.0.1".to_string(),
        port: taken.local_addr().unwrap().port(),
        ..ExportConfig::new(dir.path())
    };
    match ExportServer::bind(config) {
        Err(WriterdeckError::Http(msg)) => assert!(msg.contains("cannot bind")),
        Err(other) => panic!("expected Http error, got {other}"),
        Ok(_) => panic!("bind unexpectedly succeeded"),
    }
}

#[test]
fn resolve_expands_home_and_validates_file() {
    let home = tempfile::tempdir().unwrap();
    std::fs::create_dir(home.path().join("stash")).unwrap();
    std::fs::write(home.path().join("stash").join("a.txt"), "a").unwrap();

    let cfg = ExportConfig::resolve("~/stash", Some("a.txt"), home.path()).unwrap();
    assert_eq!(cfg.root, home.path().join("stash"));
    assert_eq!(cfg.single_file, Some(home.path().join("stash").join("a.txt")));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.bind, DEFAULT_BIND);
    assert!(!cfg.allow_listing);
    assert_eq!(cfg.mode_summary(), "single file: a.txt");
}

#[test]
fn resolve_rejects_missing_dir() {
    let home = tempfile::tempdir().unwrap();
    let err = ExportConfig::resolve("~/nowhere", None, home.path()).unwrap_err();
    assert!(matches!(err, WriterdeckError::Config(_)));
}

#[test]
fn resolve_rejects_file_outside_or_missing() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join("outside.txt"), "o").unwrap();
    std::fs::create_dir(home.path().join("stash")).unwrap();
    let stash = home.path().join("stash");
    let stash = stash.to_str().unwrap();

    assert!(ExportConfig::resolve(stash, Some("../outside.txt"), home.path()).is_err());
    assert!(ExportConfig::resolve(stash, Some("ghost.txt"), home.path()).is_err());
}

#[test]
fn mode_summary_for_directories() {
    let mut cfg = ExportConfig::new("/srv/export");
    assert_eq!(cfg.mode_summary(), "directory, listing disabled");
    cfg.allow_listing = true;
    assert_eq!(cfg.mode_summary(), "directory, listing enabled");
}
