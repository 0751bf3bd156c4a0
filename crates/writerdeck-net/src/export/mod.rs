//! Download-only HTTP export server.
//!
//! Two modes:
//! - **single-file**: one designated file is returned for every path
//! - **directory**: paths map into the export root, with optional listings
//!
//! Each accepted connection gets its own thread and exactly one
//! request/response exchange. The only state shared across threads is the
//! immutable [`ExportConfig`] and a stop flag.

mod listing;
mod request;
mod resolve;
mod response;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use writerdeck_types::error::{Result, WriterdeckError};
use writerdeck_types::paths;

use crate::mime::guess_content_type;

use listing::render_listing;
use request::{HeadRead, parse_request_line, read_head};
use resolve::{normalize_absolute, percent_decode, resolve_under, split_target};
use response::{Body, Response};

pub use request::MAX_HEAD_BYTES;

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default bind address (all interfaces).
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// How long a client may take to send its request head.
const READ_TIMEOUT: Duration = Duration::from_secs(10);
/// How long a single write may stall on a slow client.
const WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// How long to wait for a peer to finish sending after the response.
const LINGER_TIMEOUT: Duration = Duration::from_millis(250);
const LINGER_MAX_BYTES: usize = 64 * 1024;

/// Index files served inline for a directory, in order of preference.
const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Export server configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Export directory (absolute).
    pub root: PathBuf,
    /// When set, this file answers every request.
    pub single_file: Option<PathBuf>,
    /// Serve HTML listings for directories without an index file.
    pub allow_listing: bool,
    pub bind: String,
    /// Port 0 lets the OS pick.
    pub port: u16,
}

impl ExportConfig {
    /// Directory mode over `root`, listings off, default bind and port.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            single_file: None,
            allow_listing: false,
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Validate user-supplied `dir` and optional `file` (relative to `dir`).
    ///
    /// `~` in `dir` is expanded against `home`. The directory must exist; the
    /// file, when given, must exist and lie inside the directory.
    pub fn resolve(dir: &str, file: Option<&str>, home: &Path) -> Result<Self> {
        let root = normalize_absolute(&paths::absolutize(&paths::expand_tilde(dir, home))?);
        if !root.is_dir() {
            return Err(WriterdeckError::Config(format!(
                "export directory not found: {}",
                root.display()
            )));
        }

        let single_file = match file {
            None => None,
            Some(file) => {
                let path = normalize_absolute(&root.join(file));
                if !path.starts_with(&root) || !path.exists() {
                    return Err(WriterdeckError::Config(format!(
                        "serve file must live inside export dir and exist: {}",
                        path.display()
                    )));
                }
                Some(path)
            },
        };

        Ok(Self {
            single_file,
            ..Self::new(root)
        })
    }

    /// One-line description of what is being served.
    pub fn mode_summary(&self) -> String {
        match &self.single_file {
            Some(file) => {
                let rel = file.strip_prefix(&self.root).unwrap_or(file);
                format!("single file: {}", rel.display())
            },
            None if self.allow_listing => "directory, listing enabled".to_string(),
            None => "directory, listing disabled".to_string(),
        }
    }
}

/// A bound, not yet running, export server.
pub struct ExportServer {
    listener: TcpListener,
    handler: Arc<Handler>,
    stop: Arc<AtomicBool>,
}

impl ExportServer {
    /// Bind the listener described by `config`.
    pub fn bind(config: ExportConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.bind.as_str(), config.port)).map_err(|e| {
            WriterdeckError::Http(format!("cannot bind {}:{}: {e}", config.bind, config.port))
        })?;
        // Symlink checks compare against the real location of the root.
        let canonical_root = config
            .root
            .canonicalize()
            .unwrap_or_else(|_| config.root.clone());
        log::debug!("export root {}", canonical_root.display());

        Ok(Self {
            listener,
            handler: Arc::new(Handler {
                config,
                canonical_root,
            }),
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &ExportConfig {
        &self.handler.config
    }

    /// Accept connections until the stop flag is raised.
    pub fn serve_forever(&self) -> Result<()> {
        for stream in self.listener.incoming() {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            match stream {
                Ok(stream) => {
                    let handler = Arc::clone(&self.handler);
                    let spawned = thread::Builder::new()
                        .name("export-conn".to_string())
                        .spawn(move || handler.handle_connection(stream));
                    if let Err(e) = spawned {
                        log::warn!("could not spawn connection thread: {e}");
                    }
                },
                Err(e) => log::warn!("accept failed: {e}"),
            }
        }
        log::debug!("export server stopped");
        Ok(())
    }

    /// Run the accept loop on a background thread.
    pub fn spawn(self) -> Result<ServerHandle> {
        let addr = self.local_addr()?;
        let stop = Arc::clone(&self.stop);
        let thread = thread::Builder::new()
            .name("export-accept".to_string())
            .spawn(move || {
                if let Err(e) = self.serve_forever() {
                    log::error!("export server: {e}");
                }
            })?;
        Ok(ServerHandle {
            addr,
            stop,
            thread: Some(thread),
        })
    }
}

/// A running background server. Dropping the handle also shuts it down.
pub struct ServerHandle {
    addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and wait for the accept loop to exit. In-flight
    /// connections finish on their own threads.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        self.stop.store(true, Ordering::SeqCst);
        // `accept` only returns on a connection; make one.
        if let Err(e) = TcpStream::connect_timeout(&wake_addr(self.addr), Duration::from_secs(1)) {
            log::debug!("wake-up connect failed: {e}");
        }
        if thread.join().is_err() {
            log::warn!("export accept thread panicked");
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Loopback equivalent of a wildcard bind address.
fn wake_addr(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}

/// Per-server request logic, shared read-only by connection threads.
struct Handler {
    config: ExportConfig,
    canonical_root: PathBuf,
}

impl Handler {
    fn handle_connection(&self, mut stream: TcpStream) {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "-".to_string());
        if let Err(e) = stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .and_then(|()| stream.set_write_timeout(Some(WRITE_TIMEOUT)))
        {
            log::debug!("{peer}: socket options: {e}");
        }

        let head = match read_head(&mut stream) {
            Ok(HeadRead::Complete(head)) => head,
            Ok(HeadRead::Closed) => return,
            Ok(HeadRead::TooLarge) => {
                log::info!("{peer} \"-\" 400 (request head too large)");
                self.send(&mut stream, &peer, Response::error(400, "Request header too large"), false);
                return;
            },
            Err(e) => {
                log::debug!("{peer}: read failed: {e}");
                return;
            },
        };

        let Some(line) = parse_request_line(&head) else {
            log::info!("{peer} \"-\" 400");
            self.send(&mut stream, &peer, Response::error(400, "Bad request syntax"), false);
            return;
        };

        let response = match line.method.as_str() {
            "GET" | "HEAD" => self.respond(&line.target),
            other => Response::error(501, &format!("Unsupported method ('{other}')")),
        };
        log::info!("{peer} \"{} {}\" {}", line.method, line.target, response.status);
        self.send(&mut stream, &peer, response, line.method == "HEAD");
    }

    fn send(&self, stream: &mut TcpStream, peer: &str, response: Response, head_only: bool) {
        if let Err(e) = response.write_to(stream, head_only) {
            log::debug!("{peer}: write failed: {e}");
        }
        close_gracefully(stream);
    }

    fn respond(&self, target: &str) -> Response {
        if target == "/favicon.ico" {
            return Response::error(404, "Not found");
        }
        match &self.config.single_file {
            Some(file) => self.serve_single(file),
            None => self.serve_tree(target),
        }
    }

    fn serve_single(&self, file: &Path) -> Response {
        match std::fs::metadata(file) {
            Ok(meta) if meta.is_file() => attachment(file),
            _ => Response::error(404, "File not found"),
        }
    }

    fn serve_tree(&self, target: &str) -> Response {
        let (raw_path, query) = split_target(target);
        let url_path = percent_decode(raw_path);

        let Some(fs_path) = resolve_under(&self.config.root, &url_path) else {
            return Response::error(403, "Forbidden");
        };
        let Ok(meta) = std::fs::metadata(&fs_path) else {
            return Response::error(404, "File not found");
        };
        if !self.within_root(&fs_path) {
            return Response::error(403, "Forbidden");
        }

        if meta.is_dir() {
            return self.serve_dir(&fs_path, raw_path, &url_path, query);
        }
        if meta.is_file() {
            return attachment(&fs_path);
        }
        Response::error(404, "File not found")
    }

    fn serve_dir(&self, dir: &Path, raw_path: &str, url_path: &str, query: Option<&str>) -> Response {
        if !url_path.ends_with('/') {
            let mut location = format!("{raw_path}/");
            if let Some(q) = query {
                location.push('?');
                location.push_str(q);
            }
            return Response::new(301).header("Location", location);
        }

        for name in INDEX_FILES {
            let index = dir.join(name);
            if index.is_file() && self.within_root(&index) {
                return inline(&index);
            }
        }

        if !self.config.allow_listing {
            return Response::error(403, "Directory listing disabled");
        }
        match render_listing(url_path, dir) {
            Ok(page) => Response::html(200, page),
            Err(e) => {
                log::warn!("cannot list {}: {e}", dir.display());
                Response::error(404, "No permission to list directory")
            },
        }
    }

    /// Whether the real location of `path` is inside the real root.
    fn within_root(&self, path: &Path) -> bool {
        path.canonicalize()
            .map(|real| real.starts_with(&self.canonical_root))
            .unwrap_or(false)
    }
}

/// Half-close and discard unread input so the peer sees the response
/// instead of a reset.
fn close_gracefully(stream: &mut TcpStream) {
    if stream.shutdown(Shutdown::Write).is_err() {
        return;
    }
    let _ = stream.set_read_timeout(Some(LINGER_TIMEOUT));
    let mut sink = [0u8; 4096];
    let mut drained = 0usize;
    while drained < LINGER_MAX_BYTES {
        match stream.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(n) => drained += n,
        }
    }
}

/// A file sent as a download: attachment disposition, never cached.
fn attachment(path: &Path) -> Response {
    let Ok((file, len)) = open_file(path) else {
        return Response::error(404, "File not found");
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().replace('\\', "\\\\").replace('"', "\\\""))
        .unwrap_or_default();
    Response::new(200)
        .header("Content-Type", guess_content_type(path))
        .header("Content-Length", len.to_string())
        .header("Content-Disposition", format!("attachment; filename=\"{filename}\""))
        .header("Cache-Control", "no-store")
        .body(Body::File(file, len))
}

/// A file rendered in the browser (directory index pages).
fn inline(path: &Path) -> Response {
    let Ok((file, len)) = open_file(path) else {
        return Response::error(404, "File not found");
    };
    Response::new(200)
        .header("Content-Type", guess_content_type(path))
        .header("Content-Length", len.to_string())
        .body(Body::File(file, len))
}

fn open_file(path: &Path) -> std::io::Result<(File, u64)> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}
