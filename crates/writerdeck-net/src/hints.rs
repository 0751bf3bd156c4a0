//! Where to reach the appliance, and where its exports live.
//!
//! The share banner lists a few addresses a phone or laptop on the same
//! network can try: the mDNS name first, then LAN addresses.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream, UdpSocket};
use std::path::{Path, PathBuf};
use std::time::Duration;

use writerdeck_platform::run_with_timeout;

/// Drop folder the appliance's save dialogs point at, relative to `$HOME`.
pub const SAVE_DIR: &str = "silo11writerdeck/!save_files_here";

/// Probe target for discovering the outbound LAN address. No packet is sent.
const PROBE_TARGET: &str = "8.8.8.8:80";

const PORT_PROBE_TIMEOUT: Duration = Duration::from_millis(250);
const HOSTNAME_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    Mdns,
    Lan,
    Loopback,
}

impl std::fmt::Display for HintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            HintKind::Mdns => "mDNS",
            HintKind::Lan => "LAN",
            HintKind::Loopback => "loopback",
        })
    }
}

/// One address the server can be reached at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanHint {
    pub kind: HintKind,
    pub address: String,
}

impl LanHint {
    fn new(kind: HintKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
        }
    }
}

/// Build the ordered, de-duplicated hint list from raw probe results.
///
/// Order: `<hostname>.local`, the UDP probe address, then each address of
/// `hostname -I` output. Falls back to loopback when nothing is known.
pub fn lan_hints(
    hostname: Option<&str>,
    udp_probe: Option<IpAddr>,
    hostname_i: Option<&str>,
) -> Vec<LanHint> {
    let mut candidates = Vec::new();
    if let Some(name) = hostname.map(str::trim)
        && !name.is_empty()
    {
        candidates.push(LanHint::new(HintKind::Mdns, format!("{name}.local")));
    }
    if let Some(ip) = udp_probe {
        candidates.push(LanHint::new(HintKind::Lan, ip.to_string()));
    }
    for addr in hostname_i.unwrap_or_default().split_whitespace() {
        candidates.push(LanHint::new(HintKind::Lan, addr));
    }

    let mut hints: Vec<LanHint> = Vec::with_capacity(candidates.len());
    for hint in candidates {
        if !hints.iter().any(|h| h.address == hint.address) {
            hints.push(hint);
        }
    }
    if hints.is_empty() {
        hints.push(LanHint::new(HintKind::Loopback, "127.0.0.1"));
    }
    hints
}

/// Probe this machine for its current hints.
pub fn lan_ips() -> Vec<LanHint> {
    let hostname = read_hostname();
    let hostname_i = run_with_timeout("hostname", &["-I"], HOSTNAME_TIMEOUT)
        .ok()
        .filter(|out| out.success())
        .map(|out| out.output);
    lan_hints(hostname.as_deref(), udp_probe(), hostname_i.as_deref())
}

fn read_hostname() -> Option<String> {
    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .find_map(|p| std::fs::read_to_string(p).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Source address the kernel would use to reach the internet.
fn udp_probe() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(PROBE_TARGET).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// `http://<host>:<port>/` for each hint, bracketing IPv6 literals.
pub fn share_urls(hints: &[LanHint], port: u16) -> Vec<(HintKind, String)> {
    hints
        .iter()
        .map(|h| {
            let host = if h.address.contains(':') {
                format!("[{}]", h.address)
            } else {
                h.address.clone()
            };
            (h.kind, format!("http://{host}:{port}/"))
        })
        .collect()
}

/// The save folder under `home` when it exists, else `home` itself.
pub fn choose_export_dir(home: &Path) -> PathBuf {
    let save = home.join(SAVE_DIR);
    if save.is_dir() { save } else { home.to_path_buf() }
}

/// Whether something already listens on `127.0.0.1:port`.
pub fn port_in_use(port: u16) -> bool {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    TcpStream::connect_timeout(&addr, PORT_PROBE_TIMEOUT).is_ok()
}
