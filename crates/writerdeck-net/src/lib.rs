//! Networking for writerdeck.
//!
//! The export server hands files off the appliance over plain HTTP on the
//! local network. It is download-only: GET and HEAD, one request per
//! connection, nothing is ever written to disk.

pub mod export;
pub mod hints;
pub mod mime;

pub use export::{ExportConfig, ExportServer, ServerHandle};
pub use hints::{HintKind, LanHint, choose_export_dir, lan_hints, lan_ips, port_in_use, share_urls};
pub use mime::guess_content_type;
