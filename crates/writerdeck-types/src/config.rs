//! Optional `writerdeck.toml` with defaults for the export server and the
//! pairing agent. Command-line flags win over anything set here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WriterdeckError};

/// File name looked up inside [`crate::paths::config_dir`].
pub const CONFIG_FILE_NAME: &str = "writerdeck.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub export: ExportDefaults,
    #[serde(default)]
    pub agent: AgentDefaults,
}

/// `[export]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportDefaults {
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Export directory (`~` is expanded). `None` means "choose automatically".
    #[serde(default)]
    pub dir: Option<String>,
    /// Whether directory listings are served.
    #[serde(default)]
    pub allow_listing: bool,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            dir: None,
            allow_listing: false,
        }
    }
}

/// `[agent]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentDefaults {
    /// Log file the agent appends to.
    #[serde(default = "default_agent_log")]
    pub log: PathBuf,
    /// Attempts to wait for the adapter to report `Powered: yes`.
    #[serde(default = "default_wait_retries")]
    pub wait_retries: u32,
    /// Seconds between those attempts.
    #[serde(default = "default_wait_delay")]
    pub wait_delay: f64,
    /// Turn discoverable/pairable/scan off after a successful connect.
    #[serde(default = "yes")]
    pub post_connect_knobs: bool,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            log: default_agent_log(),
            wait_retries: default_wait_retries(),
            wait_delay: default_wait_delay(),
            post_connect_knobs: true,
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_agent_log() -> PathBuf {
    PathBuf::from("/tmp/bt-autopair-trust-connect.log")
}

fn default_wait_retries() -> u32 {
    10
}

fn default_wait_delay() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

/// Parse a `writerdeck.toml` document.
pub fn parse_config(toml_str: &str) -> Result<DeckConfig> {
    toml::from_str(toml_str).map_err(|e| WriterdeckError::Config(format!("writerdeck.toml: {e}")))
}

/// Load the config file at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<DeckConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DeckConfig::default()),
        Err(e) => Err(e.into()),
    }
}
