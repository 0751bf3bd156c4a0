//! HDMI rotation in the Raspberry Pi firmware config.
//!
//! The rotation is a single `display_hdmi_rotate=<0..3>` line inside
//! `/boot/firmware/config.txt`. Every rewrite leaves a timestamped backup
//! next to the file and replaces it atomically.

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use writerdeck_types::error::{Result, WriterdeckError};

/// Default firmware config location.
pub const DEFAULT_CONFIG_PATH: &str = "/boot/firmware/config.txt";

/// Config key holding the rotation.
pub const ROTATION_KEY: &str = "display_hdmi_rotate";

/// Human label for a rotation value.
pub fn rotation_label(value: Option<u8>) -> &'static str {
    match value {
        Some(0) => "0°",
        Some(1) => "90°",
        Some(2) => "180°",
        Some(3) => "270°",
        _ => "not set",
    }
}

/// Text after `key`, ignoring leading whitespace, an `=` and the whitespace
/// around it. `None` if the line does not assign `key`.
fn assignment_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(key)?;
    let rest = rest.trim_start().strip_prefix('=')?;
    Some(rest.trim_start())
}

/// Parse one config line as a valid rotation assignment. Trailing
/// whitespace and a `#` comment are allowed after the digit.
fn parse_line(line: &str) -> Option<u8> {
    let value = assignment_value(line, ROTATION_KEY)?;
    let mut chars = value.chars();
    let digit = chars.next()?;
    let tail = chars.as_str().trim_start();
    if !(tail.is_empty() || tail.starts_with('#')) {
        return None;
    }
    match digit {
        '0'..='3' => Some(digit as u8 - b'0'),
        _ => None,
    }
}

/// First valid rotation assignment in `text`.
pub fn parse_rotation(text: &str) -> Option<u8> {
    text.lines().find_map(parse_line)
}

/// `text` with every `display_hdmi_rotate =` line replaced by
/// `display_hdmi_rotate=<value>`, or the line appended when none exists.
pub fn rewrite_rotation(text: &str, value: u8) -> String {
    let wanted = format!("{ROTATION_KEY}={value}");
    let mut changed = false;
    let mut out = String::with_capacity(text.len() + wanted.len() + 1);

    for line in text.lines() {
        if assignment_value(line, ROTATION_KEY).is_some() {
            out.push_str(&wanted);
            changed = true;
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    if !changed {
        out.push_str(&wanted);
        out.push('\n');
    }
    out
}

/// The firmware config file holding the rotation line.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    path: PathBuf,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl RotationConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current rotation, `None` if the file or the line is absent.
    pub fn read(&self) -> Option<u8> {
        let bytes = std::fs::read(&self.path).ok()?;
        parse_rotation(&String::from_utf8_lossy(&bytes))
    }

    /// Write `value` (0..=3). Returns the backup path.
    pub fn set(&self, value: u8) -> Result<PathBuf> {
        if value > 3 {
            return Err(WriterdeckError::Platform(format!(
                "rotation must be 0-3, got {value}"
            )));
        }
        if !self.path.is_file() {
            return Err(WriterdeckError::Platform(format!(
                "{} not found",
                self.path.display()
            )));
        }

        let original = std::fs::read(&self.path)?;
        let backup = self.backup_path(&chrono::Local::now().format("%Y%m%d-%H%M%S").to_string());
        std::fs::write(&backup, &original)?;
        log::info!("backed up {} to {}", self.path.display(), backup.display());

        let updated = rewrite_rotation(&String::from_utf8_lossy(&original), value);
        self.install(updated.as_bytes())?;
        log::info!("{ROTATION_KEY}={value} written to {}", self.path.display());
        Ok(backup)
    }

    fn backup_path(&self, stamp: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".wb-backup-{stamp}"));
        self.path.with_file_name(name)
    }

    /// Replace the config with `contents` via temp file + rename, mode 0644.
    fn install(&self, contents: &[u8]) -> Result<()> {
        let mut tmp_name = std::ffi::OsString::from(".");
        if let Some(name) = self.path.file_name() {
            tmp_name.push(name);
        }
        tmp_name.push(format!(".wb-tmp-{}", std::process::id()));
        let tmp = self.path.with_file_name(tmp_name);

        let written = (|| -> std::io::Result<()> {
            let mut f = std::fs::File::create(&tmp)?;
            f.write_all(contents)?;
            f.set_permissions(std::fs::Permissions::from_mode(0o644))?;
            f.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        })();

        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}
