//! Pairing decisions, independent of the bus.

use std::path::{Path, PathBuf};

use crate::ctl::BluetoothCtl;
use crate::mac::extract_mac;

/// Where the last confirmed device MAC is written.
pub const DEFAULT_MAC_FILE: &str = "/tmp/last_bluetooth_mac";
/// Fixed legacy PIN.
pub const PIN_CODE: &str = "0000";
/// Fixed passkey for devices that ask for one.
pub const PASSKEY: u32 = 123_456;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Log intended commands without running them.
    pub dry_run: bool,
    /// Turn discoverable/pairable/scan off after a successful connect.
    pub post_connect_knobs: bool,
    pub mac_file: PathBuf,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            post_connect_knobs: true,
            mac_file: PathBuf::from(DEFAULT_MAC_FILE),
        }
    }
}

/// What `request_confirmation` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    DryRun,
    /// The device path carried no parsable MAC.
    NoMac,
    Connected { mac: String, knobs_applied: bool },
    ConnectFailed { mac: String, code: i32 },
}

/// A BlueZ agent that says yes to everything.
pub struct PairingAgent {
    ctl: Box<dyn BluetoothCtl>,
    options: AgentOptions,
}

impl PairingAgent {
    pub fn new(ctl: Box<dyn BluetoothCtl>, options: AgentOptions) -> Self {
        Self { ctl, options }
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    pub fn release(&self) {
        log::info!("Agent released");
    }

    pub fn authorize_service(&self, device: &str, uuid: &str) {
        log::info!("AuthorizeService for {device}, uuid {uuid}");
    }

    pub fn request_pin_code(&self, device: &str) -> String {
        log::info!("RequestPinCode for {device} -> returning {PIN_CODE}");
        PIN_CODE.to_string()
    }

    pub fn request_passkey(&self, device: &str) -> u32 {
        log::info!("RequestPasskey for {device} -> returning {PASSKEY}");
        PASSKEY
    }

    pub fn display_passkey(&self, device: &str, passkey: u32, entered: u16) {
        log::info!("DisplayPasskey: {device} {passkey:06} (entered {entered})");
    }

    pub fn display_pin_code(&self, device: &str, pincode: &str) {
        log::info!("DisplayPinCode: {device} {pincode}");
    }

    /// Auto-confirm numeric comparison: trust, connect, optionally go quiet,
    /// then remember the MAC.
    pub fn request_confirmation(&self, device: &str, passkey: u32) -> ConfirmOutcome {
        log::info!("Auto-confirming {device} with passkey {passkey:06}");
        let mac = extract_mac(device);
        log::info!("Extracted MAC: {}", mac.as_deref().unwrap_or("<none>"));

        if self.options.dry_run {
            log::info!("[DRY RUN] Would trust/connect and apply post-connect knobs");
            return ConfirmOutcome::DryRun;
        }
        let Some(mac) = mac else {
            log::error!("Could not parse MAC from: {device}");
            return ConfirmOutcome::NoMac;
        };

        log::info!("Trusting {mac}");
        let trust = self.ctl.run(&["trust", mac.as_str()]);
        if !trust.success() {
            log::warn!("trust {mac} exited with {}", trust.code);
        }

        log::info!("Connecting {mac}");
        let connect = self.ctl.run(&["connect", mac.as_str()]);

        let outcome = if connect.success() {
            if self.options.post_connect_knobs {
                log::info!("Connect OK -> turning discoverable/pairable/scan OFF");
                self.ctl.run(&["discoverable", "off"]);
                self.ctl.run(&["pairable", "off"]);
                self.ctl.run(&["scan", "off"]);
            }
            ConfirmOutcome::Connected {
                knobs_applied: self.options.post_connect_knobs,
                mac: mac.clone(),
            }
        } else {
            log::info!("Connect failed -> skipping post-connect knobs");
            ConfirmOutcome::ConnectFailed {
                code: connect.code,
                mac: mac.clone(),
            }
        };

        if let Err(e) = write_last_mac(&self.options.mac_file, &mac) {
            log::error!("could not record MAC in {}: {e}", self.options.mac_file.display());
        }
        outcome
    }

    pub fn request_authorization(&self, device: &str) {
        log::info!("RequestAuthorization for {device}");
    }

    pub fn cancel(&self) {
        log::info!("Cancel");
    }
}

/// Write `mac` and a newline to `path`.
pub fn write_last_mac(path: &Path, mac: &str) -> std::io::Result<()> {
    std::fs::write(path, format!("{mac}\n"))
}
