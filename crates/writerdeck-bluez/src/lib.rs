//! BlueZ pairing agent.
//!
//! Registers a `NoInputNoOutput` agent on the system bus that accepts every
//! pairing request, trusts and connects the device through `bluetoothctl`,
//! and afterwards turns discoverable, pairable and scanning off so the
//! appliance stops advertising itself.
//!
//! The pairing decisions live in [`agent::PairingAgent`], independent of
//! D-Bus; [`dbus`] only adapts it to `org.bluez.Agent1`.

pub mod agent;
pub mod ctl;
pub mod dbus;
pub mod logfile;
pub mod mac;

pub use agent::{AgentOptions, ConfirmOutcome, PairingAgent};
pub use ctl::{BluetoothCtl, Bluetoothctl, wait_for_powered};
pub use dbus::{AGENT_CAPABILITY, AGENT_PATH, AgentRunOptions, run_agent};
pub use logfile::LogTee;
pub use mac::extract_mac;
