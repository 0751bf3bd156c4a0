//! `org.bluez.Agent1` on the system bus.

use std::time::Duration;

use zbus::zvariant::{ObjectPath, OwnedObjectPath};

use writerdeck_platform::which;
use writerdeck_types::error::{Result, WriterdeckError};

use crate::agent::{AgentOptions, PairingAgent};
use crate::ctl::{Bluetoothctl, wait_for_powered};

/// Object path the agent is exported at.
pub const AGENT_PATH: &str = "/test/agent";
/// Pairing capability announced to BlueZ.
pub const AGENT_CAPABILITY: &str = "NoInputNoOutput";

#[zbus::proxy(
    interface = "org.bluez.AgentManager1",
    default_service = "org.bluez",
    default_path = "/org/bluez"
)]
trait AgentManager {
    fn register_agent(&self, agent: &ObjectPath<'_>, capability: &str) -> zbus::Result<()>;
    fn request_default_agent(&self, agent: &ObjectPath<'_>) -> zbus::Result<()>;
}

/// Bus adapter around [`PairingAgent`].
struct Agent1 {
    agent: PairingAgent,
}

#[zbus::interface(name = "org.bluez.Agent1")]
impl Agent1 {
    fn release(&self) {
        self.agent.release();
    }

    fn authorize_service(&self, device: OwnedObjectPath, uuid: String) {
        self.agent.authorize_service(device.as_str(), &uuid);
    }

    fn request_pin_code(&self, device: OwnedObjectPath) -> String {
        self.agent.request_pin_code(device.as_str())
    }

    fn request_passkey(&self, device: OwnedObjectPath) -> u32 {
        self.agent.request_passkey(device.as_str())
    }

    fn display_passkey(&self, device: OwnedObjectPath, passkey: u32, entered: u16) {
        self.agent.display_passkey(device.as_str(), passkey, entered);
    }

    fn display_pin_code(&self, device: OwnedObjectPath, pincode: String) {
        self.agent.display_pin_code(device.as_str(), &pincode);
    }

    fn request_confirmation(&self, device: OwnedObjectPath, passkey: u32) {
        self.agent.request_confirmation(device.as_str(), passkey);
    }

    fn request_authorization(&self, device: OwnedObjectPath) {
        self.agent.request_authorization(device.as_str());
    }

    fn cancel(&self) {
        self.agent.cancel();
    }
}

/// Startup parameters for [`run_agent`].
#[derive(Debug, Clone)]
pub struct AgentRunOptions {
    pub agent: AgentOptions,
    pub wait_retries: u32,
    pub wait_delay: Duration,
}

fn dbus_err(e: zbus::Error) -> WriterdeckError {
    WriterdeckError::DBus(e.to_string())
}

/// Check for `bluetoothctl`, wait for the adapter, register the agent and
/// serve it until the process is killed.
pub fn run_agent(options: AgentRunOptions) -> Result<()> {
    if which("bluetoothctl").is_none() {
        return Err(WriterdeckError::Bluetooth(
            "bluetoothctl not found in PATH".to_string(),
        ));
    }

    let ctl = Bluetoothctl::new(options.agent.dry_run);
    if !options.agent.dry_run {
        wait_for_powered(|| ctl.show(), options.wait_retries, options.wait_delay);
    }

    let service = Agent1 {
        agent: PairingAgent::new(Box::new(ctl), options.agent),
    };
    let connection = zbus::blocking::connection::Builder::system()
        .and_then(|b| b.serve_at(AGENT_PATH, service))
        .and_then(|b| b.build())
        .map_err(dbus_err)?;

    let path = ObjectPath::try_from(AGENT_PATH)
        .map_err(|e| WriterdeckError::DBus(format!("agent path: {e}")))?;
    let manager = AgentManagerProxyBlocking::new(&connection).map_err(dbus_err)?;
    manager
        .register_agent(&path, AGENT_CAPABILITY)
        .map_err(dbus_err)?;
    manager.request_default_agent(&path).map_err(dbus_err)?;
    log::info!("Agent registered ({AGENT_CAPABILITY}) and running");

    // The connection dispatches calls on its own executor thread.
    loop {
        std::thread::park();
    }
}
