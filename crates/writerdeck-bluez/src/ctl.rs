//! `bluetoothctl` invocation.

use std::time::Duration;

use writerdeck_platform::{EXIT_NOT_FOUND, ToolOutput, run_with_timeout};

/// Per-command timeout.
pub const BTCTL_TIMEOUT: Duration = Duration::from_secs(5);

/// Exit code reported when the command could not be started.
const EXIT_SPAWN_FAILED: i32 = 1;

/// Runs `bluetoothctl` subcommands. Nonzero exits are reported, not raised.
pub trait BluetoothCtl: Send + Sync {
    fn run(&self, args: &[&str]) -> ToolOutput;
}

/// The real `bluetoothctl` binary.
#[derive(Debug, Clone)]
pub struct Bluetoothctl {
    dry_run: bool,
    timeout: Duration,
}

impl Bluetoothctl {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            timeout: BTCTL_TIMEOUT,
        }
    }

    /// Output of `bluetoothctl show`, unlogged. `None` on failure or timeout.
    pub fn show(&self) -> Option<String> {
        run_with_timeout("bluetoothctl", &["show"], self.timeout)
            .ok()
            .filter(|out| !out.timed_out() && out.code != EXIT_NOT_FOUND)
            .map(|out| out.output)
    }
}

impl BluetoothCtl for Bluetoothctl {
    fn run(&self, args: &[&str]) -> ToolOutput {
        log::info!("$ bluetoothctl {}", args.join(" "));
        if self.dry_run {
            log::info!("[DRY RUN] Skipping execution");
            return ToolOutput {
                code: 0,
                output: String::new(),
            };
        }

        match run_with_timeout("bluetoothctl", args, self.timeout) {
            Ok(out) if out.timed_out() => {
                log::warn!("[btctl] ERROR: command timed out");
                ToolOutput {
                    code: out.code,
                    output: String::new(),
                }
            },
            Ok(out) if out.code == EXIT_NOT_FOUND => {
                log::error!("[btctl] ERROR: bluetoothctl not found");
                ToolOutput {
                    code: EXIT_SPAWN_FAILED,
                    output: String::new(),
                }
            },
            Ok(out) => {
                for line in out.output.trim().lines() {
                    log::info!("[btctl] {line}");
                }
                out
            },
            Err(e) => {
                log::error!("[btctl] ERROR: {e}");
                ToolOutput {
                    code: EXIT_SPAWN_FAILED,
                    output: String::new(),
                }
            },
        }
    }
}

/// Poll `show` until it reports `Powered: yes`.
///
/// Registering before bluetoothd has powered the adapter makes BlueZ drop
/// the agent. Returns `false` (after a warning) if it never does; the caller
/// carries on regardless.
pub fn wait_for_powered<F>(mut show: F, retries: u32, delay: Duration) -> bool
where
    F: FnMut() -> Option<String>,
{
    for attempt in 1..=retries {
        if show().is_some_and(|out| out.contains("Powered: yes")) {
            log::info!("Bluetooth adapter is powered: OK");
            return true;
        }
        log::info!(
            "Adapter not powered yet (attempt {attempt}/{retries}), waiting {:.1}s",
            delay.as_secs_f64()
        );
        std::thread::sleep(delay);
    }
    log::warn!("never saw Powered: yes; continuing anyway");
    false
}
