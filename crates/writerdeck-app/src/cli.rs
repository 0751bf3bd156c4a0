use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "writerdeck",
    version,
    about = "Writing appliance helpers: LAN export, Bluetooth pairing, theme and state"
)]
pub struct Cli {
    /// Settings file (defaults to $XDG_CONFIG_HOME/silo11writerdeck/writerdeck.toml)
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a file or directory over HTTP for download (read-only)
    Export(ExportArgs),
    /// Run the BlueZ auto-pair, trust & connect agent (NoInputNoOutput)
    BtAgent(AgentArgs),
    /// Inspect or switch the menu theme
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Read or change the HDMI rotation in the boot config
    #[command(subcommand)]
    Rotation(RotationCommand),
    /// Remember which writing app was launched last
    #[command(subcommand)]
    LastUsed(LastUsedCommand),
    /// Print the addresses this machine can be reached at
    Lan(LanArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Base directory (default: ~/silo11writerdeck/!save_files_here, else ~)
    #[arg(long)]
    pub dir: Option<String>,

    /// File under --dir to serve for every request (single-file mode)
    #[arg(long)]
    pub file: Option<String>,

    /// TCP port (default: 8080)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for local only)
    #[arg(long)]
    pub bind: Option<String>,

    /// Allow directory listing (off by default)
    #[arg(long)]
    pub list: bool,
}

#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Print intended bluetoothctl commands without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Log file (default: /tmp/bt-autopair-trust-connect.log)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Max attempts to wait for adapter Powered: yes (default: 10)
    #[arg(long)]
    pub wait_retries: Option<u32>,

    /// Delay in seconds between wait attempts (default: 1.0)
    #[arg(long)]
    pub wait_delay: Option<f64>,

    /// Do NOT disable discoverable/pairable/scan after connect
    #[arg(long)]
    pub no_post_connect_knobs: bool,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// List available themes, marking the active one
    List,
    /// Print the active theme
    Get,
    /// Switch theme and remember it
    Set { name: String },
    /// Print the resolved palette and visual knobs
    Show,
}

#[derive(Subcommand, Debug)]
pub enum RotationCommand {
    /// Print the current HDMI rotation
    Get {
        #[arg(long, default_value = writerdeck_platform::rotation::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Set the HDMI rotation (0=0°, 1=90°, 2=180°, 3=270°); takes effect after reboot
    Set {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=3))]
        value: u8,
        #[arg(long, default_value = writerdeck_platform::rotation::DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum LastUsedCommand {
    /// Print the last launched writing app
    Get,
    /// Record the last launched writing app
    Set { app: String },
}

#[derive(Args, Debug)]
pub struct LanArgs {
    /// Port to include in the printed URLs
    #[arg(long, default_value_t = writerdeck_net::export::DEFAULT_PORT)]
    pub port: u16,
}
