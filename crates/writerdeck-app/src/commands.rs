//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use writerdeck_bluez::{AgentOptions, AgentRunOptions, run_agent};
use writerdeck_net::{ExportConfig, ExportServer, choose_export_dir, lan_ips, port_in_use, share_urls};
use writerdeck_platform::{LastUsedStore, RotationConfig, rotation_label};
use writerdeck_skin::{Slot, ThemeSelection, ThemeStore, VisualKnobs, available_themes};
use writerdeck_types::config::{AgentDefaults, DeckConfig, ExportDefaults};
use writerdeck_types::env::ProcessEnv;
use writerdeck_types::paths;

use crate::cli::{AgentArgs, ExportArgs, LastUsedCommand, LanArgs, RotationCommand, ThemeCommand};

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

/// Merge flags over the `[export]` table into a server config.
pub fn export_config(args: &ExportArgs, defaults: &ExportDefaults, home: &Path) -> Result<ExportConfig> {
    let dir = match args.dir.as_deref().or(defaults.dir.as_deref()) {
        Some(dir) => dir.to_string(),
        None => choose_export_dir(home).to_string_lossy().into_owned(),
    };
    let mut config = ExportConfig::resolve(&dir, args.file.as_deref(), home)?;
    config.port = args.port.unwrap_or(defaults.port);
    config.bind = args.bind.clone().unwrap_or_else(|| defaults.bind.clone());
    config.allow_listing = args.list || defaults.allow_listing;
    Ok(config)
}

pub fn export(args: &ExportArgs, deck: &DeckConfig) -> Result<()> {
    let config = export_config(args, &deck.export, &paths::home_dir())?;
    if port_in_use(config.port) {
        log::warn!("port {} already answers on 127.0.0.1", config.port);
    }

    let target = config.single_file.as_ref().unwrap_or(&config.root).clone();
    let (bind, port) = (config.bind.clone(), config.port);
    let mode = config.mode_summary();

    let server = ExportServer::bind(config).with_context(|| {
        format!("uplink failed on {bind}:{port}; try --port 8081 or stop the other server")
    })?;
    let port = server.local_addr()?.port();

    println!("Serving {} on {bind}:{port}", target.display());
    println!("Mode: {mode}");
    println!("Routes:");
    for (kind, url) in share_urls(&lan_ips(), port) {
        println!("  ({kind}) {url}");
    }
    if bind == "127.0.0.1" {
        println!("  (tunnel) ssh -L {port}:127.0.0.1:{port} <user>@<host>.local");
    }
    println!("Read-only; Content-Disposition=attachment; Cache-Control=no-store. Ctrl+C to stop.");

    server.serve_forever()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// bt-agent
// ---------------------------------------------------------------------------

/// Log file the agent tees into.
pub fn agent_log_path(args: &AgentArgs, defaults: &AgentDefaults) -> PathBuf {
    args.log.clone().unwrap_or_else(|| defaults.log.clone())
}

pub fn agent_options(args: &AgentArgs, defaults: &AgentDefaults) -> Result<AgentRunOptions> {
    let delay = args.wait_delay.unwrap_or(defaults.wait_delay);
    let wait_delay = Duration::try_from_secs_f64(delay)
        .with_context(|| format!("invalid --wait-delay {delay}"))?;
    Ok(AgentRunOptions {
        agent: AgentOptions {
            dry_run: args.dry_run,
            post_connect_knobs: defaults.post_connect_knobs && !args.no_post_connect_knobs,
            ..AgentOptions::default()
        },
        wait_retries: args.wait_retries.unwrap_or(defaults.wait_retries),
        wait_delay,
    })
}

pub fn bt_agent(args: &AgentArgs, deck: &DeckConfig) -> Result<()> {
    let options = agent_options(args, &deck.agent)?;
    run_agent(options).context("bluetooth agent failed")
}

// ---------------------------------------------------------------------------
// theme
// ---------------------------------------------------------------------------

pub fn theme(cmd: &ThemeCommand) -> Result<()> {
    let env = ProcessEnv;
    let mut selection = ThemeSelection::load(&env, ThemeStore::default_location());

    match cmd {
        ThemeCommand::List => {
            for name in available_themes() {
                let marker = if name == selection.current() { "*" } else { " " };
                println!("{marker} {name}");
            }
        },
        ThemeCommand::Get => println!("{}", selection.current()),
        ThemeCommand::Set { name } => {
            if !selection.set(name) {
                bail!(
                    "unknown theme '{name}' (available: {})",
                    available_themes().join(", ")
                );
            }
            println!("{}", selection.current());
        },
        ThemeCommand::Show => {
            let palette = selection.palette(&env);
            println!("theme = {}", palette.theme);
            for slot in Slot::ALL {
                println!("{:<13} {}", slot.key(), palette.get(slot));
            }
            for pair in palette.pairs() {
                let bg = pair.bg.map_or("default".to_string(), |c| c.to_string());
                println!("pair {:>2}: {} on {bg}", pair.id, pair.fg);
            }
            let knobs = VisualKnobs::from_env(&env);
            println!("bolt_step = {}", knobs.bolt_step);
            println!("patina_density = {}", knobs.patina_density);
            println!("static_density = {}", knobs.static_density);
            println!("static_weights = {:?}", knobs.static_weights);
        },
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// rotation / last-used / lan
// ---------------------------------------------------------------------------

pub fn rotation(cmd: &RotationCommand) -> Result<()> {
    match cmd {
        RotationCommand::Get { config } => {
            let value = RotationConfig::new(config).read();
            match value {
                Some(v) => println!("{v} ({})", rotation_label(value)),
                None => println!("{}", rotation_label(None)),
            }
        },
        RotationCommand::Set { value, config } => {
            let backup = RotationConfig::new(config)
                .set(*value)
                .with_context(|| format!("cannot update {}", config.display()))?;
            println!("Rotation set to {}", rotation_label(Some(*value)));
            println!("Backup: {}", backup.display());
            println!("Reboot to apply.");
        },
    }
    Ok(())
}

pub fn last_used(cmd: &LastUsedCommand) -> Result<()> {
    let store = LastUsedStore::default_location();
    match cmd {
        LastUsedCommand::Get => println!("{}", store.get().as_deref().unwrap_or("none")),
        LastUsedCommand::Set { app } => store.record(app),
    }
    Ok(())
}

pub fn lan(args: &LanArgs) -> Result<()> {
    for (kind, url) in share_urls(&lan_ips(), args.port) {
        println!("({kind}) {url}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_args() -> ExportArgs {
        ExportArgs {
            dir: None,
            file: None,
            port: None,
            bind: None,
            list: false,
        }
    }

    fn agent_args() -> AgentArgs {
        AgentArgs {
            dry_run: false,
            log: None,
            wait_retries: None,
            wait_delay: None,
            no_post_connect_knobs: false,
        }
    }

    #[test]
    fn export_defaults_to_home() {
        let home = tempfile::tempdir().unwrap();
        let cfg = export_config(&export_args(), &ExportDefaults::default(), home.path()).unwrap();
        assert_eq!(cfg.root, home.path());
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.bind, "0.0.0.0");
        assert!(!cfg.allow_listing);
    }

    #[test]
    fn export_prefers_save_folder() {
        let home = tempfile::tempdir().unwrap();
        let save = home.path().join(writerdeck_net::hints::SAVE_DIR);
        std::fs::create_dir_all(&save).unwrap();
        let cfg = export_config(&export_args(), &ExportDefaults::default(), home.path()).unwrap();
        assert_eq!(cfg.root, save);
    }

    #[test]
    fn flags_override_file_defaults() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir(home.path().join("drafts")).unwrap();
        let defaults = ExportDefaults {
            port: 9000,
            bind: "127.0.0.1".to_string(),
            dir: Some("~/drafts".to_string()),
            allow_listing: true,
        };
        let args = ExportArgs {
            port: Some(8081),
            ..export_args()
        };
        let cfg = export_config(&args, &defaults, home.path()).unwrap();
        assert_eq!(cfg.root, home.path().join("drafts"));
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.bind, "127.0.0.1");
        assert!(cfg.allow_listing);
    }

    #[test]
    fn export_missing_dir_is_error() {
        let home = tempfile::tempdir().unwrap();
        let args = ExportArgs {
            dir: Some("~/nowhere".to_string()),
            ..export_args()
        };
        assert!(export_config(&args, &ExportDefaults::default(), home.path()).is_err());
    }

    #[test]
    fn agent_options_merge() {
        let defaults = AgentDefaults::default();
        let opts = agent_options(&agent_args(), &defaults).unwrap();
        assert_eq!(opts.wait_retries, 10);
        assert_eq!(opts.wait_delay, Duration::from_secs(1));
        assert!(opts.agent.post_connect_knobs);
        assert!(!opts.agent.dry_run);

        let args = AgentArgs {
            dry_run: true,
            wait_retries: Some(2),
            wait_delay: Some(0.25),
            no_post_connect_knobs: true,
            ..agent_args()
        };
        let opts = agent_options(&args, &defaults).unwrap();
        assert_eq!(opts.wait_retries, 2);
        assert_eq!(opts.wait_delay, Duration::from_millis(250));
        assert!(!opts.agent.post_connect_knobs);
        assert!(opts.agent.dry_run);
    }

    #[test]
    fn negative_delay_is_rejected() {
        let args = AgentArgs {
            wait_delay: Some(-1.0),
            ..agent_args()
        };
        assert!(agent_options(&args, &AgentDefaults::default()).is_err());
    }

    #[test]
    fn agent_log_path_prefers_flag() {
        let defaults = AgentDefaults::default();
        assert_eq!(
            agent_log_path(&agent_args(), &defaults),
            PathBuf::from("/tmp/bt-autopair-trust-connect.log")
        );
        let args = AgentArgs {
            log: Some(PathBuf::from("/var/log/agent.log")),
            ..agent_args()
        };
        assert_eq!(agent_log_path(&args, &defaults), PathBuf::from("/var/log/agent.log"));
    }
}
