//! `writerdeck` entry point.
//!
//! Exit codes: 0 on success, 1 for configuration and runtime errors, 2 when
//! the export server cannot bind its port.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use writerdeck_bluez::LogTee;
use writerdeck_types::config::{CONFIG_FILE_NAME, DeckConfig, load_config};
use writerdeck_types::error::WriterdeckError;
use writerdeck_types::paths;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config_file
        .clone()
        .unwrap_or_else(|| paths::config_dir().join(CONFIG_FILE_NAME));
    let deck = load_config(&config_path);

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Command::BtAgent(args) = &cli.command {
        let defaults = deck.as_ref().map(|d| d.agent.clone()).unwrap_or_default();
        let log_path = commands::agent_log_path(args, &defaults);
        logger.target(env_logger::Target::Pipe(Box::new(LogTee::open(&log_path))));
    }
    logger.init();

    let deck = match deck {
        Ok(deck) => deck,
        Err(e) => {
            log::error!("{}: {e}", config_path.display());
            return ExitCode::from(1);
        },
    };

    match run(&cli.command, &deck) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(exit_code(&e))
        },
    }
}

fn run(command: &Command, deck: &DeckConfig) -> anyhow::Result<()> {
    match command {
        Command::Export(args) => commands::export(args, deck),
        Command::BtAgent(args) => commands::bt_agent(args, deck),
        Command::Theme(cmd) => commands::theme(cmd),
        Command::Rotation(cmd) => commands::rotation(cmd),
        Command::LastUsed(cmd) => commands::last_used(cmd),
        Command::Lan(args) => commands::lan(args),
    }
}

/// Bind failures get their own code so wrappers can suggest another port.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<WriterdeckError>() {
        Some(WriterdeckError::Http(_)) => 2,
        _ => 1,
    }
}
