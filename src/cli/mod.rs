use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigLoader, CONFIG_ENV};

pub mod commands;

use self::commands::ExecArgs;

#[derive(Parser, Debug)]
#[command(
    name = "contactbook",
    version,
    about = "Contact book driven by typed commands"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over CONTACTBOOK_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read commands from stdin, one per line (default)
    Shell,
    /// Run the given commands in order and exit
    Exec(ExecArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }

    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let loader = ConfigLoader::discover()?;
    let config = loader.load_or_init()?;
    tracing::debug!(path = %loader.paths().config_file.display(), "config loaded");

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => commands::run_shell(&config),
        Commands::Exec(args) => commands::run_exec(&config, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow::anyhow!(err))
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exec_collects_commands_and_flags() {
        let cli = Cli::parse_from([
            "contactbook",
            "--log-level",
            "debug",
            "exec",
            "--json",
            "find alex",
            "list",
        ]);
        assert_eq!(cli.log_level, "debug");
        let Some(Commands::Exec(args)) = cli.command else {
            panic!("expected exec subcommand");
        };
        assert!(args.json);
        assert!(!args.keep_going);
        assert_eq!(args.commands, ["find alex", "list"]);
    }

    #[test]
    fn shell_is_the_default() {
        let cli = Cli::parse_from(["contactbook"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }
}
