//! Command-line interface for the `parlor` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parlor - host side of the parlor game engine
#[derive(Parser, Debug)]
#[command(name = "parlor")]
#[command(about = "Runs scripted parlor games and checks server configuration", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a JSON script and print every step's outcome as JSON
    Replay {
        /// Script file
        #[arg(short, long)]
        script: PathBuf,

        /// Server config (TOML). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the outcomes
        #[arg(long)]
        pretty: bool,
    },

    /// Load a config file and build every collaborator it names
    CheckConfig {
        /// Server config (TOML)
        #[arg(short, long, default_value = "parlor.toml")]
        config: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_args_parse() {
        let cli = Cli::parse_from(["parlor", "replay", "--script", "game.json", "--pretty"]);
        let Command::Replay {
            script,
            config,
            pretty,
        } = cli.command
        else {
            panic!("replay expected");
        };
        assert_eq!(script, PathBuf::from("game.json"));
        assert!(config.is_none());
        assert!(pretty);
    }

    #[test]
    fn test_check_config_default_path() {
        let cli = Cli::parse_from(["parlor", "check-config"]);
        assert!(matches!(
            cli.command,
            Command::CheckConfig { config } if config == PathBuf::from("parlor.toml")
        ));
    }
}
