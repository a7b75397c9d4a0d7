//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Probe a database through the repository base
#[derive(Parser, Debug)]
#[command(name = "db-probe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Name of the environment variable holding the connection string,
    /// overriding DATA_CONNECTION_STRING_NAME
    #[arg(short = 'n', long, global = true)]
    pub connection_string_name: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect, ping through an owning and a borrowing repository, then dispose both
    Check,

    /// Show the active connection string name and whether it resolves
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_with_name() {
        let cli = Cli::try_parse_from(["db-probe", "check", "--connection-string-name", "Reports"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.connection_string_name.as_deref(), Some("Reports"));
    }

    #[test]
    fn test_parse_verbose_show() {
        let cli = Cli::try_parse_from(["db-probe", "-v", "show"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Show));
    }
}
