//! Root CLI definition and global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Interactive client for MCP tool servers.
#[derive(Parser)]
#[command(name = "mcplay")]
#[command(about = "Connect to MCP tool servers and call their tools")]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long = "config", global = true, env = "MCPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from(["mcplay", "--verbose", "--config", "/tmp/c.json", "tools"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
        assert!(matches!(cli.command, Some(Commands::Tools { .. })));
    }
}
