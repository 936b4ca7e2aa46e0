//! `servers` command handler.

use std::path::Path;

use mcplay_core::{ServerConfig, load_config, save_config};

use crate::commands::ServersCommand;
use crate::error::CliError;
use crate::presentation::print_separator;

/// Execute a `servers` subcommand against the config file.
pub fn execute(config_path: &Path, command: ServersCommand) -> Result<(), CliError> {
    let mut config = load_config(config_path)?;

    match command {
        ServersCommand::List => {
            if config.servers.is_empty() {
                println!("No servers configured. Add one with: mcplay servers add <name> <url>");
                return Ok(());
            }
            println!("{:<20}  {:<16}  URL", "NAME", "TRANSPORT");
            print_separator(72);
            for server in &config.servers {
                println!(
                    "{:<20}  {:<16}  {}",
                    server.name,
                    format!("{:?}", server.transport()),
                    server.url
                );
            }
        }
        ServersCommand::Add { name, url } => {
            let server = ServerConfig::new(name, url);
            server.validate().map_err(CliError::Arguments)?;
            if config.server(&server.name).is_some() {
                return Err(CliError::Config(format!(
                    "Server already configured: {}",
                    server.name
                )));
            }
            println!("Added server '{}' ({})", server.name, server.url);
            config.servers.push(server);
            save_config(config_path, &config)?;
        }
        ServersCommand::Remove { name } => {
            let before = config.servers.len();
            config.servers.retain(|s| s.name != name);
            if config.servers.len() == before {
                return Err(CliError::Config(format!("Server not configured: {name}")));
            }
            save_config(config_path, &config)?;
            println!("Removed server '{name}'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        execute(
            &path,
            ServersCommand::Add {
                name: "ga4".to_string(),
                url: "http://localhost:8002/sse".to_string(),
            },
        )
        .unwrap();
        assert_eq!(load_config(&path).unwrap().servers.len(), 1);

        let duplicate = execute(
            &path,
            ServersCommand::Add {
                name: "ga4".to_string(),
                url: "http://localhost:9000/mcp".to_string(),
            },
        );
        assert!(matches!(duplicate, Err(CliError::Config(_))));

        execute(&path, ServersCommand::Remove { name: "ga4".to_string() }).unwrap();
        assert!(load_config(&path).unwrap().servers.is_empty());
        assert!(execute(&path, ServersCommand::Remove { name: "ga4".to_string() }).is_err());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let result = execute(
            &path,
            ServersCommand::Add {
                name: "bad".to_string(),
                url: "localhost:8002".to_string(),
            },
        );
        assert!(matches!(result, Err(CliError::Arguments(_))));
        assert!(!path.exists());
    }
}
