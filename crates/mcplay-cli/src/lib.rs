//! Command-line playground for MCP tool servers.
//!
//! `bootstrap` is the composition root; handlers only talk to the
//! `PlaygroundSession` and the config file.

#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only.
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod utils;

pub use bootstrap::{CliConfig, CliContext, bootstrap, init_logging};
pub use commands::{Commands, ConfigCommand, ServersCommand};
pub use error::CliError;
pub use parser::Cli;
