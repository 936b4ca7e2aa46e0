//! CLI bootstrap - the composition root.
//!
//! The only place where infrastructure is wired together for the CLI:
//! - config file (via mcplay-core settings)
//! - chat session storage (via mcplay-db)
//! - HTTP MCP connector (via mcplay-mcp)
//! - the playground session and its execution bridge (via mcplay-runtime)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mcplay_core::paths::{config_file_path, database_path};
use mcplay_core::{AppEvent, AppEventEmitter, ClientConfig, ToolHintRegistry, load_config};
use mcplay_db::DbFactory;
use mcplay_mcp::HttpMcpConnector;
use mcplay_runtime::{ExecutionBridge, PlaygroundSession, SessionParts};
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,mcplay=info";

/// Log filter for `--verbose`.
const VERBOSE_LOG_FILTER: &str = "warn,mcplay=debug";

/// Initialize logging to stderr.
///
/// `--verbose` wins over `RUST_LOG`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Config file location.
    pub config_path: PathBuf,
    /// Chat session database location.
    pub database_path: PathBuf,
}

impl CliConfig {
    /// Default locations, with an optional config file override.
    pub fn with_defaults(config_override: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path = match config_override {
            Some(path) => path,
            None => config_file_path()?,
        };
        Ok(Self {
            config_path,
            database_path: database_path()?,
        })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub config_path: PathBuf,
    pub config: ClientConfig,
    pub session: PlaygroundSession,
}

/// Build the playground session from the config file and the database.
///
/// Nothing is connected yet.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext, CliError> {
    let client_config = load_config(&config.config_path)?;

    let bridge = ExecutionBridge::new();
    let repository = bridge
        .run(DbFactory::open_chat_repository(&config.database_path))?
        .map_err(|e| CliError::Database(format!("{e:#}")))?;

    let connector = HttpMcpConnector::new(Duration::from_secs(client_config.tool_timeout_secs))
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let session = PlaygroundSession::open_on(
        bridge,
        SessionParts {
            connector: Arc::new(connector),
            repository,
            emitter: Arc::new(LogEmitter),
            config: client_config.clone(),
            hints: ToolHintRegistry::with_analytics_defaults(),
        },
    )?;

    tracing::debug!(
        config = %config.config_path.display(),
        database = %config.database_path.display(),
        "CLI bootstrapped"
    );

    Ok(CliContext {
        config_path: config.config_path.clone(),
        config: client_config,
        session,
    })
}

/// Event emitter that writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl AppEventEmitter for LogEmitter {
    fn emit(&self, event: AppEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_default();
        tracing::debug!(event = event.event_name(), %payload, "Event");
    }

    fn clone_box(&self) -> Box<dyn AppEventEmitter> {
        Box::new(*self)
    }
}
