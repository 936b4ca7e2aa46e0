//! Subcommand definitions.

use clap::Subcommand;

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage configured tool servers
    Servers {
        #[command(subcommand)]
        command: ServersCommand,
    },
    /// Connect to every server and list the tool catalog
    Tools {
        /// Show the parameters of each tool
        #[arg(short, long)]
        long: bool,
    },
    /// Connect and invoke one tool
    Call {
        /// Catalog name of the tool
        tool: String,
        /// Arguments as `key=value` pairs (values may be JSON)
        args: Vec<String>,
        /// Arguments as one JSON object (overrides pairs)
        #[arg(long)]
        json: Option<String>,
    },
    /// Interactive playground with chat sessions
    Chat,
    /// List stored chat sessions
    Chats,
    /// View or change the configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Server configuration commands.
#[derive(Subcommand)]
pub enum ServersCommand {
    /// Show configured servers
    List,
    /// Add a server
    Add {
        /// Unique server name
        name: String,
        /// Endpoint URL (paths ending in /sse use the legacy SSE transport)
        url: String,
    },
    /// Remove a server
    Remove {
        /// Server name
        name: String,
    },
}

/// Configuration commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration
    Show,
    /// Print the config file location
    Path,
    /// Update model parameters
    Model {
        /// openai, anthropic, google or bedrock
        #[arg(long)]
        provider: Option<String>,
        /// Model identifier (defaults to the provider's default on provider change)
        #[arg(long)]
        model_id: Option<String>,
        /// Maximum tokens (1024-10240)
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Sampling temperature (0.0-1.0)
        #[arg(long)]
        temperature: Option<f32>,
        /// API key for openai, anthropic or google
        #[arg(long, env = "MCPLAY_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Update timeouts, history size or collision handling
    Set {
        /// Connect timeout in seconds (1-600)
        #[arg(long)]
        connect_timeout: Option<u64>,
        /// Tool call timeout in seconds (1-3600)
        #[arg(long)]
        tool_timeout: Option<u64>,
        /// Chats shown in history (1-500)
        #[arg(long)]
        history_limit: Option<usize>,
        /// last-wins, reject or namespace
        #[arg(long)]
        collision_policy: Option<String>,
    },
}
