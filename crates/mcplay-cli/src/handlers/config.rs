//! `config` command handler.

use std::path::Path;

use mcplay_core::{
    ClientConfig, CollisionPolicy, Credentials, ModelParams, Provider, load_config, save_config,
};

use crate::commands::ConfigCommand;
use crate::error::CliError;

/// Execute a `config` subcommand against the config file.
pub fn execute(config_path: &Path, command: ConfigCommand) -> Result<(), CliError> {
    match command {
        ConfigCommand::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            let shown = serde_json::to_string_pretty(&redacted(&config))
                .map_err(|e| CliError::Config(e.to_string()))?;
            println!("{shown}");
        }
        ConfigCommand::Model {
            provider,
            model_id,
            max_tokens,
            temperature,
            api_key,
        } => {
            let mut config = load_config(config_path)?;
            config.model = update_model(
                config.model,
                provider.as_deref(),
                model_id,
                max_tokens,
                temperature,
                api_key,
            )?;
            save_config(config_path, &config)?;
            println!(
                "Model set to {} ({})",
                config.model.model_id, config.model.provider
            );
        }
        ConfigCommand::Set {
            connect_timeout,
            tool_timeout,
            history_limit,
            collision_policy,
        } => {
            let mut config = load_config(config_path)?;
            if let Some(secs) = connect_timeout {
                config.connect_timeout_secs = secs;
            }
            if let Some(secs) = tool_timeout {
                config.tool_timeout_secs = secs;
            }
            if let Some(limit) = history_limit {
                config.history_limit = limit;
            }
            if let Some(policy) = collision_policy {
                config.collision_policy = parse_collision_policy(&policy)?;
            }
            save_config(config_path, &config)?;
            println!("Configuration updated");
        }
    }
    Ok(())
}

/// Apply model updates. A provider change resets model id and credentials.
fn update_model(
    current: ModelParams,
    provider: Option<&str>,
    model_id: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    api_key: Option<String>,
) -> Result<ModelParams, CliError> {
    let mut params = match provider {
        Some(name) => {
            let provider = Provider::parse(name)
                .ok_or_else(|| CliError::Arguments(format!("Unknown provider: {name}")))?;
            if provider == current.provider {
                current
            } else {
                ModelParams {
                    max_tokens: current.max_tokens,
                    temperature: current.temperature,
                    ..ModelParams::for_provider(provider)
                }
            }
        }
        None => current,
    };

    if let Some(model_id) = model_id {
        params.model_id = model_id;
    }
    if let Some(max_tokens) = max_tokens {
        params.max_tokens = max_tokens;
    }
    if let Some(temperature) = temperature {
        params.temperature = temperature;
    }
    if let Some(api_key) = api_key {
        params.credentials = Credentials::ApiKey { api_key };
    }

    params.validate().map_err(CliError::Arguments)?;
    Ok(params)
}

fn parse_collision_policy(value: &str) -> Result<CollisionPolicy, CliError> {
    match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "last-wins" => Ok(CollisionPolicy::LastWins),
        "reject" => Ok(CollisionPolicy::Reject),
        "namespace" => Ok(CollisionPolicy::Namespace),
        other => Err(CliError::Arguments(format!(
            "Unknown collision policy '{other}' (expected last-wins, reject or namespace)"
        ))),
    }
}

/// Copy of the config with secrets masked.
fn redacted(config: &ClientConfig) -> ClientConfig {
    let mut shown = config.clone();
    shown.model.credentials = match &config.model.credentials {
        Credentials::None => Credentials::None,
        Credentials::ApiKey { .. } => Credentials::ApiKey {
            api_key: "****".to_string(),
        },
        Credentials::Bedrock { region_name, .. } => Credentials::Bedrock {
            region_name: region_name.clone(),
            aws_access_key: "****".to_string(),
            aws_secret_key: "****".to_string(),
        },
    };
    shown
}
