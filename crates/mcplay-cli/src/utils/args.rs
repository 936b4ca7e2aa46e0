//! Tool argument parsing for the command line and the chat loop.

use mcplay_core::ToolParameter;
use serde_json::{Map, Value};

use crate::error::CliError;

/// Parse a JSON object given as one string.
pub fn parse_json_arguments(json: &str) -> Result<Map<String, Value>, CliError> {
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CliError::Arguments(format!(
            "Tool arguments must be a JSON object, got {other}"
        ))),
        Err(e) => Err(CliError::Arguments(format!("Invalid JSON arguments: {e}"))),
    }
}

/// Parse `key=value` pairs.
///
/// Values of parameters declared as `string` are taken literally; anything
/// else is parsed as JSON when possible and kept as a string otherwise.
pub fn parse_pair_arguments(
    pairs: &[String],
    parameters: &[ToolParameter],
) -> Result<Map<String, Value>, CliError> {
    let mut arguments = Map::new();
    for pair in pairs {
        let (key, raw) = pair.split_once('=').ok_or_else(|| {
            CliError::Arguments(format!("Expected key=value, got '{pair}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Arguments(format!("Missing key in '{pair}'")));
        }

        let literal = parameters
            .iter()
            .any(|p| p.name == key && p.param_type == "string");
        let value = if literal {
            Value::String(raw.to_string())
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        arguments.insert(key.to_string(), value);
    }
    Ok(arguments)
}
