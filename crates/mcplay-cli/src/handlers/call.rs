//! `call` command handler.

use serde_json::{Map, Value};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_tool_result;
use crate::utils::{parse_json_arguments, parse_pair_arguments};

/// Connect, invoke one tool and print its result.
///
/// A result flagged as an error by the server is printed and reported as
/// a tool failure.
pub fn execute(
    ctx: &CliContext,
    tool: &str,
    pairs: &[String],
    json: Option<&str>,
) -> Result<(), CliError> {
    ctx.session.connect()?;
    let arguments = build_arguments(ctx, tool, pairs, json)?;

    tracing::debug!(tool, ?arguments, "Invoking tool");
    let result = ctx.session.invoke(tool, arguments)?;
    let rendered = format_tool_result(&result);

    if result.is_error {
        return Err(CliError::Tool(
            result.error_message().unwrap_or(rendered),
        ));
    }
    println!("{rendered}");
    Ok(())
}

/// Arguments from `--json` when given, else from `key=value` pairs coerced
/// with the tool's declared parameter types.
pub fn build_arguments(
    ctx: &CliContext,
    tool: &str,
    pairs: &[String],
    json: Option<&str>,
) -> Result<Map<String, Value>, CliError> {
    if let Some(json) = json {
        return parse_json_arguments(json);
    }
    let parameters = ctx.session.tool_parameters(tool)?.unwrap_or_default();
    parse_pair_arguments(pairs, &parameters)
}
