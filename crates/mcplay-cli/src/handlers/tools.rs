//! `tools` command handler.
//!
//! Connects to every configured server and prints the aggregated catalog.

use mcplay_core::ToolDescriptor;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{print_separator, truncate_string};

/// Execute the tools command.
pub fn execute(ctx: &CliContext, long: bool) -> Result<(), CliError> {
    if ctx.config.servers.is_empty() {
        println!("No servers configured.");
        println!("Use 'mcplay servers add <name> <url>' to add one.");
        return Ok(());
    }

    let status = ctx.session.connect()?;
    let tools = ctx.session.tools()?;
    println!(
        "{} tool(s) from {} server(s):\n",
        status.tool_count,
        status.connected_servers.len()
    );
    print_tools(ctx, &tools, long)
}

/// Print a catalog, optionally with each tool's parameters.
pub fn print_tools(ctx: &CliContext, tools: &[ToolDescriptor], long: bool) -> Result<(), CliError> {
    println!("{:<32} {:<16} Description", "Tool", "Server");
    print_separator(100);
    for tool in tools {
        println!(
            "{:<32} {:<16} {}",
            truncate_string(&tool.name, 32),
            truncate_string(&tool.server, 16),
            truncate_string(tool.description_or_default(), 50)
        );
        if long {
            for param in ctx.session.tool_parameters(&tool.name)?.unwrap_or_default() {
                println!("    {param}");
            }
        }
    }
    Ok(())
}
