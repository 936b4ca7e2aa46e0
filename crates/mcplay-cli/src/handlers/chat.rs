//! `chat` command handler: the interactive playground.
//!
//! Lines starting with `/` are commands; anything else is recorded as a
//! user turn in the current chat (one is created when none is selected).

use mcplay_core::{ChatId, ChatSession, ChatTurn, MessageRole};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::call::build_arguments;
use crate::handlers::tools::print_tools;
use crate::presentation::{format_chat_row, format_tool_result, print_separator};

const HELP: &str = "\
Commands:
  /new [name]            Start a new chat
  /chats                 List chats
  /select <n|id>         Switch to a chat by list position or id
  /delete [n|id]         Delete a chat (default: the current one)
  /rename <name>         Rename the current chat
  /connect               Connect to every configured server
  /disconnect            Close every server connection
  /status                Show connection status
  /tools                 List available tools
  /params <tool>         Show a tool's parameters
  /options <tool>        List selectable properties for a tool
  /call <tool> [k=v..]   Invoke a tool and record the result
  /history               Show the current chat
  /help                  Show this help
  /quit                  Leave the playground";

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    New(Option<String>),
    Chats,
    Select(String),
    Delete(Option<String>),
    Rename(String),
    Connect,
    Disconnect,
    Status,
    Tools,
    Params(String),
    Options(String),
    Call { tool: String, args: Vec<String> },
    History,
    Quit,
    Message(String),
    Empty,
}

/// Parse one line of input.
pub fn parse_repl_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(ReplCommand::Message(line.to_string()));
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));
    let rest_opt = (!rest.is_empty()).then(|| rest.to_string());
    let required = |usage: &str| {
        rest_opt
            .clone()
            .ok_or_else(|| format!("Usage: /{name} {usage}"))
    };

    match name {
        "help" | "?" => Ok(ReplCommand::Help),
        "new" => Ok(ReplCommand::New(rest_opt.clone())),
        "chats" => Ok(ReplCommand::Chats),
        "select" => required("<n|id>").map(ReplCommand::Select),
        "delete" => Ok(ReplCommand::Delete(rest_opt.clone())),
        "rename" => required("<name>").map(ReplCommand::Rename),
        "connect" => Ok(ReplCommand::Connect),
        "disconnect" => Ok(ReplCommand::Disconnect),
        "status" => Ok(ReplCommand::Status),
        "tools" => Ok(ReplCommand::Tools),
        "params" => required("<tool>").map(ReplCommand::Params),
        "options" => required("<tool>").map(ReplCommand::Options),
        "call" => {
            let mut words = rest.split_whitespace().map(str::to_string);
            let tool = words
                .next()
                .ok_or_else(|| "Usage: /call <tool> [key=value ...]".to_string())?;
            Ok(ReplCommand::Call {
                tool,
                args: words.collect(),
            })
        }
        "history" => Ok(ReplCommand::History),
        "quit" | "exit" | "q" => Ok(ReplCommand::Quit),
        other => Err(format!("Unknown command '/{other}'. Type /help for a list.")),
    }
}

/// Resolve a 1-based list position or a chat id.
fn resolve_chat(chats: &[ChatSession], target: &str) -> Option<ChatId> {
    if let Ok(position) = target.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| chats.get(index))
            .map(|chat| chat.chat_id);
    }
    let id = ChatId::parse(target)?;
    chats.iter().any(|chat| chat.chat_id == id).then_some(id)
}

/// Run the playground until `/quit` or end of input.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new().map_err(|e| CliError::Io(e.to_string()))?;

    println!("mcplay playground. Type /help for commands.");
    if let Some(chat) = ctx.session.current_chat()? {
        println!("Current chat: {}", chat.chat_name);
    }

    loop {
        let line = match editor.readline("mcplay> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(CliError::Io(e.to_string())),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        let command = match parse_repl_line(&line) {
            Ok(ReplCommand::Quit) => break,
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        // Errors are reported and the loop goes on.
        if let Err(e) = dispatch(ctx, command) {
            println!("Error: {e}");
        }
    }
    Ok(())
}

fn dispatch(ctx: &CliContext, command: ReplCommand) -> Result<(), CliError> {
    let session = &ctx.session;
    match command {
        ReplCommand::Help => println!("{HELP}"),
        ReplCommand::Empty | ReplCommand::Quit => {}
        ReplCommand::New(name) => {
            let chat = match name {
                Some(name) => session.create_named_chat(&name)?,
                None => session.create_chat()?,
            };
            println!("Started chat '{}'", chat.chat_name);
        }
        ReplCommand::Chats => {
            let chats = session.list_chats()?;
            let current = session.current_index()?;
            if chats.is_empty() {
                println!("No chats yet. Use /new to start one.");
            }
            for (position, chat) in chats.iter().enumerate() {
                println!("{}", format_chat_row(position, chat, current == Some(position)));
            }
        }
        ReplCommand::Select(target) => {
            let id = resolve_chat(&session.list_chats()?, &target)
                .ok_or_else(|| CliError::Arguments(format!("No chat '{target}'")))?;
            session.select_chat(id)?;
            if let Some(chat) = session.current_chat()? {
                println!("Switched to '{}'", chat.chat_name);
            }
        }
        ReplCommand::Delete(target) => {
            let id = match target {
                Some(target) => resolve_chat(&session.list_chats()?, &target)
                    .ok_or_else(|| CliError::Arguments(format!("No chat '{target}'")))?,
                None => current_chat_id(ctx)?,
            };
            session.delete_chat(id)?;
            println!("Chat deleted");
        }
        ReplCommand::Rename(name) => {
            let chat = session.rename_chat(current_chat_id(ctx)?, &name)?;
            println!("Renamed to '{}'", chat.chat_name);
        }
        ReplCommand::Connect => {
            let status = session.connect()?;
            println!(
                "Connected to {} server(s), {} tool(s)",
                status.connected_servers.len(),
                status.tool_count
            );
        }
        ReplCommand::Disconnect => {
            session.disconnect()?;
            println!("Disconnected");
        }
        ReplCommand::Status => {
            let status = session.status()?;
            if status.is_connected() {
                println!(
                    "Connected: {} ({} tools)",
                    status.connected_servers.join(", "),
                    status.tool_count
                );
            } else {
                println!("Not connected");
            }
            let model = session.model_params();
            println!("Model: {} ({})", model.model_id, model.provider);
        }
        ReplCommand::Tools => print_tools(ctx, &session.tools()?, false)?,
        ReplCommand::Params(tool) => match session.tool_parameters(&tool)? {
            Some(params) if params.is_empty() => println!("'{tool}' takes no parameters"),
            Some(params) => {
                for param in params {
                    println!("  {param}");
                }
            }
            None => println!("No tool named '{tool}'"),
        },
        ReplCommand::Options(tool) => {
            let options = session.property_options(&tool)?;
            if options.is_empty() {
                println!("'{tool}' has no selectable properties");
            }
            for option in options {
                println!("  {:<16} {}", option.property_id, option.display_name);
            }
        }
        ReplCommand::Call { tool, args } => {
            let chat_id = ensure_chat(ctx)?;
            let arguments = build_arguments(ctx, &tool, &args, None)?;
            let result = session.invoke_in_chat(chat_id, &tool, arguments)?;
            if result.is_error {
                println!("Tool reported an error:");
            }
            println!("{}", format_tool_result(&result));
        }
        ReplCommand::History => {
            let Some(chat) = session.current_chat()? else {
                println!("No chat selected");
                return Ok(());
            };
            println!("{}", chat.chat_name);
            print_separator(60);
            for turn in &chat.messages {
                print_turn(turn);
            }
        }
        ReplCommand::Message(text) => {
            let chat_id = ensure_chat(ctx)?;
            session.append_message(chat_id, ChatTurn::user(text))?;
        }
    }
    Ok(())
}

fn current_chat_id(ctx: &CliContext) -> Result<ChatId, CliError> {
    ctx.session
        .current_chat()?
        .map(|chat| chat.chat_id)
        .ok_or_else(|| CliError::Arguments("No chat selected".to_string()))
}

/// The current chat, creating one when nothing is selected.
fn ensure_chat(ctx: &CliContext) -> Result<ChatId, CliError> {
    if let Some(chat) = ctx.session.current_chat()? {
        return Ok(chat.chat_id);
    }
    let chat = ctx.session.create_chat()?;
    println!("Started chat '{}'", chat.chat_name);
    Ok(chat.chat_id)
}

fn print_turn(turn: &ChatTurn) {
    let label = match (&turn.role, &turn.tool_call) {
        (MessageRole::Tool, Some(call)) if call.is_error => format!("tool:{} (error)", call.tool),
        (MessageRole::Tool, Some(call)) => format!("tool:{}", call.tool),
        (role, _) => role.to_string(),
    };
    println!("[{}] {label}: {}", turn.created_at.format("%H:%M:%S"), turn.content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            parse_repl_line("  show me last week  ").unwrap(),
            ReplCommand::Message("show me last week".to_string())
        );
        assert_eq!(parse_repl_line("   ").unwrap(), ReplCommand::Empty);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse_repl_line("/new Weekly report").unwrap(),
            ReplCommand::New(Some("Weekly report".to_string()))
        );
        assert_eq!(parse_repl_line("/new").unwrap(), ReplCommand::New(None));
        assert_eq!(
            parse_repl_line("/call run_ga_report property_id=123 limit=5").unwrap(),
            ReplCommand::Call {
                tool: "run_ga_report".to_string(),
                args: vec!["property_id=123".to_string(), "limit=5".to_string()],
            }
        );
        assert_eq!(parse_repl_line("/quit").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_missing_arguments_and_unknown_commands() {
        assert!(parse_repl_line("/select").unwrap_err().contains("Usage"));
        assert!(parse_repl_line("/call").unwrap_err().contains("Usage"));
        assert!(parse_repl_line("/launch").unwrap_err().contains("Unknown"));
    }

    #[test]
    fn test_resolve_chat_by_position_or_id() {
        let chats = vec![ChatSession::new("a"), ChatSession::new("b")];
        assert_eq!(resolve_chat(&chats, "2"), Some(chats[1].chat_id));
        assert_eq!(resolve_chat(&chats, "0"), None);
        assert_eq!(resolve_chat(&chats, "3"), None);
        assert_eq!(
            resolve_chat(&chats, &chats[0].chat_id.to_string()),
            Some(chats[0].chat_id)
        );
        assert_eq!(resolve_chat(&chats, "nonsense"), None);
    }
}
