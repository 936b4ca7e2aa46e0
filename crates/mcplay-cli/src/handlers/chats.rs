//! `chats` command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_chat_row, print_separator};

/// List stored chat sessions, most recent first.
pub fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let chats = ctx.session.list_chats()?;
    if chats.is_empty() {
        println!("No chats yet. Start one with 'mcplay chat'.");
        return Ok(());
    }

    let current = ctx.session.current_index()?;
    println!("  {:>3}  {:<32}  {:>10}  Created", "#", "Name", "Turns");
    print_separator(72);
    for (position, chat) in chats.iter().enumerate() {
        println!("{}", format_chat_row(position, chat, current == Some(position)));
    }
    Ok(())
}
