//! Table and result formatting for CLI output.

use mcplay_core::{ChatSession, ToolCallResult};

/// Truncate to `max_chars` characters, adding "..." if needed.
///
/// ```rust
/// use mcplay_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("Hello", 10), "Hello");
/// assert_eq!(truncate_string("Hello World", 8), "Hello...");
/// ```
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// One line of the chat list: position, marker for the current chat, name.
pub fn format_chat_row(position: usize, chat: &ChatSession, current: bool) -> String {
    let marker = if current { '*' } else { ' ' };
    format!(
        "{marker} {:>3}  {:<32}  {:>4} turns  {}",
        position + 1,
        truncate_string(&chat.chat_name, 32),
        chat.messages.len(),
        chat.created_at.format("%Y-%m-%d %H:%M")
    )
}

/// Render a tool result for the terminal.
///
/// Structured content is pretty-printed; otherwise text items are joined.
pub fn format_tool_result(result: &ToolCallResult) -> String {
    if let Some(structured) = &result.structured_content {
        return serde_json::to_string_pretty(structured).unwrap_or_else(|_| structured.to_string());
    }
    let text = result.text();
    if text.is_empty() {
        serde_json::to_string_pretty(&result.content).unwrap_or_else(|_| result.content.to_string())
    } else {
        text
    }
}
