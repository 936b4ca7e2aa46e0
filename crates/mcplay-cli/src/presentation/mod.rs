//! Terminal output formatting.

pub mod tables;

pub use tables::{format_chat_row, format_tool_result, print_separator, truncate_string};
