//! Argument helpers shared by handlers.

pub mod args;

pub use args::{parse_json_arguments, parse_pair_arguments};
