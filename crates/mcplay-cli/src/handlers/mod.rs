//! Command handlers.
//!
//! `servers` and `config` only touch the config file; the rest go through
//! the `PlaygroundSession` built by bootstrap.

pub mod call;
pub mod chat;
pub mod chats;
pub mod config;
pub mod servers;
pub mod tools;
