//! Pure helpers shared by adapters.

pub mod schema;

pub use schema::{ToolParameter, extract_parameters, parameters_from_schema};
