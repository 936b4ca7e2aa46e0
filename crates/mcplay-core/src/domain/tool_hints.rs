//! Per-tool UI hints.
//!
//! Some tools need extra help from the interactive surface (for example a
//! property picker fed by another tool). Hints are registered explicitly by
//! tool name; nothing is inferred from substrings of the name.

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capability flags attached to a tool.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ToolCapabilities: u32 {
        /// The tool takes a `property_id` the user should pick from a list.
        const NEEDS_PROPERTY = 1 << 0;
        /// The tool returns the list of selectable properties.
        const LISTS_PROPERTIES = 1 << 1;
        /// The tool does not modify remote state.
        const READ_ONLY = 1 << 2;
    }
}

/// Hint for a single tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolHint {
    pub capabilities: ToolCapabilities,
    /// Tool that provides the selectable options for this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_provider: Option<String>,
}

/// A selectable property returned by an options provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOption {
    pub property_id: String,
    pub display_name: String,
}

/// Registry of tool hints, keyed by tool name.
#[derive(Debug, Clone, Default)]
pub struct ToolHintRegistry {
    hints: HashMap<String, ToolHint>,
}

impl ToolHintRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the Google Analytics 4 tool family.
    pub fn with_analytics_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            "list_ga_accounts",
            ToolHint {
                capabilities: ToolCapabilities::LISTS_PROPERTIES | ToolCapabilities::READ_ONLY,
                options_provider: None,
            },
        );
        for tool in ["run_ga_report", "run_ga_realtime_report", "get_ga_metadata"] {
            registry.register(
                tool,
                ToolHint {
                    capabilities: ToolCapabilities::NEEDS_PROPERTY | ToolCapabilities::READ_ONLY,
                    options_provider: Some("list_ga_accounts".to_string()),
                },
            );
        }
        registry
    }

    /// Register (or replace) the hint for a tool.
    pub fn register(&mut self, tool: impl Into<String>, hint: ToolHint) {
        self.hints.insert(tool.into(), hint);
    }

    /// Hint for a tool; tools without a registration get the empty hint.
    pub fn hint_for(&self, tool: &str) -> ToolHint {
        self.hints.get(tool).cloned().unwrap_or_default()
    }

    /// Whether the tool carries all of `capabilities`.
    pub fn has(&self, tool: &str, capabilities: ToolCapabilities) -> bool {
        self.hints
            .get(tool)
            .is_some_and(|hint| hint.capabilities.contains(capabilities))
    }

    /// Options provider registered for a tool.
    pub fn options_provider_for(&self, tool: &str) -> Option<&str> {
        self.hints
            .get(tool)
            .and_then(|hint| hint.options_provider.as_deref())
    }
}

/// Parse an options provider's payload into property options.
///
/// Expects a JSON array of objects with `property_id` and `display_name`
/// string fields; a single object wrapping such an array under `result`
/// is accepted too.
pub fn parse_property_options(payload: &serde_json::Value) -> Result<Vec<PropertyOption>, String> {
    let items = payload
        .as_array()
        .or_else(|| payload.get("result").and_then(serde_json::Value::as_array))
        .ok_or_else(|| "Property list is not in the expected format".to_string())?;

    items
        .iter()
        .map(|item| {
            serde_json::from_value::<PropertyOption>(item.clone())
                .map_err(|e| format!("Property entry is not in the expected format: {e}"))
        })
        .collect()
}
