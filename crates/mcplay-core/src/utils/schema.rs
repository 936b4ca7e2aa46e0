//! Tool parameter extraction from JSON Schema.
//!
//! Produces a flat, display-oriented parameter list from a tool's input
//! schema. Total over its input: anything that does not look like an object
//! schema with `properties` yields an empty list.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::mcp::ToolDescriptor;

/// Type label used when a property declares no usable type.
pub const ANY_TYPE: &str = "any";

/// One parameter of a tool, as shown to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl fmt::Display for ToolParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.param_type)?;
        if self.required {
            f.write_str(" (required)")?;
        }
        Ok(())
    }
}

/// Extract the parameter list of a tool, in schema order.
pub fn extract_parameters(tool: &ToolDescriptor) -> Vec<ToolParameter> {
    tool.input_schema
        .as_ref()
        .map(parameters_from_schema)
        .unwrap_or_default()
}

/// Extract the parameter list from a raw input schema.
pub fn parameters_from_schema(schema: &Value) -> Vec<ToolParameter> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    properties
        .iter()
        .map(|(name, property)| ToolParameter {
            name: name.clone(),
            param_type: type_label(property).unwrap_or_else(|| ANY_TYPE.to_string()),
            required: required.contains(&name.as_str()),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

fn type_label(property: &Value) -> Option<String> {
    match property.get("type") {
        Some(Value::String(ty)) => return Some(ty.clone()),
        Some(Value::Array(types)) => {
            let joined = join_unique(types.iter().filter_map(Value::as_str).map(str::to_string));
            if joined.is_some() {
                return joined;
            }
        }
        _ => {}
    }

    for combinator in ["anyOf", "oneOf"] {
        if let Some(members) = property.get(combinator).and_then(Value::as_array) {
            if let Some(joined) = join_unique(members.iter().filter_map(type_label)) {
                return Some(joined);
            }
        }
    }

    property
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| reference.rsplit('/').next())
        .filter(|tail| !tail.is_empty())
        .map(str::to_string)
}

fn join_unique(labels: impl Iterator<Item = String>) -> Option<String> {
    let mut unique: Vec<String> = Vec::new();
    for label in labels {
        if !unique.contains(&label) {
            unique.push(label);
        }
    }
    (!unique.is_empty()).then(|| unique.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(schema: Value) -> ToolDescriptor {
        ToolDescriptor::new("run_ga_report").with_input_schema(schema)
    }

    #[test]
    fn test_properties_in_schema_order() {
        let params = extract_parameters(&tool(json!({
            "type": "object",
            "properties": {
                "property_id": { "type": "string", "description": "GA4 property" },
                "start_date": { "type": "string" },
                "limit": { "type": "integer" }
            },
            "required": ["property_id"]
        })));

        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["property_id", "start_date", "limit"]);
        assert!(params[0].required);
        assert!(!params[1].required);
        assert_eq!(params[0].description.as_deref(), Some("GA4 property"));
        assert_eq!(params[2].param_type, "integer");
    }

    #[test]
    fn test_type_fallbacks() {
        let params = parameters_from_schema(&json!({
            "properties": {
                "multi": { "type": ["string", "null"] },
                "union": { "anyOf": [{ "type": "integer" }, { "type": "string" }] },
                "choice": { "oneOf": [{ "$ref": "#/$defs/DateRange" }, { "type": "null" }] },
                "reference": { "$ref": "#/definitions/Dimension" },
                "untyped": { "description": "whatever" },
                "boolean_schema": true
            }
        }));

        let types: Vec<_> = params.iter().map(|p| p.param_type.as_str()).collect();
        assert_eq!(
            types,
            vec![
                "string|null",
                "integer|string",
                "DateRange|null",
                "Dimension",
                "any",
                "any"
            ]
        );
    }

    #[test]
    fn test_malformed_schema_yields_empty_list() {
        assert!(extract_parameters(&ToolDescriptor::new("bare")).is_empty());
        assert!(extract_parameters(&tool(json!("not a schema"))).is_empty());
        assert!(extract_parameters(&tool(json!({ "properties": [1, 2] }))).is_empty());
        assert!(extract_parameters(&tool(json!({ "type": "object" }))).is_empty());
    }

    #[test]
    fn test_required_ignores_non_strings() {
        let params = parameters_from_schema(&json!({
            "properties": { "a": { "type": "string" } },
            "required": [1, null, "a"]
        }));
        assert!(params[0].required);
    }

    #[test]
    fn test_display() {
        let required = ToolParameter {
            name: "property_id".to_string(),
            param_type: "string".to_string(),
            required: true,
            description: None,
        };
        assert_eq!(required.to_string(), "property_id: string (required)");

        let optional = ToolParameter {
            required: false,
            ..required
        };
        assert_eq!(optional.to_string(), "property_id: string");
    }
}
