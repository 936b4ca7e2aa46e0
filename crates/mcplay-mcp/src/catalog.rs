//! Aggregated tool catalog.
//!
//! Merges the tool lists of every connected server into one name-addressable
//! sequence and remembers, per catalog name, which server owns the tool and
//! what that server calls it.

use std::collections::HashMap;

use mcplay_core::{CollisionPolicy, McpError, ToolDescriptor};

/// Routing entry for one catalog tool.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Descriptor as published in the catalog (`name` is the catalog name).
    pub descriptor: ToolDescriptor,
    /// Name the owning server knows the tool by.
    pub remote_name: String,
}

impl CatalogEntry {
    pub fn server(&self) -> &str {
        &self.descriptor.server
    }
}

/// Ordered, name-addressable set of tools across connected servers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge per-server tool lists, given in connection order.
    ///
    /// Under `LastWins` a later duplicate replaces the earlier descriptor in
    /// place. Under `Namespace` every tool is published as `<server>.<tool>`.
    pub fn aggregate(
        per_server: &[(String, Vec<ToolDescriptor>)],
        policy: CollisionPolicy,
    ) -> Result<Self, McpError> {
        let mut catalog = Self::new();

        for (server, tools) in per_server {
            for tool in tools {
                let catalog_name = match policy {
                    CollisionPolicy::Namespace => format!("{server}.{}", tool.name),
                    CollisionPolicy::LastWins | CollisionPolicy::Reject => tool.name.clone(),
                };
                let entry = CatalogEntry {
                    descriptor: ToolDescriptor {
                        name: catalog_name.clone(),
                        server: server.clone(),
                        ..tool.clone()
                    },
                    remote_name: tool.name.clone(),
                };

                match catalog.index.get(&catalog_name).copied() {
                    Some(position) if policy == CollisionPolicy::Reject => {
                        return Err(McpError::ToolCollision {
                            tool: catalog_name,
                            first: catalog.entries[position].server().to_string(),
                            second: server.clone(),
                        });
                    }
                    Some(position) => {
                        tracing::debug!(
                            tool = %catalog_name,
                            shadowed = %catalog.entries[position].server(),
                            owner = %server,
                            "Tool name shadowed by later server"
                        );
                        catalog.entries[position] = entry;
                    }
                    None => {
                        catalog.index.insert(catalog_name, catalog.entries.len());
                        catalog.entries.push(entry);
                    }
                }
            }
        }

        Ok(catalog)
    }

    /// Routing entry for a catalog name.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Descriptors in catalog order.
    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Catalog names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.descriptor.name.as_str()).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
