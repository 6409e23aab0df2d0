//! Plugin inventory files.
//!
//! An inventory lists plugins whose signatures were already checked by the
//! loader, one `[[plugin]]` table each:
//!
//! ```toml
//! [[plugin]]
//! id = "acme-app"
//! dir = "/var/lib/host/plugins/acme-app"
//! backend = true
//! signature = "valid"
//!
//! [[plugin]]
//! id = "acme-datasource"
//! parent = "acme-app"
//! backend = true
//! signature = "modified"
//! ```
//!
//! Parents may be declared after their children; the inventory is reordered
//! so that every parent enters the plugin set first.

use anyhow::{Context, Result};
use plugin_signature::{Plugin, PluginSet, SignatureState};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed inventory file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Inventory {
    #[serde(default, rename = "plugin")]
    pub plugins: Vec<PluginEntry>,
}

/// One plugin declaration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PluginEntry {
    pub id: String,

    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default)]
    pub backend: bool,

    #[serde(default)]
    pub core: bool,

    /// Defaults to unsigned when omitted.
    #[serde(default)]
    pub signature: SignatureState,

    /// ID of the enclosing plugin.
    #[serde(default)]
    pub parent: Option<String>,
}

impl PluginEntry {
    fn to_plugin(&self) -> Plugin {
        Plugin::new(self.id.as_str())
            .backend(self.backend)
            .core(self.core)
            .signature(self.signature)
            .dir(self.dir.clone().unwrap_or_default())
    }
}

impl Inventory {
    /// Load an inventory from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read inventory: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse inventory: {}", path.display()))
    }

    /// Parse an inventory from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let inventory: Inventory = toml::from_str(content)?;
        inventory.validate()?;
        Ok(inventory)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.plugins {
            if entry.id.trim().is_empty() {
                anyhow::bail!("Plugin ID cannot be empty");
            }
            if !seen.insert(entry.id.as_str()) {
                anyhow::bail!("Plugin '{}' is declared more than once", entry.id);
            }
        }
        Ok(())
    }

    /// Build a plugin set with every parent inserted before its children.
    ///
    /// Fails when a plugin names a parent that is not declared, or when the
    /// parent links form a cycle.
    pub fn into_plugin_set(self) -> Result<PluginSet> {
        let declared: HashSet<&str> = self.plugins.iter().map(|p| p.id.as_str()).collect();
        if let Some(orphan) = self.plugins.iter().find(|p| {
            p.parent
                .as_deref()
                .is_some_and(|parent| !declared.contains(parent))
        }) {
            anyhow::bail!(
                "Plugin '{}' references unknown parent '{}'",
                orphan.id,
                orphan.parent.as_deref().unwrap_or_default()
            );
        }

        let mut set = PluginSet::new();
        let mut pending: Vec<&PluginEntry> = self.plugins.iter().collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();

            for entry in pending {
                let key = match entry.parent.as_deref() {
                    None => Some(set.insert(entry.to_plugin())?),
                    Some(parent) => match set.find(parent) {
                        Some(parent_key) => Some(set.insert_child(parent_key, entry.to_plugin())?),
                        None => None,
                    },
                };

                match key {
                    Some(key) => debug!(plugin = %entry.id, index = key.index(), "Added plugin"),
                    None => deferred.push(entry),
                }
            }

            if deferred.len() == before {
                let ids: Vec<&str> = deferred.iter().map(|p| p.id.as_str()).collect();
                anyhow::bail!("Plugin hierarchy contains a cycle: {}", ids.join(", "));
            }
            pending = deferred;
        }

        Ok(set)
    }
}
