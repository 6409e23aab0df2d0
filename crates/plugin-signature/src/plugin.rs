//! Plugin records and the set that owns them.
//!
//! A plugin bundle can nest sub-plugins. Each nested record points at its
//! parent through a [`PluginKey`] into the same [`PluginSet`]; the set owns
//! every record, so the back-reference carries no ownership. Parents must be
//! inserted before their children, which keeps the hierarchy acyclic and
//! makes insertion order a valid validation order.
//!
//! Keys are stamped with the identity of the set that issued them. A key from
//! one set is never accepted by another, even when its index is in range.

use crate::error::{RegistryError, RegistryResult};
use crate::signature::SignatureState;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_SET_ID: AtomicUsize = AtomicUsize::new(0);

fn next_set_id() -> usize {
    NEXT_SET_ID.fetch_add(1, Ordering::Relaxed)
}

/// Index of a plugin inside the [`PluginSet`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey {
    set: usize,
    index: usize,
}

impl PluginKey {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A loaded plugin as seen by the signature policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Unique identifier.
    pub id: String,

    /// Runs as a separate backend process.
    pub backend: bool,

    /// Bundled with the host.
    pub core: bool,

    /// Signature state; may be overwritten when inheriting from the parent.
    pub signature: SignatureState,

    /// Directory the plugin was loaded from. Diagnostics only.
    pub dir: PathBuf,

    parent: Option<PluginKey>,
}

impl Plugin {
    /// Create a front-end, non-core, unsigned plugin record.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            backend: false,
            core: false,
            signature: SignatureState::Unsigned,
            dir: PathBuf::new(),
            parent: None,
        }
    }

    pub fn backend(mut self, backend: bool) -> Self {
        self.backend = backend;
        self
    }

    pub fn core(mut self, core: bool) -> Self {
        self.core = core;
        self
    }

    pub fn signature(mut self, signature: SignatureState) -> Self {
        self.signature = signature;
        self
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Key of the enclosing plugin, if this one is nested.
    pub fn parent(&self) -> Option<PluginKey> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena of plugins in dependency order.
///
/// A clone is a new set: keys issued by the original do not resolve in it.
#[derive(Debug)]
pub struct PluginSet {
    id: usize,
    plugins: Vec<Plugin>,
    by_id: HashMap<String, PluginKey>,
}

impl Default for PluginSet {
    fn default() -> Self {
        Self {
            id: next_set_id(),
            plugins: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl Clone for PluginSet {
    fn clone(&self) -> Self {
        let mut set = PluginSet::new();
        for plugin in &self.plugins {
            let mut plugin = plugin.clone();
            plugin.parent = plugin.parent.map(|parent| set.key(parent.index));
            let key = set.key(set.plugins.len());
            set.by_id.insert(plugin.id.clone(), key);
            set.plugins.push(plugin);
        }
        set
    }
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self, index: usize) -> PluginKey {
        PluginKey {
            set: self.id,
            index,
        }
    }

    /// Whether `key` was issued by this set.
    pub fn contains(&self, key: PluginKey) -> bool {
        key.set == self.id && key.index < self.plugins.len()
    }

    /// Register a root-level plugin.
    pub fn insert(&mut self, mut plugin: Plugin) -> RegistryResult<PluginKey> {
        plugin.parent = None;
        self.push(plugin)
    }

    /// Register a plugin nested inside `parent`.
    pub fn insert_child(
        &mut self,
        parent: PluginKey,
        mut plugin: Plugin,
    ) -> RegistryResult<PluginKey> {
        if !self.contains(parent) {
            return Err(RegistryError::UnknownParent {
                plugin: plugin.id,
                index: parent.index,
            });
        }
        plugin.parent = Some(parent);
        self.push(plugin)
    }

    fn push(&mut self, plugin: Plugin) -> RegistryResult<PluginKey> {
        if self.by_id.contains_key(&plugin.id) {
            return Err(RegistryError::DuplicatePlugin(plugin.id));
        }

        let key = self.key(self.plugins.len());
        self.by_id.insert(plugin.id.clone(), key);
        self.plugins.push(plugin);
        Ok(key)
    }

    pub fn get(&self, key: PluginKey) -> Option<&Plugin> {
        if !self.contains(key) {
            return None;
        }
        self.plugins.get(key.index)
    }

    pub fn get_mut(&mut self, key: PluginKey) -> Option<&mut Plugin> {
        if !self.contains(key) {
            return None;
        }
        self.plugins.get_mut(key.index)
    }

    /// Look up a plugin key by identifier.
    pub fn find(&self, id: &str) -> Option<PluginKey> {
        self.by_id.get(id).copied()
    }

    pub fn parent_of(&self, key: PluginKey) -> Option<&Plugin> {
        self.get(key)?.parent.and_then(|parent| self.get(parent))
    }

    /// Borrow a plugin mutably together with its parent.
    ///
    /// Parents always sit at a lower index than their children, so the two
    /// borrows come from disjoint halves of the arena.
    pub fn resolve(&mut self, key: PluginKey) -> Option<(&mut Plugin, Option<&Plugin>)> {
        if !self.contains(key) {
            return None;
        }

        let (before, rest) = self.plugins.split_at_mut(key.index);
        let plugin = &mut rest[0];
        let parent = plugin.parent.map(|parent| &before[parent.index]);
        Some((plugin, parent))
    }

    /// Iterate plugins in insertion (dependency) order.
    pub fn iter(&self) -> impl Iterator<Item = (PluginKey, &Plugin)> {
        self.plugins
            .iter()
            .enumerate()
            .map(|(index, plugin)| (self.key(index), plugin))
    }

    pub fn keys(&self) -> impl Iterator<Item = PluginKey> + '_ {
        (0..self.plugins.len()).map(|index| self.key(index))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let plugin = Plugin::new("acme-plugin");
        assert_eq!(plugin.id, "acme-plugin");
        assert!(!plugin.backend);
        assert!(!plugin.core);
        assert_eq!(plugin.signature, SignatureState::Unsigned);
        assert!(plugin.is_root());
    }

    #[test]
    fn test_insert_and_find() {
        let mut set = PluginSet::new();
        let root = set.insert(Plugin::new("app")).unwrap();
        let child = set.insert_child(root, Plugin::new("app-panel")).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.find("app"), Some(root));
        assert_eq!(set.find("app-panel"), Some(child));
        assert_eq!(set.find("missing"), None);
        assert_eq!(set.get(child).unwrap().parent(), Some(root));
        assert_eq!(set.parent_of(child).unwrap().id, "app");
        assert!(set.parent_of(root).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut set = PluginSet::new();
        set.insert(Plugin::new("app")).unwrap();
        let err = set.insert(Plugin::new("app")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicatePlugin("app".to_string()));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut other = PluginSet::new();
        other.insert(Plugin::new("a")).unwrap();
        let foreign = other.insert(Plugin::new("b")).unwrap();

        let mut set = PluginSet::new();
        let err = set.insert_child(foreign, Plugin::new("child")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownParent { index: 1, .. }));
        assert!(set.is_empty());
    }

    #[test]
    fn test_key_from_another_set_rejected() {
        let mut other = PluginSet::new();
        let foreign = other
            .insert(Plugin::new("trusted").signature(SignatureState::Valid))
            .unwrap();

        let mut set = PluginSet::new();
        let own = set.insert(Plugin::new("local")).unwrap();
        assert_eq!(own.index(), foreign.index());

        assert!(!set.contains(foreign));
        assert!(set.get(foreign).is_none());
        assert!(set.get_mut(foreign).is_none());
        assert!(set.resolve(foreign).is_none());

        let err = set.insert_child(foreign, Plugin::new("child")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownParent { index: 0, .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clone_issues_its_own_keys() {
        let mut set = PluginSet::new();
        let root = set.insert(Plugin::new("app")).unwrap();
        set.insert_child(root, Plugin::new("panel")).unwrap();

        let copy = set.clone();
        assert!(copy.get(root).is_none());

        let child = copy.find("panel").unwrap();
        assert_eq!(copy.parent_of(child).unwrap().id, "app");
        assert!(copy.contains(copy.get(child).unwrap().parent().unwrap()));
    }

    #[test]
    fn test_insert_clears_stale_parent() {
        let mut set = PluginSet::new();
        let root = set.insert(Plugin::new("app")).unwrap();
        let child = set.insert_child(root, Plugin::new("panel")).unwrap();

        let copied = set.get(child).unwrap().clone().signature(SignatureState::Valid);
        let mut fresh = PluginSet::new();
        let key = fresh.insert(Plugin { id: "copy".into(), ..copied }).unwrap();
        assert!(fresh.get(key).unwrap().is_root());
    }

    #[test]
    fn test_resolve_splits_borrows() {
        let mut set = PluginSet::new();
        let root = set
            .insert(Plugin::new("app").signature(SignatureState::Valid))
            .unwrap();
        let child = set.insert_child(root, Plugin::new("panel")).unwrap();

        let (plugin, parent) = set.resolve(child).unwrap();
        plugin.signature = parent.unwrap().signature;
        assert_eq!(set.get(child).unwrap().signature, SignatureState::Valid);

        let (_, parent) = set.resolve(root).unwrap();
        assert!(parent.is_none());
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut set = PluginSet::new();
        let root = set.insert(Plugin::new("a")).unwrap();
        set.insert_child(root, Plugin::new("b")).unwrap();
        set.insert(Plugin::new("c")).unwrap();

        let ids: Vec<&str> = set.iter().map(|(_, p)| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(set.keys().count(), 3);
    }
}
