//! Per-path configuration records and their prefix-based lookup.
//!
//! Records are registered at a path prefix and govern every path below
//! it unless a deeper prefix carries its own record. Resolution selects
//! the record at the longest exactly-matching registered prefix as a
//! whole; fields are never merged across registration levels.

use std::collections::BTreeMap;

use pathstate_core::{Path, Value};

use crate::coerce::CoercionKind;

/// Configuration governing writes at (and below) a path.
#[derive(Clone, Debug)]
pub struct PathOptions {
    /// Value seeded into the tree when nothing is stored at the path,
    /// and the allow-list fallback.
    pub default_value: Option<Value>,
    /// Coercion run on every raw value written to the path.
    pub coerce: CoercionKind,
    /// When non-empty, values outside this set are replaced by the
    /// default value (or null) on write.
    pub allowed_values: Vec<Value>,
    /// Skip the write and all notifications when the incoming value is
    /// structurally equal to the stored one. On by default.
    pub skip_unchanged: bool,
}

impl Default for PathOptions {
    fn default() -> Self {
        PathOptions {
            default_value: None,
            coerce: CoercionKind::None,
            allowed_values: Vec::new(),
            skip_unchanged: true,
        }
    }
}

impl PathOptions {
    /// A record with the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the coercion strategy.
    #[must_use]
    pub fn with_coercion(mut self, coerce: CoercionKind) -> Self {
        self.coerce = coerce;
        self
    }

    /// Restrict stored values to an allow-list.
    #[must_use]
    pub fn with_allowed(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = values;
        self
    }

    /// Control unchanged-write suppression.
    #[must_use]
    pub fn with_skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = skip;
        self
    }
}

/// Registry of option records keyed by path prefix.
///
/// A prefix trie over path segments; lookup walks the queried path and
/// remembers the deepest node holding a record.
#[derive(Debug, Default)]
pub struct OptionsRegistry {
    root: Node,
}

#[derive(Debug, Default)]
struct Node {
    record: Option<PathOptions>,
    children: BTreeMap<String, Node>,
}

impl OptionsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or overwrite) the record registered at exactly `path`.
    pub fn insert(&mut self, path: &Path, options: PathOptions) {
        let mut node = &mut self.root;
        for segment in path.iter() {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.record = Some(options);
    }

    /// The record registered at exactly `path`, if any.
    pub fn get(&self, path: &Path) -> Option<&PathOptions> {
        let mut node = &self.root;
        for segment in path.iter() {
            node = node.children.get(segment.as_str())?;
        }
        node.record.as_ref()
    }

    /// Resolve the effective record for a concrete path.
    ///
    /// The record at the longest registered prefix of `path` wins whole;
    /// a record at the root prefix applies to everything. Returns the
    /// built-in defaults when no prefix is registered.
    pub fn resolve(&self, path: &Path) -> PathOptions {
        let mut node = &self.root;
        let mut winner = node.record.as_ref();
        for segment in path.iter() {
            match node.children.get(segment.as_str()) {
                Some(child) => node = child,
                None => break,
            }
            if node.record.is_some() {
                winner = node.record.as_ref();
            }
        }
        winner.cloned().unwrap_or_default()
    }

    /// The effective default value for a path, if its resolved record
    /// carries one.
    pub fn default_value(&self, path: &Path) -> Option<Value> {
        self.resolve(path).default_value
    }
}
