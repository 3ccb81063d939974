//! The public state container facade.

use pathstate_core::{tree, Error, Path, Value};

use crate::coerce;
use crate::options::{OptionsRegistry, PathOptions};
use crate::subscription::{SubscriptionId, SubscriptionRegistry};

/// The result of a single write: the path written and the value actually
/// stored (after coercion and the allow-list).
#[derive(Clone, Debug, PartialEq)]
pub struct SetOutcome {
    pub path: Path,
    pub value: Value,
}

/// An observable path-addressed state container.
///
/// Owns a nested value tree addressed by dot-separated paths, per-path
/// option records, and an ordered set of subscriptions notified when a
/// path (or any of its descendants) changes. Strictly single-threaded
/// and synchronous: subscriber callbacks run during the triggering
/// `set` call, in registration order.
///
/// # Example
///
/// ```rust
/// use pathstate_store::State;
/// use pathstate_core::{path, Value};
///
/// let mut state = State::new();
/// state.set(&path!("form.name"), "Alice").unwrap();
/// assert_eq!(state.get(&path!("form.name")), Some(Value::from("Alice")));
/// ```
pub struct State {
    tree: Value,
    options: OptionsRegistry,
    subscriptions: SubscriptionRegistry,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    /// Create an empty container.
    pub fn new() -> Self {
        State {
            tree: Value::map(),
            options: OptionsRegistry::new(),
            subscriptions: SubscriptionRegistry::new(),
        }
    }

    /// Create a container seeded from a default tree.
    ///
    /// The tree is flattened into per-leaf default-value option records,
    /// so the defaults both become stored values immediately and remain
    /// the registered defaults for later resolution.
    pub fn with_defaults(defaults: Value) -> Self {
        let mut state = State::new();
        let leaves: Vec<(Path, Value)> = tree::flatten_leaves(&defaults)
            .into_iter()
            .map(|(path, value)| (path, value.clone()))
            .collect();
        for (path, value) in leaves {
            state.set_options(&path, PathOptions::new().with_default(value));
        }
        state
    }

    /// Read the value at a path, cloned out of the tree.
    ///
    /// The root path reads the whole tree. Absent paths are `None`,
    /// never an error.
    pub fn get(&self, path: &Path) -> Option<Value> {
        tree::get_path(&self.tree, path).cloned()
    }

    /// Write a value at a path.
    ///
    /// The value runs through the path's resolved coercion and
    /// allow-list, is merged into the tree as a nested patch, and
    /// matching subscribers are notified. When the path's record has
    /// `skip_unchanged` set (the default) and the coerced value equals
    /// the stored one, the write and all notifications are skipped; the
    /// outcome is still returned.
    ///
    /// The only error is a `Custom` coercion function failing.
    pub fn set(&mut self, path: &Path, value: impl Into<Value>) -> Result<SetOutcome, Error> {
        self.write(path, value.into(), true)
    }

    /// Write a value, registering `default` for the path first.
    ///
    /// Sugar for `set_options` with a default-value record followed by
    /// `set`; the default participates in this very write (allow-list
    /// fallback, custom coercion argument).
    pub fn set_with_default(
        &mut self,
        path: &Path,
        value: impl Into<Value>,
        default: impl Into<Value>,
    ) -> Result<SetOutcome, Error> {
        let mut record = self.options.get(path).cloned().unwrap_or_default();
        record.default_value = Some(default.into());
        self.set_options(path, record);
        self.set(path, value)
    }

    /// Write several paths as one batch, in input order.
    ///
    /// Each write resolves its own options but notifies nothing; one
    /// global dispatch runs at the end, firing every subscription with
    /// the then-current value at its path. An error aborts the batch at
    /// the failing entry, before the dispatch.
    pub fn set_many(
        &mut self,
        entries: Vec<(Path, Value)>,
    ) -> Result<Vec<SetOutcome>, Error> {
        let mut outcomes = Vec::with_capacity(entries.len());
        for (path, value) in entries {
            outcomes.push(self.write(&path, value, false)?);
        }
        self.subscriptions.dispatch(&self.tree, None, None, None);
        Ok(outcomes)
    }

    /// Write the value computed from the stored one.
    ///
    /// `compute` receives `(old, default)` for the path; its return
    /// value is stored through the normal coercion pipeline.
    pub fn set_computed<F>(&mut self, path: &Path, compute: F) -> Result<SetOutcome, Error>
    where
        F: FnOnce(Option<&Value>, Option<&Value>) -> Value,
    {
        let default = self.options.default_value(path);
        let raw = compute(tree::get_path(&self.tree, path), default.as_ref());
        self.write(path, raw, true)
    }

    /// Register (or replace) the option record at a path.
    ///
    /// When the record carries a default value and nothing is stored at
    /// the path yet, the default is merged into the tree immediately -
    /// defaults are real stored values, not just metadata.
    pub fn set_options(&mut self, path: &Path, options: PathOptions) {
        let seed = match (&options.default_value, tree::get_path(&self.tree, path)) {
            (Some(default), None) => Some(default.clone()),
            _ => None,
        };
        self.options.insert(path, options);
        if let Some(default) = seed {
            tree::merge(&mut self.tree, tree::expand_patch(path, default));
        }
    }

    /// The effective default value for a path, per prefix resolution.
    pub fn default_value(&self, path: &Path) -> Option<Value> {
        self.options.default_value(path)
    }

    /// Subscribe a callback to changes at (or below, or above) a path.
    ///
    /// The callback receives `(current value at the subscription path,
    /// subscription path, passthrough value)` and runs synchronously
    /// inside the triggering call. It cannot call back into this
    /// container (the container is exclusively borrowed during
    /// dispatch); communicate outward through captured shared state.
    pub fn subscribe<F>(&mut self, path: &Path, callback: F) -> SubscriptionId
    where
        F: FnMut(Option<&Value>, &Path, Option<&Value>) + 'static,
    {
        self.subscribe_many(vec![path.clone()], callback)
    }

    /// Subscribe one callback to several paths under a single id.
    pub fn subscribe_many<F>(&mut self, paths: Vec<Path>, callback: F) -> SubscriptionId
    where
        F: FnMut(Option<&Value>, &Path, Option<&Value>) + 'static,
    {
        self.subscriptions.subscribe(paths, Box::new(callback))
    }

    /// Remove every subscription path registered under `id`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    /// Remove every subscription registered at exactly `path`.
    /// Subscriptions at descendant paths stay alive.
    pub fn unsubscribe_all(&mut self, path: &Path) -> usize {
        self.subscriptions.unsubscribe_all(path)
    }

    /// Manually notify subscribers.
    ///
    /// With a path, fires the subscriptions watching the whole tree or
    /// an ancestor-or-exact path of it; with `None`, fires everything.
    /// `passthrough` is handed to each callback unchanged.
    pub fn trigger(&mut self, path: Option<&Path>, passthrough: Option<&Value>) {
        self.subscriptions
            .dispatch(&self.tree, path, None, passthrough);
    }

    fn write(&mut self, path: &Path, raw: Value, notify: bool) -> Result<SetOutcome, Error> {
        let record = self.options.resolve(path);
        let value = coerce::apply(raw, tree::get_path(&self.tree, path), &record)?;

        if record.skip_unchanged && tree::get_path(&self.tree, path) == Some(&value) {
            return Ok(SetOutcome {
                path: path.clone(),
                value,
            });
        }

        let patch = tree::expand_patch(path, value.clone());
        tree::merge(&mut self.tree, patch.clone());
        if notify {
            self.subscriptions
                .dispatch(&self.tree, Some(path), Some(&patch), None);
        }
        Ok(SetOutcome {
            path: path.clone(),
            value,
        })
    }
}
