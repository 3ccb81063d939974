//! Subscription registry and change-notification dispatch.
//!
//! Subscriptions are held in registration order and removed for real on
//! unsubscription (no tombstones). Dispatch is synchronous: callbacks
//! run during the triggering call's stack frame.

use pathstate_core::{tree, Path, Value};

/// Opaque handle identifying the subscriptions created by one
/// `subscribe` call. Process-unique per registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A change-notification callback.
///
/// Receives `(current value at the subscription path, subscription path,
/// passthrough value)`. The value is `None` when nothing is stored at
/// the subscription path.
pub type Callback = Box<dyn FnMut(Option<&Value>, &Path, Option<&Value>)>;

struct Subscription {
    id: SubscriptionId,
    paths: Vec<Path>,
    callback: Callback,
}

/// Ordered registry of active subscriptions.
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: Vec<Subscription>,
    next_id: u64,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one or more paths under a single id.
    ///
    /// The root path subscribes to every dispatch.
    pub fn subscribe(&mut self, paths: Vec<Path>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push(Subscription {
            id,
            paths,
            callback,
        });
        id
    }

    /// Remove every path registered under `id`. Returns whether anything
    /// was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Remove every subscription path exactly equal to `path`, across
    /// all ids. Descendant paths are untouched. Returns the number of
    /// paths removed.
    pub fn unsubscribe_all(&mut self, path: &Path) -> usize {
        let mut removed = 0;
        for entry in &mut self.entries {
            let before = entry.paths.len();
            entry.paths.retain(|registered| registered != path);
            removed += before - entry.paths.len();
        }
        self.entries.retain(|entry| !entry.paths.is_empty());
        removed
    }

    /// Number of live subscription paths.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.paths.len()).sum()
    }

    /// Whether no subscriptions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notify subscribers of a change.
    ///
    /// `write_path` is the path that was written (`None` for a global
    /// trigger, which fires everything) and `patch` the root-level
    /// nested patch that was merged, used to enumerate the touched leaf
    /// paths. Each subscription path fires at most once, in registration
    /// order, receiving the value currently stored at it in `state`.
    pub fn dispatch(
        &mut self,
        state: &Value,
        write_path: Option<&Path>,
        patch: Option<&Value>,
        passthrough: Option<&Value>,
    ) {
        let touched: Vec<Path> = patch
            .map(|patch| {
                tree::flatten_leaves(patch)
                    .into_iter()
                    .map(|(path, _)| path)
                    .collect()
            })
            .unwrap_or_default();

        let mut fired = 0usize;
        for entry in &mut self.entries {
            for sub_path in &entry.paths {
                if matches(sub_path, write_path, &touched) {
                    let current = tree::get_path(state, sub_path);
                    (entry.callback)(current, sub_path, passthrough);
                    fired += 1;
                }
            }
        }
        log::trace!(
            "dispatched write at '{}' to {} subscription(s)",
            write_path.map(Path::to_string).unwrap_or_default(),
            fired
        );
    }
}

/// Whether a subscription registered at `sub_path` fires for a write.
///
/// It fires when the dispatch is global, the subscription watches the
/// whole tree, the subscription watches an ancestor-or-exact path of the
/// write, or the subscription watches one of the touched leaf paths.
fn matches(sub_path: &Path, write_path: Option<&Path>, touched: &[Path]) -> bool {
    match write_path {
        None => true,
        Some(write_path) => {
            sub_path.is_empty()
                || write_path.starts_with(sub_path)
                || touched.contains(sub_path)
        }
    }
}
