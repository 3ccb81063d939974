//! pathstate: an embeddable observable state container.
//!
//! pathstate stores a nested key/value tree addressed by dot-separated
//! path strings, supports per-path configuration (defaults, coercion,
//! allow-lists) and notifies subscribers synchronously when a path or
//! any of its descendants changes. It is a state layer for a
//! single-threaded host - a form-like widget, a tool's configuration
//! surface - not a distributed or persistent store.
//!
//! This crate re-exports the two layers:
//! - [`pathstate_core`]: `Path`, `Value`, tree utilities
//! - [`pathstate_store`]: options, coercion, subscriptions, `State`

pub use pathstate_core::{path, tree, Error, Path, Value};
pub use pathstate_store::{
    CoercionKind, OptionsRegistry, PathOptions, SetOutcome, State, SubscriptionId,
    SubscriptionRegistry,
};
