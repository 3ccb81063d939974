//! Observable path-addressed state container.
//!
//! A `State` owns a nested value tree addressed by dot-separated paths
//! and notifies registered subscribers when a path (or any of its
//! descendants) changes. Paths can carry option records: a default
//! value, a coercion strategy, an allow-list, and unchanged-write
//! suppression. Everything is synchronous and single-threaded.
//!
//! # Example
//!
//! ```rust
//! use pathstate_core::{path, Value};
//! use pathstate_store::{CoercionKind, PathOptions, State};
//!
//! let mut state = State::new();
//! state.set_options(
//!     &path!("form.age"),
//!     PathOptions::new()
//!         .with_default(0)
//!         .with_coercion(CoercionKind::Integer),
//! );
//! state.subscribe(&path!("form"), |value, path, _| {
//!     println!("{} changed: {:?}", path, value);
//! });
//! state.set(&path!("form.age"), "42").unwrap();
//! assert_eq!(state.get(&path!("form.age")), Some(Value::Integer(42)));
//! ```

pub mod coerce;
mod options;
mod state;
mod subscription;

pub use coerce::{CoercionKind, CustomFn};
pub use options::{OptionsRegistry, PathOptions};
pub use state::{SetOutcome, State};
pub use subscription::{Callback, SubscriptionId, SubscriptionRegistry};

// Re-export the core layer for convenience
pub use pathstate_core::{tree, Error, Path, Value};
