//! Core pathstate types.
//!
//! This layer holds the primitives the stateful engine is built on:
//! - `Path`: dot-delimited address into a nested tree
//! - `Value`: the tree-shaped data itself
//! - `tree`: navigation, patch expansion, merge and flatten utilities
//!
//! Nothing in this crate holds state or knows about options,
//! subscriptions or coercion; see `pathstate-store` for the engine.
//!
//! # Example
//!
//! ```rust
//! use pathstate_core::{tree, path, Value};
//!
//! let mut root = Value::map();
//! tree::set_path(&mut root, &path!("user.name"), Value::from("Alice"));
//! assert_eq!(
//!     tree::get_path(&root, &path!("user.name")),
//!     Some(&Value::from("Alice"))
//! );
//! ```

mod error;
mod path;
pub mod tree;
mod value;

pub use error::Error;
pub use path::Path;
pub use value::Value;
