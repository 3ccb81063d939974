//! Utilities for navigating and modifying Value trees.
//!
//! Lookups never fail: an absent or non-traversable path resolves to
//! `None`. Mutation goes through `merge`, which descends into maps on
//! both sides and overwrites everything else.

use std::collections::BTreeMap;

use crate::{Path, Value};

/// Get a reference to the sub-tree at the given path.
///
/// Returns the whole tree for the root path, and `None` as soon as a
/// segment is absent or the cursor reaches a non-container value. Array
/// values are indexed by numeric segments.
pub fn get_path<'a>(tree: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut cursor = tree;
    for segment in path.iter() {
        cursor = match cursor {
            Value::Map(map) => map.get(segment.as_str())?,
            Value::Array(arr) => {
                let index: usize = segment.parse().ok()?;
                arr.get(index)?
            }
            _ => return None,
        };
    }
    Some(cursor)
}

/// Get a mutable reference to the sub-tree at the given path.
pub fn get_path_mut<'a>(tree: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    let mut cursor = tree;
    for segment in path.iter() {
        cursor = match cursor {
            Value::Map(map) => map.get_mut(segment.as_str())?,
            Value::Array(arr) => {
                let index: usize = segment.parse().ok()?;
                arr.get_mut(index)?
            }
            _ => return None,
        };
    }
    Some(cursor)
}

/// Set a value at a path, creating intermediate maps as needed.
///
/// Non-map intermediates are overwritten with maps; this cannot fail.
/// The root path replaces the whole tree.
pub fn set_path(tree: &mut Value, path: &Path, value: Value) {
    merge(tree, expand_patch(path, value));
}

/// Expand a single write into its minimal nested patch.
///
/// `"a.b"` with value `v` becomes `{a: {b: v}}`; the root path yields
/// `v` itself (the patch is the whole replacement).
pub fn expand_patch(path: &Path, value: Value) -> Value {
    path.iter().rev().fold(value, |inner, segment| {
        let mut map = BTreeMap::new();
        map.insert(segment.clone(), inner);
        Value::Map(map)
    })
}

/// Recursively merge `source` into `target`.
///
/// Map entries from `source` descend into matching map branches in
/// `target` (creating the branch when absent or non-map); any non-map
/// source value is a direct overwrite. A non-map `source` replaces
/// `target` outright.
pub fn merge(target: &mut Value, source: Value) {
    match source {
        Value::Map(entries) => {
            if !target.is_map() {
                *target = Value::map();
            }
            let Value::Map(branch) = target else {
                unreachable!()
            };
            for (key, value) in entries {
                merge(branch.entry(key).or_insert(Value::Null), value);
            }
        }
        other => *target = other,
    }
}

/// Flatten a tree into its leaf paths in dot notation.
///
/// Descends through maps only; anything else (including values nested
/// inside arrays) is a leaf. Empty maps count as leaves. A non-map tree
/// flattens to nothing, matching how a scalar overwrite touches no
/// enumerable keys.
pub fn flatten_leaves(tree: &Value) -> Vec<(Path, &Value)> {
    let mut leaves = Vec::new();
    if let Value::Map(map) = tree {
        for (key, value) in map {
            collect_leaves(Path::root().child(key), value, &mut leaves);
        }
    }
    leaves
}

fn collect_leaves<'a>(prefix: Path, value: &'a Value, leaves: &mut Vec<(Path, &'a Value)>) {
    match value {
        Value::Map(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(prefix.child(key), child, leaves);
            }
        }
        _ => leaves.push((prefix, value)),
    }
}

/// Recursively rewrite map keys to lower snake_case.
///
/// Total by construction: any input comes back out, worst case with its
/// keys unchanged. Used by the `json` coercion to canonicalize keys of
/// externally supplied data.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Map(map) => Value::Map(
            map.into_iter()
                .map(|(key, value)| (to_snake_case(&key), normalize_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_lower_or_digit = false;
    for c in key.chars() {
        if c == '-' || c == ' ' {
            out.push('_');
            prev_lower_or_digit = false;
        } else if c.is_uppercase() {
            if prev_lower_or_digit {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
