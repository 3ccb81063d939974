//! Type-directed coercion of raw values before storage.
//!
//! Each configurable path carries a `CoercionKind`; writes run through
//! `apply`, which coerces the raw value and then applies the allow-list
//! filter. Unsupported inputs coerce to a zero value rather than
//! erroring - only a `Custom` function can fail a write.

use std::fmt;
use std::sync::Arc;

use pathstate_core::{tree, Error, Value};

use crate::options::PathOptions;

/// A caller-supplied coercion function.
///
/// Receives `(raw, old, default)` and produces the value to store. An
/// error return propagates out of the triggering `set` call.
pub type CustomFn =
    Arc<dyn Fn(&Value, Option<&Value>, Option<&Value>) -> Result<Value, Error>>;

/// The coercion strategy configured for a path.
///
/// An explicit variant set, so an unsupported strategy is unrepresentable
/// rather than a silently ignored tag.
#[derive(Clone, Default)]
pub enum CoercionKind {
    /// Store the raw value unchanged.
    #[default]
    None,
    /// Numeric coercion; integral text becomes `Integer`, other numeric
    /// text becomes `Float`, non-numeric input becomes `Integer(0)`.
    Number,
    /// Truncating integer coercion; text parses its leading integer
    /// prefix (`"1.2"` -> 1, `"12px"` -> 12), non-numeric input becomes 0.
    Integer,
    /// Floating-point coercion; text parses its leading decimal prefix,
    /// non-numeric input becomes 0.0.
    Float,
    /// `false` only for null, `false`, and the literal string `"false"`;
    /// everything else is `true`.
    Boolean,
    /// Parse textual input as JSON and normalize its map keys; parse
    /// failures keep the original text. Non-text input passes through.
    Json,
    /// Delegate to a caller-supplied function.
    Custom(CustomFn),
}

impl fmt::Debug for CoercionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoercionKind::None => "None",
            CoercionKind::Number => "Number",
            CoercionKind::Integer => "Integer",
            CoercionKind::Float => "Float",
            CoercionKind::Boolean => "Boolean",
            CoercionKind::Json => "Json",
            CoercionKind::Custom(_) => "Custom(..)",
        };
        write!(f, "CoercionKind::{}", name)
    }
}

/// Run a raw value through a path's coercion and allow-list.
///
/// `old` is the value currently stored at the path, handed to custom
/// coercion functions alongside the configured default.
pub fn apply(raw: Value, old: Option<&Value>, options: &PathOptions) -> Result<Value, Error> {
    let coerced = match &options.coerce {
        CoercionKind::None => raw,
        CoercionKind::Number => to_number(raw),
        CoercionKind::Integer => to_integer(raw),
        CoercionKind::Float => to_float(raw),
        CoercionKind::Boolean => Value::Bool(to_bool(&raw)),
        CoercionKind::Json => parse_json(raw),
        CoercionKind::Custom(transform) => {
            transform(&raw, old, options.default_value.as_ref())?
        }
    };
    Ok(filter_allowed(coerced, options))
}

fn filter_allowed(value: Value, options: &PathOptions) -> Value {
    if options.allowed_values.is_empty() || options.allowed_values.contains(&value) {
        value
    } else {
        options.default_value.clone().unwrap_or(Value::Null)
    }
}

fn to_number(raw: Value) -> Value {
    match raw {
        Value::Integer(_) | Value::Float(_) => raw,
        Value::Bool(b) => Value::Integer(b as i64),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(i) = text.parse::<i64>() {
                Value::Integer(i)
            } else if let Ok(f) = text.parse::<f64>() {
                Value::Float(f)
            } else {
                Value::Integer(0)
            }
        }
        _ => Value::Integer(0),
    }
}

fn to_integer(raw: Value) -> Value {
    Value::Integer(match raw {
        Value::Integer(i) => i,
        Value::Float(f) => f as i64,
        Value::Bool(b) => b as i64,
        Value::String(s) => leading_integer(&s).unwrap_or(0),
        _ => 0,
    })
}

fn to_float(raw: Value) -> Value {
    Value::Float(match raw {
        Value::Float(f) => f,
        Value::Integer(i) => i as f64,
        Value::Bool(b) => b as i64 as f64,
        Value::String(s) => leading_float(&s).unwrap_or(0.0),
        _ => 0.0,
    })
}

fn to_bool(raw: &Value) -> bool {
    match raw {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => s != "false",
        _ => true,
    }
}

fn parse_json(raw: Value) -> Value {
    let Value::String(text) = raw else {
        return raw;
    };
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(parsed) => tree::normalize_keys(Value::from(parsed)),
        Err(err) => {
            // Swallowed: malformed external input stays stored as text.
            log::debug!("keeping unparsed json text ({})", err);
            Value::String(text)
        }
    }
}

/// Parse the leading `[+-]?digits` prefix of a string, ignoring leading
/// whitespace.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// Parse the leading decimal prefix (with optional fraction and
/// exponent) of a string, ignoring leading whitespace.
fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let mut seen_digits = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        seen_digits = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 {
            end = frac;
            seen_digits = true;
        } else if seen_digits {
            // "1." parses as 1.0
            end += 1;
        }
    }
    if !seen_digits {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coerced(kind: CoercionKind, raw: impl Into<Value>) -> Value {
        let options = PathOptions::new().with_coercion(kind);
        apply(raw.into(), None, &options).unwrap()
    }

    #[test]
    fn number_coercion() {
        assert_eq!(coerced(CoercionKind::Number, "12"), Value::Integer(12));
        assert_eq!(coerced(CoercionKind::Number, "1.5"), Value::Float(1.5));
        assert_eq!(coerced(CoercionKind::Number, "test"), Value::Integer(0));
        assert_eq!(coerced(CoercionKind::Number, 3), Value::Integer(3));
        assert_eq!(coerced(CoercionKind::Number, 2.5), Value::Float(2.5));
        assert_eq!(coerced(CoercionKind::Number, true), Value::Integer(1));
        assert_eq!(coerced(CoercionKind::Number, Value::Null), Value::Integer(0));
    }

    #[test]
    fn integer_coercion_parses_leading_prefix() {
        assert_eq!(coerced(CoercionKind::Integer, "1.2"), Value::Integer(1));
        assert_eq!(coerced(CoercionKind::Integer, "12px"), Value::Integer(12));
        assert_eq!(coerced(CoercionKind::Integer, "-3"), Value::Integer(-3));
        assert_eq!(coerced(CoercionKind::Integer, "test"), Value::Integer(0));
        assert_eq!(coerced(CoercionKind::Integer, 2.9), Value::Integer(2));
        assert_eq!(coerced(CoercionKind::Integer, -2.9), Value::Integer(-2));
    }

    #[test]
    fn float_coercion_parses_leading_prefix() {
        assert_eq!(coerced(CoercionKind::Float, "1.25rem"), Value::Float(1.25));
        assert_eq!(coerced(CoercionKind::Float, "2e3"), Value::Float(2000.0));
        assert_eq!(coerced(CoercionKind::Float, "1."), Value::Float(1.0));
        assert_eq!(coerced(CoercionKind::Float, "test"), Value::Float(0.0));
        assert_eq!(coerced(CoercionKind::Float, 3), Value::Float(3.0));
    }

    #[test]
    fn boolean_coercion() {
        assert_eq!(coerced(CoercionKind::Boolean, Value::Null), Value::Bool(false));
        assert_eq!(coerced(CoercionKind::Boolean, false), Value::Bool(false));
        assert_eq!(coerced(CoercionKind::Boolean, "false"), Value::Bool(false));
        assert_eq!(coerced(CoercionKind::Boolean, "0"), Value::Bool(true));
        assert_eq!(coerced(CoercionKind::Boolean, 0), Value::Bool(true));
        assert_eq!(coerced(CoercionKind::Boolean, "anything"), Value::Bool(true));
    }

    #[test]
    fn json_coercion_parses_and_normalizes() {
        assert_eq!(
            coerced(CoercionKind::Json, r#"{"someKey": {"innerKey": 1}}"#),
            Value::from(json!({"some_key": {"inner_key": 1}}))
        );
    }

    #[test]
    fn json_coercion_keeps_bad_text() {
        assert_eq!(
            coerced(CoercionKind::Json, "{not json"),
            Value::from("{not json")
        );
    }

    #[test]
    fn json_coercion_passes_non_text() {
        assert_eq!(coerced(CoercionKind::Json, 5), Value::Integer(5));
        let map = Value::from(json!({"alreadyParsed": 1}));
        assert_eq!(coerced(CoercionKind::Json, map.clone()), map);
    }

    #[test]
    fn none_passes_through() {
        let v = Value::from(json!({"any": ["shape"]}));
        assert_eq!(coerced(CoercionKind::None, v.clone()), v);
    }

    #[test]
    fn custom_coercion_sees_old_and_default() {
        let options = PathOptions::new()
            .with_default(100)
            .with_coercion(CoercionKind::Custom(Arc::new(|raw, old, default| {
                assert_eq!(old, Some(&Value::Integer(1)));
                assert_eq!(default, Some(&Value::Integer(100)));
                Ok(raw.clone())
            })));
        let out = apply(Value::from(2), Some(&Value::Integer(1)), &options).unwrap();
        assert_eq!(out, Value::Integer(2));
    }

    #[test]
    fn custom_coercion_errors_propagate() {
        let options = PathOptions::new().with_coercion(CoercionKind::Custom(Arc::new(
            |_, _, _| Err(Error::coercion("rejected")),
        )));
        assert!(apply(Value::from(2), None, &options).is_err());
    }

    #[test]
    fn allow_list_rejects_to_default_or_null() {
        let options = PathOptions::new().with_allowed(vec!["lorem".into(), "ipsum".into()]);
        assert_eq!(
            apply("dolor".into(), None, &options).unwrap(),
            Value::Null
        );
        assert_eq!(
            apply("ipsum".into(), None, &options).unwrap(),
            Value::from("ipsum")
        );

        let with_default = options.with_default("lorem");
        assert_eq!(
            apply("dolor".into(), None, &with_default).unwrap(),
            Value::from("lorem")
        );
    }

    #[test]
    fn allow_list_applies_after_coercion() {
        let options = PathOptions::new()
            .with_coercion(CoercionKind::Integer)
            .with_allowed(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(apply("1.9".into(), None, &options).unwrap(), Value::Integer(1));
        assert_eq!(apply("7".into(), None, &options).unwrap(), Value::Null);
    }

    #[test]
    fn leading_prefix_parsers() {
        assert_eq!(leading_integer("  42abc"), Some(42));
        assert_eq!(leading_integer("+7"), Some(7));
        assert_eq!(leading_integer("abc"), None);
        assert_eq!(leading_float("-1.5e2x"), Some(-150.0));
        assert_eq!(leading_float(".5"), Some(0.5));
        assert_eq!(leading_float("e5"), None);
    }
}
