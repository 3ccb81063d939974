//! End-to-end tests of the state container: writes, options resolution,
//! coercion, and subscription dispatch working together.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use pathstate_core::{path, Path, Value};
use pathstate_store::{CoercionKind, PathOptions, State};
use serde_json::json;

fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

#[test]
fn form_widget_scenario() {
    // A form seeds its defaults, constrains a field, and watches a branch.
    let mut state = State::with_defaults(value(json!({
        "form": {
            "name": "",
            "age": 0,
            "color": "red"
        }
    })));
    state.set_options(
        &path!("form.age"),
        PathOptions::new()
            .with_default(0)
            .with_coercion(CoercionKind::Integer),
    );
    state.set_options(
        &path!("form.color"),
        PathOptions::new()
            .with_default("red")
            .with_allowed(vec!["red".into(), "green".into(), "blue".into()]),
    );

    let changes = Rc::new(RefCell::new(Vec::new()));
    {
        let changes = Rc::clone(&changes);
        state.subscribe(&path!("form"), move |value, _, _| {
            changes.borrow_mut().push(value.cloned().unwrap());
        });
    }

    state.set(&path!("form.name"), "Alice").unwrap();
    state.set(&path!("form.age"), "42.9").unwrap();
    state.set(&path!("form.color"), "purple").unwrap();

    assert_eq!(
        state.get(&path!("form")),
        Some(value(json!({"name": "Alice", "age": 42, "color": "red"})))
    );
    // The rejected color fell back to the default already stored, so
    // that write was suppressed as unchanged: two notifications, not
    // three, each carrying the merged sub-tree.
    assert_eq!(changes.borrow().len(), 2);
    assert_eq!(
        changes.borrow()[0],
        value(json!({"name": "Alice", "age": 0, "color": "red"}))
    );
}

#[test]
fn ancestor_and_descendant_notification() {
    let mut state = State::new();

    let ancestor = Rc::new(RefCell::new(None));
    let descendant = Rc::new(RefCell::new(None));
    {
        let ancestor = Rc::clone(&ancestor);
        state.subscribe(&path!("a"), move |value, _, _| {
            *ancestor.borrow_mut() = value.cloned();
        });
    }
    {
        let descendant = Rc::clone(&descendant);
        state.subscribe(&path!("a.b"), move |value, _, _| {
            *descendant.borrow_mut() = value.cloned();
        });
    }

    // Writing a descendant fires the ancestor watcher with the sub-tree.
    state.set(&path!("a.b"), 2).unwrap();
    assert_eq!(*ancestor.borrow(), Some(value(json!({"b": 2}))));

    // Writing an ancestor map fires the descendant watcher with the leaf.
    state.set(&path!("a"), value(json!({"b": 3}))).unwrap();
    assert_eq!(*descendant.borrow(), Some(Value::Integer(3)));
}

#[test]
fn unsubscription_semantics() {
    let mut state = State::new();
    let count_a = Rc::new(RefCell::new(0));
    let count_ab = Rc::new(RefCell::new(0));

    let id = {
        let count_a = Rc::clone(&count_a);
        state.subscribe(&path!("a"), move |_, _, _| *count_a.borrow_mut() += 1)
    };
    {
        let count_ab = Rc::clone(&count_ab);
        state.subscribe(&path!("a.b"), move |_, _, _| *count_ab.borrow_mut() += 1);
    }

    state.set(&path!("a.b"), 1).unwrap();
    assert_eq!((*count_a.borrow(), *count_ab.borrow()), (1, 1));

    // Token unsubscription stops the "a" watcher.
    assert!(state.unsubscribe(id));
    state.set(&path!("a.b"), 2).unwrap();
    assert_eq!((*count_a.borrow(), *count_ab.borrow()), (1, 2));

    // Exact-path bulk removal of "a" does not touch the "a.b" watcher.
    state.unsubscribe_all(&path!("a"));
    state.unsubscribe_all(&path!("a.b"));
    state.set(&path!("a.b"), 3).unwrap();
    assert_eq!((*count_a.borrow(), *count_ab.borrow()), (1, 2));
}

#[test]
fn batch_write_notifies_once_per_subscriber() {
    let mut state = State::new();
    let global = Rc::new(RefCell::new(0));
    let scoped = Rc::new(RefCell::new(Vec::new()));
    {
        let global = Rc::clone(&global);
        state.subscribe(&Path::root(), move |_, _, _| *global.borrow_mut() += 1);
    }
    {
        let scoped = Rc::clone(&scoped);
        state.subscribe(&path!("b"), move |value, _, _| {
            scoped.borrow_mut().push(value.cloned());
        });
    }

    let outcomes = state
        .set_many(vec![
            (path!("a"), Value::Integer(1)),
            (path!("b"), Value::Integer(2)),
            (path!("c.d"), Value::from("x")),
        ])
        .unwrap();

    // Outcomes come back in input order.
    let written: Vec<String> = outcomes.iter().map(|o| o.path.to_string()).collect();
    assert_eq!(written, vec!["a", "b", "c.d"]);

    // One global dispatch: every subscriber fired exactly once, seeing
    // the fully merged tree.
    assert_eq!(*global.borrow(), 1);
    assert_eq!(scoped.borrow().as_slice(), &[Some(Value::Integer(2))]);
}

#[test]
fn json_coercion_normalizes_external_payloads() {
    let mut state = State::new();
    state.set_options(
        &path!("payload"),
        PathOptions::new().with_coercion(CoercionKind::Json),
    );

    state
        .set(&path!("payload"), r#"{"userName": "kim", "innerData": {"someFlag": true}}"#)
        .unwrap();
    assert_eq!(
        state.get(&path!("payload")),
        Some(value(json!({"user_name": "kim", "inner_data": {"some_flag": true}})))
    );

    // Malformed input is kept as the original text, silently.
    state.set(&path!("payload"), "{broken").unwrap();
    assert_eq!(state.get(&path!("payload")), Some(Value::from("{broken")));
}

#[test]
fn custom_coercion_clamps_with_default() {
    let mut state = State::new();
    state.set_options(
        &path!("volume"),
        PathOptions::new()
            .with_default(50)
            .with_coercion(CoercionKind::Custom(Arc::new(|raw, _, default| {
                match raw {
                    Value::Integer(i) => Ok(Value::Integer(*i.min(&100).max(&0))),
                    _ => Ok(default.cloned().unwrap_or(Value::Null)),
                }
            }))),
    );

    state.set(&path!("volume"), 130).unwrap();
    assert_eq!(state.get(&path!("volume")), Some(Value::Integer(100)));

    state.set(&path!("volume"), "loud").unwrap();
    assert_eq!(state.get(&path!("volume")), Some(Value::Integer(50)));
}

#[test]
fn options_resolution_prefers_deepest_registration() {
    let mut state = State::new();
    state.set_options(&path!("a"), PathOptions::new().with_default("a"));
    state.set_options(&path!("a.b"), PathOptions::new().with_default("a.b"));

    assert_eq!(state.default_value(&path!("a.b")), Some(Value::from("a.b")));
    assert_eq!(state.default_value(&path!("a.other")), Some(Value::from("a")));
    // Registering "a" first seeded the tree at "a" with a scalar; the
    // deeper default then carved it into a branch.
    assert_eq!(state.get(&path!("a.b")), Some(Value::from("a.b")));
}

#[test]
fn trigger_fires_manually() {
    let mut state = State::new();
    state.set(&path!("status"), "ready").unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        state.subscribe(&path!("status"), move |value, path, passthrough| {
            seen.borrow_mut()
                .push((path.to_string(), value.cloned(), passthrough.cloned()));
        });
    }

    state.trigger(None, Some(&Value::from("refresh")));
    assert_eq!(
        seen.borrow().as_slice(),
        &[(
            "status".to_string(),
            Some(Value::from("ready")),
            Some(Value::from("refresh"))
        )]
    );
}
