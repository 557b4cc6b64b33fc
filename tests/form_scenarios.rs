//! End-to-end form scenarios
//!
//! A host mounts a form, wires leaves to its scopes, feeds every reported
//! change back, and submits.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use faram::condition::{integer, required};
use faram::dispatch::{Element, ElementAction};
use faram::form::{Form, FormHost, FormProps, SubmitHandle, SubmitHost, SubmitOutcome};
use faram::schema::{GroupSchema, KeySelector, ListSchema, SchemaNode};
use faram::tree::{ChangeInfo, ErrorTree};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Default)]
struct Host {
    changes: RefCell<Vec<(Value, ErrorTree, ChangeInfo)>>,
    failures: RefCell<Vec<ErrorTree>>,
    successes: RefCell<Vec<(Value, Value)>>,
    handle: RefCell<Option<SubmitHandle>>,
}

impl Host {
    fn last_change(&self) -> (Value, ErrorTree, ChangeInfo) {
        self.changes.borrow().last().cloned().unwrap()
    }

    /// Feeds the latest reported change back, as a controlling host does.
    fn sync(&self, form: &Form) {
        let (value, error, _) = self.last_change();
        form.update(value, error);
    }
}

impl SubmitHost for Host {
    fn on_validation_failure(&self, errors: &ErrorTree) {
        self.failures.borrow_mut().push(errors.clone());
    }

    fn on_validation_success(&self, values: &Value, compact: &Value) {
        self.successes.borrow_mut().push((values.clone(), compact.clone()));
    }
}

impl FormHost for Host {
    fn on_change(&self, value: Value, error: ErrorTree, info: ChangeInfo) {
        self.changes.borrow_mut().push((value, error, info));
    }

    fn on_submit_function(&self, submit: SubmitHandle) {
        *self.handle.borrow_mut() = Some(submit);
    }
}

fn mount(props: FormProps) -> (Rc<Host>, Form) {
    let host = Rc::new(Host::default());
    let form = Form::mount(props, host.clone());
    (host, form)
}

fn type_in(form: &Form, name: &str, value: Value) {
    let props = Element::input().named(name).resolve(Some(&form.scope()));
    props.on_change.unwrap()(value);
}

// =============================================================================
// Scenarios
// =============================================================================

/// Invalid age blocks submission and leaves the value alone.
#[test]
fn test_invalid_field_blocks_submit() {
    let schema = GroupSchema::new().field("age", SchemaNode::field([required(), integer()]));
    let (host, form) = mount(FormProps::new(schema).with_value(json!({ "age": "x" })));

    let outcome = form.submit().unwrap();
    assert_eq!(outcome.code().map(|code| code.code()), Some("FARAM_SUBMISSION_BLOCKED"));
    assert_eq!(
        host.failures.borrow()[0].to_value(),
        json!({ "age": "Value must be a integer" })
    );
    assert!(host.successes.borrow().is_empty());
    assert!(host.changes.borrow().is_empty());
    assert_eq!(form.value(), json!({ "age": "x" }));
}

/// Editing an input re-derives computed fields before the host sees it.
#[test]
fn test_computed_total_follows_edit() {
    let schema = GroupSchema::new()
        .field("a", SchemaNode::field([integer()]))
        .field("b", SchemaNode::field([integer()]))
        .field("total", SchemaNode::plain());
    let compute = GroupSchema::new().field(
        "total",
        SchemaNode::computed(|chain| {
            let parent = chain[chain.len() - 2];
            let a = parent.get("a").and_then(Value::as_i64).unwrap_or(0);
            let b = parent.get("b").and_then(Value::as_i64).unwrap_or(0);
            json!(a + b)
        }),
    );
    let (host, form) = mount(
        FormProps::new(schema)
            .with_value(json!({ "a": 1, "b": 3 }))
            .with_compute_schema(compute),
    );

    let (mounted, _, info) = host.last_change();
    assert_eq!(mounted, json!({ "a": 1, "b": 3, "total": 4 }));
    assert!(info.computed);
    host.sync(&form);

    type_in(&form, "a", json!(2));
    let (value, error, info) = host.last_change();
    assert_eq!(value, json!({ "a": 2, "b": 3, "total": 5 }));
    assert!(error.is_clean());
    assert_eq!(info.path_string(), "a");
    assert!(!info.computed);
    assert_eq!(host.changes.borrow().len(), 2);

    // Feeding the result back is quiet
    host.sync(&form);
    assert_eq!(host.changes.borrow().len(), 2);
}

/// Removing the first keyed item yields the rest and calls back.
#[test]
fn test_remove_first_list_item() {
    let schema = GroupSchema::new().field(
        "items",
        ListSchema::new(GroupSchema::new().field("key", SchemaNode::field([required()])))
            .key_selector(KeySelector::field("key")),
    );
    let (host, form) = mount(
        FormProps::new(schema).with_value(json!({ "items": [{ "key": "x" }, { "key": "y" }] })),
    );
    let list = form.scope().list("items", KeySelector::field("key"));

    let removed: Rc<RefCell<Vec<(usize, Vec<Value>)>>> = Rc::default();
    let seen = removed.clone();
    let element = Element::action()
        .named("0")
        .with_action(ElementAction::remove_with(move |index, items| {
            seen.borrow_mut().push((index, items.to_vec()));
        }));
    let props = element.resolve(Some(&list));
    props.on_click.unwrap()(Value::Null);

    let (value, error, _) = host.last_change();
    assert_eq!(value, json!({ "items": [{ "key": "y" }] }));
    assert!(error.is_clean());
    assert_eq!(removed.borrow().as_slice(), &[(0, vec![json!({ "key": "y" })])]);
}

/// Nested edits report the full root-to-leaf path and per-key errors.
#[test]
fn test_nested_list_edit_reports_path_and_keyed_error() {
    let schema = GroupSchema::new().field(
        "people",
        ListSchema::new(
            GroupSchema::new()
                .field("id", SchemaNode::plain())
                .field("age", SchemaNode::field([integer()])),
        )
        .key_selector(KeySelector::field("id")),
    );
    let (host, form) = mount(FormProps::new(schema).with_value(json!({
        "people": [{ "id": "p1", "age": 30 }, { "id": "p2", "age": 40 }]
    })));

    let person = form
        .scope()
        .list("people", KeySelector::field("id"))
        .group(1);
    let props = Element::input().named("age").resolve(Some(&person));
    props.on_change.unwrap()(json!("old"));

    let (value, error, info) = host.last_change();
    assert_eq!(value["people"][1]["age"], json!("old"));
    assert_eq!(
        error.to_value(),
        json!({ "people": { "p2": { "age": "Value must be a integer" } } })
    );
    assert_eq!(info.path_string(), "people.1.age");
    assert_eq!(info.value, json!("old"));

    // Error slices follow the keys
    host.sync(&form);
    let people = form.scope().list("people", KeySelector::field("id"));
    let indicator = Element::error_indicator().named("1").resolve(Some(&people));
    assert_eq!(indicator.has_error, Some(true));
    let clean = Element::error_indicator().named("0").resolve(Some(&people));
    assert_eq!(clean.has_error, Some(false));
}

/// Successful submit hands over both value variants.
#[test]
fn test_accepted_submit_variants() {
    let schema = GroupSchema::new()
        .field("name", SchemaNode::field([required()]))
        .field("nickname", SchemaNode::plain())
        .field("tags", ListSchema::new(SchemaNode::plain()));
    let (host, form) = mount(FormProps::new(schema).with_value(json!({
        "name": "Ada",
        "nickname": "",
        "tags": []
    })));

    let handle = host.handle.borrow().clone().unwrap();
    let outcome = handle.submit().unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Accepted {
            values: json!({ "name": "Ada", "nickname": null, "tags": [] }),
            compact: json!({ "name": "Ada" }),
        }
    );
    assert_eq!(host.successes.borrow().len(), 1);
}

/// Debounced submits collapse to the last call and die with the form.
#[test]
fn test_debounced_submit_lifecycle() {
    let schema = GroupSchema::new().field("name", SchemaNode::field([required()]));
    let (host, form) = mount(
        FormProps::new(schema)
            .with_value(json!({ "name": "Ada" }))
            .with_change_delay(Duration::from_millis(200)),
    );
    let start = Instant::now();

    for offset in [0, 50, 100] {
        assert!(form.submit_at(start + Duration::from_millis(offset)).is_none());
    }
    assert_eq!(form.next_deadline(), Some(start + Duration::from_millis(300)));
    assert!(form.poll(start + Duration::from_millis(250)).is_none());
    assert!(form.poll(start + Duration::from_millis(300)).unwrap().is_accepted());
    assert_eq!(host.successes.borrow().len(), 1);

    form.submit_at(start + Duration::from_millis(400));
    form.teardown();
    assert!(form.poll(start + Duration::from_secs(5)).is_none());
    assert_eq!(host.successes.borrow().len(), 1);

    // Leaves are inert after teardown
    type_in(&form, "name", json!("Bob"));
    assert!(host.changes.borrow().is_empty());
}

/// Validation sees untouched fields at submit time.
#[test]
fn test_submit_checks_untouched_fields() {
    let schema = GroupSchema::new()
        .field("first", SchemaNode::field([required()]))
        .field("second", SchemaNode::field([required()]));
    let (host, form) = mount(FormProps::new(schema));

    type_in(&form, "first", json!("filled"));
    host.sync(&form);
    // Only the edited path was validated on change
    assert!(host.last_change().1.is_clean());

    let outcome = form.submit().unwrap();
    match outcome {
        SubmitOutcome::Blocked(errors) => {
            assert_eq!(errors.to_value(), json!({ "second": "Field must not be empty" }))
        }
        other => panic!("expected a blocked submit, got {:?}", other),
    }
}

/// A row handler handed out before its row was removed stays inert.
#[test]
fn test_stale_row_handler_after_remove() {
    let schema = GroupSchema::new().field(
        "l",
        ListSchema::new(GroupSchema::new().field("n", SchemaNode::field([integer()]))),
    );
    let value = json!({ "l": [{ "n": 1 }, { "n": 2 }] });
    let (host, form) = mount(FormProps::new(schema).with_value(value));
    let list = form.scope().list("l", KeySelector::Index);
    let row = list.group(1);
    let stale = Element::input().named("n").resolve(Some(&row)).on_change.unwrap();

    assert!(list.remove(1, |_, _| {}));
    assert_eq!(host.last_change().0, json!({ "l": [{ "n": 1 }] }));
    host.sync(&form);

    stale(json!(9));
    assert_eq!(host.changes.borrow().len(), 1);
    assert_eq!(form.value(), json!({ "l": [{ "n": 1 }] }));
}
