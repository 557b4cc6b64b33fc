//! Root controller
//!
//! `Form` binds the root Group scope to host-owned props. The value and
//! error trees are controlled: the form never keeps an edited value, it
//! derives, re-validates and hands the result to `FormHost::on_change`,
//! and the host feeds it back through `update`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};

use super::config::FormConfig;
use super::debounce::Debouncer;
use super::submit::{deliver, finish, validate_submission, SubmitHost, SubmitOutcome};
use crate::accumulator::accumulate_differential_errors;
use crate::computer::{compute_outputs, compute_outputs_with_report};
use crate::observability::{log_event, Event, ObservationScope};
use crate::schema::SchemaNode;
use crate::scope::{GroupScope, ScopeSettings, ScopeSource};
use crate::tree::{ChangeInfo, ErrorTree};

/// Callbacks of a mounted form.
pub trait FormHost: SubmitHost {
    /// A new value and error tree. `info.computed` is set when the change
    /// came from re-deriving computed fields rather than from a leaf.
    fn on_change(&self, value: Value, error: ErrorTree, info: ChangeInfo);

    /// Called once on mount with a handle that can trigger submit.
    fn on_submit_function(&self, _submit: SubmitHandle) {}
}

/// Everything the host controls.
#[derive(Debug, Clone)]
pub struct FormProps {
    pub value: Value,
    pub error: ErrorTree,
    pub schema: Arc<SchemaNode>,
    pub compute_schema: Option<Arc<SchemaNode>>,
    pub disabled: bool,
    pub read_only: bool,
    pub change_delay: Duration,
}

impl FormProps {
    pub fn new(schema: impl Into<SchemaNode>) -> Self {
        Self {
            value: Value::Object(Map::new()),
            error: ErrorTree::Clean,
            schema: Arc::new(schema.into()),
            compute_schema: None,
            disabled: false,
            read_only: false,
            change_delay: Duration::ZERO,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    pub fn with_error(mut self, error: ErrorTree) -> Self {
        self.error = error;
        self
    }

    pub fn with_compute_schema(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.compute_schema = Some(Arc::new(schema.into()));
        self
    }

    pub fn with_change_delay(mut self, delay: Duration) -> Self {
        self.change_delay = delay;
        self
    }

    pub fn with_config(mut self, config: &FormConfig) -> Self {
        self.disabled = config.disabled;
        self.read_only = config.read_only;
        self.change_delay = config.change_delay();
        self
    }

    fn settings(&self) -> ScopeSettings {
        ScopeSettings {
            disabled: self.disabled,
            read_only: self.read_only,
            change_delay: self.change_delay,
        }
    }
}

/// Timers the root owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormTimer {
    Submit,
}

pub struct Form {
    inner: Rc<FormInner>,
}

struct FormInner {
    props: RefCell<FormProps>,
    host: Rc<dyn FormHost>,
    /// Last value derivation ran on (or produced)
    last_input: RefCell<Option<Value>>,
    timers: RefCell<Debouncer<FormTimer>>,
    scope: RefCell<Option<GroupScope>>,
    torn_down: Cell<bool>,
}

impl Form {
    /// Mounts the form: hands out the submit handle, then derives computed
    /// fields once.
    pub fn mount(props: FormProps, host: Rc<dyn FormHost>) -> Self {
        let root = props.schema.type_name();
        let inner = Rc::new(FormInner {
            props: RefCell::new(props),
            host,
            last_input: RefCell::new(None),
            timers: RefCell::new(Debouncer::new()),
            scope: RefCell::new(None),
            torn_down: Cell::new(false),
        });
        log_event(Event::FormMounted, &[("root", root)]);

        let handle = SubmitHandle {
            form: Rc::downgrade(&inner),
        };
        inner.host.on_submit_function(handle);
        inner.refresh();
        Form { inner }
    }

    pub fn props(&self) -> FormProps {
        self.inner.props.borrow().clone()
    }

    pub fn value(&self) -> Value {
        self.inner.current_value()
    }

    pub fn error(&self) -> ErrorTree {
        self.inner.current_error()
    }

    /// Replaces every prop. Derivation reruns even for an unchanged value,
    /// since the schemas may have changed.
    pub fn set_props(&self, props: FormProps) {
        *self.inner.props.borrow_mut() = props;
        *self.inner.last_input.borrow_mut() = None;
        self.inner.refresh();
    }

    /// Feeds back the value and error trees, typically those received in
    /// `on_change`.
    pub fn update(&self, value: Value, error: ErrorTree) {
        {
            let mut props = self.inner.props.borrow_mut();
            props.value = value;
            props.error = error;
        }
        self.inner.refresh();
    }

    /// The root Group scope. Always the same scope for a given form.
    pub fn scope(&self) -> GroupScope {
        if let Some(scope) = self.inner.scope.borrow().as_ref() {
            return scope.clone();
        }
        let source = RootSource {
            form: Rc::downgrade(&self.inner),
        };
        let scope = GroupScope::new(Rc::new(source));
        *self.inner.scope.borrow_mut() = Some(scope.clone());
        scope
    }

    pub fn submit_handle(&self) -> SubmitHandle {
        SubmitHandle {
            form: Rc::downgrade(&self.inner),
        }
    }

    /// Requests a submit now; see `submit_at`.
    pub fn submit(&self) -> Option<SubmitOutcome> {
        self.inner.submit_at(Instant::now())
    }

    /// Requests a submit at `now`. With no change delay it runs
    /// immediately and the outcome is returned; otherwise it is scheduled
    /// for `now + change_delay`, replacing any pending submit.
    pub fn submit_at(&self, now: Instant) -> Option<SubmitOutcome> {
        self.inner.submit_at(now)
    }

    /// Runs the pending submit if it is due at `now`.
    pub fn poll(&self, now: Instant) -> Option<SubmitOutcome> {
        self.inner.poll(now)
    }

    /// Runs the pending submit, if any, without waiting for its deadline.
    pub fn flush(&self) -> Option<SubmitOutcome> {
        if self.inner.torn_down.get()
            || !self.inner.timers.borrow_mut().cancel(&FormTimer::Submit)
        {
            return None;
        }
        Some(self.inner.fire_submit())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.timers.borrow().next_deadline()
    }

    pub fn is_submit_pending(&self) -> bool {
        self.inner.timers.borrow().is_pending(&FormTimer::Submit)
    }

    /// Cancels pending timers. Later submits, polls and leaf changes do
    /// nothing.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }
}

impl Drop for Form {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl FormInner {
    fn current_value(&self) -> Value {
        self.props.borrow().value.clone()
    }

    fn current_error(&self) -> ErrorTree {
        self.props.borrow().error.clone()
    }

    fn settings(&self) -> ScopeSettings {
        self.props.borrow().settings()
    }

    fn schemas(&self) -> (Arc<SchemaNode>, Option<Arc<SchemaNode>>) {
        let props = self.props.borrow();
        (props.schema.clone(), props.compute_schema.clone())
    }

    /// Re-derives computed fields when the value differs from the last
    /// one seen, reporting a change only if derivation altered it.
    fn refresh(&self) {
        if self.torn_down.get() {
            return;
        }
        let value = self.current_value();
        {
            let mut last = self.last_input.borrow_mut();
            if last.as_ref() == Some(&value) {
                return;
            }
            *last = Some(value.clone());
        }

        let (schema, compute_schema) = self.schemas();
        let Some(compute_schema) = compute_schema else {
            return;
        };
        let report = compute_outputs_with_report(&value, &compute_schema);
        if !report.changed {
            return;
        }

        *self.last_input.borrow_mut() = Some(report.value.clone());
        let error =
            accumulate_differential_errors(&value, &report.value, &self.current_error(), &schema);
        self.host.on_change(report.value, error, ChangeInfo::computed());
    }

    /// A change bubbled up from the root scope.
    fn handle_change(&self, value: Value, info: ChangeInfo) {
        if self.torn_down.get() {
            return;
        }
        let (schema, compute_schema) = self.schemas();
        let value = match compute_schema {
            Some(compute_schema) => compute_outputs(&value, &compute_schema),
            None => value,
        };
        let error = accumulate_differential_errors(
            &self.current_value(),
            &value,
            &self.current_error(),
            &schema,
        );

        *self.last_input.borrow_mut() = Some(value.clone());
        self.host.on_change(value, error, info);
    }

    fn submit_at(&self, now: Instant) -> Option<SubmitOutcome> {
        if self.torn_down.get() {
            return None;
        }
        let delay = self.props.borrow().change_delay;
        if delay.is_zero() {
            self.timers.borrow_mut().cancel(&FormTimer::Submit);
            return Some(self.fire_submit());
        }

        let replaced = self.timers.borrow_mut().schedule(FormTimer::Submit, now + delay);
        if replaced {
            log_event(Event::SubmitSuperseded, &[]);
        }
        log_event(
            Event::SubmitScheduled,
            &[("delay_ms", &delay.as_millis().to_string())],
        );
        None
    }

    fn poll(&self, now: Instant) -> Option<SubmitOutcome> {
        if self.torn_down.get() {
            return None;
        }
        let due = self.timers.borrow_mut().take_due(now);
        due.contains(&FormTimer::Submit).then(|| self.fire_submit())
    }

    /// Full validation of the current value, whatever changed last.
    fn fire_submit(&self) -> SubmitOutcome {
        let scope = ObservationScope::with_fields("SUBMIT", &[("mode", "mounted")]);
        let value = self.current_value();
        let (schema, _) = self.schemas();
        let outcome = validate_submission(&value, &schema);
        deliver(&outcome, self.host.as_ref());
        finish(scope, &outcome);
        outcome
    }

    fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        let cancelled = self.timers.borrow_mut().cancel_all();
        log_event(
            Event::FormTeardown,
            &[("cancelled_timers", &cancelled.to_string())],
        );
    }
}

/// Source of the root scope: the form's props.
struct RootSource {
    form: Weak<FormInner>,
}

impl ScopeSource for RootSource {
    fn value(&self) -> Value {
        self.form
            .upgrade()
            .map(|form| form.current_value())
            .unwrap_or(Value::Null)
    }

    fn error(&self) -> ErrorTree {
        self.form
            .upgrade()
            .map(|form| form.current_error())
            .unwrap_or_default()
    }

    fn settings(&self) -> ScopeSettings {
        self.form
            .upgrade()
            .map(|form| form.settings())
            .unwrap_or_default()
    }

    fn commit(&self, value: Value, info: ChangeInfo) {
        if let Some(form) = self.form.upgrade() {
            form.handle_change(value, info);
        }
    }
}

/// Triggers submit on a form the holder does not own.
#[derive(Clone)]
pub struct SubmitHandle {
    form: Weak<FormInner>,
}

impl SubmitHandle {
    pub fn submit(&self) -> Option<SubmitOutcome> {
        self.submit_at(Instant::now())
    }

    pub fn submit_at(&self, now: Instant) -> Option<SubmitOutcome> {
        self.form.upgrade()?.submit_at(now)
    }

    /// False once the form is dropped or torn down.
    pub fn is_live(&self) -> bool {
        self.form
            .upgrade()
            .map_or(false, |form| !form.torn_down.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{integer, required};
    use crate::dispatch::Element;
    use crate::observability::Logger;
    use crate::schema::GroupSchema;
    use serde_json::json;

    #[derive(Default)]
    struct Host {
        changes: RefCell<Vec<(Value, ErrorTree, ChangeInfo)>>,
        failures: RefCell<Vec<ErrorTree>>,
        successes: RefCell<Vec<(Value, Value)>>,
        handle: RefCell<Option<SubmitHandle>>,
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

    fn schema() -> SchemaNode {
        GroupSchema::new()
            .field("a", SchemaNode::field([required(), integer()]))
            .field("b", SchemaNode::field([integer()]))
            .into()
    }

    fn sum() -> SchemaNode {
        GroupSchema::new()
            .field(
                "total",
                SchemaNode::computed(|chain| {
                    let parent = chain[chain.len() - 2];
                    let a = parent.get("a").and_then(Value::as_i64).unwrap_or(0);
                    let b = parent.get("b").and_then(Value::as_i64).unwrap_or(0);
                    json!(a + b)
                }),
            )
            .into()
    }

    fn mount(props: FormProps) -> (Rc<Host>, Form) {
        let host = Rc::new(Host::default());
        let form = Form::mount(props, host.clone());
        (host, form)
    }

    #[test]
    fn test_mount_derives_and_reports_computed_change() {
        let (host, form) = mount(
            FormProps::new(schema())
                .with_value(json!({ "a": 1, "b": 2 }))
                .with_compute_schema(sum()),
        );
        let changes = host.changes.borrow();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, json!({ "a": 1, "b": 2, "total": 3 }));
        assert!(changes[0].2.computed);
        assert!(host.handle.borrow().is_some());

        // Feeding the derived value back does not fire again
        drop(changes);
        form.update(json!({ "a": 1, "b": 2, "total": 3 }), ErrorTree::Clean);
        assert_eq!(host.changes.borrow().len(), 1);
    }

    #[test]
    fn test_leaf_change_reaches_host_with_errors_and_path() {
        let (host, form) = mount(FormProps::new(schema()).with_value(json!({ "a": 1, "b": 2 })));
        let props = Element::input().named("b").resolve(Some(&form.scope()));
        props.on_change.unwrap()(json!("x"));

        let changes = host.changes.borrow();
        let (value, error, info) = &changes[0];
        assert_eq!(value, &json!({ "a": 1, "b": "x" }));
        assert_eq!(error.to_value(), json!({ "b": "Value must be a integer" }));
        assert_eq!(info.path_string(), "b");
        assert!(!info.computed);
        // Controlled: the form still holds the old value
        assert_eq!(form.value(), json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_submit_without_delay_runs_immediately() {
        let (host, form) = mount(FormProps::new(schema()).with_value(json!({ "a": "x" })));
        let outcome = form.submit().unwrap();
        assert!(!outcome.is_accepted());
        assert_eq!(
            host.failures.borrow()[0].to_value(),
            json!({ "a": "Value must be a integer" })
        );
        assert_eq!(form.value(), json!({ "a": "x" }));
    }

    #[test]
    fn test_debounced_submit_last_call_wins() {
        let (host, form) = mount(
            FormProps::new(schema())
                .with_value(json!({ "a": 1 }))
                .with_change_delay(Duration::from_millis(100)),
        );
        let start = Instant::now();
        assert!(form.submit_at(start).is_none());
        assert!(form.submit_at(start + Duration::from_millis(50)).is_none());

        assert!(form.poll(start + Duration::from_millis(120)).is_none());
        assert!(form.is_submit_pending());
        let outcome = form.poll(start + Duration::from_millis(150)).unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(host.successes.borrow().len(), 1);
        assert!(!form.is_submit_pending());
    }

    #[test]
    fn test_submit_handle_and_flush() {
        let (host, form) = mount(
            FormProps::new(schema())
                .with_value(json!({ "a": 4, "b": "" }))
                .with_change_delay(Duration::from_millis(500)),
        );
        let handle = host.handle.borrow().clone().unwrap();
        assert!(handle.submit().is_none());
        let outcome = form.flush().unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                values: json!({ "a": 4, "b": null }),
                compact: json!({ "a": 4 }),
            }
        );
        assert!(form.flush().is_none());
    }

    #[test]
    fn test_teardown_cancels_pending_submit() {
        let (host, form) = mount(
            FormProps::new(schema())
                .with_value(json!({ "a": 1 }))
                .with_change_delay(Duration::from_millis(100)),
        );
        let start = Instant::now();
        form.submit_at(start);
        let (_, lines) = Logger::capture(|| form.teardown());
        assert!(lines.iter().any(|line| line.contains("FORM_TEARDOWN") && line.contains("\"1\"")));

        assert!(form.poll(start + Duration::from_secs(1)).is_none());
        assert!(host.successes.borrow().is_empty());
        assert!(!host.handle.borrow().as_ref().unwrap().is_live());
    }

    #[test]
    fn test_drop_tears_down() {
        let (host, form) = mount(FormProps::new(schema()));
        let handle = host.handle.borrow().clone().unwrap();
        drop(form);
        assert!(!handle.is_live());
        assert!(handle.submit().is_none());
    }

    #[test]
    fn test_settings_reach_leaves() {
        let config = FormConfig {
            disabled: true,
            read_only: false,
            change_delay_ms: 40,
        };
        let (_host, form) = mount(FormProps::new(schema()).with_config(&config));
        let props = Element::input().named("a").resolve(Some(&form.scope()));
        assert_eq!(props.disabled, Some(true));
        assert_eq!(props.change_delay, Some(Duration::from_millis(40)));
    }
}
