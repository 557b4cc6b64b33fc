//! Leaf wrapper
//!
//! An `Element` is a leaf declared with a kind, optionally bound to a
//! position by name, info or action. Resolving it against a scope yields
//! the props to render. Unbound elements, and elements resolved without
//! a scope, keep exactly the props they were given.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use super::kind::ElementKind;
use super::props::ElementProps;
use super::table::{ElementRequest, Scope};
use crate::observability::log_event;

/// `(current slice, element name, click params) -> new slice`
pub type Reducer = Rc<dyn Fn(&Value, &str, &Value) -> Value>;

/// Called after an add with `(new element, new array)`.
pub type AddCallback = Rc<dyn Fn(&Value, &[Value])>;

/// Called after a remove with `(removed index, new array)`.
pub type RemoveCallback = Rc<dyn Fn(usize, &[Value])>;

/// Element appended by an add action.
#[derive(Clone)]
pub enum NewElement {
    Value(Value),
    /// Built from the current array
    Factory(Rc<dyn Fn(&[Value]) -> Value>),
}

impl NewElement {
    pub fn factory(build: impl Fn(&[Value]) -> Value + 'static) -> Self {
        NewElement::Factory(Rc::new(build))
    }

    pub fn resolve(&self, items: &[Value]) -> Value {
        match self {
            NewElement::Value(value) => value.clone(),
            NewElement::Factory(build) => build(items),
        }
    }
}

impl From<Value> for NewElement {
    fn from(value: Value) -> Self {
        NewElement::Value(value)
    }
}

/// Behavior an action leaf triggers on click.
#[derive(Clone)]
pub enum ElementAction {
    /// Append to the enclosing list
    Add {
        element: NewElement,
        callback: Option<AddCallback>,
    },
    /// Remove the list item the element is named after
    Remove { callback: Option<RemoveCallback> },
    /// Replace the enclosing slice with the reducer's output
    Reduce(Reducer),
}

impl ElementAction {
    pub fn add(element: impl Into<NewElement>) -> Self {
        ElementAction::Add {
            element: element.into(),
            callback: None,
        }
    }

    pub fn add_with(
        element: impl Into<NewElement>,
        callback: impl Fn(&Value, &[Value]) + 'static,
    ) -> Self {
        ElementAction::Add {
            element: element.into(),
            callback: Some(Rc::new(callback)),
        }
    }

    pub fn remove() -> Self {
        ElementAction::Remove { callback: None }
    }

    pub fn remove_with(callback: impl Fn(usize, &[Value]) + 'static) -> Self {
        ElementAction::Remove {
            callback: Some(Rc::new(callback)),
        }
    }

    pub fn reduce(reducer: impl Fn(&Value, &str, &Value) -> Value + 'static) -> Self {
        ElementAction::Reduce(Rc::new(reducer))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementAction::Add { .. } => "add",
            ElementAction::Remove { .. } => "remove",
            ElementAction::Reduce(_) => "reduce",
        }
    }
}

impl fmt::Debug for ElementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A leaf declared with its kind.
#[derive(Clone)]
pub struct Element {
    kind: ElementKind,
    name: Option<String>,
    info: Option<Value>,
    action: Option<ElementAction>,
    attached: bool,
    props: ElementProps,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            name: None,
            info: None,
            action: None,
            attached: false,
            props: ElementProps::default(),
        }
    }

    pub fn input() -> Self {
        Self::new(ElementKind::Input)
    }

    pub fn output() -> Self {
        Self::new(ElementKind::Output)
    }

    pub fn action() -> Self {
        Self::new(ElementKind::Action)
    }

    pub fn list() -> Self {
        Self::new(ElementKind::List).attached()
    }

    pub fn sortable_list() -> Self {
        Self::new(ElementKind::SortableList).attached()
    }

    pub fn error_message() -> Self {
        Self::new(ElementKind::ErrorMessage)
    }

    pub fn error_indicator() -> Self {
        Self::new(ElementKind::ErrorIndicator)
    }

    /// Binds the element to the child slice called `name`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = Some(info);
        self
    }

    pub fn with_action(mut self, action: ElementAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Asks for injection without a name; the scope serves its own slice.
    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }

    /// Props set on the leaf itself; they win over injected ones.
    pub fn with_props(mut self, props: ElementProps) -> Self {
        self.props = props;
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.attached || self.name.is_some() || self.info.is_some() || self.action.is_some()
    }

    pub fn request(&self) -> ElementRequest<'_> {
        ElementRequest {
            name: self.name.as_deref(),
            info: self.info.as_ref(),
            action: self.action.as_ref(),
        }
    }

    /// Props to render with.
    pub fn resolve(&self, scope: Option<&dyn Scope>) -> ElementProps {
        let scope = match scope {
            Some(scope) if self.is_bound() => scope,
            _ => return self.props.clone(),
        };

        match scope.dispatch(self.kind, &self.request()) {
            Ok(injected) => ElementProps::merge(injected, self.props.clone()),
            Err(err) => {
                log_event(
                    err.event(),
                    &[
                        ("kind", self.kind.as_str()),
                        ("name", self.name().unwrap_or("")),
                        ("code", err.code().code()),
                        ("reason", &err.to_string()),
                    ],
                );
                self.props.clone()
            }
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("action", &self.action)
            .finish()
    }
}
