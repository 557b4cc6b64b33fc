//! Group scope: serves the named children of an object slice

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use serde_json::Value;

use super::handlers::{
    action_props, error_indicator_props, error_message_props, input_props, output_props,
};
use super::list::ListScope;
use super::source::{ScopeSettings, ScopeSource};
use crate::dispatch::{
    ChangeHandler, ClickHandler, DispatchError, DispatchResult, ElementAction, ElementKind,
    ElementProps, ElementRequest, HandlerTable, Reducer, Scope,
};
use crate::schema::KeySelector;
use crate::tree::{with_child, ChangeInfo, ErrorTree, PathKey};

static GROUP_HANDLERS: OnceLock<HandlerTable<GroupScope>> = OnceLock::new();

fn handlers() -> &'static HandlerTable<GroupScope> {
    GROUP_HANDLERS.get_or_init(|| {
        HandlerTable::new("group")
            .register(ElementKind::Input, input)
            .register(ElementKind::Output, output)
            .register(ElementKind::Action, action)
            .register(ElementKind::ErrorMessage, error_message)
            .register(ElementKind::ErrorIndicator, error_indicator)
    })
}

/// Scope over an object slice.
///
/// Cloning shares the scope. Handlers and nested scopes are created once
/// per element name and read the source on every call.
#[derive(Clone)]
pub struct GroupScope {
    inner: Rc<GroupInner>,
}

struct GroupInner {
    source: Rc<dyn ScopeSource>,
    change_handlers: RefCell<HashMap<String, ChangeHandler>>,
    click_handlers: RefCell<HashMap<String, ClickHandler>>,
    reducers: RefCell<HashMap<String, Reducer>>,
    groups: RefCell<HashMap<String, GroupScope>>,
    lists: RefCell<HashMap<String, ListScope>>,
}

impl GroupScope {
    /// Scope over whatever slice `source` reads and commits.
    pub fn new(source: Rc<dyn ScopeSource>) -> Self {
        Self {
            inner: Rc::new(GroupInner {
                source,
                change_handlers: RefCell::new(HashMap::new()),
                click_handlers: RefCell::new(HashMap::new()),
                reducers: RefCell::new(HashMap::new()),
                groups: RefCell::new(HashMap::new()),
                lists: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// The slice as the source holds it right now.
    pub fn value(&self) -> Value {
        self.inner.source.value()
    }

    /// Error subtree for the slice; `Clean` when it has none.
    pub fn error(&self) -> ErrorTree {
        self.inner.source.error()
    }

    /// Flags inherited from the root.
    pub fn settings(&self) -> ScopeSettings {
        self.inner.source.settings()
    }

    /// Value under `name`, `null` when the slice is not an object or lacks it.
    pub fn field_value(&self, name: &str) -> Value {
        self.value().get(name).cloned().unwrap_or(Value::Null)
    }

    /// Error subtree under `name`.
    pub fn field_error(&self, name: &str) -> ErrorTree {
        self.error().child(name).clone()
    }

    /// Merges `{name: value}` into the slice and bubbles the change up
    /// with `name` prepended to its path.
    pub fn change_field(&self, name: &str, value: Value, info: ChangeInfo) {
        let key = PathKey::from(name);
        let merged = with_child(&self.value(), &key, value);
        self.inner.source.commit(merged, info.prepend(key));
    }

    /// Replaces the whole slice.
    pub fn replace(&self, value: Value) {
        let info = ChangeInfo::leaf(value.clone());
        self.inner.source.commit(value, info);
    }

    /// Change handler for the field `name`; the same handler is returned
    /// for as long as the scope lives.
    pub fn on_change(&self, name: &str) -> ChangeHandler {
        if let Some(handler) = self.inner.change_handlers.borrow().get(name) {
            return handler.clone();
        }

        let weak = Rc::downgrade(&self.inner);
        let field = name.to_string();
        let handler: ChangeHandler = Rc::new(move |value: Value| {
            if let Some(scope) = upgrade(&weak) {
                let info = ChangeInfo::leaf(value.clone());
                scope.change_field(&field, value, info);
            }
        });
        self.inner
            .change_handlers
            .borrow_mut()
            .insert(name.to_string(), handler.clone());
        handler
    }

    /// Click handler running the reducer registered under `name`.
    ///
    /// The reducer is swapped on every call while the handler stays the same.
    pub fn on_click(&self, name: &str, reducer: Reducer) -> ClickHandler {
        self.inner.reducers.borrow_mut().insert(name.to_string(), reducer);
        if let Some(handler) = self.inner.click_handlers.borrow().get(name) {
            return handler.clone();
        }

        let weak = Rc::downgrade(&self.inner);
        let element = name.to_string();
        let handler: ClickHandler = Rc::new(move |params: Value| {
            let Some(scope) = upgrade(&weak) else { return };
            let reducer = scope.inner.reducers.borrow().get(&element).cloned();
            if let Some(reduce) = reducer {
                let next = reduce(&scope.value(), &element, &params);
                scope.replace(next);
            }
        });
        self.inner
            .click_handlers
            .borrow_mut()
            .insert(name.to_string(), handler.clone());
        handler
    }

    /// Scope over the object under `name`.
    pub fn group(&self, name: &str) -> GroupScope {
        if let Some(scope) = self.inner.groups.borrow().get(name) {
            return scope.clone();
        }
        let scope = GroupScope::new(Rc::new(FieldSource::new(&self.inner, name)));
        self.inner.groups.borrow_mut().insert(name.to_string(), scope.clone());
        scope
    }

    /// Scope over the array under `name`, keyed by `keys`.
    pub fn list(&self, name: &str, keys: KeySelector) -> ListScope {
        if let Some(scope) = self.inner.lists.borrow().get(name) {
            scope.set_key_selector(keys);
            return scope.clone();
        }
        let scope = ListScope::new(Rc::new(FieldSource::new(&self.inner, name)), keys);
        self.inner.lists.borrow_mut().insert(name.to_string(), scope.clone());
        scope
    }

    /// Element kinds a Group scope dispatches.
    pub fn kinds() -> Vec<ElementKind> {
        handlers().kinds()
    }
}

impl Scope for GroupScope {
    fn dispatch(
        &self,
        kind: ElementKind,
        request: &ElementRequest<'_>,
    ) -> DispatchResult<ElementProps> {
        handlers().dispatch(self, kind, request)
    }
}

fn upgrade(weak: &Weak<GroupInner>) -> Option<GroupScope> {
    weak.upgrade().map(|inner| GroupScope { inner })
}

fn input(scope: &GroupScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let name = request.require_name(ElementKind::Input)?;
    Ok(input_props(
        scope.field_value(name),
        scope.field_error(name),
        scope.on_change(name),
        scope.settings(),
    ))
}

fn output(scope: &GroupScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let name = request.require_name(ElementKind::Output)?;
    Ok(output_props(scope.field_value(name)))
}

fn action(scope: &GroupScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let name = request.require_name(ElementKind::Action)?;
    match request.action {
        Some(ElementAction::Reduce(reducer)) => Ok(action_props(
            scope.on_click(name, reducer.clone()),
            scope.settings(),
        )),
        Some(other) => Err(DispatchError::UnsupportedAction {
            scope: handlers().scope_name(),
            action: other.name(),
        }),
        None => Err(DispatchError::MissingAction {
            name: name.to_string(),
        }),
    }
}

/// Named: the child's `$internal`; unnamed: the group's own.
fn error_message(scope: &GroupScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let errors = match request.name {
        Some(name) => scope.field_error(name),
        None => scope.error(),
    };
    Ok(error_message_props(&errors))
}

fn error_indicator(
    scope: &GroupScope,
    request: &ElementRequest<'_>,
) -> DispatchResult<ElementProps> {
    let errors = match request.name {
        Some(name) => scope.field_error(name),
        None => scope.error(),
    };
    Ok(error_indicator_props(&errors))
}

/// Source for a child scope bound to one field of a parent group.
struct FieldSource {
    parent: Weak<GroupInner>,
    name: String,
}

impl FieldSource {
    fn new(parent: &Rc<GroupInner>, name: &str) -> Self {
        Self {
            parent: Rc::downgrade(parent),
            name: name.to_string(),
        }
    }

    fn parent(&self) -> Option<GroupScope> {
        upgrade(&self.parent)
    }
}

impl ScopeSource for FieldSource {
    fn value(&self) -> Value {
        self.parent()
            .map(|parent| parent.field_value(&self.name))
            .unwrap_or(Value::Null)
    }

    fn error(&self) -> ErrorTree {
        self.parent()
            .map(|parent| parent.field_error(&self.name))
            .unwrap_or_default()
    }

    fn settings(&self) -> ScopeSettings {
        self.parent()
            .map(|parent| parent.settings())
            .unwrap_or_default()
    }

    fn commit(&self, value: Value, info: ChangeInfo) {
        if let Some(parent) = self.parent() {
            parent.change_field(&self.name, value, info);
        }
    }
}
