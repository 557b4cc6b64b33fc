//! List scope: serves the items of an array slice
//!
//! Item errors are looked up by the key selector, not by position, so an
//! error stays with its item when rows are inserted or reordered.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::OnceLock;

use serde_json::Value;

use super::group::GroupScope;
use super::handlers::{
    action_props, error_indicator_props, error_message_props, input_props, output_props,
    parse_index,
};
use super::source::{ScopeSettings, ScopeSource};
use crate::dispatch::{
    ChangeHandler, ClickHandler, DispatchError, DispatchResult, ElementAction, ElementKind,
    ElementProps, ElementRequest, HandlerTable, NewElement, Scope,
};
use crate::observability::{log_event, Event};
use crate::schema::KeySelector;
use crate::tree::{with_child, ChangeInfo, ErrorTree, PathKey};

static LIST_HANDLERS: OnceLock<HandlerTable<ListScope>> = OnceLock::new();

fn handlers() -> &'static HandlerTable<ListScope> {
    LIST_HANDLERS.get_or_init(|| {
        HandlerTable::new("list")
            .register(ElementKind::Input, input)
            .register(ElementKind::Output, output)
            .register(ElementKind::Action, action)
            .register(ElementKind::List, list)
            .register(ElementKind::SortableList, sortable_list)
            .register(ElementKind::ErrorMessage, error_message)
            .register(ElementKind::ErrorIndicator, error_indicator)
    })
}

/// Scope over an array slice.
#[derive(Clone)]
pub struct ListScope {
    inner: Rc<ListInner>,
}

struct ListInner {
    source: Rc<dyn ScopeSource>,
    keys: RefCell<KeySelector>,
    change_handlers: RefCell<HashMap<usize, ChangeHandler>>,
    reorder_handler: RefCell<Option<ChangeHandler>>,
    click_handlers: RefCell<HashMap<String, ClickHandler>>,
    actions: RefCell<HashMap<String, ElementAction>>,
    groups: RefCell<HashMap<usize, GroupScope>>,
    lists: RefCell<HashMap<usize, ListScope>>,
}

impl ListScope {
    /// Scope over the array `source` reads; rows are keyed in the error
    /// tree by `keys`.
    pub fn new(source: Rc<dyn ScopeSource>, keys: KeySelector) -> Self {
        Self {
            inner: Rc::new(ListInner {
                source,
                keys: RefCell::new(keys),
                change_handlers: RefCell::new(HashMap::new()),
                reorder_handler: RefCell::new(None),
                click_handlers: RefCell::new(HashMap::new()),
                actions: RefCell::new(HashMap::new()),
                groups: RefCell::new(HashMap::new()),
                lists: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Current items; a missing or non-array slice reads as empty.
    pub fn items(&self) -> Vec<Value> {
        match self.inner.source.value() {
            Value::Array(items) => items,
            _ => Vec::new(),
        }
    }

    /// Error subtree for the array. Rows live under their keys, list-level
    /// messages under `$internal`.
    pub fn error(&self) -> ErrorTree {
        self.inner.source.error()
    }

    /// Flags inherited from the root.
    pub fn settings(&self) -> ScopeSettings {
        self.inner.source.settings()
    }

    /// Selector used to key rows in the error tree.
    pub fn key_selector(&self) -> KeySelector {
        self.inner.keys.borrow().clone()
    }

    /// Swaps the selector. Cached handlers stay valid since they address rows
    /// by index.
    pub fn set_key_selector(&self, keys: KeySelector) {
        *self.inner.keys.borrow_mut() = keys;
    }

    /// Error-tree key of the row at `index`, `None` past the end.
    pub fn item_key(&self, index: usize) -> Option<String> {
        let items = self.items();
        let keys = self.inner.keys.borrow();
        items.get(index).map(|item| keys.key(item, index))
    }

    /// Row at `index`, `null` past the end.
    pub fn item_value(&self, index: usize) -> Value {
        self.items().into_iter().nth(index).unwrap_or(Value::Null)
    }

    /// Error subtree of the row at `index`, looked up by its key.
    pub fn item_error(&self, index: usize) -> ErrorTree {
        match self.item_key(index) {
            Some(key) => self.error().child(&key).clone(),
            None => ErrorTree::Clean,
        }
    }

    /// Replaces the item at `index` and bubbles the change up with the
    /// index prepended to its path.
    ///
    /// An index past the end (a row removed since the handler was handed
    /// out) is refused and logged; returns whether the change was committed.
    pub fn change_item(&self, index: usize, value: Value, info: ChangeInfo) -> bool {
        let items = self.items();
        if index >= items.len() {
            reject_index(index, items.len());
            return false;
        }
        let key = PathKey::Index(index);
        let merged = with_child(&Value::Array(items), &key, value);
        self.inner.source.commit(merged, info.prepend(key));
        true
    }

    /// Appends an element and calls `callback(new_element, new_items)`.
    pub fn add(&self, element: &NewElement, callback: impl FnOnce(&Value, &[Value])) -> Value {
        let mut items = self.items();
        let added = element.resolve(&items);
        items.push(added.clone());

        let info = ChangeInfo::leaf(added.clone()).prepend(PathKey::Index(items.len() - 1));
        self.inner.source.commit(Value::Array(items.clone()), info);
        self.inner.prune(items.len());
        callback(&added, &items);
        added
    }

    /// Removes the item at `index` and calls `callback(index, new_items)`.
    ///
    /// Returns false, without committing, when `index` is out of range.
    pub fn remove(&self, index: usize, callback: impl FnOnce(usize, &[Value])) -> bool {
        let mut items = self.items();
        if index >= items.len() {
            reject_index(index, items.len());
            return false;
        }
        items.remove(index);

        let info = ChangeInfo::leaf(Value::Null).prepend(PathKey::Index(index));
        self.inner.source.commit(Value::Array(items.clone()), info);
        self.inner.prune(items.len());
        callback(index, &items);
        true
    }

    /// Replaces the whole array. Membership or order changed, not a leaf,
    /// so `info` is passed through as is.
    pub fn change(&self, items: Vec<Value>, info: ChangeInfo) {
        let len = items.len();
        self.inner.source.commit(Value::Array(items), info);
        self.inner.prune(len);
    }

    /// Memoized handler replacing the row at `index`. Once the row is gone
    /// the handler is refused like any out-of-range `change_item`.
    pub fn on_change(&self, index: usize) -> ChangeHandler {
        if let Some(handler) = self.inner.change_handlers.borrow().get(&index) {
            return handler.clone();
        }

        let weak = Rc::downgrade(&self.inner);
        let handler: ChangeHandler = Rc::new(move |value: Value| {
            if let Some(scope) = upgrade(&weak) {
                let info = ChangeInfo::leaf(value.clone());
                scope.change_item(index, value, info);
            }
        });
        self.inner.change_handlers.borrow_mut().insert(index, handler.clone());
        handler
    }

    /// Handler taking a whole reordered array.
    pub fn on_reorder(&self) -> ChangeHandler {
        if let Some(handler) = self.inner.reorder_handler.borrow().as_ref() {
            return handler.clone();
        }

        let weak = Rc::downgrade(&self.inner);
        let handler: ChangeHandler = Rc::new(move |value: Value| {
            let Some(scope) = upgrade(&weak) else { return };
            let items = match &value {
                Value::Array(items) => items.clone(),
                _ => Vec::new(),
            };
            scope.change(items, ChangeInfo::leaf(value));
        });
        *self.inner.reorder_handler.borrow_mut() = Some(handler.clone());
        handler
    }

    /// Click handler running whatever action is registered under `name`.
    fn on_click(&self, name: &str, action: ElementAction) -> ClickHandler {
        self.inner.actions.borrow_mut().insert(name.to_string(), action);
        if let Some(handler) = self.inner.click_handlers.borrow().get(name) {
            return handler.clone();
        }

        let weak = Rc::downgrade(&self.inner);
        let element = name.to_string();
        let handler: ClickHandler = Rc::new(move |params: Value| {
            let Some(scope) = upgrade(&weak) else { return };
            let action = scope.inner.actions.borrow().get(&element).cloned();
            match action {
                Some(ElementAction::Add { element: added, callback }) => {
                    scope.add(&added, |value, items| {
                        if let Some(callback) = &callback {
                            callback(value, items);
                        }
                    });
                }
                Some(ElementAction::Remove { callback }) => {
                    if let Ok(index) = element.parse::<usize>() {
                        scope.remove(index, |index, items| {
                            if let Some(callback) = &callback {
                                callback(index, items);
                            }
                        });
                    }
                }
                Some(ElementAction::Reduce(reduce)) => {
                    let next = reduce(&Value::Array(scope.items()), &element, &params);
                    let info = ChangeInfo::leaf(next.clone());
                    scope.inner.source.commit(next, info);
                }
                None => {}
            }
        });
        self.inner
            .click_handlers
            .borrow_mut()
            .insert(name.to_string(), handler.clone());
        handler
    }

    /// Scope over the object at `index`.
    pub fn group(&self, index: usize) -> GroupScope {
        if let Some(scope) = self.inner.groups.borrow().get(&index) {
            return scope.clone();
        }
        let scope = GroupScope::new(Rc::new(ItemSource::new(&self.inner, index)));
        self.inner.groups.borrow_mut().insert(index, scope.clone());
        scope
    }

    /// Scope over the array at `index`.
    pub fn list(&self, index: usize, keys: KeySelector) -> ListScope {
        if let Some(scope) = self.inner.lists.borrow().get(&index) {
            scope.set_key_selector(keys);
            return scope.clone();
        }
        let scope = ListScope::new(Rc::new(ItemSource::new(&self.inner, index)), keys);
        self.inner.lists.borrow_mut().insert(index, scope.clone());
        scope
    }

    /// Element kinds a List scope dispatches.
    pub fn kinds() -> Vec<ElementKind> {
        handlers().kinds()
    }
}

impl Scope for ListScope {
    fn dispatch(
        &self,
        kind: ElementKind,
        request: &ElementRequest<'_>,
    ) -> DispatchResult<ElementProps> {
        handlers().dispatch(self, kind, request)
    }
}

impl ListInner {
    /// Drops cached handlers and child scopes for rows at or past `len`.
    fn prune(&self, len: usize) {
        self.change_handlers.borrow_mut().retain(|index, _| *index < len);
        self.groups.borrow_mut().retain(|index, _| *index < len);
        self.lists.borrow_mut().retain(|index, _| *index < len);
    }
}

fn reject_index(index: usize, len: usize) {
    log_event(
        Event::DispatchRejected,
        &[
            ("scope", "list"),
            ("index", &index.to_string()),
            ("len", &len.to_string()),
            ("reason", "row index out of range"),
        ],
    );
}

fn upgrade(weak: &Weak<ListInner>) -> Option<ListScope> {
    weak.upgrade().map(|inner| ListScope { inner })
}

fn index_of(request: &ElementRequest<'_>, kind: ElementKind) -> DispatchResult<usize> {
    parse_index(request.require_name(kind)?)
}

fn input(scope: &ListScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let index = index_of(request, ElementKind::Input)?;
    Ok(input_props(
        scope.item_value(index),
        scope.item_error(index),
        scope.on_change(index),
        scope.settings(),
    ))
}

fn output(scope: &ListScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let index = index_of(request, ElementKind::Output)?;
    Ok(output_props(scope.item_value(index)))
}

fn action(scope: &ListScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let name = request.require_name(ElementKind::Action)?;
    let action = request.action.ok_or_else(|| DispatchError::MissingAction {
        name: name.to_string(),
    })?;
    if let ElementAction::Remove { .. } = action {
        parse_index(name)?;
    }
    Ok(action_props(scope.on_click(name, action.clone()), scope.settings()))
}

fn list(scope: &ListScope, _request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    Ok(ElementProps {
        data: Some(scope.items()),
        key_extractor: Some(scope.key_selector()),
        ..ElementProps::default()
    })
}

fn sortable_list(scope: &ListScope, _request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    Ok(ElementProps {
        data: Some(scope.items()),
        on_change: Some(scope.on_reorder()),
        key_extractor: Some(scope.key_selector()),
        ..ElementProps::default()
    })
}

/// Named: the item's `$internal`; unnamed: the list's own.
fn error_message(scope: &ListScope, request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
    let errors = match request.name {
        Some(name) => scope.item_error(parse_index(name)?),
        None => scope.error(),
    };
    Ok(error_message_props(&errors))
}

fn error_indicator(
    scope: &ListScope,
    request: &ElementRequest<'_>,
) -> DispatchResult<ElementProps> {
    let errors = match request.name {
        Some(name) => scope.item_error(parse_index(name)?),
        None => scope.error(),
    };
    Ok(error_indicator_props(&errors))
}

/// Source for a child scope bound to one item of a parent list.
struct ItemSource {
    parent: Weak<ListInner>,
    index: usize,
}

impl ItemSource {
    fn new(parent: &Rc<ListInner>, index: usize) -> Self {
        Self {
            parent: Rc::downgrade(parent),
            index,
        }
    }

    fn parent(&self) -> Option<ListScope> {
        upgrade(&self.parent)
    }
}

impl ScopeSource for ItemSource {
    fn value(&self) -> Value {
        self.parent()
            .map(|parent| parent.item_value(self.index))
            .unwrap_or(Value::Null)
    }

    fn error(&self) -> ErrorTree {
        self.parent()
            .map(|parent| parent.item_error(self.index))
            .unwrap_or_default()
    }

    fn settings(&self) -> ScopeSettings {
        self.parent()
            .map(|parent| parent.settings())
            .unwrap_or_default()
    }

    fn commit(&self, value: Value, info: ChangeInfo) {
        if let Some(parent) = self.parent() {
            parent.change_item(self.index, value, info);
        }
    }
}
