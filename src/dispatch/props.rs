//! Props handed to leaves

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use crate::schema::KeySelector;
use crate::tree::ErrorTree;

/// Receives a leaf's new value (or a list's new ordering).
pub type ChangeHandler = Rc<dyn Fn(Value)>;

/// Receives the click parameters of an action leaf.
pub type ClickHandler = Rc<dyn Fn(Value)>;

/// Props a leaf renders from.
///
/// Every field is optional: scopes fill in what the element kind needs,
/// and whatever the leaf sets itself takes precedence.
#[derive(Clone, Default)]
pub struct ElementProps {
    pub value: Option<Value>,
    pub error: Option<ErrorTree>,
    pub errors: Option<Vec<String>>,
    pub has_error: Option<bool>,
    pub on_change: Option<ChangeHandler>,
    pub on_click: Option<ClickHandler>,
    pub disabled: Option<bool>,
    pub read_only: Option<bool>,
    pub change_delay: Option<Duration>,
    pub data: Option<Vec<Value>>,
    pub key_extractor: Option<KeySelector>,
}

impl ElementProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope-injected props overridden by the leaf's own.
    pub fn merge(injected: ElementProps, explicit: ElementProps) -> ElementProps {
        ElementProps {
            value: explicit.value.or(injected.value),
            error: explicit.error.or(injected.error),
            errors: explicit.errors.or(injected.errors),
            has_error: explicit.has_error.or(injected.has_error),
            on_change: explicit.on_change.or(injected.on_change),
            on_click: explicit.on_click.or(injected.on_click),
            disabled: explicit.disabled.or(injected.disabled),
            read_only: explicit.read_only.or(injected.read_only),
            change_delay: explicit.change_delay.or(injected.change_delay),
            data: explicit.data.or(injected.data),
            key_extractor: explicit.key_extractor.or(injected.key_extractor),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = Some(disabled);
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    pub fn with_on_change(mut self, on_change: impl Fn(Value) + 'static) -> Self {
        self.on_change = Some(Rc::new(on_change));
        self
    }

    pub fn with_on_click(mut self, on_click: impl Fn(Value) + 'static) -> Self {
        self.on_click = Some(Rc::new(on_click));
        self
    }

    /// Names of the props that are set, in declaration order.
    pub fn keys(&self) -> Vec<&'static str> {
        let present = [
            ("value", self.value.is_some()),
            ("error", self.error.is_some()),
            ("errors", self.errors.is_some()),
            ("hasError", self.has_error.is_some()),
            ("onChange", self.on_change.is_some()),
            ("onClick", self.on_click.is_some()),
            ("disabled", self.disabled.is_some()),
            ("readOnly", self.read_only.is_some()),
            ("changeDelay", self.change_delay.is_some()),
            ("data", self.data.is_some()),
            ("keyExtractor", self.key_extractor.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

impl fmt::Debug for ElementProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementProps")
            .field("value", &self.value)
            .field("error", &self.error)
            .field("errors", &self.errors)
            .field("has_error", &self.has_error)
            .field("on_change", &self.on_change.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("disabled", &self.disabled)
            .field("read_only", &self.read_only)
            .field("change_delay", &self.change_delay)
            .field("data", &self.data)
            .field("key_extractor", &self.key_extractor)
            .finish()
    }
}
