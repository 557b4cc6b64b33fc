//! Kind-keyed handler tables
//!
//! Each scope type builds one table mapping element kinds to typed
//! handler functions. Kinds without a handler resolve to
//! `DispatchError::UnregisteredKind`.

use std::fmt;

use serde_json::Value;

use super::element::ElementAction;
use super::errors::{DispatchError, DispatchResult};
use super::kind::ElementKind;
use super::props::ElementProps;

/// What a leaf tells its scope when asking for props.
#[derive(Clone, Copy, Default)]
pub struct ElementRequest<'a> {
    pub name: Option<&'a str>,
    pub info: Option<&'a Value>,
    pub action: Option<&'a ElementAction>,
}

impl<'a> ElementRequest<'a> {
    pub fn named(name: &'a str) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    /// The element name, required by `kind`.
    pub fn require_name(&self, kind: ElementKind) -> DispatchResult<&'a str> {
        self.name.ok_or(DispatchError::MissingElementName { kind })
    }
}

impl fmt::Debug for ElementRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRequest")
            .field("name", &self.name)
            .field("info", &self.info)
            .field("action", &self.action.map(ElementAction::name))
            .finish()
    }
}

/// A scope able to serve leaves.
pub trait Scope {
    fn dispatch(
        &self,
        kind: ElementKind,
        request: &ElementRequest<'_>,
    ) -> DispatchResult<ElementProps>;
}

pub type Handler<S> = fn(&S, &ElementRequest<'_>) -> DispatchResult<ElementProps>;

pub struct HandlerTable<S> {
    scope_name: &'static str,
    handlers: [Option<Handler<S>>; ElementKind::COUNT],
}

impl<S> HandlerTable<S> {
    pub fn new(scope_name: &'static str) -> Self {
        Self {
            scope_name,
            handlers: [None; ElementKind::COUNT],
        }
    }

    pub fn register(mut self, kind: ElementKind, handler: Handler<S>) -> Self {
        self.handlers[kind.slot()] = Some(handler);
        self
    }

    pub fn scope_name(&self) -> &'static str {
        self.scope_name
    }

    pub fn get(&self, kind: ElementKind) -> Option<Handler<S>> {
        self.handlers[kind.slot()]
    }

    pub fn kinds(&self) -> Vec<ElementKind> {
        ElementKind::ALL
            .into_iter()
            .filter(|kind| self.handlers[kind.slot()].is_some())
            .collect()
    }

    pub fn dispatch(
        &self,
        scope: &S,
        kind: ElementKind,
        request: &ElementRequest<'_>,
    ) -> DispatchResult<ElementProps> {
        let handler = self.get(kind).ok_or(DispatchError::UnregisteredKind {
            scope: self.scope_name,
            kind,
        })?;
        handler(scope, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(Value);

    fn output(scope: &Fixed, _request: &ElementRequest<'_>) -> DispatchResult<ElementProps> {
        Ok(ElementProps::new().with_value(scope.0.clone()))
    }

    #[test]
    fn test_dispatch_by_kind() {
        let table: HandlerTable<Fixed> =
            HandlerTable::new("fixed").register(ElementKind::Output, output);
        let props = table
            .dispatch(&Fixed(json!(3)), ElementKind::Output, &ElementRequest::default())
            .unwrap();
        assert_eq!(props.value, Some(json!(3)));
        assert_eq!(table.kinds(), [ElementKind::Output]);
    }

    #[test]
    fn test_unregistered_kind() {
        let table: HandlerTable<Fixed> = HandlerTable::new("fixed");
        let err = table
            .dispatch(&Fixed(json!(3)), ElementKind::Input, &ElementRequest::default())
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnregisteredKind {
                scope: "fixed",
                kind: ElementKind::Input
            }
        );
    }

    #[test]
    fn test_require_name() {
        assert_eq!(ElementRequest::named("age").require_name(ElementKind::Input), Ok("age"));
        assert!(ElementRequest::default().require_name(ElementKind::Input).is_err());
    }
}
