//! Dispatch protocol between leaves and scopes
//!
//! A leaf is declared with a closed `ElementKind`. At render time it asks
//! its scope (passed in explicitly) for props, and the scope answers from a
//! typed per-kind handler table. Misconfiguration is logged and the leaf
//! falls back to its own props.

mod element;
mod errors;
mod kind;
mod props;
mod table;

pub use element::{AddCallback, Element, ElementAction, NewElement, Reducer, RemoveCallback};
pub use errors::{DispatchError, DispatchResult};
pub use kind::ElementKind;
pub use props::{ChangeHandler, ClickHandler, ElementProps};
pub use table::{ElementRequest, Handler, HandlerTable, Scope};
