//! Scope APIs
//!
//! A scope owns one slice of the value and error trees (an object for a
//! Group, an array for a List) and serves the dispatch protocol for the
//! leaves under it. Nested scopes bind to a child slice of their parent,
//! so leaves never see the full path; changes bubble back up through the
//! chain of sources with each level prepending its key.

mod group;
mod handlers;
mod list;
mod source;

pub use group::GroupScope;
pub use list::ListScope;
pub use source::{MemorySource, ScopeSettings, ScopeSource};
