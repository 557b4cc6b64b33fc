//! Schema model for the form engine
//!
//! Schemas are supplied by the host and treated as immutable. They can be
//! built in code with the `GroupSchema`/`ListSchema` builders or parsed
//! from JSON through a `SchemaLoader`.

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::{ConditionFactory, SchemaLoader};
pub use types::{ComputeFn, GroupSchema, KeySelector, ListSchema, NodeValidator, SchemaNode};
