//! Value and error trees threaded through the form engine
//!
//! Value trees are plain `serde_json::Value`s mirroring the schema's
//! Group/List shape. Error trees are structurally congruent to them and
//! may carry node-level `$internal` messages on Group/List nodes.
//!
//! Both trees are immutable snapshots: every helper here returns a new
//! tree built by shallow composition and never mutates its input.

mod error_tree;
mod path;
mod value;

pub use error_tree::{ErrorNode, ErrorTree, Violation, INTERNAL_KEY};
pub use path::{ChangeInfo, PathKey};
pub use value::{child, is_falsy, with_child, NULL};
