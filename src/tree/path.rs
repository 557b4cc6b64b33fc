//! Path keys and change metadata bubbled from leaves to the root

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step in a value tree: a Group field name or a List index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathKey {
    Field(String),
    Index(usize),
}

impl PathKey {
    pub fn as_field(&self) -> Option<&str> {
        match self {
            PathKey::Field(name) => Some(name),
            PathKey::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathKey::Field(_) => None,
            PathKey::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Field(name) => write!(f, "{}", name),
            PathKey::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathKey {
    fn from(name: &str) -> Self {
        PathKey::Field(name.to_string())
    }
}

impl From<String> for PathKey {
    fn from(name: String) -> Self {
        PathKey::Field(name)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        PathKey::Index(index)
    }
}

/// Metadata attached to every change reported to the host.
///
/// Leaves start with an empty path; each enclosing scope prepends its key
/// while the change bubbles outward, so the root sees the full
/// root-to-leaf path and the raw leaf value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChangeInfo {
    /// Root-to-leaf path of the edit
    pub path: Vec<PathKey>,
    /// Raw value emitted by the leaf
    pub value: Value,
    /// True when the change came from recomputing derived fields
    pub computed: bool,
}

impl ChangeInfo {
    /// A leaf edit, before any scope has prepended its key.
    pub fn leaf(value: Value) -> Self {
        Self {
            path: Vec::new(),
            value,
            computed: false,
        }
    }

    /// A programmatic recomputation of derived fields.
    pub fn computed() -> Self {
        Self {
            path: Vec::new(),
            value: Value::Null,
            computed: true,
        }
    }

    /// Prepends the key of the scope the change is bubbling out of.
    pub fn prepend(mut self, key: PathKey) -> Self {
        self.path.insert(0, key);
        self
    }

    /// Dotted rendering of the path for logs.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(PathKey::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}
