//! Error tree: per-field messages plus node-level `$internal` messages

use std::collections::BTreeMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Map, Value};

use crate::error::FaramErrorCode;

/// Reserved key holding node-level (non-field) messages.
pub const INTERNAL_KEY: &str = "$internal";

static CLEAN: ErrorTree = ErrorTree::Clean;

/// An error tree congruent to a value tree.
///
/// `Clean` stands for "no error here" and is what a missing key resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrorTree {
    /// No error at this position
    #[default]
    Clean,
    /// Leaf message from a failing condition
    Message(String),
    /// Group or List node
    Node(ErrorNode),
}

/// Error node for a Group or List position.
///
/// Children are keyed by field name (Group) or by the list's key selector
/// output (List). Clean children are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorNode {
    /// Node-level messages (`$internal`)
    pub internal: Vec<String>,
    /// Child errors
    pub children: BTreeMap<String, ErrorTree>,
}

impl ErrorNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal(internal: Vec<String>) -> Self {
        Self {
            internal,
            children: BTreeMap::new(),
        }
    }

    /// Stores `error` under `key`; a clean error clears the key instead.
    pub fn insert(&mut self, key: impl Into<String>, error: ErrorTree) {
        let key = key.into();
        if error.is_clean() {
            self.children.remove(&key);
        } else {
            self.children.insert(key, error);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.children.is_empty()
    }

    /// Collapses an empty node to `ErrorTree::Clean`.
    pub fn into_tree(self) -> ErrorTree {
        if self.is_empty() {
            ErrorTree::Clean
        } else {
            ErrorTree::Node(self)
        }
    }
}

impl ErrorTree {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorTree::Message(message.into())
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, ErrorTree::Clean)
    }

    /// Leaf message, if this position holds one.
    pub fn as_message(&self) -> Option<&str> {
        match self {
            ErrorTree::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Node-level messages; empty for leaves and clean positions.
    pub fn internal(&self) -> &[String] {
        match self {
            ErrorTree::Node(node) => &node.internal,
            _ => &[],
        }
    }

    /// Child error under `key`; clean when absent.
    pub fn child(&self, key: &str) -> &ErrorTree {
        match self {
            ErrorTree::Node(node) => node.children.get(key).unwrap_or(&CLEAN),
            _ => &CLEAN,
        }
    }

    /// Every message in the subtree, depth-first, `$internal` before children.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    fn collect_messages(&self, out: &mut Vec<String>) {
        match self {
            ErrorTree::Clean => {}
            ErrorTree::Message(message) => out.push(message.clone()),
            ErrorTree::Node(node) => {
                out.extend(node.internal.iter().cloned());
                for child in node.children.values() {
                    child.collect_messages(out);
                }
            }
        }
    }

    /// Every message with its dotted path and class: leaf messages are
    /// `ValidationFailed`, `$internal` messages are `InternalError`.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        self.collect_violations("", &mut out);
        out
    }

    fn collect_violations(&self, path: &str, out: &mut Vec<Violation>) {
        match self {
            ErrorTree::Clean => {}
            ErrorTree::Message(message) => out.push(Violation {
                path: path.to_string(),
                code: FaramErrorCode::ValidationFailed,
                message: message.clone(),
            }),
            ErrorTree::Node(node) => {
                out.extend(node.internal.iter().map(|message| Violation {
                    path: path.to_string(),
                    code: FaramErrorCode::InternalError,
                    message: message.clone(),
                }));
                for (key, child) in &node.children {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    child.collect_violations(&child_path, out);
                }
            }
        }
    }

    /// JSON shape: `null`, a string, or an object with optional `$internal`.
    pub fn to_value(&self) -> Value {
        match self {
            ErrorTree::Clean => Value::Null,
            ErrorTree::Message(message) => Value::String(message.clone()),
            ErrorTree::Node(node) => {
                let mut map = Map::new();
                if !node.internal.is_empty() {
                    let internal = node.internal.iter().cloned().map(Value::String).collect();
                    map.insert(INTERNAL_KEY.to_string(), Value::Array(internal));
                }
                for (key, child) in &node.children {
                    map.insert(key.clone(), child.to_value());
                }
                Value::Object(map)
            }
        }
    }

    /// Reads a host-supplied error tree.
    ///
    /// Strings are messages and objects are nodes; anything else is clean.
    /// Empty nodes collapse to clean.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(message) => ErrorTree::Message(message.clone()),
            Value::Object(map) => {
                let mut node = ErrorNode::new();
                for (key, child) in map {
                    if key == INTERNAL_KEY {
                        node.internal = match child {
                            Value::Array(items) => items
                                .iter()
                                .filter_map(|item| item.as_str().map(str::to_string))
                                .collect(),
                            Value::String(message) => vec![message.clone()],
                            _ => Vec::new(),
                        };
                    } else {
                        node.insert(key.clone(), ErrorTree::from_value(child));
                    }
                }
                node.into_tree()
            }
            _ => ErrorTree::Clean,
        }
    }
}

/// A single message of an error tree, flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the position; empty for the root
    pub path: String,
    pub code: FaramErrorCode,
    pub message: String,
}

impl Violation {
    pub fn to_value(&self) -> Value {
        json!({
            "path": self.path,
            "code": self.code.code(),
            "message": self.message,
        })
    }
}

impl From<&str> for ErrorTree {
    fn from(message: &str) -> Self {
        ErrorTree::Message(message.to_string())
    }
}

impl Serialize for ErrorTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorTree::Clean => serializer.serialize_none(),
            ErrorTree::Message(message) => serializer.serialize_str(message),
            ErrorTree::Node(node) => {
                let internal = usize::from(!node.internal.is_empty());
                let mut map = serializer.serialize_map(Some(node.children.len() + internal))?;
                if !node.internal.is_empty() {
                    map.serialize_entry(INTERNAL_KEY, &node.internal)?;
                }
                for (key, child) in &node.children {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ErrorTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ErrorTree::from_value(&value))
    }
}
