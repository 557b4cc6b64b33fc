//! Value accumulation for submission
//!
//! Walks the schema and rebuilds the value tree from it. Keys the schema
//! does not describe are dropped; leaves pass through unchanged except for
//! falsy ones, which are either omitted or replaced by a placeholder.

use serde_json::{Map, Value};

use crate::schema::SchemaNode;
use crate::tree::{is_falsy, NULL};

/// How falsy leaves are emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSettings {
    /// Omit falsy leaves and empty containers
    pub no_falsy_values: bool,
    /// Placeholder for falsy leaves when they are kept
    pub falsy_value: Value,
}

impl ValueSettings {
    /// Falsy leaves and empty Groups/Lists are left out.
    pub fn compact() -> Self {
        Self {
            no_falsy_values: true,
            falsy_value: Value::Null,
        }
    }

    /// Every schema position is present; falsy leaves become `null`.
    pub fn explicit_null() -> Self {
        Self {
            no_falsy_values: false,
            falsy_value: Value::Null,
        }
    }
}

impl Default for ValueSettings {
    fn default() -> Self {
        Self::explicit_null()
    }
}

/// Rebuilds `value` along `schema`.
///
/// The root always comes back as a container for Group/List schemas,
/// even when everything under it was omitted.
pub fn accumulate_values(value: &Value, schema: &SchemaNode, settings: &ValueSettings) -> Value {
    match accumulate(value, schema, settings) {
        Some(out) => out,
        None => schema.scaffold().unwrap_or_else(|| settings.falsy_value.clone()),
    }
}

/// `None` means "omit this position".
fn accumulate(value: &Value, schema: &SchemaNode, settings: &ValueSettings) -> Option<Value> {
    match schema {
        SchemaNode::Field(_) | SchemaNode::Computed(_) => {
            if !is_falsy(value) {
                Some(value.clone())
            } else if settings.no_falsy_values {
                None
            } else {
                Some(settings.falsy_value.clone())
            }
        }
        SchemaNode::Group(group) => {
            let mut map = Map::new();
            for (name, child_schema) in group.fields() {
                let child = value.get(name).unwrap_or(&NULL);
                if let Some(out) = accumulate(child, child_schema, settings) {
                    map.insert(name.to_string(), out);
                }
            }
            if map.is_empty() && settings.no_falsy_values {
                None
            } else {
                Some(Value::Object(map))
            }
        }
        SchemaNode::List(list) => {
            let items: Vec<Value> = value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| accumulate(item, list.member(), settings))
                        .collect()
                })
                .unwrap_or_default();
            if items.is_empty() && settings.no_falsy_values {
                None
            } else {
                Some(Value::Array(items))
            }
        }
    }
}
