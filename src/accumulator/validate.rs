//! Full validation

use serde_json::Value;

use crate::condition::first_failure;
use crate::schema::{KeySelector, NodeValidator, SchemaNode};
use crate::tree::{ErrorNode, ErrorTree, NULL};

/// Validates `value` against `schema`.
///
/// Each Field reports its first failing condition. Groups and Lists
/// aggregate their children and may add `$internal` messages from their
/// own validator. Computed leaves never carry errors.
pub fn accumulate_errors(value: &Value, schema: &SchemaNode) -> ErrorTree {
    match schema {
        SchemaNode::Field(conditions) => match first_failure(conditions, value) {
            Some(message) => ErrorTree::Message(message),
            None => ErrorTree::Clean,
        },
        SchemaNode::Computed(_) => ErrorTree::Clean,
        SchemaNode::Group(group) => {
            let mut node = node_for(value, group.validator());
            for (name, child_schema) in group.fields() {
                let child = value.get(name).unwrap_or(&NULL);
                node.insert(name, accumulate_errors(child, child_schema));
            }
            node.into_tree()
        }
        SchemaNode::List(list) => {
            let mut node = node_for(value, list.validator());
            for_each_keyed(value, list.keys(), |key, item| {
                node.insert(key, accumulate_errors(item, list.member()));
            });
            node.into_tree()
        }
    }
}

/// True when any leaf or `$internal` entry in the tree holds a message.
pub fn analyze_errors(errors: &ErrorTree) -> bool {
    match errors {
        ErrorTree::Clean => false,
        ErrorTree::Message(_) => true,
        ErrorTree::Node(node) => {
            !node.internal.is_empty() || node.children.values().any(analyze_errors)
        }
    }
}

pub(super) fn node_for(value: &Value, validator: Option<&NodeValidator>) -> ErrorNode {
    match validator {
        Some(validate) => ErrorNode::with_internal(validate(value)),
        None => ErrorNode::new(),
    }
}

/// Visits list items in order with their keys. Later duplicates overwrite
/// earlier ones in whatever the callback builds.
pub(super) fn for_each_keyed<'a>(
    value: &'a Value,
    keys: &KeySelector,
    mut visit: impl FnMut(String, &'a Value),
) {
    if let Some(items) = value.as_array() {
        for (index, item) in items.iter().enumerate() {
            visit(keys.key(item, index), item);
        }
    }
}
