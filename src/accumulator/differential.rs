//! Differential validation
//!
//! Re-validates only the subtrees whose value changed between two
//! snapshots and reuses the previous error nodes everywhere else. The
//! result equals `accumulate_errors(new_value, schema)` whenever
//! `old_errors` equals `accumulate_errors(old_value, schema)`.

use std::collections::HashMap;

use serde_json::Value;

use super::validate::{accumulate_errors, for_each_keyed, node_for};
use crate::schema::SchemaNode;
use crate::tree::{ErrorTree, NULL};

/// Error tree for `new_value`, rebuilt only where it differs from
/// `old_value`.
///
/// Unchanged fields and rows keep their node from `old_errors`. List rows
/// are matched by key, so a reorder reuses each row's errors.
pub fn accumulate_differential_errors(
    old_value: &Value,
    new_value: &Value,
    old_errors: &ErrorTree,
    schema: &SchemaNode,
) -> ErrorTree {
    if old_value == new_value {
        return old_errors.clone();
    }

    match schema {
        SchemaNode::Field(_) | SchemaNode::Computed(_) => accumulate_errors(new_value, schema),
        SchemaNode::Group(group) => {
            let mut node = node_for(new_value, group.validator());
            for (name, child_schema) in group.fields() {
                let old_child = old_value.get(name).unwrap_or(&NULL);
                let new_child = new_value.get(name).unwrap_or(&NULL);
                let error = accumulate_differential_errors(
                    old_child,
                    new_child,
                    old_errors.child(name),
                    child_schema,
                );
                node.insert(name, error);
            }
            node.into_tree()
        }
        SchemaNode::List(list) => {
            // Old items by key; with duplicate keys the last item owns the
            // stored error, same as in full validation.
            let mut previous: HashMap<String, &Value> = HashMap::new();
            for_each_keyed(old_value, list.keys(), |key, item| {
                previous.insert(key, item);
            });

            let mut node = node_for(new_value, list.validator());
            for_each_keyed(new_value, list.keys(), |key, item| {
                let error = match previous.get(&key) {
                    Some(old_item) => accumulate_differential_errors(
                        old_item,
                        item,
                        old_errors.child(&key),
                        list.member(),
                    ),
                    None => accumulate_errors(item, list.member()),
                };
                node.insert(key, error);
            });
            node.into_tree()
        }
    }
}
