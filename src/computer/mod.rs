//! Computer: fixed-point derivation of computed fields
//!
//! One pass walks the compute schema depth-first in field order. A
//! `Computed` leaf is called with `[root, ..., parent, current]`, taken from
//! the tree as it was at the start of the pass, and its result replaces the
//! current value only when the two differ. Missing Group/List positions are
//! created as empty containers on the way down.
//!
//! Passes repeat until one changes nothing, bounded by `MAX_ITERATIONS`.
//! Hitting the bound is logged and the last tree is kept.

use serde_json::{Map, Value};

use crate::observability::{log_event, Event};
use crate::schema::SchemaNode;
use crate::tree::NULL;

/// Upper bound on derivation passes per change.
pub const MAX_ITERATIONS: usize = 100;

/// Outcome of a full derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeReport {
    pub value: Value,
    /// Passes run, including the final one that found nothing to change
    pub iterations: usize,
    /// False when the pass bound was hit
    pub converged: bool,
    /// True when `value` differs from the input
    pub changed: bool,
}

/// Runs one derivation pass.
///
/// Returns `None` when nothing changed, so callers can keep the tree they
/// already hold.
pub fn compute_output_settings(
    value: &Value,
    schema: &SchemaNode,
    ancestors: &[&Value],
) -> Option<Value> {
    match schema {
        SchemaNode::Field(_) => None,
        SchemaNode::Computed(derive) => {
            let mut chain = ancestors.to_vec();
            chain.push(value);
            let derived = derive(chain.as_slice());
            (derived != *value).then_some(derived)
        }
        SchemaNode::Group(group) => {
            let base = value.as_object();
            let mut chain = ancestors.to_vec();
            chain.push(value);

            let mut patched: Option<Map<String, Value>> = None;
            for (name, child_schema) in group.fields() {
                let current = base.and_then(|map| map.get(name));
                if let Some(next) = derive_child(current, child_schema, &chain) {
                    patched
                        .get_or_insert_with(|| base.cloned().unwrap_or_default())
                        .insert(name.to_string(), next);
                }
            }
            patched.map(Value::Object)
        }
        SchemaNode::List(list) => {
            let items = value.as_array()?;
            let mut chain = ancestors.to_vec();
            chain.push(value);

            let mut patched: Option<Vec<Value>> = None;
            for (index, item) in items.iter().enumerate() {
                if let Some(next) = derive_child(Some(item), list.member(), &chain) {
                    patched.get_or_insert_with(|| items.clone())[index] = next;
                }
            }
            patched.map(Value::Array)
        }
    }
}

/// Derives one child position, creating an empty container for
/// Group/List schemas when the position is missing or `null`.
fn derive_child(current: Option<&Value>, schema: &SchemaNode, chain: &[&Value]) -> Option<Value> {
    let scaffold = match current {
        None | Some(Value::Null) => schema.scaffold(),
        Some(_) => None,
    };
    match scaffold {
        Some(empty) => Some(compute_output_settings(&empty, schema, chain).unwrap_or(empty)),
        None => compute_output_settings(current.unwrap_or(&NULL), schema, chain),
    }
}

/// Derives `initial` to a fixed point.
pub fn compute_outputs(initial: &Value, schema: &SchemaNode) -> Value {
    compute_outputs_with_report(initial, schema).value
}

/// Same as `compute_outputs`, with pass accounting.
pub fn compute_outputs_with_report(initial: &Value, schema: &SchemaNode) -> ComputeReport {
    let mut current: Option<Value> = None;

    for iteration in 1..=MAX_ITERATIONS {
        let input = current.as_ref().unwrap_or(initial);
        match compute_output_settings(input, schema, &[]) {
            Some(next) => current = Some(next),
            None => return finish(initial, current, iteration, true),
        }
    }

    log_event(
        Event::ComputeDiverged,
        &[("iterations", &MAX_ITERATIONS.to_string())],
    );
    finish(initial, current, MAX_ITERATIONS, false)
}

fn finish(
    initial: &Value,
    current: Option<Value>,
    iterations: usize,
    converged: bool,
) -> ComputeReport {
    let changed = current.as_ref().map_or(false, |value| value != initial);
    if changed {
        log_event(Event::ComputeApplied, &[("iterations", &iterations.to_string())]);
    }
    ComputeReport {
        value: current.unwrap_or_else(|| initial.clone()),
        iterations,
        converged,
        changed,
    }
}
