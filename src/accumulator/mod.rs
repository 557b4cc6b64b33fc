//! Accumulator: recursive walkers over value and error trees
//!
//! - `accumulate_values`: rebuild the value tree for submission
//! - `accumulate_errors`: full validation
//! - `accumulate_differential_errors`: validation of changed subtrees only
//! - `analyze_errors`: the single "is this tree submittable" gate

mod differential;
mod validate;
mod values;

pub use differential::accumulate_differential_errors;
pub use validate::{accumulate_errors, analyze_errors};
pub use values::{accumulate_values, ValueSettings};
