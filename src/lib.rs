//! faram - schema-driven form state
//!
//! A schema describes a nested value tree (groups, lists, leaf fields and
//! computed fields). The engine validates that tree into a congruent error
//! tree, re-validates only what changed, derives computed fields to a
//! fixed point, and hands UI elements the value/error/handler slice for
//! their position.

pub mod accumulator;
pub mod cli;
pub mod computer;
pub mod condition;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod observability;
pub mod schema;
pub mod scope;
pub mod tree;
