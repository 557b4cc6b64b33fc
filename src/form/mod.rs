//! Root controller
//!
//! - `Form`: mounts a schema over host-controlled props, derives computed
//!   fields, re-validates differentially on change, submits on request
//! - `detached_submit`: the same validate-then-branch logic for a
//!   standalone value/schema pair
//! - `Debouncer`: cancel-and-replace timers over an explicit clock
//! - `FormConfig`: form-wide flags loadable from JSON

mod config;
mod controller;
mod debounce;
mod submit;

pub use config::{ConfigError, FormConfig, MAX_CHANGE_DELAY_MS};
pub use controller::{Form, FormHost, FormProps, FormTimer, SubmitHandle};
pub use debounce::Debouncer;
pub use submit::{detached_submit, validate_submission, SubmitHost, SubmitOutcome};
