//! Where a scope reads its slice from and commits changes to

use std::cell::RefCell;
use std::time::Duration;

use serde_json::Value;

use crate::tree::{ChangeInfo, ErrorTree};

/// Form-wide flags every scope hands down to its leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeSettings {
    pub disabled: bool,
    pub read_only: bool,
    pub change_delay: Duration,
}

/// The slice a scope is bound to.
///
/// Reads always return the current state, so handlers created once keep
/// seeing fresh values. `commit` hands a new slice to whoever owns it.
pub trait ScopeSource {
    fn value(&self) -> Value;
    fn error(&self) -> ErrorTree;
    fn settings(&self) -> ScopeSettings;
    fn commit(&self, value: Value, info: ChangeInfo);
}

/// A self-contained source holding its own value.
///
/// Commits replace the stored value and are recorded, which makes it the
/// owner for standalone sub-forms and for exercising scopes in isolation.
#[derive(Debug, Default)]
pub struct MemorySource {
    value: RefCell<Value>,
    error: RefCell<ErrorTree>,
    settings: ScopeSettings,
    commits: RefCell<Vec<ChangeInfo>>,
}

impl MemorySource {
    pub fn new(value: Value) -> Self {
        Self {
            value: RefCell::new(value),
            ..Self::default()
        }
    }

    pub fn with_error(self, error: ErrorTree) -> Self {
        *self.error.borrow_mut() = error;
        self
    }

    pub fn with_settings(mut self, settings: ScopeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn set_error(&self, error: ErrorTree) {
        *self.error.borrow_mut() = error;
    }

    /// Change infos in commit order.
    pub fn commits(&self) -> Vec<ChangeInfo> {
        self.commits.borrow().clone()
    }
}

impl ScopeSource for MemorySource {
    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn error(&self) -> ErrorTree {
        self.error.borrow().clone()
    }

    fn settings(&self) -> ScopeSettings {
        self.settings
    }

    fn commit(&self, value: Value, info: ChangeInfo) {
        *self.value.borrow_mut() = value;
        self.commits.borrow_mut().push(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_source_records_commits() {
        let source = MemorySource::new(json!({ "a": 1 }));
        source.commit(json!({ "a": 2 }), ChangeInfo::leaf(json!(2)).prepend("a".into()));
        assert_eq!(source.value(), json!({ "a": 2 }));
        assert_eq!(source.commits().len(), 1);
        assert_eq!(source.commits()[0].path_string(), "a");
    }
}
