//! Element kinds

use std::fmt;

/// Category of a leaf, deciding which props its scope injects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Editable value: value, error, on_change, disabled, read_only, change_delay
    Input,
    /// Read-only value
    Output,
    /// Button-like leaf: disabled, change_delay, on_click
    Action,
    /// Rows of a list: data, key_extractor
    List,
    /// Rows that can be reordered: data, on_change, key_extractor
    SortableList,
    /// Node-level messages
    ErrorMessage,
    /// has_error plus every message below
    ErrorIndicator,
}

impl ElementKind {
    pub const COUNT: usize = 7;

    pub const ALL: [ElementKind; Self::COUNT] = [
        ElementKind::Input,
        ElementKind::Output,
        ElementKind::Action,
        ElementKind::List,
        ElementKind::SortableList,
        ElementKind::ErrorMessage,
        ElementKind::ErrorIndicator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Input => "input",
            ElementKind::Output => "output",
            ElementKind::Action => "action",
            ElementKind::List => "list",
            ElementKind::SortableList => "sortableList",
            ElementKind::ErrorMessage => "errorMessage",
            ElementKind::ErrorIndicator => "errorIndicator",
        }
    }

    pub(crate) fn slot(&self) -> usize {
        match self {
            ElementKind::Input => 0,
            ElementKind::Output => 1,
            ElementKind::Action => 2,
            ElementKind::List => 3,
            ElementKind::SortableList => 4,
            ElementKind::ErrorMessage => 5,
            ElementKind::ErrorIndicator => 6,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
