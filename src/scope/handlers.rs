//! Prop builders shared by the Group and List handler tables

use serde_json::Value;

use super::source::ScopeSettings;
use crate::accumulator::analyze_errors;
use crate::dispatch::{ChangeHandler, ClickHandler, DispatchError, DispatchResult, ElementProps};
use crate::tree::ErrorTree;

pub(super) fn input_props(
    value: Value,
    error: ErrorTree,
    on_change: ChangeHandler,
    settings: ScopeSettings,
) -> ElementProps {
    ElementProps {
        value: Some(value),
        error: Some(error),
        on_change: Some(on_change),
        disabled: Some(settings.disabled),
        read_only: Some(settings.read_only),
        change_delay: Some(settings.change_delay),
        ..ElementProps::default()
    }
}

pub(super) fn output_props(value: Value) -> ElementProps {
    ElementProps {
        value: Some(value),
        ..ElementProps::default()
    }
}

/// Actions are unavailable on disabled or read-only forms.
pub(super) fn action_props(on_click: ClickHandler, settings: ScopeSettings) -> ElementProps {
    ElementProps {
        on_click: Some(on_click),
        disabled: Some(settings.disabled || settings.read_only),
        change_delay: Some(settings.change_delay),
        ..ElementProps::default()
    }
}

pub(super) fn error_message_props(errors: &ErrorTree) -> ElementProps {
    ElementProps {
        errors: Some(errors.internal().to_vec()),
        ..ElementProps::default()
    }
}

pub(super) fn error_indicator_props(errors: &ErrorTree) -> ElementProps {
    ElementProps {
        has_error: Some(analyze_errors(errors)),
        errors: Some(errors.messages()),
        ..ElementProps::default()
    }
}

pub(super) fn parse_index(name: &str) -> DispatchResult<usize> {
    name.parse().map_err(|_| DispatchError::InvalidIndex {
        name: name.to_string(),
    })
}
