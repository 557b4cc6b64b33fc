//! CLI command implementations
//!
//! Each command reads its documents, runs one engine operation and writes
//! a single JSON response to stdout. A blocked submission is a normal
//! response, not a CLI failure.

use std::path::Path;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::accumulator::{accumulate_values, ValueSettings};
use crate::error::FaramErrorCode;
use crate::form::{
    detached_submit, Form, FormConfig, FormHost, FormProps, SubmitHost, SubmitOutcome,
};
use crate::schema::{SchemaLoader, SchemaNode};
use crate::tree::{ChangeInfo, ErrorTree, Violation};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_blocked, write_error, write_response};

/// Host for one-shot runs; outcomes are read from the return value.
struct OneShotHost;

impl SubmitHost for OneShotHost {
    fn on_validation_failure(&self, _errors: &ErrorTree) {}

    fn on_validation_success(&self, _values: &Value, _compact: &Value) {}
}

impl FormHost for OneShotHost {
    fn on_change(&self, _value: Value, _error: ErrorTree, _info: ChangeInfo) {}
}

/// Main CLI entry point
///
/// A failing command also reports its code and message on stdout, so
/// callers reading responses always get one JSON object.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(()) => Ok(()),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Validate {
            schema,
            value,
            config,
        } => match validate(&schema, &value, config.as_deref())? {
            SubmitOutcome::Accepted { values, compact } => {
                write_response(json!({ "values": values, "compact": compact }))
            }
            SubmitOutcome::Blocked(errors) => {
                let violations = errors.violations().iter().map(Violation::to_value).collect();
                write_blocked(
                    FaramErrorCode::SubmissionBlocked.code(),
                    errors.to_value(),
                    violations,
                )
            }
        },
        Command::Values { schema, value } => write_response(values(&schema, &value)?),
        Command::Conditions => write_response(conditions()),
    }
}

fn load(schema_path: &Path, value_path: &Path) -> CliResult<(SchemaNode, Value)> {
    let schema = SchemaLoader::new().load_file(schema_path)?;
    let value = read_json_file(value_path)?;
    Ok((schema, value))
}

/// Submits the value file against the schema file.
///
/// Without a config this is a detached submit. With one, the value is
/// mounted in a form carrying the config's flags and the submit is
/// flushed past its change delay.
pub fn validate(
    schema_path: &Path,
    value_path: &Path,
    config_path: Option<&Path>,
) -> CliResult<SubmitOutcome> {
    let (schema, value) = load(schema_path, value_path)?;
    let Some(config_path) = config_path else {
        return Ok(detached_submit(&value, &schema, &OneShotHost));
    };

    let config = FormConfig::load(config_path)?;
    let props = FormProps::new(schema).with_value(value).with_config(&config);
    let form = Form::mount(props, Rc::new(OneShotHost));
    let outcome = form.submit().or_else(|| form.flush());
    outcome.ok_or_else(|| CliError::config_error("form was torn down before submit"))
}

/// Both value variants, unvalidated
pub fn values(schema_path: &Path, value_path: &Path) -> CliResult<Value> {
    let (schema, value) = load(schema_path, value_path)?;
    Ok(json!({
        "values": accumulate_values(&value, &schema, &ValueSettings::explicit_null()),
        "compact": accumulate_values(&value, &schema, &ValueSettings::compact()),
    }))
}

/// Condition names accepted in schema documents
pub fn conditions() -> Value {
    let loader = SchemaLoader::new();
    let names = loader
        .condition_names()
        .into_iter()
        .map(|name| Value::String(name.to_string()))
        .collect();
    Value::Array(names)
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content.to_string()).unwrap();
        path
    }

    fn schema(dir: &TempDir) -> PathBuf {
        write(
            dir,
            "schema.json",
            json!({
                "fields": {
                    "name": ["required"],
                    "age": ["integer"]
                }
            }),
        )
    }

    #[test]
    fn test_validate_accepts() {
        let dir = TempDir::new().unwrap();
        let schema = schema(&dir);
        let value = write(&dir, "value.json", json!({ "name": "Ada", "age": "" }));

        let outcome = validate(&schema, &value, None).unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Accepted {
                values: json!({ "name": "Ada", "age": null }),
                compact: json!({ "name": "Ada" }),
            }
        );
    }

    #[test]
    fn test_validate_blocks() {
        let dir = TempDir::new().unwrap();
        let schema = schema(&dir);
        let value = write(&dir, "value.json", json!({ "age": 3 }));

        match validate(&schema, &value, None).unwrap() {
            SubmitOutcome::Blocked(errors) => {
                assert_eq!(errors.to_value(), json!({ "name": "Field must not be empty" }));
                let violations = errors.violations();
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].code, FaramErrorCode::ValidationFailed);
                assert_eq!(violations[0].path, "name");
            }
            other => panic!("expected a blocked submit, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_with_delayed_config_still_submits() {
        let dir = TempDir::new().unwrap();
        let schema = schema(&dir);
        let value = write(&dir, "value.json", json!({ "name": "Ada" }));
        let config = write(&dir, "form.json", json!({ "change_delay_ms": 300 }));

        let outcome = validate(&schema, &value, Some(&config)).unwrap();
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        let schema = schema(&dir);
        let value = write(&dir, "value.json", json!({}));
        let config = write(&dir, "form.json", json!({ "change_delay_ms": 999_999 }));

        let err = validate(&schema, &value, Some(&config)).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_unknown_condition_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "schema.json", json!({ "fields": { "a": ["nope"] } }));
        let value = write(&dir, "value.json", json!({}));

        let err = values(&schema, &value).unwrap_err();
        assert_eq!(err.code_str(), "FARAM_CLI_SCHEMA_ERROR");
    }

    #[test]
    fn test_missing_value_file() {
        let dir = TempDir::new().unwrap();
        let schema = schema(&dir);
        let err = values(&schema, &dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::IoError);
    }

    #[test]
    fn test_values_prints_both_variants() {
        let dir = TempDir::new().unwrap();
        let schema = schema(&dir);
        let value = write(&dir, "value.json", json!({ "name": "", "age": 7 }));
        assert_eq!(
            values(&schema, &value).unwrap(),
            json!({
                "values": { "name": null, "age": 7 },
                "compact": { "age": 7 }
            })
        );
    }

    #[test]
    fn test_conditions_lists_builtins() {
        let names = conditions();
        let names = names.as_array().unwrap();
        assert!(names.contains(&json!("required")));
        assert!(names.contains(&json!("email")));
    }
}
