//! Declarative schemas from JSON
//!
//! Document shape:
//! - Field: an array of condition entries, each either a bare name
//!   (`"required"`) or a single-key object carrying arguments
//!   (`{"lengthLessThan": 3}`, `{"inclusiveInBetween": [1, 10]}`)
//! - Group: `{"fields": {...}, "validation": "name" | ["name", ...]}`
//! - List: `{"member": ..., "keySelector": "index" | "<field>", "validation": ...}`
//!
//! Condition and node-validator names resolve through a registry seeded
//! with the built-in condition library. Computed nodes cannot be described
//! in JSON; build them in code.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{GroupSchema, KeySelector, ListSchema, NodeValidator, SchemaNode};
use crate::condition::{self, Condition};
use crate::observability::{log_event, Event};

/// Builds a condition from its JSON arguments (`null` when given as a bare name).
pub type ConditionFactory = Arc<dyn Fn(&Value) -> Result<Condition, String> + Send + Sync>;

/// Registry of named conditions and node validators.
pub struct SchemaLoader {
    conditions: HashMap<String, ConditionFactory>,
    validators: HashMap<String, NodeValidator>,
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader {
    /// A loader knowing the built-in condition library.
    pub fn new() -> Self {
        let mut loader = Self::empty();
        loader.install_builtins();
        loader
    }

    /// A loader with no names registered.
    pub fn empty() -> Self {
        Self {
            conditions: HashMap::new(),
            validators: HashMap::new(),
        }
    }

    fn install_builtins(&mut self) {
        let plain: [fn() -> Condition; 7] = [
            condition::required,
            condition::numeric,
            condition::integer,
            condition::email,
            condition::url,
            condition::date,
            condition::time,
        ];
        for make in plain {
            let name = make().name().to_string();
            self.conditions.insert(name, no_arguments(make));
        }

        let lengths: [(&str, fn(usize) -> Condition); 3] = [
            ("lengthLessThan", condition::length_less_than),
            ("lengthGreaterThan", condition::length_greater_than),
            ("lengthEqualTo", condition::length_equal_to),
        ];
        for (name, make) in lengths {
            self.conditions.insert(
                name.to_string(),
                Arc::new(move |args: &Value| length_argument(args).map(make)),
            );
        }

        let bounds: [(&str, fn(f64) -> Condition); 3] = [
            ("lessThan", condition::less_than),
            ("greaterThan", condition::greater_than),
            ("equalTo", condition::equal_to),
        ];
        for (name, make) in bounds {
            self.conditions.insert(
                name.to_string(),
                Arc::new(move |args: &Value| number_argument(args).map(make)),
            );
        }

        let ranges: [(&str, fn(f64, f64) -> Condition); 2] = [
            ("inclusiveInBetween", condition::inclusive_in_between),
            ("exclusiveInBetween", condition::exclusive_in_between),
        ];
        for (name, make) in ranges {
            self.conditions.insert(
                name.to_string(),
                Arc::new(move |args: &Value| {
                    range_arguments(args).map(|(min, max)| make(min, max))
                }),
            );
        }
    }

    /// Registers a condition taking JSON arguments.
    pub fn register_condition(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&Value) -> Result<Condition, String> + Send + Sync + 'static,
    ) -> SchemaResult<()> {
        let name = name.into();
        if self.conditions.contains_key(&name) {
            return Err(SchemaError::DuplicateCondition(name));
        }
        self.conditions.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Registers an argument-less condition under its own name.
    pub fn register_simple(&mut self, condition: Condition) -> SchemaResult<()> {
        let name = condition.name().to_string();
        self.register_condition(name, move |args: &Value| {
            if args.is_null() {
                Ok(condition.clone())
            } else {
                Err("takes no arguments".to_string())
            }
        })
    }

    /// Registers a named Group/List validator.
    pub fn register_validator(
        &mut self,
        name: impl Into<String>,
        validate: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    ) -> SchemaResult<()> {
        let name = name.into();
        if self.validators.contains_key(&name) {
            return Err(SchemaError::DuplicateCondition(name));
        }
        self.validators.insert(name, Arc::new(validate));
        Ok(())
    }

    /// Registered condition names, sorted.
    pub fn condition_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.conditions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn parse(&self, document: &Value) -> SchemaResult<SchemaNode> {
        self.parse_node(document, "$")
    }

    pub fn parse_str(&self, text: &str) -> SchemaResult<SchemaNode> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| SchemaError::malformed("$", format!("invalid JSON: {}", e)))?;
        self.parse(&document)
    }

    /// Reads and parses one schema file.
    pub fn load_file(&self, path: &Path) -> SchemaResult<SchemaNode> {
        let text = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let schema = self.parse_str(&text)?;
        log_event(
            Event::SchemaLoaded,
            &[("path", &path.display().to_string()), ("root", schema.type_name())],
        );
        Ok(schema)
    }

    fn parse_node(&self, node: &Value, path: &str) -> SchemaResult<SchemaNode> {
        match node {
            Value::Array(entries) => {
                let conditions = entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| self.parse_condition(entry, &format!("{}[{}]", path, i)))
                    .collect::<SchemaResult<Vec<_>>>()?;
                Ok(SchemaNode::Field(conditions))
            }
            Value::Object(map) => match (map.get("fields"), map.get("member")) {
                (Some(_), Some(_)) => Err(SchemaError::malformed(
                    path,
                    "a node cannot have both 'fields' and 'member'",
                )),
                (Some(fields), None) => self.parse_group(fields, map.get("validation"), path),
                (None, Some(member)) => {
                    self.parse_list(member, map.get("keySelector"), map.get("validation"), path)
                }
                (None, None) => Err(SchemaError::malformed(
                    path,
                    "expected a condition array, 'fields' or 'member'",
                )),
            },
            other => Err(SchemaError::malformed(
                path,
                format!("unexpected {} in schema", json_type_name(other)),
            )),
        }
    }

    fn parse_group(
        &self,
        fields: &Value,
        validation: Option<&Value>,
        path: &str,
    ) -> SchemaResult<SchemaNode> {
        let Value::Object(fields) = fields else {
            return Err(SchemaError::malformed(path, "'fields' must be an object"));
        };
        let mut group = GroupSchema::new();
        for (name, child) in fields {
            let child_path = format!("{}.fields.{}", path, name);
            group = group.field(name.as_str(), self.parse_node(child, &child_path)?);
        }
        if let Some(validate) = self.parse_validation(validation, path)? {
            group = group.validation(move |value| validate(value));
        }
        Ok(group.into())
    }

    fn parse_list(
        &self,
        member: &Value,
        key_selector: Option<&Value>,
        validation: Option<&Value>,
        path: &str,
    ) -> SchemaResult<SchemaNode> {
        let member = self.parse_node(member, &format!("{}.member", path))?;
        let keys = match key_selector {
            None | Some(Value::Null) => KeySelector::Index,
            Some(Value::String(name)) if name == "index" => KeySelector::Index,
            Some(Value::String(name)) => KeySelector::field(name.as_str()),
            Some(other) => {
                return Err(SchemaError::malformed(
                    format!("{}.keySelector", path),
                    format!("expected a string, got {}", json_type_name(other)),
                ))
            }
        };
        let mut list = ListSchema::new(member).key_selector(keys);
        if let Some(validate) = self.parse_validation(validation, path)? {
            list = list.validation(move |value| validate(value));
        }
        Ok(list.into())
    }

    /// Resolves `"name"` or `["a", "b"]` into one validator concatenating messages.
    fn parse_validation(
        &self,
        validation: Option<&Value>,
        path: &str,
    ) -> SchemaResult<Option<NodeValidator>> {
        let names: Vec<&str> = match validation {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        SchemaError::malformed(
                            format!("{}.validation", path),
                            "validator names must be strings",
                        )
                    })
                })
                .collect::<SchemaResult<_>>()?,
            Some(other) => {
                return Err(SchemaError::malformed(
                    format!("{}.validation", path),
                    format!("expected a name or list of names, got {}", json_type_name(other)),
                ))
            }
        };

        let validators = names
            .into_iter()
            .map(|name| {
                self.validators.get(name).cloned().ok_or_else(|| SchemaError::UnknownCondition {
                    name: name.to_string(),
                    path: format!("{}.validation", path),
                })
            })
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Some(Arc::new(move |value: &Value| {
            validators.iter().flat_map(|validate| validate(value)).collect()
        })))
    }

    fn parse_condition(&self, entry: &Value, path: &str) -> SchemaResult<Condition> {
        let (name, args) = match entry {
            Value::String(name) => (name.as_str(), &Value::Null),
            Value::Object(map) if map.len() == 1 => match map.iter().next() {
                Some((name, args)) => (name.as_str(), args),
                None => return Err(SchemaError::malformed(path, "empty condition object")),
            },
            _ => {
                return Err(SchemaError::malformed(
                    path,
                    "a condition is a name or a single-key object",
                ))
            }
        };

        let factory = self.conditions.get(name).ok_or_else(|| SchemaError::UnknownCondition {
            name: name.to_string(),
            path: path.to_string(),
        })?;
        factory(args).map_err(|reason| SchemaError::InvalidArguments {
            name: name.to_string(),
            path: path.to_string(),
            reason,
        })
    }
}

fn no_arguments(make: fn() -> Condition) -> ConditionFactory {
    Arc::new(move |args: &Value| {
        if args.is_null() {
            Ok(make())
        } else {
            Err("takes no arguments".to_string())
        }
    })
}

fn length_argument(args: &Value) -> Result<usize, String> {
    args.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("expected a non-negative integer, got {}", args))
}

fn number_argument(args: &Value) -> Result<f64, String> {
    args.as_f64().ok_or_else(|| format!("expected a number, got {}", args))
}

fn range_arguments(args: &Value) -> Result<(f64, f64), String> {
    let (min, max) = match args {
        Value::Array(items) if items.len() == 2 => (items[0].as_f64(), items[1].as_f64()),
        Value::Object(map) => (
            map.get("min").and_then(Value::as_f64),
            map.get("max").and_then(Value::as_f64),
        ),
        _ => (None, None),
    };
    match (min, max) {
        (Some(min), Some(max)) if min <= max => Ok((min, max)),
        (Some(min), Some(max)) => Err(format!("min {} is greater than max {}", min, max)),
        _ => Err(format!("expected [min, max] or {{\"min\", \"max\"}}, got {}", args)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Verdict;
    use serde_json::json;

    #[test]
    fn test_parse_group_of_fields_keeps_document_order() {
        let schema = SchemaLoader::new()
            .parse(&json!({
                "fields": {
                    "name": ["required"],
                    "age": ["required", "integer", { "lessThan": 150 }]
                }
            }))
            .unwrap();

        let group = schema.as_group().unwrap();
        let names: Vec<&str> = group.fields().map(|(name, _)| name).collect();
        assert_eq!(names, ["name", "age"]);
        match group.get("age") {
            Some(SchemaNode::Field(conditions)) => {
                let kinds: Vec<&str> = conditions.iter().map(Condition::name).collect();
                assert_eq!(kinds, ["required", "integer", "lessThan"]);
            }
            other => panic!("expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_with_key_selector() {
        let schema = SchemaLoader::new()
            .parse(&json!({
                "member": { "fields": { "key": ["required"] } },
                "keySelector": "key"
            }))
            .unwrap();
        let list = schema.as_list().unwrap();
        assert_eq!(list.keys().key(&json!({ "key": "x" }), 0), "x");
        assert!(list.member().as_group().is_some());
    }

    #[test]
    fn test_unknown_condition_reports_path() {
        let err = SchemaLoader::new()
            .parse(&json!({ "fields": { "zip": ["required", "postcode"] } }))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownCondition {
                name: "postcode".into(),
                path: "$.fields.zip[1]".into()
            }
        );
    }

    #[test]
    fn test_bad_arguments() {
        let loader = SchemaLoader::new();
        let err = loader.parse(&json!([{ "lengthLessThan": -1 }])).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArguments { .. }));

        let err = loader.parse(&json!([{ "inclusiveInBetween": [5, 1] }])).unwrap_err();
        assert!(err.to_string().contains("greater than max"));

        let err = loader.parse(&json!([{ "required": true }])).unwrap_err();
        assert!(err.to_string().contains("takes no arguments"));
    }

    #[test]
    fn test_range_argument_forms() {
        let loader = SchemaLoader::new();
        for args in [json!([1, 10]), json!({ "min": 1, "max": 10 })] {
            let schema = loader.parse(&json!([{ "inclusiveInBetween": args }])).unwrap();
            let SchemaNode::Field(conditions) = schema else { panic!("expected field") };
            assert!(conditions[0].check(&json!(10)).ok);
            assert!(!conditions[0].check(&json!(11)).ok);
        }
    }

    #[test]
    fn test_malformed_nodes() {
        let loader = SchemaLoader::new();
        assert!(matches!(loader.parse(&json!(3)), Err(SchemaError::Malformed { .. })));
        assert!(matches!(loader.parse(&json!({})), Err(SchemaError::Malformed { .. })));
        assert!(matches!(
            loader.parse(&json!({ "fields": {}, "member": [] })),
            Err(SchemaError::Malformed { .. })
        ));
        assert!(matches!(loader.parse_str("{ nope"), Err(SchemaError::Malformed { .. })));
    }

    #[test]
    fn test_custom_conditions_and_validators() {
        let mut loader = SchemaLoader::new();
        loader
            .register_simple(Condition::new("even", |value| {
                Verdict::check(value.as_i64().map_or(false, |n| n % 2 == 0), "Value must be even")
            }))
            .unwrap();
        loader
            .register_validator("confirmMatches", |value| {
                if value["password"] == value["confirm"] {
                    Vec::new()
                } else {
                    vec!["Passwords do not match".to_string()]
                }
            })
            .unwrap();
        assert_eq!(
            loader.register_simple(condition::required()),
            Err(SchemaError::DuplicateCondition("required".into()))
        );

        let schema = loader
            .parse(&json!({
                "fields": { "n": ["even"], "password": [], "confirm": [] },
                "validation": "confirmMatches"
            }))
            .unwrap();
        let validate = schema.as_group().and_then(GroupSchema::validator).unwrap();
        assert_eq!(validate(&json!({ "password": "a", "confirm": "b" })).len(), 1);
        assert!(validate(&json!({ "password": "a", "confirm": "a" })).is_empty());
    }

    #[test]
    fn test_builtin_names() {
        let loader = SchemaLoader::new();
        let names = loader.condition_names();
        let expected_names = [
            "required",
            "integer",
            "lengthEqualTo",
            "exclusiveInBetween",
            "date",
            "time",
        ];
        for expected in expected_names {
            assert!(names.contains(&expected), "{}", expected);
        }
        assert!(SchemaLoader::empty().condition_names().is_empty());
    }
}
