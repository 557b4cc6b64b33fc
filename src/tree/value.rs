//! Shallow-composition helpers over value trees

use serde_json::{Map, Value};

use super::path::PathKey;

/// Shared `null`, returned for absent positions.
pub static NULL: Value = Value::Null;

/// Child of `value` at `key`, if present.
pub fn child<'a>(value: &'a Value, key: &PathKey) -> Option<&'a Value> {
    match key {
        PathKey::Field(name) => value.as_object().and_then(|map| map.get(name)),
        PathKey::Index(index) => value.as_array().and_then(|items| items.get(*index)),
    }
}

/// Returns a copy of `value` with `key` set to `child`.
///
/// A Field key on a non-object starts a fresh object; an Index key on a
/// non-array starts a fresh array. Arrays are padded with `null` when the
/// index lies past the end.
pub fn with_child(value: &Value, key: &PathKey, child: Value) -> Value {
    match key {
        PathKey::Field(name) => {
            let mut map = value.as_object().cloned().unwrap_or_else(Map::new);
            map.insert(name.clone(), child);
            Value::Object(map)
        }
        PathKey::Index(index) => {
            let mut items = value.as_array().cloned().unwrap_or_default();
            if *index < items.len() {
                items[*index] = child;
            } else {
                items.resize(*index, Value::Null);
                items.push(child);
            }
            Value::Array(items)
        }
    }
}

/// A leaf counts as falsy when it is `null` or an empty string.
///
/// `false` and `0` are real answers and are kept.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_child_leaves_input_untouched() {
        let before = json!({ "a": 1, "b": 2 });
        let after = with_child(&before, &PathKey::from("a"), json!(5));
        assert_eq!(before, json!({ "a": 1, "b": 2 }));
        assert_eq!(after, json!({ "a": 5, "b": 2 }));
    }

    #[test]
    fn test_with_child_creates_containers() {
        assert_eq!(with_child(&Value::Null, &PathKey::from("x"), json!(1)), json!({ "x": 1 }));
        assert_eq!(
            with_child(&Value::Null, &PathKey::from(2), json!("c")),
            json!([null, null, "c"])
        );
    }

    #[test]
    fn test_child_lookup() {
        let value = json!({ "rows": [{ "k": "x" }] });
        let rows = child(&value, &PathKey::from("rows")).unwrap();
        assert_eq!(child(rows, &PathKey::from(0)), Some(&json!({ "k": "x" })));
        assert_eq!(child(rows, &PathKey::from(4)), None);
        assert_eq!(child(rows, &PathKey::from("k")), None);
    }

    #[test]
    fn test_falsy_values() {
        assert!(is_falsy(&Value::Null));
        assert!(is_falsy(&json!("")));
        assert!(!is_falsy(&json!(false)));
        assert!(!is_falsy(&json!(0)));
        assert!(!is_falsy(&json!(" ")));
    }
}
