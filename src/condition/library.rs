//! Built-in conditions
//!
//! Every condition except `required` accepts an empty value (`null` or
//! `""`), so optional fields only validate once they are filled in.
//! Numeric conditions accept JSON numbers and numeric strings.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;

use super::{Condition, Verdict};
use crate::tree::is_falsy;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const URL_PATTERN: &str = r"^(?i)(https?|ftp)://[^\s/$.?#][^\s]*$";
const DATE_PATTERN: &str = r"^(\d{4})-(\d{1,2})-(\d{1,2})$";
const TIME_PATTERN: &str = r"^(\d{1,2}):(\d{1,2})(?::(\d{1,2}))?$";

static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
static URL: OnceLock<Option<Regex>> = OnceLock::new();
static DATE: OnceLock<Option<Regex>> = OnceLock::new();
static TIME: OnceLock<Option<Regex>> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

/// Numeric reading of a JSON number or a numeric string.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn length_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Number(number) => Some(number.to_string().len()),
        _ => None,
    }
}

/// `5.0` prints as `5`, `2.5` as `2.5`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn numeric_bound(
    name: &'static str,
    message: String,
    accept: impl Fn(f64) -> bool + Send + Sync + 'static,
) -> Condition {
    Condition::new(name, move |value| {
        let ok = is_falsy(value) || as_number(value).map_or(false, &accept);
        Verdict::check(ok, message.clone())
    })
}

fn length_bound(
    name: &'static str,
    message: String,
    accept: impl Fn(usize) -> bool + Send + Sync + 'static,
) -> Condition {
    Condition::new(name, move |value| {
        let ok = is_falsy(value) || length_of(value).map_or(false, &accept);
        Verdict::check(ok, message.clone())
    })
}

fn text_format(
    name: &'static str,
    message: &'static str,
    accept: impl Fn(&str) -> bool + Send + Sync + 'static,
) -> Condition {
    Condition::new(name, move |value| {
        let ok = match value {
            Value::Null => true,
            Value::String(text) => text.is_empty() || accept(text),
            _ => false,
        };
        Verdict::check(ok, message)
    })
}

/// Value must be present: not `null`, not blank text, not an empty list.
pub fn required() -> Condition {
    Condition::new("required", |value| {
        let ok = match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        };
        Verdict::check(ok, "Field must not be empty")
    })
}

pub fn numeric() -> Condition {
    numeric_bound("numeric", "Value must be a number".to_string(), |_| true)
}

pub fn integer() -> Condition {
    numeric_bound("integer", "Value must be a integer".to_string(), |n| n.fract() == 0.0)
}

pub fn length_less_than(n: usize) -> Condition {
    length_bound("lengthLessThan", format!("Length must be less than {}", n), move |len| len < n)
}

pub fn length_greater_than(n: usize) -> Condition {
    length_bound("lengthGreaterThan", format!("Length must be greater than {}", n), move |len| {
        len > n
    })
}

pub fn length_equal_to(n: usize) -> Condition {
    length_bound("lengthEqualTo", format!("Length must be exactly {}", n), move |len| len == n)
}

pub fn less_than(n: f64) -> Condition {
    let message = format!("Value must be less than {}", format_number(n));
    numeric_bound("lessThan", message, move |x| x < n)
}

pub fn greater_than(n: f64) -> Condition {
    let message = format!("Value must be greater than {}", format_number(n));
    numeric_bound("greaterThan", message, move |x| x > n)
}

pub fn equal_to(n: f64) -> Condition {
    let message = format!("Value must be equal to {}", format_number(n));
    numeric_bound("equalTo", message, move |x| x == n)
}

/// `min <= value <= max`
pub fn inclusive_in_between(min: f64, max: f64) -> Condition {
    let message = format!(
        "Value must be between {} and {} (inclusive)",
        format_number(min),
        format_number(max)
    );
    numeric_bound("inclusiveInBetween", message, move |x| min <= x && x <= max)
}

/// `min < value < max`
pub fn exclusive_in_between(min: f64, max: f64) -> Condition {
    let message = format!(
        "Value must be between {} and {} (exclusive)",
        format_number(min),
        format_number(max)
    );
    numeric_bound("exclusiveInBetween", message, move |x| min < x && x < max)
}

pub fn email() -> Condition {
    text_format("email", "Value must be a valid email", |text| {
        pattern(&EMAIL, EMAIL_PATTERN).map_or(false, |re| re.is_match(text))
    })
}

pub fn url() -> Condition {
    text_format("url", "Value must be a valid URL", |text| {
        pattern(&URL, URL_PATTERN).map_or(false, |re| re.is_match(text))
    })
}

/// `YYYY-MM-DD`; the day must exist in that month of that year.
pub fn date() -> Condition {
    text_format("date", "Value must be a valid date", is_valid_date)
}

/// `HH:MM` or `HH:MM:SS` with 0-23 hours, 0-59 minutes and seconds.
pub fn time() -> Condition {
    text_format("time", "Value must be a valid time", is_valid_time)
}

fn is_valid_date(text: &str) -> bool {
    let Some(captures) = pattern(&DATE, DATE_PATTERN).and_then(|re| re.captures(text)) else {
        return false;
    };
    let year = captures[1].parse::<i32>().ok();
    let month = captures[2].parse::<u32>().ok();
    let day = captures[3].parse::<u32>().ok();
    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        _ => false,
    }
}

fn is_valid_time(text: &str) -> bool {
    let Some(captures) = pattern(&TIME, TIME_PATTERN).and_then(|re| re.captures(text)) else {
        return false;
    };
    let hour = captures[1].parse::<u32>().ok();
    let minute = captures[2].parse::<u32>().ok();
    let second = match captures.get(3) {
        Some(m) => m.as_str().parse::<u32>().ok(),
        None => Some(0),
    };
    match (hour, minute, second) {
        (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s).is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required() {
        assert!(!required().check(&json!("")).ok);
        assert!(!required().check(&json!("   ")).ok);
        assert!(!required().check(&Value::Null).ok);
        assert!(!required().check(&json!([])).ok);
        assert!(required().check(&json!(1)).ok);
        assert!(required().check(&json!(false)).ok);
        assert_eq!(required().check(&json!("")).message, "Field must not be empty");
    }

    #[test]
    fn test_integer() {
        assert!(!integer().check(&json!(1.23)).ok);
        assert!(integer().check(&json!(-1)).ok);
        assert!(integer().check(&json!("42")).ok);
        assert!(!integer().check(&json!("x")).ok);
        assert!(integer().check(&json!("")).ok);
        assert_eq!(integer().check(&json!("x")).message, "Value must be a integer");
    }

    #[test]
    fn test_numeric() {
        assert!(numeric().check(&json!("3.5")).ok);
        assert!(numeric().check(&json!(-2)).ok);
        assert!(!numeric().check(&json!("3.5kg")).ok);
        assert!(!numeric().check(&json!(true)).ok);
    }

    #[test]
    fn test_length_conditions() {
        assert!(length_equal_to(3).check(&json!("abc")).ok);
        assert!(!length_equal_to(3).check(&json!("ab")).ok);
        assert!(length_less_than(3).check(&json!("ab")).ok);
        assert!(!length_less_than(3).check(&json!("abc")).ok);
        assert!(length_greater_than(1).check(&json!(["a", "b"])).ok);
        assert!(length_equal_to(2).check(&json!("né")).ok);
        assert_eq!(length_equal_to(3).check(&json!("ab")).message, "Length must be exactly 3");
    }

    #[test]
    fn test_value_bounds() {
        assert!(less_than(10.0).check(&json!(9)).ok);
        assert!(!less_than(10.0).check(&json!(10)).ok);
        assert!(greater_than(0.0).check(&json!("0.5")).ok);
        assert!(equal_to(4.0).check(&json!(4.0)).ok);
        assert_eq!(greater_than(5.0).check(&json!(1)).message, "Value must be greater than 5");
    }

    #[test]
    fn test_in_between() {
        assert!(inclusive_in_between(1.0, 5.0).check(&json!(5)).ok);
        assert!(!exclusive_in_between(1.0, 5.0).check(&json!(5)).ok);
        assert!(exclusive_in_between(1.0, 5.0).check(&json!(2.5)).ok);
        assert!(!inclusive_in_between(1.0, 5.0).check(&json!(0)).ok);
    }

    #[test]
    fn test_email_and_url() {
        assert!(email().check(&json!("ann@example.org")).ok);
        assert!(!email().check(&json!("ann@example")).ok);
        assert!(!email().check(&json!("ann example.org")).ok);
        assert!(url().check(&json!("https://example.org/a?b=c")).ok);
        assert!(url().check(&json!("FTP://files.example.org")).ok);
        assert!(!url().check(&json!("example.org")).ok);
        assert!(!url().check(&json!(12)).ok);
    }

    #[test]
    fn test_date_checks_day_of_month() {
        assert!(date().check(&json!("2024-02-29")).ok);
        assert!(!date().check(&json!("2023-02-29")).ok);
        assert!(!date().check(&json!("2023-04-31")).ok);
        assert!(!date().check(&json!("2023-13-01")).ok);
        assert!(!date().check(&json!("2023-00-10")).ok);
        assert!(!date().check(&json!("23-01-01")).ok);
        assert!(date().check(&json!("")).ok);
    }

    #[test]
    fn test_time_ranges() {
        assert!(time().check(&json!("23:59")).ok);
        assert!(time().check(&json!("00:00:59")).ok);
        assert!(!time().check(&json!("24:00")).ok);
        assert!(!time().check(&json!("12:60")).ok);
        assert!(!time().check(&json!("12:30:60")).ok);
        assert!(!time().check(&json!("noon")).ok);
    }

    #[test]
    fn test_empty_values_pass_optional_conditions() {
        let conditions = [
            numeric(),
            integer(),
            length_equal_to(3),
            less_than(1.0),
            email(),
            url(),
        ];
        for condition in conditions {
            assert!(condition.check(&Value::Null).ok, "{}", condition.name());
            assert!(condition.check(&json!("")).ok, "{}", condition.name());
        }
    }
}
