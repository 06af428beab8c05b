//! Coercion helpers for untyped `get_apps` payloads
//!
//! Every read from server JSON goes through these functions. None of them fail:
//! a value of the wrong shape collapses to an empty map, an empty string, or the
//! caller's fallback.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

pub type JsonMap = Map<String, Value>;

static EMPTY_OBJECT: Lazy<JsonMap> = Lazy::new(JsonMap::new);

/// Narrow a value to a key-value map. Null, arrays and scalars become an empty map.
pub fn to_object(value: Option<&Value>) -> &JsonMap {
    match value {
        Some(Value::Object(map)) => map,
        _ => &*EMPTY_OBJECT,
    }
}

/// Narrow a value to an array slice, or `None` if it is not an array.
pub fn to_array(value: Option<&Value>) -> Option<&[Value]> {
    match value {
        Some(Value::Array(items)) => Some(items.as_slice()),
        _ => None,
    }
}

/// Look up `key` in `source`, falling back to a case-insensitive scan.
///
/// Returns `None` when `source` is not an object.
pub fn get_key<'a>(source: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    match source {
        Some(Value::Object(map)) => find_key(map, key),
        _ => None,
    }
}

/// Map form of [`get_key`]. Exact match first, then the first key that matches
/// ignoring ASCII case. O(n) in the number of keys on a miss.
pub fn find_key<'a>(map: &'a JsonMap, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

pub fn to_string_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => format_number(n),
        Some(other) => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Integral floats print without a trailing `.0` so that `7.0` and `7` agree.
fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

pub fn to_number_value(value: Option<&Value>, fallback: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(fallback),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return fallback;
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .unwrap_or(fallback)
        }
        _ => fallback,
    }
}

/// Coerce to a non-negative integer, or `fallback` if the value is negative,
/// fractional or not numeric.
pub fn to_u64_value(value: Option<&Value>, fallback: u64) -> u64 {
    parse_u64(value).unwrap_or(fallback)
}

/// Exact integer read. Integer numbers and decimal strings never pass through
/// `f64`, so ids above 2^53 keep every digit.
pub fn parse_u64(value: Option<&Value>) -> Option<u64> {
    let exact = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    exact.or_else(|| {
        let number = to_number_value(value, f64::NAN);
        (number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number <= u64::MAX as f64)
            .then_some(number as u64)
    })
}

pub fn to_boolean_value(value: Option<&Value>, fallback: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(fallback),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            _ => fallback,
        },
        _ => fallback,
    }
}

/// Stringify and trim, mapping blank results to `None`.
pub fn to_optional_string(value: Option<&Value>) -> Option<String> {
    let text = to_string_value(value);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_object() {
        let obj = json!({"a": 1});
        assert_eq!(to_object(Some(&obj)).len(), 1);
        assert!(to_object(Some(&json!([1, 2]))).is_empty());
        assert!(to_object(Some(&Value::Null)).is_empty());
        assert!(to_object(Some(&json!("text"))).is_empty());
        assert!(to_object(None).is_empty());
    }

    #[test]
    fn test_get_key_prefers_exact_match() {
        let source = json!({"deeploy_specs": 1, "DEEPLOY_SPECS": 2});
        assert_eq!(get_key(Some(&source), "DEEPLOY_SPECS"), Some(&json!(2)));
        assert_eq!(get_key(Some(&source), "deeploy_specs"), Some(&json!(1)));
    }

    #[test]
    fn test_get_key_case_insensitive_fallback() {
        let source = json!({"Plugins": {"x": []}});
        assert!(get_key(Some(&source), "PLUGINS").is_some());
        assert!(get_key(Some(&source), "plugins").is_some());
        assert!(get_key(Some(&source), "missing").is_none());
        assert!(get_key(Some(&json!([1])), "plugins").is_none());
        assert!(get_key(None, "plugins").is_none());
    }

    #[test]
    fn test_to_string_value() {
        assert_eq!(to_string_value(None), "");
        assert_eq!(to_string_value(Some(&Value::Null)), "");
        assert_eq!(to_string_value(Some(&json!("abc"))), "abc");
        assert_eq!(to_string_value(Some(&json!(42))), "42");
        assert_eq!(to_string_value(Some(&json!(7.0))), "7");
        assert_eq!(to_string_value(Some(&json!(1.5))), "1.5");
        assert_eq!(to_string_value(Some(&json!(true))), "true");
        assert_eq!(to_string_value(Some(&json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(to_string_value(Some(&json!([1, "x"]))), r#"[1,"x"]"#);
    }

    #[test]
    fn test_to_number_value() {
        assert_eq!(to_number_value(Some(&json!(3)), 0.0), 3.0);
        assert_eq!(to_number_value(Some(&json!(" 12.5 ")), 0.0), 12.5);
        assert_eq!(to_number_value(Some(&json!("abc")), -1.0), -1.0);
        assert_eq!(to_number_value(Some(&json!("")), 9.0), 9.0);
        assert_eq!(to_number_value(Some(&json!("NaN")), 9.0), 9.0);
        assert_eq!(to_number_value(Some(&json!("inf")), 9.0), 9.0);
        assert_eq!(to_number_value(Some(&json!(true)), 4.0), 4.0);
        assert_eq!(to_number_value(None, 5.0), 5.0);
    }

    #[test]
    fn test_to_u64_value() {
        assert_eq!(to_u64_value(Some(&json!("7")), 0), 7);
        assert_eq!(to_u64_value(Some(&json!(-3)), 1), 1);
        assert_eq!(to_u64_value(Some(&json!(2.5)), 1), 1);
        assert_eq!(to_u64_value(Some(&json!(null)), 11), 11);
    }

    #[test]
    fn test_parse_u64_keeps_large_ids_exact() {
        let above_f64 = (1u64 << 53) + 1;
        assert_eq!(parse_u64(Some(&json!(above_f64))), Some(above_f64));
        assert_eq!(parse_u64(Some(&json!(above_f64.to_string()))), Some(above_f64));
        assert_eq!(parse_u64(Some(&json!(" 9007199254740993 "))), Some(above_f64));
        assert_eq!(parse_u64(Some(&json!(7.0))), Some(7));
        assert_eq!(parse_u64(Some(&json!("x"))), None);
    }

    #[test]
    fn test_to_boolean_value() {
        assert!(to_boolean_value(Some(&json!(true)), false));
        assert!(to_boolean_value(Some(&json!(1)), false));
        assert!(!to_boolean_value(Some(&json!(0)), true));
        assert!(to_boolean_value(Some(&json!("YES")), false));
        assert!(to_boolean_value(Some(&json!(" True ")), false));
        assert!(!to_boolean_value(Some(&json!("no")), true));
        assert!(!to_boolean_value(Some(&json!("")), true));
        assert!(to_boolean_value(Some(&json!("maybe")), true));
        assert!(!to_boolean_value(Some(&json!({})), false));
        assert!(to_boolean_value(None, true));
    }

    #[test]
    fn test_to_optional_string() {
        assert_eq!(to_optional_string(Some(&json!("  "))), None);
        assert_eq!(to_optional_string(Some(&json!(" name "))), Some("name".to_string()));
        assert_eq!(to_optional_string(None), None);
    }
}
