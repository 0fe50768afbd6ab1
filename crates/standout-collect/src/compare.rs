//! Equality and ordering between collection values.
//!
//! Three relations back every filtering, searching and sorting operation:
//!
//! - [`loose_eq`]: coercive equality, so `100` equals `"100"`
//! - [`strict_eq`]: same kind and same value
//! - [`loose_cmp`]: relational ordering for `<`, `<=`, `>`, `>=`
//!
//! [`sort_cmp`] is the total order used when sorting.

use std::cmp::Ordering;

use serde_json::Value;

use crate::number::{parse_numeric, Number};

/// Loose equality between two values.
///
/// Same-kind values compare like [`strict_eq`]. A number and a string are
/// compared after coercing the string to a number. A boolean is replaced by
/// `0`/`1` and the comparison is retried. `null` only equals `null`, and
/// arrays or objects never equal a scalar.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(_), Value::String(s)) | (Value::String(s), Value::Number(_)) => {
            let number = if a.is_number() { a } else { b };
            match (Number::from_value(number), parse_numeric(s)) {
                (Some(n), Some(m)) => n.compare(m) == Some(Ordering::Equal),
                _ => false,
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => {
            loose_eq(&Value::from(i64::from(*x)), other)
        }
        _ => strict_eq(a, b),
    }
}

/// Strict equality: same kind and same value.
///
/// Numbers compare by value across integer and float representations, and
/// arrays/objects compare element by element.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            Number::from_json(x).compare(Number::from_json(y)) == Some(Ordering::Equal)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| strict_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| strict_eq(l, r)))
        }
        _ => false,
    }
}

/// Relational comparison with coercion.
///
/// Two strings compare lexicographically. Anything else is coerced to a
/// number first; when either side does not coerce, there is no ordering and
/// every relational operator should evaluate to `false`.
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => Number::coerce(a)?.compare(Number::coerce(b)?),
    }
}

/// Total order used by `sort`, `sort_by` and `sort_by_desc`.
///
/// Values are ranked by kind first: booleans, then numbers together with
/// numeric strings, then other strings, arrays, objects, and `null` last.
/// Within the numeric rank values compare by numeric value, so `"9" < 10`;
/// other strings compare lexicographically, booleans `false < true`, and
/// arrays and objects by length.
pub fn sort_cmp(a: &Value, b: &Value) -> Ordering {
    sort_rank(a)
        .cmp(&sort_rank(b))
        .then_with(|| match (sort_number(a), sort_number(b)) {
            (Some(x), Some(y)) => x.total_cmp(y),
            _ => match (a, b) {
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                (Value::String(x), Value::String(y)) => x.cmp(y),
                (Value::Array(x), Value::Array(y)) => x.len().cmp(&y.len()),
                (Value::Object(x), Value::Object(y)) => x.len().cmp(&y.len()),
                _ => Ordering::Equal,
            },
        })
}

/// Human-readable kind name, used in error messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Numbers and non-blank numeric strings share a rank
fn sort_number(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(Number::from_json(n)),
        Value::String(s) if !s.trim().is_empty() => parse_numeric(s),
        _ => None,
    }
}

fn sort_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) if sort_number(value).is_some() => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loose_equality_coerces_numeric_strings() {
        assert!(loose_eq(&json!(100), &json!("100")));
        assert!(loose_eq(&json!("100"), &json!(100)));
        assert!(loose_eq(&json!(4), &json!("4")));
        assert!(loose_eq(&json!(1), &json!(1.0)));
        assert!(!loose_eq(&json!(100), &json!("100 NOK")));
    }

    #[test]
    fn loose_equality_booleans_and_null() {
        assert!(loose_eq(&json!(true), &json!(1)));
        assert!(loose_eq(&json!(false), &json!("0")));
        assert!(!loose_eq(&json!(true), &json!(2)));
        assert!(loose_eq(&json!(null), &json!(null)));
        assert!(!loose_eq(&json!(null), &json!(0)));
        assert!(!loose_eq(&json!(0), &json!(null)));
    }

    #[test]
    fn loose_equality_containers() {
        assert!(loose_eq(&json!([1, 2]), &json!([1, 2])));
        assert!(!loose_eq(&json!([1]), &json!(1)));
        assert!(!loose_eq(&json!({"a": 1}), &json!("a")));
    }

    #[test]
    fn strict_equality() {
        assert!(strict_eq(&json!(100), &json!(100)));
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(!strict_eq(&json!(100), &json!("100")));
        assert!(!strict_eq(&json!(true), &json!(1)));
        assert!(strict_eq(&json!({"a": [1, 2]}), &json!({"a": [1, 2]})));
        assert!(!strict_eq(&json!({"a": [1, 2]}), &json!({"a": [1, "2"]})));
        assert!(!strict_eq(&json!({"a": 1}), &json!({"b": 1})));
    }

    #[test]
    fn relational_comparison() {
        assert_eq!(loose_cmp(&json!(1), &json!(2)), Some(Ordering::Less));
        assert_eq!(loose_cmp(&json!("100"), &json!(99)), Some(Ordering::Greater));
        assert_eq!(loose_cmp(&json!("apple"), &json!("banana")), Some(Ordering::Less));
        // "10" < "9" as strings
        assert_eq!(loose_cmp(&json!("10"), &json!("9")), Some(Ordering::Less));
        assert_eq!(loose_cmp(&json!("abc"), &json!(1)), None);
        assert_eq!(loose_cmp(&json!([1]), &json!(1)), None);
    }

    #[test]
    fn sort_order_puts_null_last() {
        let mut values = vec![json!(null), json!(3), json!(1), json!(null), json!(2)];
        values.sort_by(sort_cmp);
        assert_eq!(values, vec![json!(1), json!(2), json!(3), json!(null), json!(null)]);
    }

    #[test]
    fn sort_order_mixed_kinds() {
        assert_eq!(sort_cmp(&json!(5), &json!("10")), Ordering::Less);
        assert_eq!(sort_cmp(&json!(true), &json!("x")), Ordering::Less);
        assert_eq!(sort_cmp(&json!("x"), &json!([1])), Ordering::Less);
        assert_eq!(sort_cmp(&json!(1000), &json!("abc")), Ordering::Less);
        assert_eq!(sort_cmp(&json!(""), &json!("a")), Ordering::Less);
    }

    #[test]
    fn sort_order_numeric_strings_are_transitive() {
        // numeric strings compare by value against each other, not as text
        assert_eq!(sort_cmp(&json!(10), &json!("9")), Ordering::Greater);
        assert_eq!(sort_cmp(&json!("9"), &json!("10")), Ordering::Less);
        assert_eq!(sort_cmp(&json!("10"), &json!(10)), Ordering::Equal);
    }

    #[test]
    fn kind_names() {
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!([1])), "array");
        assert_eq!(kind_name(&json!({})), "object");
    }
}
