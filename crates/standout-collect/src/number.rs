//! Numeric values extracted from collection items.
//!
//! JSON numbers arrive as `serde_json::Number`; aggregates and relational
//! comparisons work on [`Number`], which keeps integers integral until a float
//! (or an overflow) forces the result to `F64`.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

/// Numeric value supporting integers and floats.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers (every integer JSON produces that fits)
/// - `U64` for unsigned integers above `i64::MAX`
/// - `F64` for floating point
///
/// Comparisons between different variants convert to the common type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Reads a JSON number, preferring the integer variants.
    pub fn from_json(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::I64(i)
        } else if let Some(u) = n.as_u64() {
            Number::U64(u)
        } else {
            Number::F64(n.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Returns the number held by `value`, without coercion.
    ///
    /// Strings, booleans and null yield `None`; aggregates use this so that
    /// only real numbers contribute.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Number::from_json(n)),
            _ => None,
        }
    }

    /// Coerces `value` to a number the way loose comparison does.
    ///
    /// - numbers are returned as-is
    /// - `null` is `0`, booleans are `0`/`1`
    /// - strings are trimmed; empty is `0`, otherwise they must parse as a
    ///   decimal literal
    /// - arrays and objects do not coerce
    pub fn coerce(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Number::from_json(n)),
            Value::Null => Some(Number::I64(0)),
            Value::Bool(b) => Some(Number::I64(i64::from(*b))),
            Value::String(s) => parse_numeric(s),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            (Number::U64(a), Number::I64(b)) => Some(i128::from(a).cmp(&i128::from(b))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order over numbers, used for sorting.
    ///
    /// Orders by floating-point value first and breaks ties by exact integer
    /// value, so large integers that share an `f64` still order correctly.
    pub fn total_cmp(self, other: Number) -> Ordering {
        self.to_f64()
            .total_cmp(&other.to_f64())
            .then_with(|| self.as_i128().cmp(&other.as_i128()))
    }

    /// Adds two numbers, staying integral while the result fits.
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::F64(_), _) | (_, Number::F64(_)) => {
                Number::F64(self.to_f64() + other.to_f64())
            }
            _ => {
                let sum = self.as_i128() + other.as_i128();
                if let Ok(i) = i64::try_from(sum) {
                    Number::I64(i)
                } else if let Ok(u) = u64::try_from(sum) {
                    Number::U64(u)
                } else {
                    Number::F64(sum as f64)
                }
            }
        }
    }

    /// Converts back into a JSON value. Non-finite floats become `null`.
    pub fn to_value(self) -> Value {
        match self {
            Number::I64(n) => Value::from(n),
            Number::U64(n) => Value::from(n),
            Number::F64(n) => serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number),
        }
    }

    fn as_i128(self) -> i128 {
        match self {
            Number::I64(n) => i128::from(n),
            Number::U64(n) => i128::from(n),
            Number::F64(n) => n as i128,
        }
    }
}

/// Parses numeric text the way loose comparison coerces strings.
pub(crate) fn parse_numeric(s: &str) -> Option<Number> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(Number::I64(0));
    }
    // f64::from_str also accepts "inf" and "NaN", which are not numeric text here
    let looks_numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::I64(i));
    }
    trimmed.parse::<f64>().ok().map(Number::F64)
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(i64::from(n))
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::I64(i64::from(n))
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Number::U64(n), Number::I64)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::from(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_prefers_integers() {
        assert_eq!(Number::from_value(&json!(42)), Some(Number::I64(42)));
        assert_eq!(Number::from_value(&json!(u64::MAX)), Some(Number::U64(u64::MAX)));
        assert_eq!(Number::from_value(&json!(1.5)), Some(Number::F64(1.5)));
        assert_eq!(Number::from_value(&json!("42")), None);
    }

    #[test]
    fn coerce_strings() {
        assert_eq!(Number::coerce(&json!("100")), Some(Number::I64(100)));
        assert_eq!(Number::coerce(&json!(" 2.5 ")), Some(Number::F64(2.5)));
        assert_eq!(Number::coerce(&json!("")), Some(Number::I64(0)));
        assert_eq!(Number::coerce(&json!("1490 NOK")), None);
        assert_eq!(Number::coerce(&json!("inf")), None);
        assert_eq!(Number::coerce(&json!("NaN")), None);
    }

    #[test]
    fn coerce_scalars_and_containers() {
        assert_eq!(Number::coerce(&json!(null)), Some(Number::I64(0)));
        assert_eq!(Number::coerce(&json!(true)), Some(Number::I64(1)));
        assert_eq!(Number::coerce(&json!([1])), None);
        assert_eq!(Number::coerce(&json!({"a": 1})), None);
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(Number::I64(5).compare(Number::U64(10)), Some(Ordering::Less));
        assert_eq!(Number::I64(5).compare(Number::F64(5.0)), Some(Ordering::Equal));
        assert_eq!(Number::U64(10).compare(Number::F64(5.5)), Some(Ordering::Greater));
        assert_eq!(Number::I64(-1).compare(Number::U64(u64::MAX)), Some(Ordering::Less));
    }

    #[test]
    fn total_cmp_is_exact_for_large_integers() {
        let big = 1i64 << 53;
        assert_eq!(Number::I64(big + 1).total_cmp(Number::I64(big)), Ordering::Greater);
        assert_eq!(Number::I64(big).total_cmp(Number::F64(big as f64)), Ordering::Equal);
        assert_eq!(Number::F64(1.5).total_cmp(Number::I64(2)), Ordering::Less);
        assert_eq!(Number::U64(u64::MAX).total_cmp(Number::I64(-1)), Ordering::Greater);
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
    }

    #[test]
    fn add_stays_integral() {
        assert_eq!(Number::I64(2).add(Number::I64(3)), Number::I64(5));
        assert_eq!(Number::I64(2).add(Number::F64(0.5)), Number::F64(2.5));
        assert_eq!(Number::I64(i64::MAX).add(Number::I64(1)), Number::U64(i64::MAX as u64 + 1));
    }

    #[test]
    fn to_value_round_trip() {
        assert_eq!(Number::I64(8).to_value(), json!(8));
        assert_eq!(Number::F64(3.5).to_value(), json!(3.5));
        assert_eq!(Number::F64(f64::NAN).to_value(), json!(null));
    }

    #[test]
    fn display() {
        assert_eq!(Number::I64(14).to_string(), "14");
        assert_eq!(Number::F64(3.5).to_string(), "3.5");
    }
}
