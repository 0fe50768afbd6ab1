//! Accessors: a key name or a callback that derives a value from an entry.
//!
//! Every keyed operation (`group_by`, `sort_by`, `pluck`, `sum_by`, ...) takes
//! `impl Into<Accessor>`, so callers pass either a property name or a closure:
//!
//! ```
//! use serde_json::{json, Value};
//! use standout_collect::{collect, Accessor};
//!
//! let products = collect(json!([
//!     {"name": "Desk", "colors": ["Black", "Mahogany"]},
//!     {"name": "Chair", "colors": ["Black"]},
//! ]));
//!
//! let names = products.pluck("name");
//! assert_eq!(names.all(), json!(["Desk", "Chair"]));
//!
//! let color_count = Accessor::func(|product: &Value, _| {
//!     json!(product["colors"].as_array().map_or(0, Vec::len))
//! });
//! assert_eq!(products.sum_by(color_count).to_string(), "3");
//! ```

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::key::Key;

type Derive<'a> = dyn Fn(&Value, &Key) -> Value + 'a;

/// Extracts a comparison, grouping or aggregation value from an entry.
pub enum Accessor<'a> {
    /// Reads a property of a record (or an element of an array, by position).
    Key(String),
    /// Derives a value from `(value, key)`.
    Func(Box<Derive<'a>>),
}

impl<'a> Accessor<'a> {
    /// Creates a key accessor.
    pub fn key(name: impl Into<String>) -> Self {
        Accessor::Key(name.into())
    }

    /// Creates a callback accessor.
    pub fn func(f: impl Fn(&Value, &Key) -> Value + 'a) -> Self {
        Accessor::Func(Box::new(f))
    }

    /// Resolves the accessor against one entry.
    ///
    /// A key that is missing, or applied to a scalar, resolves to
    /// `Value::Null` rather than failing.
    pub fn resolve<'v>(&self, value: &'v Value, key: &Key) -> Cow<'v, Value> {
        match self {
            Accessor::Key(name) => {
                property(value, name).map_or(Cow::Owned(Value::Null), Cow::Borrowed)
            }
            Accessor::Func(f) => Cow::Owned(f(value, key)),
        }
    }
}

/// Reads `name` from a record, or position `name` from an array.
pub(crate) fn property<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(name),
        Value::Array(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Key(name) => f.debug_tuple("Key").field(name).finish(),
            Accessor::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<&str> for Accessor<'_> {
    fn from(name: &str) -> Self {
        Accessor::Key(name.to_string())
    }
}

impl From<String> for Accessor<'_> {
    fn from(name: String) -> Self {
        Accessor::Key(name)
    }
}

impl From<&String> for Accessor<'_> {
    fn from(name: &String) -> Self {
        Accessor::Key(name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_accessor_reads_record_property() {
        let item = json!({"price": 100});
        let accessor = Accessor::from("price");
        assert_eq!(accessor.resolve(&item, &Key::Index(0)).as_ref(), &json!(100));
    }

    #[test]
    fn key_accessor_missing_is_null() {
        let accessor = Accessor::key("price");
        assert_eq!(
            accessor.resolve(&json!({"name": "Desk"}), &Key::Index(0)).as_ref(),
            &json!(null)
        );
        assert_eq!(accessor.resolve(&json!(42), &Key::Index(0)).as_ref(), &json!(null));
    }

    #[test]
    fn key_accessor_indexes_arrays() {
        let accessor = Accessor::key("1");
        assert_eq!(accessor.resolve(&json!(["a", "b"]), &Key::Index(0)).as_ref(), &json!("b"));
    }

    #[test]
    fn func_accessor_sees_value_and_key() {
        let accessor = Accessor::func(|value, key| json!(format!("{key}:{value}")));
        assert_eq!(
            accessor.resolve(&json!(7), &Key::from("seven")).as_ref(),
            &json!("seven:7")
        );
    }

    #[test]
    fn debug_hides_callbacks() {
        assert_eq!(format!("{:?}", Accessor::key("a")), "Key(\"a\")");
        assert_eq!(format!("{:?}", Accessor::func(|v, _| v.clone())), "Func(..)");
    }
}
