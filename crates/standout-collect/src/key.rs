//! Entry keys.
//!
//! List entries are addressed by position, map entries by name. Numeric map
//! keys are stored as strings but still match positions, so `Key::Index(1337)`
//! finds the map entry `"1337"` and `Key::from("2")` finds list position 2.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::compare::kind_name;
use crate::error::{CollectError, Result};

/// Key of a collection entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Position in a list.
    Index(usize),
    /// Name in a map.
    Name(String),
}

impl Key {
    /// Converts a resolved value into a map key.
    ///
    /// Strings are used as-is, numbers and booleans by their textual form.
    /// Null, arrays and objects cannot be keys.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Key::Name(s.clone())),
            Value::Number(n) => Ok(Key::Name(n.to_string())),
            Value::Bool(b) => Ok(Key::Name(b.to_string())),
            other => Err(CollectError::UnusableKey {
                kind: kind_name(other),
            }),
        }
    }

    /// Returns the list position this key addresses, if any.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(name) => canonical_index(name),
        }
    }

    /// Returns the textual form used for map lookups.
    pub fn as_name(&self) -> Cow<'_, str> {
        match self {
            Key::Index(i) => Cow::Owned(i.to_string()),
            Key::Name(name) => Cow::Borrowed(name),
        }
    }

    /// Returns `true` if this key names the map entry `name`.
    pub fn matches_name(&self, name: &str) -> bool {
        match self {
            Key::Name(own) => own == name,
            Key::Index(i) => canonical_index(name) == Some(*i),
        }
    }

    /// Returns the key as a caller-visible value: a number for positions,
    /// a string for names.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Index(i) => Value::from(*i),
            Key::Name(name) => Value::String(name.clone()),
        }
    }

    /// Consumes the key, returning its map-key form.
    pub fn into_name(self) -> String {
        match self {
            Key::Index(i) => i.to_string(),
            Key::Name(name) => name,
        }
    }
}

/// Parses `name` as a position only when it is the canonical decimal form,
/// so `"01"` and `"+1"` stay names.
pub(crate) fn canonical_index(name: &str) -> Option<usize> {
    name.parse::<usize>().ok().filter(|i| i.to_string() == name)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_accepts_scalars() {
        assert_eq!(Key::from_value(&json!("a")).unwrap(), Key::Name("a".into()));
        assert_eq!(Key::from_value(&json!(8)).unwrap(), Key::Name("8".into()));
        assert_eq!(Key::from_value(&json!(true)).unwrap(), Key::Name("true".into()));
    }

    #[test]
    fn from_value_rejects_containers() {
        assert!(matches!(
            Key::from_value(&json!(null)),
            Err(CollectError::UnusableKey { kind: "null" })
        ));
        assert!(matches!(
            Key::from_value(&json!({"a": 1})),
            Err(CollectError::UnusableKey { kind: "object" })
        ));
    }

    #[test]
    fn numeric_names_match_positions() {
        assert_eq!(Key::from("2").as_index(), Some(2));
        assert_eq!(Key::from("two").as_index(), None);
        assert!(Key::Index(1337).matches_name("1337"));
        assert!(!Key::Index(1).matches_name("01x"));
        assert!(Key::Index(0).matches_name("0"));
    }

    #[test]
    fn non_canonical_names_are_not_positions() {
        assert_eq!(Key::from("01").as_index(), None);
        assert_eq!(Key::from("+2").as_index(), None);
        assert_eq!(Key::from(" 3").as_index(), None);
        assert!(!Key::Index(1).matches_name("01"));
        assert!(!Key::Index(2).matches_name("+2"));
        assert!(Key::from("name").matches_name("name"));
    }

    #[test]
    fn caller_visible_form() {
        assert_eq!(Key::Index(3).to_value(), json!(3));
        assert_eq!(Key::from("a").to_value(), json!("a"));
        assert_eq!(Key::Index(3).to_string(), "3");
        assert_eq!(Key::Index(3).as_name(), "3");
    }
}
