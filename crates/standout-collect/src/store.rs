//! Backing store for a collection.
//!
//! A [`Store`] is a tagged union over the two shapes. Both variants keep their
//! entries in one ordered `Vec`, so map iteration order is insertion order and
//! list order is positional order. Operations that must produce a particular
//! shape rebuild through [`Store::list`], [`Store::map`] or
//! [`Store::same_shape`].

use serde_json::{Map, Value};

use crate::error::{CollectError, Result};
use crate::key::{canonical_index, Key};

/// Shape of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Ordered sequence addressed by position.
    List,
    /// Insertion-ordered mapping addressed by string keys.
    Map,
}

impl Shape {
    /// Returns the display name of this shape.
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::List => "list",
            Shape::Map => "map",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered entries of a collection, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Store {
    /// Values addressed by position.
    List(Vec<Value>),
    /// Key/value pairs in insertion order. Keys are unique.
    Map(Vec<(String, Value)>),
}

impl Default for Store {
    fn default() -> Self {
        Store::List(Vec::new())
    }
}

impl Store {
    /// Builds a list-shaped store.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Self {
        Store::List(values.into_iter().collect())
    }

    /// Builds a map-shaped store.
    ///
    /// A repeated key overwrites the earlier value but keeps the position
    /// where the key was first seen.
    pub fn map<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut store = Store::Map(Vec::new());
        for (key, value) in pairs {
            store.set_name(key.into(), value);
        }
        store
    }

    /// Rebuilds `entries` with the shape of `self`.
    ///
    /// Lists drop the keys and compact positions; maps keep them.
    pub fn same_shape(&self, entries: impl IntoIterator<Item = (Key, Value)>) -> Self {
        match self {
            Store::List(_) => Store::list(entries.into_iter().map(|(_, value)| value)),
            Store::Map(_) => Store::map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into_name(), value)),
            ),
        }
    }

    /// Wraps a raw value.
    ///
    /// Arrays become lists and objects become maps. `null` is an empty list;
    /// any other scalar is a list of one.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(values) => Store::List(values),
            Value::Object(map) => Store::Map(map.into_iter().collect()),
            Value::Null => Store::List(Vec::new()),
            scalar => Store::List(vec![scalar]),
        }
    }

    /// Returns the shape tag.
    pub fn shape(&self) -> Shape {
        match self {
            Store::List(_) => Shape::List,
            Store::Map(_) => Shape::Map,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Store::List(values) => values.len(),
            Store::Map(pairs) => pairs.len(),
        }
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates entries in order.
    pub fn entries(&self) -> Entries<'_> {
        match self {
            Store::List(values) => Entries::List(values.iter().enumerate()),
            Store::Map(pairs) => Entries::Map(pairs.iter()),
        }
    }

    /// Iterates values in order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Value> + '_ {
        self.entries().map(|(_, value)| value)
    }

    /// Consumes the store, yielding owned entries in order.
    pub fn into_entries(self) -> Vec<(Key, Value)> {
        match self {
            Store::List(values) => values
                .into_iter()
                .enumerate()
                .map(|(i, value)| (Key::Index(i), value))
                .collect(),
            Store::Map(pairs) => pairs
                .into_iter()
                .map(|(name, value)| (Key::Name(name), value))
                .collect(),
        }
    }

    /// Finds the position of `key` in iteration order.
    pub fn position(&self, key: &Key) -> Option<usize> {
        match self {
            Store::List(values) => key.as_index().filter(|i| *i < values.len()),
            Store::Map(pairs) => pairs.iter().position(|(name, _)| key.matches_name(name)),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        let position = self.position(key)?;
        match self {
            Store::List(values) => values.get(position),
            Store::Map(pairs) => pairs.get(position).map(|(_, value)| value),
        }
    }

    /// Inserts or overwrites the value under `key`.
    ///
    /// Lists accept positions up to and including their length; writing at
    /// the length appends.
    pub fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        match self {
            Store::List(values) => {
                let index = key
                    .as_index()
                    .ok_or_else(|| CollectError::NotAnIndex(key.to_string()))?;
                match index.cmp(&values.len()) {
                    std::cmp::Ordering::Less => values[index] = value,
                    std::cmp::Ordering::Equal => values.push(value),
                    std::cmp::Ordering::Greater => {
                        return Err(CollectError::IndexOutOfBounds {
                            index,
                            len: values.len(),
                        })
                    }
                }
            }
            Store::Map(_) => self.set_name(key.into_name(), value),
        }
        Ok(())
    }

    /// Removes the entry under `key`, shifting later entries down.
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let position = self.position(key)?;
        self.remove_at(position).map(|(_, value)| value)
    }

    /// Removes the entry at `position` in iteration order.
    pub fn remove_at(&mut self, position: usize) -> Option<(Key, Value)> {
        if position >= self.len() {
            return None;
        }
        match self {
            Store::List(values) => Some((Key::Index(position), values.remove(position))),
            Store::Map(pairs) => {
                let (name, value) = pairs.remove(position);
                Some((Key::Name(name), value))
            }
        }
    }

    /// Appends a value. Maps key it with [`Store::next_index`].
    pub fn push(&mut self, value: Value) {
        match self {
            Store::List(values) => values.push(value),
            Store::Map(_) => {
                let key = self.next_index().to_string();
                self.set_name(key, value);
            }
        }
    }

    /// Inserts an entry at `position`, keeping the rest in order.
    ///
    /// For maps an existing entry with the same key is replaced and moved.
    pub fn insert_at(&mut self, position: usize, key: Option<String>, value: Value) {
        match self {
            Store::List(values) => values.insert(position.min(values.len()), value),
            Store::Map(pairs) => {
                let name = key.unwrap_or_else(|| next_map_index(pairs).to_string());
                let mut position = position;
                if let Some(existing) = pairs.iter().position(|(n, _)| *n == name) {
                    pairs.remove(existing);
                    if existing < position {
                        position -= 1;
                    }
                }
                pairs.insert(position.min(pairs.len()), (name, value));
            }
        }
    }

    /// One past the largest numeric key (or the length, for lists).
    pub fn next_index(&self) -> usize {
        match self {
            Store::List(values) => values.len(),
            Store::Map(pairs) => next_map_index(pairs),
        }
    }

    /// Mutable access to every value, paired with its key.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&Key, &mut Value)) {
        match self {
            Store::List(values) => {
                for (i, value) in values.iter_mut().enumerate() {
                    f(&Key::Index(i), value);
                }
            }
            Store::Map(pairs) => {
                for (name, value) in pairs.iter_mut() {
                    f(&Key::Name(name.clone()), value);
                }
            }
        }
    }

    /// Returns the raw value: an array for lists, an object for maps.
    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    /// Consumes the store into its raw value.
    pub fn into_value(self) -> Value {
        match self {
            Store::List(values) => Value::Array(values),
            Store::Map(pairs) => Value::Object(pairs.into_iter().collect::<Map<String, Value>>()),
        }
    }

    fn set_name(&mut self, name: String, value: Value) {
        if let Store::Map(pairs) = self {
            match pairs.iter_mut().find(|(n, _)| *n == name) {
                Some((_, slot)) => *slot = value,
                None => pairs.push((name, value)),
            }
        }
    }
}

fn next_map_index(pairs: &[(String, Value)]) -> usize {
    pairs
        .iter()
        .filter_map(|(name, _)| canonical_index(name))
        .max()
        .map_or(0, |max| max + 1)
}

/// Iterator over `(Key, &Value)` entries of a [`Store`].
#[derive(Debug, Clone)]
pub enum Entries<'a> {
    /// Entries of a list.
    List(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
    /// Entries of a map.
    Map(std::slice::Iter<'a, (String, Value)>),
}

impl<'a> Iterator for Entries<'a> {
    type Item = (Key, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Entries::List(iter) => iter.next().map(|(i, value)| (Key::Index(i), value)),
            Entries::Map(iter) => iter.next().map(|(name, value)| (Key::Name(name.clone()), value)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Entries::List(iter) => iter.size_hint(),
            Entries::Map(iter) => iter.size_hint(),
        }
    }
}

impl DoubleEndedIterator for Entries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        match self {
            Entries::List(iter) => iter.next_back().map(|(i, value)| (Key::Index(i), value)),
            Entries::Map(iter) => iter
                .next_back()
                .map(|(name, value)| (Key::Name(name.clone()), value)),
        }
    }
}

impl ExactSizeIterator for Entries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_infers_shape() {
        assert_eq!(Store::from_value(json!([1, 2])).shape(), Shape::List);
        assert_eq!(Store::from_value(json!({"a": 1})).shape(), Shape::Map);
        assert!(Store::from_value(json!(null)).is_empty());
        assert_eq!(Store::from_value(json!(5)), Store::List(vec![json!(5)]));
    }

    #[test]
    fn map_rebuild_last_write_wins_first_position() {
        let store = Store::map([("a", json!(1)), ("b", json!(2)), ("a", json!(3))]);
        assert_eq!(store.to_value(), json!({"a": 3, "b": 2}));
        let keys: Vec<Key> = store.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Key::from("a"), Key::from("b")]);
    }

    #[test]
    fn numeric_keys_stay_in_insertion_order() {
        let store = Store::map([("a", json!("xoxo")), ("1337", json!(12))]);
        assert_eq!(store.get(&Key::Index(1337)), Some(&json!(12)));
        let values: Vec<&Value> = store.values().collect();
        assert_eq!(values, vec![&json!("xoxo"), &json!(12)]);
    }

    #[test]
    fn list_insert_bounds() {
        let mut store = Store::list([json!(1)]);
        store.insert(Key::Index(0), json!(9)).unwrap();
        store.insert(Key::Index(1), json!(2)).unwrap();
        assert_eq!(store.to_value(), json!([9, 2]));

        assert!(matches!(
            store.insert(Key::Index(5), json!(0)),
            Err(CollectError::IndexOutOfBounds { index: 5, len: 2 })
        ));
        assert!(matches!(
            store.insert(Key::from("name"), json!(0)),
            Err(CollectError::NotAnIndex(_))
        ));
    }

    #[test]
    fn remove_shifts_entries() {
        let mut store = Store::map([("a", json!(1)), ("b", json!(2)), ("c", json!(3))]);
        assert_eq!(store.remove(&Key::from("b")), Some(json!(2)));
        assert_eq!(store.remove(&Key::from("z")), None);
        assert_eq!(store.to_value(), json!({"a": 1, "c": 3}));
    }

    #[test]
    fn push_on_map_uses_next_numeric_key() {
        let mut store = Store::map([("a", json!(1)), ("4", json!(2))]);
        store.push(json!(3));
        assert_eq!(store.get(&Key::Index(5)), Some(&json!(3)));

        let mut padded = Store::map([("07", json!(1))]);
        padded.push(json!(2));
        assert_eq!(padded.get(&Key::Index(0)), Some(&json!(2)));

        let mut plain = Store::map([("a", json!(1))]);
        plain.push(json!(2));
        assert_eq!(plain.get(&Key::from("0")), Some(&json!(2)));
    }

    #[test]
    fn insert_at_moves_existing_key() {
        let mut store = Store::map([("a", json!(1)), ("b", json!(2))]);
        store.insert_at(0, Some("b".into()), json!(3));
        assert_eq!(store.to_value(), json!({"b": 3, "a": 1}));
        let keys: Vec<Key> = store.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Key::from("b"), Key::from("a")]);
    }

    #[test]
    fn entries_reverse() {
        let store = Store::list([json!("x"), json!("y")]);
        let last = store.entries().next_back();
        assert_eq!(last, Some((Key::Index(1), &json!("y"))));
    }
}
