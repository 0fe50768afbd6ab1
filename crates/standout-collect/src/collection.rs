//! The chainable collection container.
//!
//! [`Collection`] owns a [`Store`] and exposes three kinds of operations:
//!
//! - **Queries** take `&self` and return plain values (`count`, `get`, `sum`, ...)
//! - **Transforms** take `&self` and return a new `Collection` (`map`,
//!   `where_eq`, `group_by`, ...). The receiver is never modified.
//! - **Mutations** take `&mut self` and change the receiver in place (`push`,
//!   `pull`, `splice`, ...).
//!
//! Transforms keep the receiver's shape unless documented otherwise.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{debug, trace};

use crate::accessor::Accessor;
use crate::compare::{loose_eq, sort_cmp, strict_eq};
use crate::error::{CollectError, Result};
use crate::key::Key;
use crate::number::Number;
use crate::op::Op;
use crate::store::{Entries, Shape, Store};

/// A list or map of JSON values with a fluent query API.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_collect::{collect, Op};
///
/// let products = collect(json!([
///     {"product": "Desk", "price": 200},
///     {"product": "Chair", "price": 100},
///     {"product": "Bookcase", "price": 150},
///     {"product": "Door", "price": "100"},
/// ]));
///
/// // Loose equality: "100" matches 100
/// assert_eq!(products.where_eq("price", 100).count(), 2);
/// assert_eq!(products.where_strict("price", 100).count(), 1);
///
/// let cheap = products
///     .where_op("price", Op::Lt, 160)
///     .sort_by("price")
///     .pluck("product");
/// assert_eq!(cheap.all(), json!(["Chair", "Door", "Bookcase"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    store: Store,
}

impl Collection {
    /// Creates an empty list-shaped collection.
    pub fn new() -> Self {
        Collection::default()
    }

    /// Wraps an existing store.
    pub fn from_store(store: Store) -> Self {
        Collection { store }
    }

    /// Parses JSON text and wraps the result.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Collection::from(value))
    }

    /// Returns the shape of the backing store.
    pub fn shape(&self) -> Shape {
        self.store.shape()
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns the raw items: an array for lists, an object for maps.
    pub fn all(&self) -> Value {
        self.store.to_value()
    }

    /// Consumes the collection into its raw items.
    pub fn into_value(self) -> Value {
        self.store.into_value()
    }

    /// Iterates `(key, value)` entries in order.
    pub fn iter(&self) -> Entries<'_> {
        self.store.entries()
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the first value.
    pub fn first(&self) -> Option<&Value> {
        self.store.values().next()
    }

    /// Returns the first value for which `predicate` holds.
    pub fn first_where<F>(&self, mut predicate: F) -> Option<&Value>
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.store
            .entries()
            .find(|entry| predicate(entry.1, &entry.0))
            .map(|(_, value)| value)
    }

    /// Returns the last value.
    pub fn last(&self) -> Option<&Value> {
        self.store.values().next_back()
    }

    /// Returns the last value for which `predicate` holds.
    pub fn last_where<F>(&self, mut predicate: F) -> Option<&Value>
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.store
            .entries()
            .rev()
            .find(|entry| predicate(entry.1, &entry.0))
            .map(|(_, value)| value)
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.store.get(&key.into())
    }

    /// Returns the value under `key`, or `default` when absent.
    pub fn get_or(&self, key: impl Into<Key>, default: impl Into<Value>) -> Value {
        self.get(key).cloned().unwrap_or_else(|| default.into())
    }

    /// Returns the value under `key`, or the result of `default` when absent.
    ///
    /// `default` only runs when the key is missing.
    pub fn get_or_else<F>(&self, key: impl Into<Key>, default: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        self.get(key).cloned().unwrap_or_else(default)
    }

    /// Returns `true` if `key` is present.
    ///
    /// On a map this is a key lookup. On a list a position is checked against
    /// the length, while a name asks whether any record in the list has that
    /// property. A list without records treats a numeric name like `"1"` as
    /// a position, matching [`Collection::get`].
    pub fn has(&self, key: impl Into<Key>) -> bool {
        let key: Key = key.into();
        match (&self.store, &key) {
            (Store::Map(_), _) => self.store.position(&key).is_some(),
            (Store::List(values), Key::Index(i)) => *i < values.len(),
            (Store::List(values), Key::Name(name)) => {
                if values.iter().any(Value::is_object) {
                    values.iter().any(|value| {
                        value
                            .as_object()
                            .is_some_and(|record| record.contains_key(name))
                    })
                } else {
                    self.store.position(&key).is_some()
                }
            }
        }
    }

    /// Returns `true` if the collection holds `needle`.
    ///
    /// Lists test the values with strict equality; maps test the keys.
    pub fn contains(&self, needle: impl Into<Value>) -> bool {
        let needle: Value = needle.into();
        match &self.store {
            Store::List(values) => values.iter().any(|value| strict_eq(value, &needle)),
            Store::Map(_) => Key::from_value(&needle)
                .map(|key| self.store.position(&key).is_some())
                .unwrap_or(false),
        }
    }

    /// Returns `true` if the value under `key` strictly equals `value`.
    pub fn contains_pair(&self, key: impl Into<Key>, value: impl Into<Value>) -> bool {
        let value: Value = value.into();
        self.get(key).is_some_and(|found| strict_eq(found, &value))
    }

    /// Returns `true` if any entry satisfies `predicate`.
    pub fn contains_where<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.store.entries().any(|(key, value)| predicate(value, &key))
    }

    /// Returns the key of the first value loosely equal to `needle`.
    pub fn search(&self, needle: impl Into<Value>) -> Option<Key> {
        let needle: Value = needle.into();
        self.search_where(|value, _| loose_eq(value, &needle))
    }

    /// Returns the key of the first value strictly equal to `needle`.
    pub fn search_strict(&self, needle: impl Into<Value>) -> Option<Key> {
        let needle: Value = needle.into();
        self.search_where(|value, _| strict_eq(value, &needle))
    }

    /// Returns the key of the first entry satisfying `predicate`.
    pub fn search_where<F>(&self, mut predicate: F) -> Option<Key>
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.store
            .entries()
            .find(|entry| predicate(entry.1, &entry.0))
            .map(|(key, _)| key)
    }

    /// Sums the numeric values. Non-numbers are skipped.
    pub fn sum(&self) -> Number {
        total(self.numbers(None))
    }

    /// Sums the numeric values resolved by `accessor`.
    pub fn sum_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Number {
        total(self.numbers(Some(accessor.into())))
    }

    /// Arithmetic mean of the numeric values, `None` when there are none.
    pub fn avg(&self) -> Option<f64> {
        mean(self.numbers(None))
    }

    /// Arithmetic mean of the numeric values resolved by `accessor`.
    pub fn avg_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Option<f64> {
        mean(self.numbers(Some(accessor.into())))
    }

    /// Largest numeric value.
    pub fn max(&self) -> Option<Number> {
        extreme(self.numbers(None), Ordering::Greater)
    }

    /// Largest numeric value resolved by `accessor`.
    pub fn max_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Option<Number> {
        extreme(self.numbers(Some(accessor.into())), Ordering::Greater)
    }

    /// Smallest numeric value.
    pub fn min(&self) -> Option<Number> {
        extreme(self.numbers(None), Ordering::Less)
    }

    /// Smallest numeric value resolved by `accessor`.
    pub fn min_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Option<Number> {
        extreme(self.numbers(Some(accessor.into())), Ordering::Less)
    }

    /// Every `step`-th value, starting at position `offset`.
    pub fn every(&self, step: usize, offset: usize) -> Result<Vec<Value>> {
        if step == 0 {
            debug!(offset, "rejected every() with a zero step");
            return Err(CollectError::InvalidStep);
        }
        Ok(self.store.values().skip(offset).step_by(step).cloned().collect())
    }

    /// Joins the values with `glue`.
    ///
    /// Strings are used verbatim, `null` as the empty string, and everything
    /// else by its compact JSON text.
    pub fn implode(&self, glue: &str) -> String {
        join(self.store.values().map(text), glue)
    }

    /// Joins the values resolved by `accessor` with `glue`.
    pub fn implode_by<'a>(&self, accessor: impl Into<Accessor<'a>>, glue: &str) -> String {
        let accessor: Accessor<'_> = accessor.into();
        join(
            self.store
                .entries()
                .map(|(key, value)| text(&accessor.resolve(value, &key))),
            glue,
        )
    }

    /// Folds the entries left to right, seeded with the first value.
    ///
    /// Returns `None` for an empty collection.
    pub fn reduce<F>(&self, mut f: F) -> Option<Value>
    where
        F: FnMut(Value, &Value, &Key) -> Value,
    {
        let mut entries = self.store.entries();
        let (_, first) = entries.next()?;
        Some(entries.fold(first.clone(), |carry, (key, value)| f(carry, value, &key)))
    }

    /// Folds the entries left to right from `initial`.
    pub fn fold<T, F>(&self, initial: T, mut f: F) -> T
    where
        F: FnMut(T, &Value, &Key) -> T,
    {
        self.store
            .entries()
            .fold(initial, |carry, (key, value)| f(carry, value, &key))
    }

    /// Passes the collection to `f` and returns whatever it returns.
    pub fn pipe<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        f(self)
    }

    /// Serializes the items as compact JSON, keeping key order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Calls `f` for every entry in order.
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Value, &Key),
    {
        for (key, value) in self.store.entries() {
            f(value, &key);
        }
        self
    }

    /// Calls `f` for every entry in order until it returns `false`.
    pub fn each_while<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        for (key, value) in self.store.entries() {
            if !f(value, &key) {
                break;
            }
        }
        self
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Replaces every value with `f(value, key)`, keeping keys and shape.
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Value, &Key) -> Value,
    {
        self.rebuild(
            self.store
                .entries()
                .map(|(key, value)| {
                    let mapped = f(value, &key);
                    (key, mapped)
                })
                .collect::<Vec<_>>(),
        )
    }

    /// Keeps the entries for which `predicate` holds.
    ///
    /// Maps keep their keys; lists are compacted.
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.retain_where(|value, key| predicate(value, key))
    }

    /// Drops the entries for which `predicate` holds.
    pub fn reject<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        self.retain_where(|value, key| !predicate(value, key))
    }

    /// Keeps entries whose resolved field loosely equals `value`.
    pub fn where_eq<'a>(&self, accessor: impl Into<Accessor<'a>>, value: impl Into<Value>) -> Self {
        self.where_op(accessor, Op::Eq, value)
    }

    /// Keeps entries whose resolved field satisfies `field <op> value`.
    pub fn where_op<'a>(
        &self,
        accessor: impl Into<Accessor<'a>>,
        op: Op,
        value: impl Into<Value>,
    ) -> Self {
        let accessor: Accessor<'_> = accessor.into();
        let value: Value = value.into();
        self.retain_where(|item, key| op.eval(&accessor.resolve(item, key), &value))
    }

    /// Keeps entries whose resolved field strictly equals `value`.
    pub fn where_strict<'a>(
        &self,
        accessor: impl Into<Accessor<'a>>,
        value: impl Into<Value>,
    ) -> Self {
        self.where_op(accessor, Op::StrictEq, value)
    }

    /// Keeps entries whose resolved field is strictly equal to one of `values`.
    pub fn where_in<'a, I>(&self, accessor: impl Into<Accessor<'a>>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.where_in_with(accessor.into(), values, strict_eq)
    }

    /// Like [`Collection::where_in`], but membership uses loose equality.
    pub fn where_in_loose<'a, I>(&self, accessor: impl Into<Accessor<'a>>, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.where_in_with(accessor.into(), values, loose_eq)
    }

    /// Keeps the first entry of every distinct value (strict equality).
    pub fn unique(&self) -> Self {
        let mut seen: Vec<Value> = Vec::new();
        self.retain_where(|value, _| {
            if seen.iter().any(|earlier| strict_eq(earlier, value)) {
                false
            } else {
                seen.push(value.clone());
                true
            }
        })
    }

    /// Keeps the first entry of every distinct value resolved by `accessor`.
    pub fn unique_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Self {
        let accessor: Accessor<'_> = accessor.into();
        let mut seen: Vec<Value> = Vec::new();
        self.retain_where(|value, key| {
            let resolved = accessor.resolve(value, key);
            if seen.iter().any(|earlier| strict_eq(earlier, &resolved)) {
                false
            } else {
                seen.push(resolved.into_owned());
                true
            }
        })
    }

    /// Lists the values resolved by `accessor`.
    pub fn pluck<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Self {
        let accessor: Accessor<'_> = accessor.into();
        Collection::from_store(Store::list(
            self.store
                .entries()
                .map(|(key, value)| accessor.resolve(value, &key).into_owned()),
        ))
    }

    /// Maps the value resolved by `index` to the value resolved by `accessor`.
    ///
    /// Later entries win when two resolve to the same index.
    pub fn pluck_with_key<'a, 'b>(
        &self,
        accessor: impl Into<Accessor<'a>>,
        index: impl Into<Accessor<'b>>,
    ) -> Result<Self> {
        let accessor: Accessor<'_> = accessor.into();
        let index: Accessor<'_> = index.into();
        let pairs = self
            .store
            .entries()
            .map(|(key, value)| {
                let name = map_key(&index.resolve(value, &key), "pluck_with_key")?;
                Ok((name, accessor.resolve(value, &key).into_owned()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Collection::from_store(Store::map(pairs)))
    }

    /// Groups values by the key resolved by `accessor`.
    ///
    /// Produces a map of arrays. Groups appear in the order their key was
    /// first seen and keep the relative order of their members.
    pub fn group_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Result<Self> {
        let accessor: Accessor<'_> = accessor.into();
        let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
        for (key, value) in self.store.entries() {
            let name = map_key(&accessor.resolve(value, &key), "group_by")?;
            match groups.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, members)) => members.push(value.clone()),
                None => groups.push((name, vec![value.clone()])),
            }
        }
        trace!(groups = groups.len(), "grouped collection");
        Ok(Collection::from_store(Store::map(
            groups
                .into_iter()
                .map(|(name, members)| (name, Value::Array(members))),
        )))
    }

    /// Keys values by the key resolved by `accessor`. Later entries win.
    pub fn key_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Result<Self> {
        let accessor: Accessor<'_> = accessor.into();
        let pairs = self
            .store
            .entries()
            .map(|(key, value)| {
                let name = map_key(&accessor.resolve(value, &key), "key_by")?;
                Ok((name, value.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Collection::from_store(Store::map(pairs)))
    }

    /// Sorts values ascending.
    pub fn sort(&self) -> Self {
        self.sort_with(sort_cmp)
    }

    /// Sorts values with a caller-supplied comparator. The sort is stable.
    pub fn sort_with<F>(&self, mut compare: F) -> Self
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut entries = self.owned_entries();
        entries.sort_by(|(_, a), (_, b)| compare(a, b));
        self.rebuild(entries)
    }

    /// Sorts ascending by the value resolved by `accessor`.
    ///
    /// The sort is stable and entries that resolve to nothing sort last.
    pub fn sort_by<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Self {
        self.sort_resolved(accessor.into(), sort_cmp)
    }

    /// Sorts descending by the value resolved by `accessor`.
    ///
    /// Ties keep their original order; entries that resolve to nothing
    /// still sort last.
    pub fn sort_by_desc<'a>(&self, accessor: impl Into<Accessor<'a>>) -> Self {
        self.sort_resolved(accessor.into(), |a, b| match (a, b) {
            (Value::Null, _) | (_, Value::Null) => sort_cmp(a, b),
            _ => sort_cmp(b, a),
        })
    }

    /// Reverses the entry order.
    pub fn reverse(&self) -> Self {
        let mut entries = self.owned_entries();
        entries.reverse();
        self.rebuild(entries)
    }

    /// Splits the values into arrays of at most `size` items.
    pub fn chunk(&self, size: usize) -> Result<Self> {
        if size == 0 {
            debug!(count = self.count(), "rejected chunk() with size 0");
            return Err(CollectError::InvalidChunkSize);
        }
        let values: Vec<Value> = self.store.values().cloned().collect();
        Ok(Collection::from_store(Store::list(
            values.chunks(size).map(|chunk| Value::Array(chunk.to_vec())),
        )))
    }

    /// Flattens one level of nested arrays into a list.
    ///
    /// Values that are not arrays are kept as they are.
    pub fn collapse(&self) -> Self {
        let mut out = Vec::new();
        for value in self.store.values() {
            spread(value.clone(), &mut out);
        }
        Collection::from_store(Store::List(out))
    }

    /// Lists every leaf value, descending into arrays and records.
    pub fn flatten(&self) -> Self {
        self.flatten_depth(usize::MAX)
    }

    /// Lists leaf values, descending at most `depth` levels.
    ///
    /// With `depth == 1`, the elements (or record values) of each top-level
    /// value are listed as they are.
    pub fn flatten_depth(&self, depth: usize) -> Self {
        let mut out = Vec::new();
        for value in self.store.values() {
            descend(value, depth, &mut out);
        }
        Collection::from_store(Store::List(out))
    }

    /// Maps every entry with `f` and flattens one level of the results.
    ///
    /// On a list, array results are spread into the output list. A map keeps
    /// its keys and shape: every key maps to what `f` returned for it.
    pub fn flat_map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Value, &Key) -> Value,
    {
        if self.shape() == Shape::Map {
            return self.map(f);
        }
        let mut out = Vec::new();
        for (key, value) in self.store.entries() {
            spread(f(value, &key), &mut out);
        }
        Collection::from_store(Store::List(out))
    }

    /// Uses the values as keys for the positionally matching `values`.
    ///
    /// Keys without a partner map to `null`.
    pub fn combine(&self, values: impl Into<Collection>) -> Result<Self> {
        let values: Collection = values.into();
        let partners: Vec<Value> = values
            .store
            .into_entries()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        let pairs = self
            .store
            .values()
            .enumerate()
            .map(|(i, key)| {
                let name = map_key(key, "combine")?;
                Ok((name, partners.get(i).cloned().unwrap_or(Value::Null)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Collection::from_store(Store::map(pairs)))
    }

    /// Swaps keys and values.
    ///
    /// Fails if a value is not a string, number or bool.
    pub fn flip(&self) -> Result<Self> {
        let pairs = self
            .store
            .entries()
            .map(|(key, value)| Ok((map_key(value, "flip")?, key.to_value())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Collection::from_store(Store::map(pairs)))
    }

    /// Merges `other` into a copy of the receiver.
    ///
    /// A list receiver appends the other values. A map receiver adds the other
    /// entries by key, overwriting values already present.
    pub fn merge(&self, other: impl Into<Collection>) -> Self {
        let other: Collection = other.into();
        let other = other.store.into_entries();
        match &self.store {
            Store::List(values) => Collection::from_store(Store::list(
                values.iter().cloned().chain(other.into_iter().map(|(_, value)| value)),
            )),
            Store::Map(pairs) => Collection::from_store(Store::map(
                pairs
                    .iter()
                    .cloned()
                    .chain(other.into_iter().map(|(key, value)| (key.into_name(), value))),
            )),
        }
    }

    /// Adds the entries of `other` whose keys the receiver lacks.
    ///
    /// On a key collision the receiver's value wins. For lists, keys are
    /// positions, so only the other list's surplus tail is appended.
    pub fn union(&self, other: impl Into<Collection>) -> Self {
        let mut entries = self.owned_entries();
        let other: Collection = other.into();
        for (key, value) in other.store.into_entries() {
            if self.store.position(&key).is_none() {
                entries.push((key, value));
            }
        }
        self.rebuild(entries)
    }

    /// Keeps values that do not occur in `other` (strict equality).
    pub fn diff(&self, other: impl Into<Collection>) -> Self {
        let other: Collection = other.into();
        self.retain_where(|value, _| !other.store.values().any(|o| strict_eq(value, o)))
    }

    /// Keeps values that also occur in `other` (strict equality).
    pub fn intersect(&self, other: impl Into<Collection>) -> Self {
        let other: Collection = other.into();
        self.retain_where(|value, _| other.store.values().any(|o| strict_eq(value, o)))
    }

    /// Keeps entries whose key is absent from `other`.
    pub fn diff_keys(&self, other: impl Into<Collection>) -> Self {
        let other: Collection = other.into();
        self.retain_where(|_, key| other.store.position(key).is_none())
    }

    /// Keeps only the entries under `keys`, in receiver order.
    pub fn only<I>(&self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        self.retain_where(|_, key| keys.iter().any(|k| k.as_name() == key.as_name()))
    }

    /// Drops the entries under `keys`.
    pub fn except<I>(&self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        self.retain_where(|_, key| !keys.iter().any(|k| k.as_name() == key.as_name()))
    }

    /// Lists the values on 1-indexed `page` with `per_page` values per page.
    ///
    /// Page 0 is treated as page 1.
    pub fn for_page(&self, page: usize, per_page: usize) -> Self {
        let start = page.saturating_sub(1).saturating_mul(per_page);
        Collection::from_store(Store::list(
            self.store.values().skip(start).take(per_page).cloned(),
        ))
    }

    /// Returns `length` entries (or the rest) starting at `offset`.
    ///
    /// A negative offset counts from the end.
    pub fn slice(&self, offset: isize, length: Option<usize>) -> Self {
        let start = clamp_offset(offset, self.count());
        let length = length.unwrap_or(usize::MAX);
        self.rebuild(self.owned_entries().into_iter().skip(start).take(length).collect())
    }

    /// Returns the first `limit` entries, or the last `-limit` when negative.
    pub fn take(&self, limit: isize) -> Self {
        if limit < 0 {
            self.slice(limit, None)
        } else {
            self.slice(0, Some(limit.unsigned_abs()))
        }
    }

    /// Pairs every value with the value at the same position in `other`.
    ///
    /// The result has the receiver's length; missing partners are `null`.
    pub fn zip(&self, other: impl Into<Collection>) -> Self {
        let other: Collection = other.into();
        let mut partners = other.store.values();
        Collection::from_store(Store::list(self.store.values().map(|value| {
            let partner = partners.next().cloned().unwrap_or(Value::Null);
            Value::Array(vec![value.clone(), partner])
        })))
    }

    /// Builds a map from the `(key, value)` pair `f` returns for every entry.
    pub fn map_with_keys<K, F>(&self, mut f: F) -> Self
    where
        K: Into<String>,
        F: FnMut(&Value, &Key) -> (K, Value),
    {
        Collection::from_store(Store::map(
            self.store
                .entries()
                .map(|(key, value)| {
                    let (name, mapped) = f(value, &key);
                    let name: String = name.into();
                    (name, mapped)
                })
                .collect::<Vec<_>>(),
        ))
    }

    /// Lists the values, dropping keys.
    pub fn values(&self) -> Self {
        Collection::from_store(Store::list(self.store.values().cloned()))
    }

    /// Lists the keys.
    ///
    /// For a list that holds records, this is every property name seen across
    /// the records in first-seen order. For a list of scalars it is the
    /// positions.
    pub fn keys(&self) -> Self {
        let keys = match &self.store {
            Store::Map(pairs) => pairs
                .iter()
                .map(|(name, _)| Value::String(name.clone()))
                .collect(),
            Store::List(values) if values.iter().any(Value::is_object) => {
                let mut seen: Vec<&String> = Vec::new();
                for record in values.iter().filter_map(Value::as_object) {
                    for name in record.keys() {
                        if !seen.contains(&name) {
                            seen.push(name);
                        }
                    }
                }
                seen.into_iter().map(|name| Value::String(name.clone())).collect()
            }
            Store::List(values) => (0..values.len()).map(Value::from).collect(),
        };
        Collection::from_store(Store::List(keys))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Appends `value`. Maps key it one past their largest numeric key.
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.store.push(value.into());
        self
    }

    /// Inserts `value` at the front.
    pub fn prepend(&mut self, value: impl Into<Value>) -> &mut Self {
        self.store.insert_at(0, None, value.into());
        self
    }

    /// Inserts `value` under `key` as the first entry.
    ///
    /// Lists have no semantic keys, so there `key` is ignored.
    pub fn prepend_with_key(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        let name = match self.store {
            Store::List(_) => None,
            Store::Map(_) => Some(Key::into_name(key.into())),
        };
        self.store.insert_at(0, name, value.into());
        self
    }

    /// Inserts or overwrites the value under `key`.
    ///
    /// On a list, `key` must be a position no greater than the length.
    pub fn put(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<&mut Self> {
        let key: Key = key.into();
        if let Err(err) = self.store.insert(key.clone(), value.into()) {
            debug!(key = %key, shape = %self.shape(), "rejected put()");
            return Err(err);
        }
        Ok(self)
    }

    /// Removes and returns the last value.
    pub fn pop(&mut self) -> Option<Value> {
        let last = self.count().checked_sub(1)?;
        self.store.remove_at(last).map(|(_, value)| value)
    }

    /// Removes and returns the first value.
    pub fn shift(&mut self) -> Option<Value> {
        self.store.remove_at(0).map(|(_, value)| value)
    }

    /// Removes and returns the value under `key`.
    pub fn pull(&mut self, key: impl Into<Key>) -> Option<Value> {
        self.store.remove(&key.into())
    }

    /// Removes the entry under `key`, if present.
    pub fn forget(&mut self, key: impl Into<Key>) -> &mut Self {
        self.store.remove(&key.into());
        self
    }

    /// Removes `length` entries (or the rest) from `offset` and returns them.
    pub fn splice(&mut self, offset: isize, length: Option<usize>) -> Collection {
        self.splice_with(offset, length, Vec::<Value>::new())
    }

    /// Removes entries like [`Collection::splice`] and inserts `replacement`
    /// in their place.
    ///
    /// A negative offset counts from the end. On a map, replacement values
    /// are keyed like [`Collection::push`].
    pub fn splice_with<I>(
        &mut self,
        offset: isize,
        length: Option<usize>,
        replacement: I,
    ) -> Collection
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let len = self.count();
        let start = clamp_offset(offset, len);
        let count = length.unwrap_or(len).min(len - start);

        let mut removed = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(entry) = self.store.remove_at(start) {
                removed.push(entry);
            }
        }
        let mut inserted = 0;
        for value in replacement {
            self.store.insert_at(start + inserted, None, value.into());
            inserted += 1;
        }
        trace!(start, removed = removed.len(), inserted, "spliced collection");
        Collection::from_store(self.store.same_shape(removed))
    }

    /// Replaces every value in place with `f(value, key)`.
    pub fn transform<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(&Value, &Key) -> Value,
    {
        self.store.for_each_mut(|key, value| *value = f(value, key));
        self
    }

    // ========================================================================
    // Randomness
    // ========================================================================

    /// Returns one value chosen uniformly at random.
    #[cfg(feature = "random")]
    pub fn random(&self) -> Option<Value> {
        self.random_with(&mut rand::thread_rng())
    }

    /// Returns one value chosen uniformly with `rng`.
    #[cfg(feature = "random")]
    pub fn random_with<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        let position = rng.gen_range(0..self.count());
        self.store.values().nth(position).cloned()
    }

    /// Returns `count` distinct entries chosen uniformly at random.
    #[cfg(feature = "random")]
    pub fn random_many(&self, count: usize) -> Result<Self> {
        self.random_many_with(&mut rand::thread_rng(), count)
    }

    /// Returns `count` distinct entries chosen uniformly with `rng`.
    ///
    /// Map entries keep their keys.
    #[cfg(feature = "random")]
    pub fn random_many_with<R: rand::Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Self> {
        let available = self.count();
        if count > available {
            debug!(count, available, "rejected random_many()");
            return Err(CollectError::NotEnoughItems {
                requested: count,
                available,
            });
        }
        let mut entries: Vec<Option<(Key, Value)>> =
            self.owned_entries().into_iter().map(Some).collect();
        let picked = rand::seq::index::sample(rng, available, count)
            .into_iter()
            .filter_map(|i| entries[i].take())
            .collect::<Vec<_>>();
        Ok(self.rebuild(picked))
    }

    /// Returns a shuffled copy.
    #[cfg(feature = "random")]
    pub fn shuffle(&self) -> Self {
        self.shuffle_with(&mut rand::thread_rng())
    }

    /// Returns a copy shuffled with `rng`. Map entries keep their keys.
    #[cfg(feature = "random")]
    pub fn shuffle_with<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Self {
        use rand::seq::SliceRandom;

        let mut entries = self.owned_entries();
        entries.shuffle(rng);
        self.rebuild(entries)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn owned_entries(&self) -> Vec<(Key, Value)> {
        self.store.clone().into_entries()
    }

    fn rebuild(&self, entries: Vec<(Key, Value)>) -> Self {
        Collection::from_store(self.store.same_shape(entries))
    }

    fn retain_where<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Value, &Key) -> bool,
    {
        let kept = self
            .store
            .entries()
            .filter(|entry| keep(entry.1, &entry.0))
            .map(|(key, value)| (key, value.clone()))
            .collect();
        self.rebuild(kept)
    }

    fn where_in_with<I>(
        &self,
        accessor: Accessor<'_>,
        values: I,
        eq: fn(&Value, &Value) -> bool,
    ) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.retain_where(|item, key| {
            let resolved = accessor.resolve(item, key);
            values.iter().any(|candidate| eq(&resolved, candidate))
        })
    }

    fn sort_resolved<C>(&self, accessor: Accessor<'_>, compare: C) -> Self
    where
        C: Fn(&Value, &Value) -> Ordering,
    {
        let mut decorated: Vec<(Value, (Key, Value))> = self
            .store
            .entries()
            .map(|(key, value)| {
                let resolved = accessor.resolve(value, &key).into_owned();
                (resolved, (key, value.clone()))
            })
            .collect();
        decorated.sort_by(|(a, _), (b, _)| compare(a, b));
        self.rebuild(decorated.into_iter().map(|(_, entry)| entry).collect())
    }

    fn numbers(&self, accessor: Option<Accessor<'_>>) -> Vec<Number> {
        self.store
            .entries()
            .filter_map(|(key, value)| match &accessor {
                Some(accessor) => Number::from_value(&accessor.resolve(value, &key)),
                None => Number::from_value(value),
            })
            .collect()
    }
}

fn map_key(value: &Value, operation: &'static str) -> Result<String> {
    Key::from_value(value).map(Key::into_name).map_err(|err| {
        debug!(operation, error = %err, "value cannot become a key");
        err
    })
}

fn clamp_offset(offset: isize, len: usize) -> usize {
    if offset < 0 {
        len.saturating_sub(offset.unsigned_abs())
    } else {
        offset.unsigned_abs().min(len)
    }
}

fn total(numbers: Vec<Number>) -> Number {
    numbers.into_iter().fold(Number::I64(0), Number::add)
}

fn mean(numbers: Vec<Number>) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    let count = numbers.len() as f64;
    Some(total(numbers).to_f64() / count)
}

fn extreme(numbers: Vec<Number>, wanted: Ordering) -> Option<Number> {
    numbers.into_iter().reduce(|best, n| {
        if n.compare(best) == Some(wanted) {
            n
        } else {
            best
        }
    })
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn join(parts: impl Iterator<Item = String>, glue: &str) -> String {
    parts.collect::<Vec<_>>().join(glue)
}

fn spread(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => out.extend(items),
        other => out.push(other),
    }
}

fn descend(value: &Value, depth: usize, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) if depth > 0 => {
            for item in items {
                descend(item, depth - 1, out);
            }
        }
        Value::Object(record) if depth > 0 => {
            for item in record.values() {
                descend(item, depth - 1, out);
            }
        }
        leaf => out.push(leaf.clone()),
    }
}

impl From<Value> for Collection {
    fn from(value: Value) -> Self {
        Collection::from_store(Store::from_value(value))
    }
}

impl From<Vec<Value>> for Collection {
    fn from(values: Vec<Value>) -> Self {
        Collection::from_store(Store::List(values))
    }
}

impl From<&Collection> for Collection {
    fn from(collection: &Collection) -> Self {
        collection.clone()
    }
}

impl FromIterator<Value> for Collection {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Collection::from_store(Store::list(iter))
    }
}

impl FromIterator<(String, Value)> for Collection {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Collection::from_store(Store::map(iter))
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.store {
            Store::List(values) => serializer.collect_seq(values),
            Store::Map(pairs) => {
                serializer.collect_map(pairs.iter().map(|(name, value)| (name, value)))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Collection::from)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn products() -> Collection {
        Collection::from(json!([
            {"id": 100, "product": "Chair", "manufacturer": "IKEA", "price": "1490 NOK"},
            {"id": 150, "product": "Desk", "manufacturer": "IKEA", "price": "900 NOK"},
            {"id": 200, "product": "Chair", "manufacturer": "Herman Miller", "price": "9990 NOK"},
        ]))
    }

    #[test]
    fn transforms_keep_shape() {
        let map = Collection::from(json!({"a": 1, "b": 2, "c": 3}));
        let filtered = map.filter(|value, _| value.as_i64() != Some(2));
        assert_eq!(filtered.shape(), Shape::Map);
        assert_eq!(filtered.all(), json!({"a": 1, "c": 3}));

        let list = Collection::from(json!([1, 2, 3]));
        let filtered = list.filter(|value, _| value.as_i64() != Some(2));
        assert_eq!(filtered.shape(), Shape::List);
        assert_eq!(filtered.get(1usize), Some(&json!(3)));
    }

    #[test]
    fn map_passes_keys() {
        let map = Collection::from(json!({"a": 1, "b": 2}));
        let labelled = map.map(|value, key| json!(format!("{key}={value}")));
        assert_eq!(labelled.all(), json!({"a": "a=1", "b": "b=2"}));
    }

    #[test]
    fn group_by_rejects_unusable_keys() {
        let items = Collection::from(json!([{"tags": ["a"]}, {"tags": ["b"]}]));
        assert!(matches!(
            items.group_by("tags"),
            Err(CollectError::UnusableKey { kind: "array" })
        ));
    }

    #[test]
    fn group_by_keeps_first_seen_order() {
        let grouped = products().group_by("manufacturer").unwrap();
        let keys: Vec<Key> = grouped.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![Key::from("IKEA"), Key::from("Herman Miller")]);
        assert_eq!(grouped.get("IKEA").and_then(Value::as_array).map(Vec::len), Some(2));
    }

    #[test]
    fn sort_by_desc_is_stable() {
        let items = Collection::from(json!([
            {"n": "a", "rank": 1},
            {"n": "b", "rank": 2},
            {"n": "c", "rank": 1},
            {"n": "d"},
        ]));
        let sorted = items.sort_by_desc("rank").pluck("n");
        assert_eq!(sorted.all(), json!(["b", "a", "c", "d"]));
    }

    #[test]
    fn clamp_offset_handles_negatives() {
        assert_eq!(clamp_offset(-2, 5), 3);
        assert_eq!(clamp_offset(-9, 5), 0);
        assert_eq!(clamp_offset(7, 5), 5);
        assert_eq!(clamp_offset(2, 5), 2);
    }

    #[test]
    fn splice_on_map_keeps_removed_keys() {
        let mut map = Collection::from(json!({"a": 1, "b": 2, "c": 3}));
        let removed = map.splice(1, Some(1));
        assert_eq!(removed.all(), json!({"b": 2}));
        assert_eq!(map.all(), json!({"a": 1, "c": 3}));
    }

    #[test]
    fn put_on_list_requires_position() {
        let mut list = Collection::from(json!([1, 2]));
        assert!(list.put(2usize, 3).is_ok());
        assert!(matches!(list.put("name", 4), Err(CollectError::NotAnIndex(_))));
        assert_eq!(list.all(), json!([1, 2, 3]));
    }

    #[test]
    fn display_is_compact_json() {
        let map = Collection::from(json!({"id": 384, "name": "Rayquaza"}));
        assert_eq!(map.to_string(), r#"{"id":384,"name":"Rayquaza"}"#);
    }

    #[test]
    fn avg_of_empty_is_none() {
        assert_eq!(Collection::new().avg(), None);
        assert_eq!(Collection::new().sum(), Number::I64(0));
        assert_eq!(Collection::new().max(), None);
    }
}
