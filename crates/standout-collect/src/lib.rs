//! Collect - Chainable collections over JSON-like values.
//!
//! Collect wraps a list or a map of [`serde_json::Value`]s and exposes a
//! fluent API for querying, reshaping and aggregating them. It supports:
//!
//! - Two shapes: ordered lists and insertion-ordered maps
//! - Filtering with loose (`100 == "100"`) or strict equality
//! - Grouping, keying, sorting and plucking by property name or callback
//! - Set operations, slicing, chunking and flattening
//! - Numeric aggregates that never lose integer precision
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use standout_collect::{collect, Op};
//!
//! let products = collect(json!([
//!     {"product": "Desk", "manufacturer": "IKEA", "price": 200},
//!     {"product": "Chair", "manufacturer": "IKEA", "price": 100},
//!     {"product": "Lamp", "manufacturer": "Muuto", "price": 150},
//! ]));
//!
//! let affordable = products
//!     .where_op("price", Op::Lte, 150)
//!     .sort_by("price")
//!     .pluck("product");
//! assert_eq!(affordable.all(), json!(["Chair", "Lamp"]));
//!
//! let by_maker = products.group_by("manufacturer").unwrap();
//! assert_eq!(by_maker.count(), 2);
//! assert_eq!(products.sum_by("price").to_string(), "450");
//! ```
//!
//! # Shapes
//!
//! A collection is either a **list** (keys are positions) or a **map**
//! (keys are strings, kept in insertion order). Transforms preserve the
//! receiver's shape unless they say otherwise:
//!
//! - **Same shape**: `map`, `flat_map`, `filter`, `reject`, `where_*`,
//!   `unique`, `sort*`, `reverse`, `slice`, `take`, `only`, `except`,
//!   `diff*`, `intersect`, `union`
//! - **Always a list**: `pluck`, `values`, `keys`, `chunk`, `collapse`,
//!   `flatten`, `for_page`, `zip`
//! - **Always a map**: `group_by`, `key_by`, `pluck_with_key`, `combine`,
//!   `flip`, `map_with_keys`
//!
//! # Equality
//!
//! Two relations are used throughout:
//!
//! - **Loose**: numbers and numeric strings compare by value, booleans act as
//!   `0`/`1`. Used by `where_eq`, `where_in_loose` and `search`.
//! - **Strict**: kind and value must match. Used by `contains`, `where_strict`,
//!   `where_in`, `unique`, `diff` and `intersect`.

mod accessor;
mod collection;
mod compare;
mod error;
mod key;
mod number;
mod op;
mod store;

// Re-export public API
pub use accessor::Accessor;
pub use collection::Collection;
pub use compare::{kind_name, loose_cmp, loose_eq, sort_cmp, strict_eq};
pub use error::{CollectError, Result};
pub use key::Key;
pub use number::Number;
pub use op::Op;
pub use store::{Entries, Shape, Store};

/// Wraps `items` in a [`Collection`].
///
/// Arrays become lists, objects become maps, `null` becomes an empty list
/// and any other scalar a list of one.
pub fn collect(items: impl Into<serde_json::Value>) -> Collection {
    Collection::from(items.into())
}
