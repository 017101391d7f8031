//! Free-form metadata bags attached to executors and tasks.
//!
//! The core never inspects metadata contents — only merges and versions
//! them (spec §9 "Dynamic metadata bags"). `MetadataValue` models an
//! arbitrary JSON-like value so that language bindings built on top of
//! this crate have a concrete, serializable shape to marshal into.

use im::HashMap as ImHashMap;
use serde::{Deserialize, Serialize};

/// A single metadata value: a sum type covering the shapes user
/// metadata commonly takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataValue {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// A floating point number.
    F64(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// An ordered list of values.
    Array(Vec<MetadataValue>),
    /// A nested map of values.
    Map(Metadata),
}

/// A metadata bag: a map from string key to [`MetadataValue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Metadata(pub ImHashMap<String, MetadataValue>);

impl Metadata {
    /// An empty metadata bag.
    pub fn empty() -> Self {
        Metadata(ImHashMap::new())
    }

    /// Build a `Metadata` from an iterator of `(key, value)` pairs.
    pub fn from_pairs<I: IntoIterator<Item = (String, MetadataValue)>>(pairs: I) -> Self {
        Metadata(pairs.into_iter().collect())
    }

    /// Shallow "right wins" merge: every top-level key present in
    /// `other` overwrites (or inserts) the corresponding key in `self`.
    /// Keys present only in `self` are left untouched. Nested maps are
    /// *not* merged recursively — a `Map` value in `other` simply
    /// replaces whatever was at that key in `self`.
    pub fn merge(&mut self, other: &Metadata) {
        for (k, v) in other.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Whether the bag has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
