//! The overlay container
//!
//! [`Overlay`] owns a record, an insertion-ordered mapping from string keys
//! to [`Field`] values, and exposes indexed access, iteration, the deferred
//! cast/transform pipelines, and normalization of the whole record into plain
//! JSON data.
//!
//! Records come from an upstream markup-document parser already materialized
//! in memory; they are small, so the backing store is a plain ordered vector
//! and key lookup is a linear scan.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use crate::pipeline::{CastMode, Caster, Pending, TransformMode, Transformer};
use crate::{Error, Field, Result};
use serde::ser::{Error as _, SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Typed overlay over a parsed record.
///
/// # Examples
///
/// ```
/// use recast_core::{Overlay, Result};
/// use serde_json::{json, Value};
///
/// fn main() -> Result<()> {
///     let mut record = Overlay::new(json!({
///         "name": "bob",
///         "tags": {"0": "x", "1": "y"},
///     }));
///
///     record
///         .cast("tags")
///         .to(|items: Vec<Value>| -> Result<Value> {
///             let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
///             Ok(Value::String(parts.join(",")))
///         })?
///         .transform("name")
///         .to(|v: Value| -> Result<Value> {
///             Ok(json!(v.as_str().unwrap_or_default().to_uppercase()))
///         })?;
///
///     assert_eq!(record.read("tags")?, json!("x,y"));
///     assert_eq!(record.read("name")?, json!("BOB"));
///     Ok(())
/// }
/// ```
pub struct Overlay {
    entries: Vec<(String, Field)>,
    casts: HashMap<String, Arc<dyn Caster>>,
}

impl Overlay {
    /// Build an overlay from any JSON value. Never fails; non-mapping input
    /// is coerced:
    ///
    /// - `null` → empty record
    /// - object → copied entry for entry, order preserved
    /// - array → entries keyed `"0"`, `"1"`, …
    /// - any scalar → a single entry at key `"0"`
    pub fn new(raw: Value) -> Self {
        let entries = match raw {
            Value::Null => Vec::new(),
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| (key, Field::Plain(value)))
                .collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, value)| (index.to_string(), Field::Plain(value)))
                .collect(),
            scalar => vec![("0".to_string(), Field::Plain(scalar))],
        };
        Self {
            entries,
            casts: HashMap::new(),
        }
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is present in the record
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Top-level keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Borrow the raw stored field at `key`, without normalization.
    ///
    /// Together with [`keys`](Overlay::keys) and [`write`](Overlay::write)
    /// this is the enumerate/mutate hook external whole-structure transform
    /// collaborators work through.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    /// Read the normalized value at `key`.
    ///
    /// Fails with [`Error::KeyNotFound`] when the key is absent.
    pub fn read(&self, key: &str) -> Result<Value> {
        match self.field(key) {
            Some(field) => field.normalize(key),
            None => Err(Error::key_not_found(key)),
        }
    }

    /// Insert or overwrite the field at `key`, preserving its position on
    /// overwrite
    pub fn write(&mut self, key: impl Into<String>, value: impl Into<Field>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Append a value at the next free integer index and return the assigned
    /// key.
    ///
    /// The index is one past the largest existing key that parses as an
    /// unsigned integer (`0` for a record with none); non-numeric keys are
    /// ignored by the scan, so they can never collide with an appended key.
    pub fn push(&mut self, value: impl Into<Field>) -> String {
        let key = self.next_index().to_string();
        log::debug!("appending at key '{key}'");
        self.entries.push((key.clone(), value.into()));
        key
    }

    /// Remove and return the field at `key`; `None` (and no other effect)
    /// when absent
    pub fn remove(&mut self, key: &str) -> Option<Field> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    /// Iterate `(key, field)` pairs in insertion order
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    /// The fully normalized record as a JSON object value. Side-effect-free;
    /// calling it twice without an intervening mutation returns structurally
    /// equal results.
    pub fn get(&self) -> Result<Value> {
        Ok(Value::Object(self.json_serialize()?))
    }

    /// The normalized record deserialized into a caller-chosen typed view
    pub fn get_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let value = self.get()?;
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Apply the normalization algorithm to every top-level value
    pub fn json_serialize(&self) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        for (key, field) in &self.entries {
            map.insert(key.clone(), field.normalize(key)?);
        }
        Ok(map)
    }

    /// One level of normalization: fields answering the plain-array
    /// capability expand through it, everything else normalizes as
    /// [`get`](Overlay::get) does
    pub fn to_array(&self) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        for (key, field) in &self.entries {
            map.insert(key.clone(), field.normalize_shallow(key)?);
        }
        Ok(map)
    }

    /// Serialize the normalized record to a compact JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.json_serialize()?).map_err(Error::from)
    }

    /// Serialize the normalized record to a pretty-printed JSON string
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.json_serialize()?).map_err(Error::from)
    }

    /// Re-materialize the record as a generic plain collection through a JSON
    /// round-trip, for hand-off to collection utilities that expect plain
    /// data
    pub fn collect(&self) -> Result<Map<String, Value>> {
        let encoded = self.to_json()?;
        serde_json::from_str(&encoded).map_err(Error::from)
    }

    /// Begin a deferred cast of the field at `key`.
    ///
    /// The returned pending operation commits through its `to` or `named`
    /// method and hands the container back for further chained calls.
    pub fn cast(&mut self, key: impl Into<String>) -> Pending<'_, CastMode> {
        Pending::new(self, key.into())
    }

    /// Begin a deferred transform of the field at `key`
    pub fn transform(&mut self, key: impl Into<String>) -> Pending<'_, TransformMode> {
        Pending::new(self, key.into())
    }

    /// Alias of [`transform`](Overlay::transform)
    pub fn expect(&mut self, key: impl Into<String>) -> Pending<'_, TransformMode> {
        self.transform(key)
    }

    /// Register a cast policy under `name`, for use with the cast pipeline's
    /// `named` commit
    pub fn register_cast(&mut self, name: impl Into<String>, policy: impl Caster + 'static) {
        self.casts.insert(name.into(), Arc::new(policy));
    }

    /// Apply one transformer to every top-level key in insertion order.
    ///
    /// Stops at the first failure; keys already visited keep their
    /// transformed values.
    pub fn transform_each<T: Transformer>(&mut self, policy: T) -> Result<&mut Self> {
        let keys: Vec<String> = self.keys().map(str::to_string).collect();
        for key in keys {
            let current = self.read(&key)?;
            let next = policy.transform(current)?;
            self.write(key, Field::Plain(next));
        }
        Ok(self)
    }

    pub(crate) fn cast_policy(&self, name: &str) -> Option<Arc<dyn Caster>> {
        self.casts.get(name).cloned()
    }

    pub(crate) fn cast_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.casts.keys().cloned().collect();
        names.sort();
        names
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn next_index(&self) -> u64 {
        self.entries
            .iter()
            .filter_map(|(key, _)| key.parse::<u64>().ok())
            .max()
            .map_or(0, |max| max + 1)
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl From<Value> for Overlay {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

impl FromIterator<(String, Field)> for Overlay {
    fn from_iter<I: IntoIterator<Item = (String, Field)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            casts: HashMap::new(),
        }
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("entries", &self.entries)
            .field("casts", &self.cast_names())
            .finish()
    }
}

/// Serializes the normalized record, so an `Overlay` can be handed straight
/// to any serde encoder
impl Serialize for Overlay {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, field) in &self.entries {
            let value = field.normalize(key).map_err(S::Error::custom)?;
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

/// Ordered iterator over `(key, field)` pairs
pub struct Iter<'a>(std::slice::Iter<'a, (String, Field)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Field);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, field)| (key.as_str(), field))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> IntoIterator for &'a Overlay {
    type Item = (&'a str, &'a Field);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
