//! Field values and the normalization algorithm
//!
//! A record stores each value as a [`Field`]: either plain JSON data or an
//! opaque object that knows how to describe itself through one of three
//! serialization capabilities. Normalization reduces every field to plain
//! `serde_json::Value` data by probing those capabilities in a fixed priority
//! order.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Serialization capabilities an opaque field object may answer.
///
/// All three probes default to `None`; an implementation answers the ones it
/// supports. Normalization consults them in declaration order and uses the
/// first answer it gets:
///
/// 1. [`describe_json`](FieldObject::describe_json): the object produces its
///    own plain JSON representation. The output is trusted as-is and is not
///    re-normalized.
/// 2. [`json_string`](FieldObject::json_string): the object serializes itself
///    to a JSON-encoded string, which is decoded back into plain data.
/// 3. [`to_plain`](FieldObject::to_plain): the object converts itself to a
///    plain mapping or sequence.
///
/// Exactly one capability is used per value; they are alternatives, not
/// layers. An object answering none of them normalizes to `null` (and a
/// warning is logged naming the key), since an opaque object has no plain
/// shape to pass through.
pub trait FieldObject: fmt::Debug + Send {
    /// Self-describing JSON representation, trusted as already plain.
    fn describe_json(&self) -> Option<Value> {
        None
    }

    /// JSON-encoded string form, decoded during normalization.
    fn json_string(&self) -> Option<String> {
        None
    }

    /// Plain mapping/sequence conversion.
    fn to_plain(&self) -> Option<Value> {
        None
    }
}

/// A single stored value in a record: plain data or an opaque capability
/// object.
#[derive(Debug)]
pub enum Field {
    /// Plain JSON data, stored as-is
    Plain(Value),
    /// An opaque object reduced through its [`FieldObject`] capabilities
    Object(Box<dyn FieldObject>),
}

impl Field {
    /// Wrap an opaque capability object as a field
    pub fn object(obj: impl FieldObject + 'static) -> Self {
        Field::Object(Box::new(obj))
    }

    /// Wrap a plain JSON-compatible value as a field
    pub fn plain(value: impl Into<Value>) -> Self {
        Field::Plain(value.into())
    }

    /// True if this field holds plain data
    pub fn is_plain(&self) -> bool {
        matches!(self, Field::Plain(_))
    }

    /// Borrow the plain value, if this field holds one
    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            Field::Plain(value) => Some(value),
            Field::Object(_) => None,
        }
    }

    /// Reduce this field to plain data.
    ///
    /// `key` is only used for error messages and log context.
    pub fn normalize(&self, key: &str) -> Result<Value> {
        match self {
            Field::Plain(value) => Ok(value.clone()),
            Field::Object(obj) => {
                if let Some(value) = obj.describe_json() {
                    return Ok(value);
                }
                if let Some(encoded) = obj.json_string() {
                    return serde_json::from_str(&encoded).map_err(|source| Error::Json {
                        message: format!("field '{key}': json_string capability produced invalid JSON"),
                        source,
                    });
                }
                if let Some(value) = obj.to_plain() {
                    return Ok(value);
                }
                log::warn!("field '{key}': object answers no serialization capability, rendering null");
                Ok(Value::Null)
            }
        }
    }

    /// One-level normalization used by `Overlay::to_array`: the plain-array
    /// capability is preferred when present, everything else normalizes as
    /// [`normalize`](Field::normalize) does.
    pub(crate) fn normalize_shallow(&self, key: &str) -> Result<Value> {
        if let Field::Object(obj) = self {
            if let Some(value) = obj.to_plain() {
                return Ok(value);
            }
        }
        self.normalize(key)
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Plain(value)
    }
}
