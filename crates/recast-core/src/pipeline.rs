//! Deferred cast and transform pipelines
//!
//! A pipeline is a two-step protocol: `Overlay::cast(key)` or
//! `Overlay::transform(key)` hands back a [`Pending`] operation bound to that
//! key, and supplying a policy through its `to` method commits it: the policy
//! runs, the result is written back at the key, and the owning container is
//! returned so calls chain fluently.
//!
//! Both pipelines share the one [`Pending`] type; the mode parameter selects
//! how the stored value is presented to the policy. Casts coerce the value to
//! an ordered sequence first (repeated markup elements are collection-shaped);
//! transforms pass the value through untouched. A `Pending` is consumed by its
//! commit, so a second commit on the same operation is a compile error rather
//! than a silent double write.
//!
//! Copyright (c) 2025 Recast Team
//! Licensed under the Apache-2.0 license

use crate::overlay::Overlay;
use crate::{Error, Field, Result};
use serde_json::Value;
use std::marker::PhantomData;

/// A cast policy: rewrites a field from its sequence-coerced form.
///
/// Implement this on a unit type for a named, reusable cast (the static-apply
/// shape), or supply a closure: any `Fn(Vec<Value>) -> Result<Value>` is a
/// caster through the blanket impl.
pub trait Caster: Send + Sync {
    fn cast(&self, items: Vec<Value>) -> Result<Value>;
}

impl<F> Caster for F
where
    F: Fn(Vec<Value>) -> Result<Value> + Send + Sync,
{
    fn cast(&self, items: Vec<Value>) -> Result<Value> {
        self(items)
    }
}

/// A transform policy: rewrites a field from its current value, shape
/// untouched.
///
/// Any `Fn(Value) -> Result<Value>` is a transformer through the blanket
/// impl; transformer objects implement the trait directly.
pub trait Transformer: Send + Sync {
    fn transform(&self, value: Value) -> Result<Value>;
}

impl<F> Transformer for F
where
    F: Fn(Value) -> Result<Value> + Send + Sync,
{
    fn transform(&self, value: Value) -> Result<Value> {
        self(value)
    }
}

/// Marker for the cast commit mode
pub enum CastMode {}

/// Marker for the transform commit mode
pub enum TransformMode {}

/// A deferred single-key operation, bound to its owning container.
///
/// Exists only between `cast()`/`transform()` and the commit; it borrows the
/// container mutably, so it cannot be stored past the chained call and
/// nothing else can touch the record while it is pending.
#[must_use = "a pending operation does nothing until committed with `to`"]
pub struct Pending<'a, M> {
    owner: &'a mut Overlay,
    key: String,
    _mode: PhantomData<M>,
}

impl<'a, M> Pending<'a, M> {
    pub(crate) fn new(owner: &'a mut Overlay, key: String) -> Self {
        Self {
            owner,
            key,
            _mode: PhantomData,
        }
    }

    /// The key this operation is bound to
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<'a> Pending<'a, CastMode> {
    /// Commit with the supplied cast policy.
    ///
    /// Fails with [`Error::KeyNotFound`] when the bound key is absent: a cast
    /// rewrites an existing field, it never invents one.
    pub fn to<C: Caster>(self, policy: C) -> Result<&'a mut Overlay> {
        let Pending { owner, key, .. } = self;
        commit_cast(owner, key, &policy)
    }

    /// Commit with a cast policy registered by name on the owning container.
    ///
    /// Fails with [`Error::InvalidPolicy`] when no policy is registered under
    /// `name`.
    pub fn named(self, name: &str) -> Result<&'a mut Overlay> {
        let Pending { owner, key, .. } = self;
        let policy = owner.cast_policy(name).ok_or_else(|| Error::InvalidPolicy {
            name: name.to_string(),
            available: owner.cast_names(),
        })?;
        commit_cast(owner, key, policy.as_ref())
    }
}

impl<'a> Pending<'a, TransformMode> {
    /// Commit with the supplied transform policy.
    ///
    /// Fails with [`Error::KeyNotFound`] when the bound key is absent.
    pub fn to<T: Transformer>(self, policy: T) -> Result<&'a mut Overlay> {
        let Pending { owner, key, .. } = self;
        let current = owner.read(&key)?;
        let next = policy.transform(current)?;
        log::debug!("transform committed at key '{key}'");
        owner.write(key, Field::Plain(next));
        Ok(owner)
    }
}

fn commit_cast<'a>(
    owner: &'a mut Overlay,
    key: String,
    policy: &dyn Caster,
) -> Result<&'a mut Overlay> {
    let current = owner.read(&key)?;
    let items = coerce_sequence(current);
    let next = policy.cast(items)?;
    log::debug!("cast committed at key '{key}'");
    owner.write(key, Field::Plain(next));
    Ok(owner)
}

/// Coerce a normalized value into the ordered sequence casts operate on.
///
/// Arrays yield their items, mappings their values in order, `null` the empty
/// sequence, and a bare scalar a one-element sequence.
fn coerce_sequence(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}
