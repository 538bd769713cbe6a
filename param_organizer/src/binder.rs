//! Sequential parameter binding.
//!
//! A [`ParameterBinder`] walks a fixed list of positional values with a
//! single cursor. Each `bind` call names an output slot and the types it
//! accepts; the value under the cursor either fills the slot (and the
//! cursor moves on) or is left where it is for the next call. Slots are
//! collected into [`Bindings`], read by name once the chain is done.
//!
//! Matching is positional, not type-dispatched: a value rejected by one
//! slot is never skipped, so it keeps blocking every later slot.

use std::fmt;

use param_organizer_runtime::{HostRuntime, RuntimeError, RuntimeResult, Value};

use crate::matching::check;
use crate::types::ExpectedTypes;
use crate::BuiltinHost;

/// State of one output slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    /// Bound or default value; `None` if neither was ever written
    pub value: Option<Value>,
    /// The last bind for this slot took a value from the input
    pub filled: bool,
    /// The current value came from `default_value`
    pub defaulted: bool,
}

/// Output slots in the order they were first bound
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    slots: Vec<(String, Slot)>,
}

impl Bindings {
    /// Index of `name`, creating an empty slot if it was never bound
    fn entry(&mut self, name: &str) -> usize {
        match self.slots.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.slots.push((name.to_string(), Slot::default()));
                self.slots.len() - 1
            }
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot {
        &mut self.slots[index].1
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Value held by `name`, if any
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slot(name).and_then(|s| s.value.as_ref())
    }

    /// Value held by `name`, or an error naming the slot
    pub fn require(&self, name: &str) -> RuntimeResult<&Value> {
        self.get(name).ok_or_else(|| RuntimeError::unbound_slot(name))
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Whether the last bind for `name` took a value from the input
    pub fn is_filled(&self, name: &str) -> bool {
        self.slot(name).is_some_and(|s| s.filled)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(n, s)| (n.as_str(), s))
    }
}

/// Final state of a binding chain
#[derive(Debug, Clone, PartialEq)]
pub struct Organized {
    pub valid: bool,
    pub bindings: Bindings,
}

#[derive(Debug, Clone, Copy)]
struct LastBind {
    index: usize,
    filled: bool,
}

/// Binds positional values to named slots, one `bind` call at a time.
///
/// ```
/// use param_organizer::prelude::*;
///
/// let binder = organize(vec![Value::from("abc")])
///     .bind("count", "int", false)
///     .default_value(10i64)
///     .bind("label", "string", true);
///
/// assert!(binder.is_valid());
/// assert_eq!(binder.get("count"), Some(&Value::Int(10)));
/// assert_eq!(binder.get("label"), Some(&Value::from("abc")));
/// ```
pub struct ParameterBinder<H: HostRuntime = BuiltinHost> {
    runtime: H,
    values: Vec<Value>,
    cursor: usize,
    valid: bool,
    bindings: Bindings,
    last: Option<LastBind>,
}

impl<H: HostRuntime> ParameterBinder<H> {
    /// Start a chain that consults `runtime` as given.
    ///
    /// [`crate::organize`] and [`crate::organize_with`] additionally teach
    /// the host the classes of the supplied instances.
    pub fn new(values: Vec<Value>, runtime: H) -> Self {
        ParameterBinder {
            runtime,
            values,
            cursor: 0,
            valid: true,
            bindings: Bindings::default(),
            last: None,
        }
    }

    /// Bind the value under the cursor to `slot` if it satisfies
    /// `expected`.
    ///
    /// On a match the slot receives the value and the cursor advances.
    /// Otherwise the slot keeps whatever it held before, and a `required`
    /// slot invalidates the binder for good.
    pub fn bind<E: Into<ExpectedTypes>>(mut self, slot: &str, expected: E, required: bool) -> Self {
        let expected = expected.into();
        let index = self.bindings.entry(slot);

        let candidate = self.values.get(self.cursor);
        let outcome = candidate.map(|value| check(value, &expected, &self.runtime));

        let filled = match (candidate, outcome) {
            (Some(value), Some(outcome)) if outcome.matched => {
                tracing::trace!(
                    slot,
                    cursor = self.cursor,
                    expected = %expected,
                    rule = ?outcome.rule,
                    "bound {}",
                    value
                );
                let value = value.clone();
                let entry = self.bindings.slot_mut(index);
                entry.value = Some(value);
                entry.filled = true;
                entry.defaulted = false;
                self.cursor += 1;
                true
            }
            (Some(value), Some(outcome)) => {
                tracing::trace!(
                    slot,
                    cursor = self.cursor,
                    expected = %expected,
                    rule = ?outcome.rule,
                    "rejected {}",
                    value
                );
                false
            }
            _ => {
                tracing::trace!(slot, cursor = self.cursor, "no input left");
                false
            }
        };

        if !filled {
            self.bindings.slot_mut(index).filled = false;
            if required && self.valid {
                tracing::debug!(slot, cursor = self.cursor, "required slot unfilled");
            }
            if required {
                self.valid = false;
            }
        }

        self.last = Some(LastBind { index, filled });
        self
    }

    /// Give the most recently bound slot `value` if that bind did not
    /// take one from the input.
    ///
    /// Calling it again re-applies to the same slot. Without a preceding
    /// bind it does nothing.
    pub fn default_value<V: Into<Value>>(mut self, value: V) -> Self {
        match self.last {
            Some(LastBind { index, filled: false }) => {
                let entry = self.bindings.slot_mut(index);
                entry.value = Some(value.into());
                entry.defaulted = true;
            }
            Some(_) => {}
            None => tracing::debug!("default_value called before any bind"),
        }
        self
    }

    /// Invalidate the binder unless at least `count` values were supplied.
    pub fn expects_at_least(mut self, count: usize) -> Self {
        if self.values.len() < count {
            tracing::debug!(
                supplied = self.values.len(),
                expected = count,
                "too few arguments"
            );
            self.valid = false;
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Index of the next unconsumed value
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of values supplied
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values not yet consumed, starting at the cursor
    pub fn remaining(&self) -> &[Value] {
        &self.values[self.cursor..]
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn get(&self, slot: &str) -> Option<&Value> {
        self.bindings.get(slot)
    }

    pub fn finish(self) -> Organized {
        Organized {
            valid: self.valid,
            bindings: self.bindings,
        }
    }
}

impl<H: HostRuntime> fmt::Debug for ParameterBinder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinder")
            .field("values", &self.values)
            .field("cursor", &self.cursor)
            .field("valid", &self.valid)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}
