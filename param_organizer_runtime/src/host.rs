//! Host runtime services
//!
//! The organizer decides matches on its own but asks the host three
//! questions it cannot answer from a `Value` alone: whether a name is a
//! known class or interface, whether a value descends from a named type,
//! and whether a value can be invoked.

use std::collections::HashSet;

use crate::value::Value;

/// Lookup key for class, interface and function names.
///
/// Names are case-insensitive and a single leading `\` is ignored, the way
/// the host resolves fully-qualified names.
pub fn type_key(name: &str) -> String {
    name.strip_prefix('\\').unwrap_or(name).to_ascii_lowercase()
}

/// Reflection services supplied by the host.
///
/// Implementations are expected to be cheap and side-effect free. A host
/// that cannot answer (e.g. a malformed type name reaching a reflection
/// backend) should panic rather than report `false`, so that the fault is
/// not mistaken for a type mismatch.
pub trait HostRuntime {
    /// Whether `name` names a class or interface known to the host.
    fn type_exists(&self, name: &str) -> bool;

    /// Whether `value`'s runtime type is `type_name` or a descendant or
    /// implementor of it.
    fn is_instance_of(&self, value: &Value, type_name: &str) -> bool;

    /// Whether `value` can be invoked as a function.
    fn is_callable(&self, value: &Value) -> bool;
}

impl<T: HostRuntime + ?Sized> HostRuntime for &T {
    fn type_exists(&self, name: &str) -> bool {
        (**self).type_exists(name)
    }

    fn is_instance_of(&self, value: &Value, type_name: &str) -> bool {
        (**self).is_instance_of(value, type_name)
    }

    fn is_callable(&self, value: &Value) -> bool {
        (**self).is_callable(value)
    }
}

impl<T: HostRuntime + ?Sized> HostRuntime for Box<T> {
    fn type_exists(&self, name: &str) -> bool {
        (**self).type_exists(name)
    }

    fn is_instance_of(&self, value: &Value, type_name: &str) -> bool {
        (**self).is_instance_of(value, type_name)
    }

    fn is_callable(&self, value: &Value) -> bool {
        (**self).is_callable(value)
    }
}

/// Host that also knows the class of every instance it was given.
///
/// An instance's class always exists in the runtime that created it, even
/// when the wrapped host was never told about it. Such a class only
/// matches its own name; ancestry beyond that is the wrapped host's.
#[derive(Debug, Clone)]
pub struct InstanceClasses<H> {
    inner: H,
    classes: HashSet<String>,
}

impl<H: HostRuntime> InstanceClasses<H> {
    pub fn new<'v, I>(inner: H, values: I) -> Self
    where
        I: IntoIterator<Item = &'v Value>,
    {
        let classes = values
            .into_iter()
            .filter_map(Value::as_object)
            .map(|obj| type_key(obj.class_name()))
            .collect();
        InstanceClasses { inner, classes }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: HostRuntime> HostRuntime for InstanceClasses<H> {
    fn type_exists(&self, name: &str) -> bool {
        self.classes.contains(&type_key(name)) || self.inner.type_exists(name)
    }

    fn is_instance_of(&self, value: &Value, type_name: &str) -> bool {
        let own_class = value
            .as_object()
            .is_some_and(|obj| type_key(obj.class_name()) == type_key(type_name));
        own_class || self.inner.is_instance_of(value, type_name)
    }

    fn is_callable(&self, value: &Value) -> bool {
        self.inner.is_callable(value)
    }
}
