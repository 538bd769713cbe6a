//! Dynamic Value type for call-time arguments
//!
//! This module provides the `Value` enum used to carry positional
//! arguments whose types are only known at runtime.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Dynamic value passed as a positional argument
///
/// Scalars compare by value. Arrays, objects and closures are shared
/// handles and compare by identity, so a bound slot holds the very
/// instance the caller passed in.
#[derive(Debug, Clone)]
pub enum Value {
    // ========== Scalars ==========
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// String
    Str(String),

    // ========== Shared handles ==========
    /// Ordered list of values
    Array(Rc<RefCell<Vec<Value>>>),
    /// Opaque host resource (file handle, connection, ...)
    Resource(ResourceHandle),
    /// Class instance
    Object(Rc<Object>),
    /// Anonymous function
    Closure(Rc<Closure>),
}

/// Opaque host resource handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    /// Host-assigned identifier
    pub id: u64,
    /// Resource kind reported by the host, e.g. "stream"
    pub kind: String,
}

/// Class instance with its runtime class name
#[derive(Debug)]
pub struct Object {
    class_name: String,
    fields: Vec<(String, Value)>,
}

impl Object {
    /// Create an instance of `class_name` with no fields
    pub fn new<S: Into<String>>(class_name: S) -> Self {
        Object {
            class_name: class_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, replacing an earlier field of the same name
    pub fn with_field<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    /// Exact runtime class name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Anonymous function handle
///
/// Closures are opaque here: the organizer only needs to know that a
/// value is one, never to invoke it.
#[derive(Debug, Default)]
pub struct Closure {
    label: Option<String>,
}

impl Closure {
    /// Create an unlabeled closure
    pub fn anonymous() -> Self {
        Closure { label: None }
    }

    /// Create a closure carrying a label for diagnostics
    pub fn labeled<S: Into<String>>(label: S) -> Self {
        Closure {
            label: Some(label.into()),
        }
    }

    /// Diagnostic label, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Value {
    /// Create a fresh array value
    pub fn array<T: Into<Value>>(items: Vec<T>) -> Self {
        items.into()
    }

    /// Create a fresh instance of `class_name` with no fields
    pub fn object<S: Into<String>>(class_name: S) -> Self {
        Value::Object(Rc::new(Object::new(class_name)))
    }

    /// Create a fresh anonymous closure
    pub fn closure() -> Self {
        Value::Closure(Rc::new(Closure::anonymous()))
    }

    /// Create a resource handle
    pub fn resource<S: Into<String>>(id: u64, kind: S) -> Self {
        Value::Resource(ResourceHandle {
            id,
            kind: kind.into(),
        })
    }

    /// Fundamental kind name of this value
    ///
    /// These are the host's own kind names; note `double` for floats and
    /// `NULL` for null.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Resource(_) => "resource",
            Value::Object(_) | Value::Closure(_) => "object",
        }
    }

    /// Type name for diagnostics: the class name for objects, the kind
    /// name otherwise
    pub fn type_name(&self) -> &str {
        match self {
            Value::Object(obj) => obj.class_name(),
            Value::Closure(_) => "Closure",
            other => other.kind_name(),
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Check if this value is a class instance
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Check if this value is an anonymous function
    pub fn is_closure(&self) -> bool {
        matches!(self, Value::Closure(_))
    }

    /// Try to extract as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to extract as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to extract as a class instance
    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

// ========== From implementations ==========

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(Rc::new(v))
    }
}

impl From<Closure> for Value {
    fn from(v: Closure) -> Self {
        Value::Closure(Rc::new(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        let values: Vec<Value> = v.into_iter().map(|x| x.into()).collect();
        Value::Array(Rc::new(RefCell::new(values)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

// ========== Display implementation ==========

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}.0", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Array(arr) => {
                let arr = arr.borrow();
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Resource(handle) => write!(f, "resource({}) of type ({})", handle.id, handle.kind),
            Value::Object(obj) => {
                write!(f, "{} {{", obj.class_name())?;
                for (i, (name, value)) in obj.fields().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", name, value)?;
                }
                write!(f, " }}")
            }
            Value::Closure(closure) => match closure.label() {
                Some(label) => write!(f, "Closure({})", label),
                None => write!(f, "Closure"),
            },
        }
    }
}

// ========== PartialEq implementation ==========

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Resource(a), Value::Resource(b)) => a == b,
            // Shared handles are compared by reference
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
