//! Conversion from JSON documents
//!
//! Lets a host hand over arguments it received as JSON. JSON objects
//! become `stdClass` instances, the way the host's own decoder does.

use std::rc::Rc;

use crate::value::{Object, Value};

/// Class given to decoded JSON objects
pub const JSON_OBJECT_CLASS: &str = "stdClass";

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 above i64::MAX and fractional numbers
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect::<Vec<_>>())
            }
            serde_json::Value::Object(map) => {
                let obj = map
                    .into_iter()
                    .fold(Object::new(JSON_OBJECT_CLASS), |obj, (k, v)| {
                        obj.with_field(k, Value::from(v))
                    });
                Value::Object(Rc::new(obj))
            }
        }
    }
}

/// Split a JSON document into positional arguments
///
/// An array yields one argument per element; any other document is a
/// single argument.
pub fn json_arguments(json: serde_json::Value) -> Vec<Value> {
    match json {
        serde_json::Value::Array(items) => items.into_iter().map(Value::from).collect(),
        other => vec![Value::from(other)],
    }
}
