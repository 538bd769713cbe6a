//! Positional Parameter Organizer
//!
//! Binds an ordered list of call-time values to named slots, checking each
//! value against the types the slot accepts. It stands in for typed,
//! optional parameters in hosts whose functions only see a flat argument
//! list:
//!
//! - `types`: type tags and their normalization
//! - `matching`: dependency classification and the match predicate
//! - `binder`: the sequential binding state machine and its results
//!
//! Reflection (class lookup, ancestry, callability) is delegated to a
//! [`HostRuntime`]; [`TypeRegistry`] is the declarative one shipped with
//! the runtime crate. The class of every supplied instance is known to the
//! host even when the registry never declared it.

use once_cell::sync::Lazy;
use param_organizer_runtime::InstanceClasses;

pub mod binder;
pub mod matching;
pub mod types;

pub use param_organizer_runtime as runtime;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use param_organizer::prelude::*;
/// ```
pub mod prelude {
    pub use super::binder::{Bindings, Organized, ParameterBinder, Slot};
    pub use super::matching::{is_dependency, matches_expected};
    pub use super::types::{normalize_tag, normalize_tags, ExpectedTypes, TypeTag};
    pub use super::{organize, organize_json, organize_with, BuiltinHost};
    pub use param_organizer_runtime::{HostRuntime, RuntimeError, RuntimeResult, TypeRegistry, Value};
}

pub use prelude::*;

/// Registry behind [`organize`]: built-in classes and functions only
static BUILTIN_RUNTIME: Lazy<TypeRegistry> = Lazy::new(TypeRegistry::with_builtins);

/// Host used by [`organize`]: the built-in registry plus the classes of the
/// supplied instances
pub type BuiltinHost = InstanceClasses<&'static TypeRegistry>;

/// Start a binding chain over `values` using the built-in host.
pub fn organize(values: Vec<Value>) -> ParameterBinder<BuiltinHost> {
    let host = InstanceClasses::new(&*BUILTIN_RUNTIME, &values);
    ParameterBinder::new(values, host)
}

/// Start a binding chain over `values` using a caller-supplied host.
pub fn organize_with<R>(values: Vec<Value>, runtime: &R) -> ParameterBinder<InstanceClasses<&R>>
where
    R: HostRuntime + ?Sized,
{
    let host = InstanceClasses::new(runtime, &values);
    ParameterBinder::new(values, host)
}

/// Start a binding chain over arguments decoded from JSON.
///
/// An array supplies one argument per element; any other document is a
/// single argument.
pub fn organize_json(json: serde_json::Value) -> ParameterBinder<BuiltinHost> {
    organize(param_organizer_runtime::json_arguments(json))
}
