//! Parameter Organizer Runtime Library
//!
//! This crate provides the host side of the parameter organizer:
//!
//! - `Value` enum for dynamically typed call-time arguments
//! - `HostRuntime` trait for the reflection services the organizer consumes,
//!   and `InstanceClasses`, which also knows the classes of call-time instances
//! - `TypeRegistry`, a declarative host loaded from code or TOML
//! - `RuntimeError` for registry and slot lookup errors
//! - JSON conversion utilities

pub mod convert;
pub mod error;
pub mod host;
pub mod registry;
pub mod value;

/// Prelude module for convenient imports
///
/// # Example
/// ```
/// use param_organizer_runtime::prelude::*;
/// ```
pub mod prelude {
    pub use super::convert::json_arguments;
    pub use super::error::{RuntimeError, RuntimeResult};
    pub use super::host::{type_key, HostRuntime, InstanceClasses};
    pub use super::registry::{ClassDecl, InterfaceDecl, RegistryConfig, TypeKind, TypeRegistry};
    pub use super::value::{Closure, Object, ResourceHandle, Value};
}

pub use prelude::*;
