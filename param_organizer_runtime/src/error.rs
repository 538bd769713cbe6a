//! Runtime error types for the host runtime
//!
//! The organizer itself never fails; these errors come from loading and
//! validating a type registry, and from callers asking for a slot that
//! was never bound.

use std::path::PathBuf;

use thiserror::Error;

/// Runtime error type
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Registry document could not be read
    #[error("IOError: cannot read {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Registry document is not valid TOML or has the wrong shape
    #[error("ConfigError: {0}")]
    Config(#[from] toml::de::Error),

    /// The same class, interface or function was declared twice
    #[error("DuplicateError: {kind} {name} is already declared")]
    Duplicate {
        /// "class", "interface" or "function"
        kind: &'static str,
        /// Declared name as written
        name: String,
    },

    /// A declaration references a parent that is not declared
    #[error("UnknownTypeError: {child} references undeclared type {parent}")]
    UnknownParent {
        /// Declaring type
        child: String,
        /// Missing parent
        parent: String,
    },

    /// A class extends an interface, implements a class, or similar
    #[error("KindError: {child} cannot {relation} {parent}")]
    KindMismatch {
        /// Declaring type
        child: String,
        /// "extend" or "implement"
        relation: &'static str,
        /// Parent of the wrong kind
        parent: String,
    },

    /// Inheritance graph loops back on itself
    #[error("CycleError: inheritance cycle through {0}")]
    InheritanceCycle(String),

    /// A slot was read that no bind call produced a value for
    #[error("UnboundSlotError: slot {0} has no value")]
    UnboundSlot(String),
}

impl RuntimeError {
    /// Create an I/O error for a registry file
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        RuntimeError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a duplicate declaration error
    pub fn duplicate<S: Into<String>>(kind: &'static str, name: S) -> Self {
        RuntimeError::Duplicate {
            kind,
            name: name.into(),
        }
    }

    /// Create an unknown parent error
    pub fn unknown_parent<S1: Into<String>, S2: Into<String>>(child: S1, parent: S2) -> Self {
        RuntimeError::UnknownParent {
            child: child.into(),
            parent: parent.into(),
        }
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch<S1: Into<String>, S2: Into<String>>(
        child: S1,
        relation: &'static str,
        parent: S2,
    ) -> Self {
        RuntimeError::KindMismatch {
            child: child.into(),
            relation,
            parent: parent.into(),
        }
    }

    /// Create an inheritance cycle error
    pub fn inheritance_cycle<S: Into<String>>(name: S) -> Self {
        RuntimeError::InheritanceCycle(name.into())
    }

    /// Create an unbound slot error
    pub fn unbound_slot<S: Into<String>>(slot: S) -> Self {
        RuntimeError::UnboundSlot(slot.into())
    }
}

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::duplicate("class", "App\\User");
        assert_eq!(
            format!("{}", err),
            "DuplicateError: class App\\User is already declared"
        );

        let err = RuntimeError::unknown_parent("B", "A");
        assert_eq!(
            format!("{}", err),
            "UnknownTypeError: B references undeclared type A"
        );

        let err = RuntimeError::kind_mismatch("C", "implement", "A");
        assert_eq!(format!("{}", err), "KindError: C cannot implement A");

        let err = RuntimeError::unbound_slot("limit");
        assert_eq!(format!("{}", err), "UnboundSlotError: slot limit has no value");
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;

        let err = RuntimeError::io(
            "types.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().starts_with("IOError: cannot read types.toml"));
        assert!(err.source().is_some());
    }
}
