//! Shared helpers for integration tests
// Consumed selectively by the integration test files.
#![allow(dead_code)]

use param_organizer::prelude::*;
use param_organizer::runtime::{ClassDecl, InterfaceDecl};

/// Host with a small class hierarchy:
///
/// - `A` implements `AInterface`
/// - `B` extends `A`
/// - `C` implements `BInterface`
/// - `D` extends `B`
/// - `CallableClass` instances are invokable
pub fn fixture_runtime() -> TypeRegistry {
    let registry = TypeRegistry::with_builtins()
        .with_interface(InterfaceDecl::new("Fixture\\AInterface"))
        .unwrap()
        .with_interface(InterfaceDecl::new("Fixture\\BInterface"))
        .unwrap()
        .with_class(ClassDecl::new("Fixture\\A").implements("Fixture\\AInterface"))
        .unwrap()
        .with_class(ClassDecl::new("Fixture\\B").extends("Fixture\\A"))
        .unwrap()
        .with_class(ClassDecl::new("Fixture\\C").implements("Fixture\\BInterface"))
        .unwrap()
        .with_class(ClassDecl::new("Fixture\\D").extends("Fixture\\B"))
        .unwrap()
        .with_class(ClassDecl::new("Fixture\\CallableClass").invokable())
        .unwrap();
    registry.validate().expect("fixture hierarchy is valid");
    registry
}

/// Route `tracing` output to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
