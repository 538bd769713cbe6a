//! Match predicate: does a value satisfy an expected-type set?
//!
//! A value can fit several tags at once: a class-name string is both a
//! string and a dependency, a function-name string is both a string and a
//! callable. The rules below are tried in a fixed order and the first one
//! that applies decides the outcome, so ambiguous values always resolve
//! the same way.

use param_organizer_runtime::{HostRuntime, Value};

use crate::types::{normalize_value_kind, ExpectedTypes, TypeTag};

/// Rule that decided a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Empty set or `mixed`
    Universal,
    /// Dependency value against `string` or `object`
    DependencyRawType,
    /// Dependency value checked against named class/interface tags
    DependencyAncestry,
    /// Plain string against `string` / `callable`
    PlainString,
    /// Everything else, by runtime kind
    ValueKind,
}

/// Outcome of [`check`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    pub rule: MatchRule,
}

impl MatchOutcome {
    fn new(matched: bool, rule: MatchRule) -> Self {
        MatchOutcome { matched, rule }
    }
}

/// Whether `value` is a dependency reference: a class instance, or a
/// string naming a known class or interface.
///
/// Closures are never dependencies, even though the host may model them
/// as instances of a `Closure` class. Invokable objects still are.
pub fn is_dependency<R>(value: &Value, runtime: &R) -> bool
where
    R: HostRuntime + ?Sized,
{
    match value {
        Value::Object(_) => true,
        Value::Str(name) => runtime.type_exists(name),
        _ => false,
    }
}

/// Name of a tag that refers to a known class or interface
fn dependency_tag_name<'t, R>(tag: &'t TypeTag, runtime: &R) -> Option<&'t str>
where
    R: HostRuntime + ?Sized,
{
    tag.type_name().filter(|name| runtime.type_exists(name))
}

/// Evaluate the match rules in priority order and report which one
/// decided.
pub fn check<R>(value: &Value, expected: &ExpectedTypes, runtime: &R) -> MatchOutcome
where
    R: HostRuntime + ?Sized,
{
    if expected.is_universal() {
        return MatchOutcome::new(true, MatchRule::Universal);
    }

    if is_dependency(value, runtime) {
        // A dependency is accepted as a raw string or object regardless of
        // its concrete type, instances included.
        if expected.contains(&TypeTag::String) || expected.contains(&TypeTag::Object) {
            return MatchOutcome::new(true, MatchRule::DependencyRawType);
        }

        let matched = expected
            .iter()
            .filter_map(|tag| dependency_tag_name(tag, runtime))
            .any(|name| runtime.is_instance_of(value, name));
        return MatchOutcome::new(matched, MatchRule::DependencyAncestry);
    }

    if value.is_string() {
        // One-directional: a callable string satisfies `callable`, but a
        // non-string callable never satisfies `string`.
        let matched = expected.contains(&TypeTag::String)
            || (expected.contains(&TypeTag::Callable) && runtime.is_callable(value));
        return MatchOutcome::new(matched, MatchRule::PlainString);
    }

    let matched = normalize_value_kind(value, runtime).is_some_and(|kind| expected.contains(&kind));
    MatchOutcome::new(matched, MatchRule::ValueKind)
}

/// Whether `value` satisfies `expected`
pub fn matches_expected<R>(value: &Value, expected: &ExpectedTypes, runtime: &R) -> bool
where
    R: HostRuntime + ?Sized,
{
    check(value, expected, runtime).matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use param_organizer_runtime::{ClassDecl, InstanceClasses, InterfaceDecl, TypeRegistry};

    fn registry() -> TypeRegistry {
        TypeRegistry::with_builtins()
            .with_interface(InterfaceDecl::new("AInterface"))
            .unwrap()
            .with_class(ClassDecl::new("A").implements("AInterface"))
            .unwrap()
            .with_class(ClassDecl::new("Other"))
            .unwrap()
            .with_class(ClassDecl::new("Invoker").invokable())
            .unwrap()
    }

    fn matches(value: &Value, tags: &[&str]) -> bool {
        matches_expected(value, &ExpectedTypes::from(tags), &registry())
    }

    #[test]
    fn test_is_dependency() {
        let rt = registry();
        assert!(is_dependency(&Value::from("A"), &rt));
        assert!(is_dependency(&Value::from("AInterface"), &rt));
        assert!(is_dependency(&Value::from("stdClass"), &rt));
        assert!(is_dependency(&Value::from("\\stdClass"), &rt));
        assert!(is_dependency(&Value::object("stdClass"), &rt));
        assert!(is_dependency(&Value::object("Invoker"), &rt));
        // Instances of undeclared classes are still instances
        assert!(is_dependency(&Value::object("Unregistered"), &rt));

        assert!(!is_dependency(&Value::closure(), &rt));
        assert!(!is_dependency(&Value::from("UnknownClass"), &rt));
        assert!(!is_dependency(&Value::Int(123), &rt));
    }

    #[test]
    fn test_universal() {
        let rt = registry();
        for value in [Value::from("hello"), Value::Int(123), Value::Null, Value::closure()] {
            let outcome = check(&value, &ExpectedTypes::any(), &rt);
            assert_eq!(outcome, MatchOutcome::new(true, MatchRule::Universal));
            assert!(matches(&value, &["mixed"]));
            assert!(matches(&value, &["int", "any"]));
        }
    }

    #[test]
    fn test_plain_kinds() {
        assert!(matches(&Value::from("string"), &["string"]));
        assert!(matches(&Value::Int(123), &["integer"]));
        assert!(matches(&Value::Float(1.23), &["float"]));
        assert!(matches(&Value::Bool(true), &["bool"]));
        assert!(matches(&Value::resource(3, "mysql link"), &["resource"]));
        assert!(matches(&Value::array(vec![1i64]), &["array"]));

        assert!(!matches(&Value::Int(1), &["string"]));
        assert!(!matches(&Value::Float(1.0), &["int"]));
        assert!(!matches(&Value::Null, &["string", "integer"]));
    }

    #[test]
    fn test_callable_string_asymmetry() {
        assert!(matches(&Value::from("max"), &["string"]));
        assert!(matches(&Value::from("max"), &["callable"]));
        assert!(!matches(&Value::from("not_a_function"), &["callable"]));

        assert!(!matches(&Value::closure(), &["string"]));
        assert!(matches(&Value::closure(), &["callable"]));
    }

    #[test]
    fn test_class_name_string_is_string_and_object() {
        let rt = registry();
        let value = Value::from("stdClass");
        let outcome = check(&value, &ExpectedTypes::from("object"), &rt);
        assert_eq!(outcome, MatchOutcome::new(true, MatchRule::DependencyRawType));
        assert!(matches(&value, &["string"]));
        // Strings are never instances, so ancestry does not match
        assert!(!matches(&value, &["stdClass"]));
    }

    // An instance satisfies a bare `string` expectation. Surprising, but
    // kept: callers rely on dependencies passing as raw strings or objects.
    #[test]
    fn test_instance_satisfies_string() {
        let value = Value::object("A");
        assert!(matches(&value, &["object"]));
        assert!(matches(&value, &["string"]));
    }

    #[test]
    fn test_instance_ancestry() {
        let rt = registry();
        let value = Value::object("A");
        let outcome = check(&value, &ExpectedTypes::from("A"), &rt);
        assert_eq!(outcome, MatchOutcome::new(true, MatchRule::DependencyAncestry));

        assert!(matches(&value, &["AInterface"]));
        assert!(matches(&value, &["int", "Other", "A"]));
        assert!(!matches(&value, &["Other"]));
        assert!(!matches(&value, &["integer"]));
    }

    #[test]
    fn test_undeclared_class_depends_on_host() {
        let rt = registry();
        let ghost = Value::object("Ghost");
        // A host that never heard of the class cannot vouch for it
        assert!(!matches(&ghost, &["Ghost"]));

        let host = InstanceClasses::new(&rt, [&ghost]);
        let outcome = check(&ghost, &ExpectedTypes::from("\\ghost"), &host);
        assert_eq!(outcome, MatchOutcome::new(true, MatchRule::DependencyAncestry));
        assert!(!matches_expected(&ghost, &ExpectedTypes::from("A"), &host));
    }

    #[test]
    fn test_invokable_instance_is_dependency_first() {
        assert!(matches(&Value::object("Invoker"), &["Invoker"]));
        assert!(!matches(&Value::object("Invoker"), &["callable"]));
    }

    #[test]
    fn test_closure_against_closure_class() {
        // Closures classify by kind, not by class
        assert!(!matches(&Value::closure(), &["Closure"]));
    }
}
