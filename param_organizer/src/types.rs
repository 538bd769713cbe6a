//! Type tags and their normalization.
//!
//! Callers describe expected argument types with loose tag strings
//! (`"int"`, `"STRING"`, `"*"`, a class name). This module folds them into
//! [`TypeTag`], a closed set of canonical kinds plus an open case for
//! class and interface names, and classifies runtime values the same way.

use std::fmt;
use std::str::FromStr;

use param_organizer_runtime::{type_key, HostRuntime, Value};

/// Canonical type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    Resource,
    Object,
    Array,
    /// Accepts anything
    Mixed,
    Callable,
    /// Class or interface name, kept as written
    Named(String),
}

impl TypeTag {
    /// Canonical spelling; the name itself for `Named`
    pub fn as_str(&self) -> &str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Boolean => "boolean",
            TypeTag::Resource => "resource",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Mixed => "mixed",
            TypeTag::Callable => "callable",
            TypeTag::Named(name) => name,
        }
    }

    /// True for every tag except `Named`
    pub fn is_canonical(&self) -> bool {
        !matches!(self, TypeTag::Named(_))
    }

    /// Class or interface name carried by a `Named` tag
    pub fn type_name(&self) -> Option<&str> {
        match self {
            TypeTag::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(normalize_tag(s))
    }
}

/// Normalize a single tag.
///
/// Canonical names and the aliases `bool`, `int`, `double`, `any` and `*`
/// are matched case-insensitively. Anything else is returned unchanged as
/// a `Named` tag; whether that name is a real type is decided later, at
/// match time.
pub fn normalize_tag(tag: &str) -> TypeTag {
    match tag.to_ascii_lowercase().as_str() {
        "string" => TypeTag::String,
        "integer" | "int" => TypeTag::Integer,
        "float" | "double" => TypeTag::Float,
        "boolean" | "bool" => TypeTag::Boolean,
        "resource" => TypeTag::Resource,
        "object" => TypeTag::Object,
        "array" => TypeTag::Array,
        "mixed" | "any" | "*" => TypeTag::Mixed,
        "callable" => TypeTag::Callable,
        _ => TypeTag::Named(tag.to_string()),
    }
}

/// Normalize a list of tags, dropping duplicates and keeping the first
/// occurrence of each.
pub fn normalize_tags<I, S>(tags: I) -> ExpectedTypes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = ExpectedTypes::any();
    for tag in tags {
        out.push(normalize_tag(tag.as_ref()));
    }
    out
}

/// Canonical tag for a value's runtime kind.
///
/// Callability wins over every other classification, so an invokable
/// object or a string naming a function reports `Callable`. Objects
/// otherwise report their exact class name. Null has no tag.
pub fn normalize_value_kind<R>(value: &Value, runtime: &R) -> Option<TypeTag>
where
    R: HostRuntime + ?Sized,
{
    if runtime.is_callable(value) {
        return Some(TypeTag::Callable);
    }

    match value {
        Value::Null => None,
        Value::Object(obj) => Some(TypeTag::Named(obj.class_name().to_string())),
        // Closures are callable by definition; hosts that disagree get the
        // generic object tag.
        Value::Closure(_) => Some(TypeTag::Object),
        scalar => Some(normalize_tag(scalar.kind_name())),
    }
}

/// Same tag, comparing class names the way the host looks them up
fn same_tag(a: &TypeTag, b: &TypeTag) -> bool {
    match (a, b) {
        (TypeTag::Named(a), TypeTag::Named(b)) => type_key(a) == type_key(b),
        _ => a == b,
    }
}

/// Ordered, duplicate-free set of expected tags.
///
/// An empty set accepts any value, the same as `{mixed}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedTypes {
    tags: Vec<TypeTag>,
}

impl ExpectedTypes {
    /// The empty set, which accepts anything
    pub fn any() -> Self {
        Self::default()
    }

    fn push(&mut self, tag: TypeTag) {
        if !self.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Whether this set accepts every value without inspecting it
    pub fn is_universal(&self) -> bool {
        self.tags.is_empty() || self.contains(&TypeTag::Mixed)
    }

    /// Whether `tag` is in the set; class names compare case-insensitively
    /// and ignore a leading `\`.
    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.tags.iter().any(|t| same_tag(t, tag))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_slice(&self) -> &[TypeTag] {
        &self.tags
    }
}

impl fmt::Display for ExpectedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            return f.write_str("mixed");
        }
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ExpectedTypes {
    type Item = &'a TypeTag;
    type IntoIter = std::slice::Iter<'a, TypeTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

impl FromIterator<TypeTag> for ExpectedTypes {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        let mut out = ExpectedTypes::any();
        for tag in iter {
            out.push(tag);
        }
        out
    }
}

// ========== From implementations ==========

impl From<&str> for ExpectedTypes {
    fn from(tag: &str) -> Self {
        normalize_tags([tag])
    }
}

impl From<String> for ExpectedTypes {
    fn from(tag: String) -> Self {
        normalize_tags([tag])
    }
}

impl From<TypeTag> for ExpectedTypes {
    fn from(tag: TypeTag) -> Self {
        ExpectedTypes { tags: vec![tag] }
    }
}

impl<S: AsRef<str>> From<&[S]> for ExpectedTypes {
    fn from(tags: &[S]) -> Self {
        normalize_tags(tags)
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for ExpectedTypes {
    fn from(tags: [S; N]) -> Self {
        normalize_tags(tags)
    }
}

impl<S: AsRef<str>> From<Vec<S>> for ExpectedTypes {
    fn from(tags: Vec<S>) -> Self {
        normalize_tags(tags)
    }
}

impl<T: Into<ExpectedTypes>> From<Option<T>> for ExpectedTypes {
    fn from(tags: Option<T>) -> Self {
        tags.map_or_else(ExpectedTypes::any, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use param_organizer_runtime::TypeRegistry;
    use pretty_assertions::assert_eq;

    const CANONICAL: &[&str] = &[
        "string", "integer", "float", "boolean", "resource", "object", "array", "mixed",
        "callable",
    ];

    #[test]
    fn test_canonical_names_are_fixed_points() {
        for name in CANONICAL {
            let tag = normalize_tag(name);
            assert!(tag.is_canonical(), "{} should be canonical", name);
            assert_eq!(tag.as_str(), *name);
            assert_eq!(normalize_tag(tag.as_str()), tag);
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(normalize_tag("bool"), TypeTag::Boolean);
        assert_eq!(normalize_tag("int"), TypeTag::Integer);
        assert_eq!(normalize_tag("double"), TypeTag::Float);
        assert_eq!(normalize_tag("any"), TypeTag::Mixed);
        assert_eq!(normalize_tag("*"), TypeTag::Mixed);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(normalize_tag("STRING"), TypeTag::String);
        assert_eq!(normalize_tag("ANY"), TypeTag::Mixed);
        assert_eq!(normalize_tag("Bool"), TypeTag::Boolean);
    }

    #[test]
    fn test_unrecognized_passes_through() {
        assert_eq!(normalize_tag("invalid"), TypeTag::Named("invalid".to_string()));
        // Class names keep their spelling
        let tag = normalize_tag("App\\Models\\User");
        assert_eq!(tag.type_name(), Some("App\\Models\\User"));
        assert_eq!(normalize_tag(tag.as_str()), tag);
    }

    #[test]
    fn test_from_str() {
        let tag: TypeTag = "INT".parse().unwrap();
        assert_eq!(tag, TypeTag::Integer);
    }

    #[test]
    fn test_list_dedup_preserves_order() {
        let types = normalize_tags(["string", "int", "string"]);
        assert_eq!(types.as_slice(), &[TypeTag::String, TypeTag::Integer]);

        // Aliases collapse onto the same tag
        let types = normalize_tags(["int", "INTEGER", "bool", "boolean"]);
        assert_eq!(types.as_slice(), &[TypeTag::Integer, TypeTag::Boolean]);
    }

    #[test]
    fn test_list_dedup_folds_class_name_spelling() {
        let types = normalize_tags(["App\\A", "\\app\\a", "int", "APP\\A"]);
        assert_eq!(
            types.as_slice(),
            &[TypeTag::Named("App\\A".to_string()), TypeTag::Integer]
        );
        assert!(types.contains(&TypeTag::Named("\\App\\a".to_string())));
        assert!(!types.contains(&TypeTag::Named("App\\B".to_string())));
    }

    #[test]
    fn test_single_tag_and_list_forms() {
        assert_eq!(ExpectedTypes::from("string"), normalize_tags(["string"]));
        assert_eq!(
            ExpectedTypes::from(vec!["string", "int", "App\\A"]).to_string(),
            "string|integer|App\\A"
        );
        assert_eq!(ExpectedTypes::from(None::<&str>), ExpectedTypes::any());
        assert_eq!(ExpectedTypes::from(Some("int")), ExpectedTypes::from("int"));
    }

    #[test]
    fn test_empty_is_universal() {
        let empty = normalize_tags(Vec::<&str>::new());
        assert!(empty.is_empty());
        assert!(empty.is_universal());
        assert_eq!(empty.to_string(), "mixed");
        assert!(ExpectedTypes::from(["int", "*"]).is_universal());
        assert!(!ExpectedTypes::from("int").is_universal());
    }

    #[test]
    fn test_value_kinds() {
        let rt = TypeRegistry::with_builtins();
        assert_eq!(normalize_value_kind(&Value::from("string"), &rt), Some(TypeTag::String));
        assert_eq!(normalize_value_kind(&Value::Int(123), &rt), Some(TypeTag::Integer));
        assert_eq!(normalize_value_kind(&Value::Float(1.23), &rt), Some(TypeTag::Float));
        assert_eq!(normalize_value_kind(&Value::Bool(false), &rt), Some(TypeTag::Boolean));
        assert_eq!(
            normalize_value_kind(&Value::resource(1, "curl"), &rt),
            Some(TypeTag::Resource)
        );
        assert_eq!(
            normalize_value_kind(&Value::array(Vec::<i64>::new()), &rt),
            Some(TypeTag::Array)
        );
        assert_eq!(normalize_value_kind(&Value::Null, &rt), None);
    }

    #[test]
    fn test_value_kind_follows_kind_name() {
        let rt = TypeRegistry::new();
        let scalars = [
            Value::Bool(true),
            Value::Int(0),
            Value::Float(0.5),
            Value::from("text"),
            Value::array(vec![1i64]),
            Value::resource(2, "stream"),
        ];
        for value in scalars {
            let kind = normalize_value_kind(&value, &rt).unwrap();
            assert!(kind.is_canonical(), "{}", value);
            assert_eq!(kind, normalize_tag(value.kind_name()), "{}", value);
        }
    }

    #[test]
    fn test_value_kind_object_reports_class() {
        let rt = TypeRegistry::with_builtins();
        assert_eq!(
            normalize_value_kind(&Value::object("stdClass"), &rt),
            Some(TypeTag::Named("stdClass".to_string()))
        );
    }

    #[test]
    fn test_value_kind_callable_wins() {
        let rt = TypeRegistry::with_builtins()
            .with_class(param_organizer_runtime::ClassDecl::new("Invoker").invokable())
            .unwrap();
        assert_eq!(normalize_value_kind(&Value::from("max"), &rt), Some(TypeTag::Callable));
        assert_eq!(normalize_value_kind(&Value::closure(), &rt), Some(TypeTag::Callable));
        assert_eq!(
            normalize_value_kind(&Value::object("Invoker"), &rt),
            Some(TypeTag::Callable)
        );
    }
}
