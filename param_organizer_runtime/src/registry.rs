//! Declarative host runtime
//!
//! `TypeRegistry` answers the host reflection questions from a table of
//! declared classes, interfaces and global functions. It can be built in
//! code or loaded from a TOML document:
//!
//! ```toml
//! functions = ["format_price"]
//!
//! [[interface]]
//! name = "App\\Renderable"
//!
//! [[class]]
//! name = "App\\View"
//! implements = ["App\\Renderable"]
//!
//! [[class]]
//! name = "App\\Action"
//! invokable = true
//! ```
//!
//! Names are case-insensitive and a single leading `\` is ignored, the
//! way the host resolves fully-qualified class names.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{RuntimeError, RuntimeResult};
use crate::host::{type_key, HostRuntime};
use crate::value::Value;

/// Functions every host provides
const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "array_filter",
    "array_map",
    "count",
    "explode",
    "implode",
    "is_callable",
    "max",
    "min",
    "printf",
    "sprintf",
    "strlen",
    "strtolower",
    "strtoupper",
    "trim",
];

/// Class declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    /// Class name
    pub name: String,
    /// Parent class
    #[serde(default)]
    pub extends: Option<String>,
    /// Implemented interfaces
    #[serde(default)]
    pub implements: Vec<String>,
    /// Instances can be invoked as functions
    #[serde(default)]
    pub invokable: bool,
}

impl ClassDecl {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ClassDecl {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn extends<S: Into<String>>(mut self, parent: S) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn implements<S: Into<String>>(mut self, interface: S) -> Self {
        self.implements.push(interface.into());
        self
    }

    pub fn invokable(mut self) -> Self {
        self.invokable = true;
        self
    }
}

/// Interface declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceDecl {
    /// Interface name
    pub name: String,
    /// Parent interfaces
    #[serde(default)]
    pub extends: Vec<String>,
}

impl InterfaceDecl {
    pub fn new<S: Into<String>>(name: S) -> Self {
        InterfaceDecl {
            name: name.into(),
            extends: Vec::new(),
        }
    }

    pub fn extends<S: Into<String>>(mut self, parent: S) -> Self {
        self.extends.push(parent.into());
        self
    }
}

fn default_builtins() -> bool {
    true
}

/// Registry document as read from TOML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Include the host's built-in classes and functions
    #[serde(default = "default_builtins")]
    pub builtins: bool,
    /// Global function names
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDecl>,
    #[serde(default, rename = "interface")]
    pub interfaces: Vec<InterfaceDecl>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            builtins: true,
            functions: Vec::new(),
            classes: Vec::new(),
            interfaces: Vec::new(),
        }
    }
}

/// Kind of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

impl TypeKind {
    fn as_str(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Debug, Clone)]
struct TypeEntry {
    name: String,
    kind: TypeKind,
    /// Parent class (at most one) for classes, parent interfaces otherwise
    extends: Vec<String>,
    implements: Vec<String>,
    invokable: bool,
}

impl TypeEntry {
    fn parents(&self) -> impl Iterator<Item = &str> {
        self.extends
            .iter()
            .chain(self.implements.iter())
            .map(String::as_str)
    }
}

/// Table-driven host runtime
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeEntry>,
    functions: HashMap<String, String>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the host's built-in declarations:
    /// `stdClass`, `Closure` and a handful of global functions
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(TypeEntry {
            name: "stdClass".to_string(),
            kind: TypeKind::Class,
            extends: Vec::new(),
            implements: Vec::new(),
            invokable: false,
        });
        registry.insert(TypeEntry {
            name: "Closure".to_string(),
            kind: TypeKind::Class,
            extends: Vec::new(),
            implements: Vec::new(),
            invokable: true,
        });
        for name in BUILTIN_FUNCTIONS {
            registry.functions.insert(type_key(name), name.to_string());
        }
        registry
    }

    /// Build and validate a registry from a parsed document
    pub fn from_config(config: RegistryConfig) -> RuntimeResult<Self> {
        let mut registry = if config.builtins {
            Self::with_builtins()
        } else {
            Self::new()
        };
        for decl in config.interfaces {
            registry.register_interface(decl)?;
        }
        for decl in config.classes {
            registry.register_class(decl)?;
        }
        for name in config.functions {
            registry.register_function(name)?;
        }
        registry.validate()?;

        tracing::debug!(
            types = registry.types.len(),
            functions = registry.functions.len(),
            "loaded type registry"
        );
        Ok(registry)
    }

    /// Parse, build and validate a registry from TOML text
    pub fn from_toml_str(source: &str) -> RuntimeResult<Self> {
        let config: RegistryConfig = toml::from_str(source)?;
        Self::from_config(config)
    }

    /// Read, build and validate a registry from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| RuntimeError::io(path, e))?;
        Self::from_toml_str(&source)
    }

    fn insert(&mut self, entry: TypeEntry) {
        self.types.insert(type_key(&entry.name), entry);
    }

    fn check_free(&self, kind: TypeKind, name: &str) -> RuntimeResult<()> {
        if self.types.contains_key(&type_key(name)) {
            return Err(RuntimeError::duplicate(kind.as_str(), name));
        }
        Ok(())
    }

    /// Declare a class. Parents are checked by [`TypeRegistry::validate`].
    pub fn register_class(&mut self, decl: ClassDecl) -> RuntimeResult<()> {
        self.check_free(TypeKind::Class, &decl.name)?;
        self.insert(TypeEntry {
            name: decl.name,
            kind: TypeKind::Class,
            extends: decl.extends.into_iter().collect(),
            implements: decl.implements,
            invokable: decl.invokable,
        });
        Ok(())
    }

    /// Declare an interface. Parents are checked by [`TypeRegistry::validate`].
    pub fn register_interface(&mut self, decl: InterfaceDecl) -> RuntimeResult<()> {
        self.check_free(TypeKind::Interface, &decl.name)?;
        self.insert(TypeEntry {
            name: decl.name,
            kind: TypeKind::Interface,
            extends: decl.extends,
            implements: Vec::new(),
            invokable: false,
        });
        Ok(())
    }

    /// Declare a global function
    pub fn register_function<S: Into<String>>(&mut self, name: S) -> RuntimeResult<()> {
        let name = name.into();
        let key = type_key(&name);
        if self.functions.contains_key(&key) {
            return Err(RuntimeError::duplicate("function", name));
        }
        self.functions.insert(key, name);
        Ok(())
    }

    pub fn with_class(mut self, decl: ClassDecl) -> RuntimeResult<Self> {
        self.register_class(decl)?;
        Ok(self)
    }

    pub fn with_interface(mut self, decl: InterfaceDecl) -> RuntimeResult<Self> {
        self.register_interface(decl)?;
        Ok(self)
    }

    pub fn with_function<S: Into<String>>(mut self, name: S) -> RuntimeResult<Self> {
        self.register_function(name)?;
        Ok(self)
    }

    /// Check that every parent is declared, has the right kind, and that
    /// the inheritance graph is acyclic.
    pub fn validate(&self) -> RuntimeResult<()> {
        let mut keys: Vec<&String> = self.types.keys().collect();
        keys.sort();

        for key in &keys {
            let entry = &self.types[*key];
            for parent in &entry.extends {
                let kind = self
                    .kind_of(parent)
                    .ok_or_else(|| RuntimeError::unknown_parent(&entry.name, parent))?;
                if kind != entry.kind {
                    return Err(RuntimeError::kind_mismatch(&entry.name, "extend", parent));
                }
            }
            for parent in &entry.implements {
                let kind = self
                    .kind_of(parent)
                    .ok_or_else(|| RuntimeError::unknown_parent(&entry.name, parent))?;
                if kind != TypeKind::Interface {
                    return Err(RuntimeError::kind_mismatch(&entry.name, "implement", parent));
                }
            }
        }

        // Depth-first walk; a key seen again while still on the path is a cycle.
        let mut done: HashSet<&str> = HashSet::new();
        for key in keys {
            let mut on_path: Vec<&str> = Vec::new();
            self.visit_acyclic(key, &mut on_path, &mut done)?;
        }
        Ok(())
    }

    fn visit_acyclic<'a>(
        &'a self,
        key: &'a str,
        on_path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> RuntimeResult<()> {
        if done.contains(key) {
            return Ok(());
        }
        let Some((stored_key, entry)) = self.types.get_key_value(key) else {
            return Ok(());
        };
        if on_path.contains(&stored_key.as_str()) {
            return Err(RuntimeError::inheritance_cycle(&entry.name));
        }
        on_path.push(stored_key);
        for parent in entry.parents() {
            let parent_key = type_key(parent);
            if let Some((parent_stored, _)) = self.types.get_key_value(&parent_key) {
                self.visit_acyclic(parent_stored, on_path, done)?;
            }
        }
        on_path.pop();
        done.insert(stored_key);
        Ok(())
    }

    /// Kind of a declared type
    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        self.types.get(&type_key(name)).map(|e| e.kind)
    }

    /// Whether a global function is declared
    pub fn function_exists(&self, name: &str) -> bool {
        self.functions.contains_key(&type_key(name))
    }

    /// Declared names of every ancestor of `name`, nearest first
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        let mut queue: Vec<String> = vec![type_key(name)];
        seen.insert(type_key(name));

        let mut i = 0;
        while i < queue.len() {
            if let Some(entry) = self.types.get(&queue[i]) {
                for parent in entry.parents() {
                    let parent_key = type_key(parent);
                    if seen.insert(parent_key.clone()) {
                        if let Some(parent_entry) = self.types.get(&parent_key) {
                            out.push(parent_entry.name.as_str());
                        }
                        queue.push(parent_key);
                    }
                }
            }
            i += 1;
        }
        out
    }

    /// Whether `class_name` is `type_name` or inherits from a declared
    /// `type_name`.
    ///
    /// An undeclared class is only a subtype of its own name.
    pub fn is_subtype(&self, class_name: &str, type_name: &str) -> bool {
        let target = type_key(type_name);
        type_key(class_name) == target
            || self
                .ancestors(class_name)
                .into_iter()
                .any(|ancestor| type_key(ancestor) == target)
    }

    /// Whether instances of `class_name` can be invoked. Invokability is
    /// inherited from parent classes.
    pub fn is_invokable(&self, class_name: &str) -> bool {
        let mut key = type_key(class_name);
        let mut steps = 0;
        while let Some(entry) = self.types.get(&key) {
            if entry.kind != TypeKind::Class {
                return false;
            }
            if entry.invokable {
                return true;
            }
            match entry.extends.first() {
                // Bounded by the table size so an unvalidated cycle cannot spin.
                Some(parent) if steps < self.types.len() => {
                    key = type_key(parent);
                    steps += 1;
                }
                _ => return false,
            }
        }
        false
    }
}

impl HostRuntime for TypeRegistry {
    fn type_exists(&self, name: &str) -> bool {
        self.types.contains_key(&type_key(name))
    }

    fn is_instance_of(&self, value: &Value, type_name: &str) -> bool {
        match value {
            Value::Object(obj) => self.is_subtype(obj.class_name(), type_name),
            Value::Closure(_) => self.is_subtype("Closure", type_name),
            _ => false,
        }
    }

    fn is_callable(&self, value: &Value) -> bool {
        match value {
            Value::Closure(_) => true,
            Value::Str(name) => self.function_exists(name),
            Value::Object(obj) => self.is_invokable(obj.class_name()),
            _ => false,
        }
    }
}
