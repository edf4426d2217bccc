//! Type references and type metadata.
//!
//! These are pure data types; hierarchy lookups live behind the
//! provider traits in [`crate::type_system`].

use serde::{Deserialize, Serialize};

/// Fully qualified name of the universal supertype.
pub const OBJECT_FQN: &str = "java.lang.Object";

/// Names accepted as primitive (base) types, including `void`.
pub const PRIMITIVE_NAMES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Returns true if `name` is a primitive type or `void`.
pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVE_NAMES.contains(&name)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Default)]
#[serde(tag = "kind", content = "data")]
pub enum TypeRef {
    /// Unresolved or primitive type name (e.g., "int", "void")
    Raw(String),

    /// Resolved reference to a type definition (FQN)
    Id(String),

    /// Generic instantiation (e.g., List<String>)
    Generic {
        base: Box<TypeRef>,
        args: Vec<TypeRef>,
    },

    /// Array type (e.g., String[])
    Array {
        element: Box<TypeRef>,
        dimensions: usize,
    },

    /// Wildcard type (e.g., ? extends Number)
    Wildcard {
        bound: Option<Box<TypeRef>>,
        is_upper_bound: bool, // true: extends, false: super
    },

    #[default]
    Unknown,
}

impl TypeRef {
    /// Helper to create a Raw type
    pub fn raw(s: impl Into<String>) -> Self {
        TypeRef::Raw(s.into())
    }

    /// Helper to create an Id type
    pub fn id(s: impl Into<String>) -> Self {
        TypeRef::Id(s.into())
    }

    /// Helper to create an array of `element` with `dimensions` levels.
    ///
    /// Zero dimensions returns the element unchanged; nested arrays are flattened.
    pub fn array(element: TypeRef, dimensions: usize) -> Self {
        if dimensions == 0 {
            return element;
        }
        match element {
            TypeRef::Array {
                element,
                dimensions: inner,
            } => TypeRef::Array {
                element,
                dimensions: inner + dimensions,
            },
            other => TypeRef::Array {
                element: Box::new(other),
                dimensions,
            },
        }
    }

    /// Parse a Java-like source spelling such as `int`, `com.foo.Bar` or `Bar[][]`.
    ///
    /// Generic arguments are not understood here; the spelling is treated
    /// as an erased reference.
    pub fn parse(spelling: &str) -> Self {
        let mut base = spelling.trim();
        let mut dimensions = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.trim_end();
            dimensions += 1;
        }
        let element = if base.is_empty() {
            TypeRef::Unknown
        } else if is_primitive_name(base) {
            TypeRef::raw(base)
        } else {
            TypeRef::id(base)
        };
        TypeRef::array(element, dimensions)
    }

    /// Strip generic arguments, keeping array structure.
    ///
    /// Wildcards erase to their upper bound, or to `java.lang.Object` when
    /// they have none.
    pub fn erasure(&self) -> TypeRef {
        match self {
            TypeRef::Generic { base, .. } => base.erasure(),
            TypeRef::Array {
                element,
                dimensions,
            } => TypeRef::array(element.erasure(), *dimensions),
            TypeRef::Wildcard {
                bound: Some(bound),
                is_upper_bound: true,
            } => bound.erasure(),
            TypeRef::Wildcard { .. } => TypeRef::id(OBJECT_FQN),
            other => other.clone(),
        }
    }

    /// Split into the erased base element and its array dimension.
    pub fn element_type(&self) -> (TypeRef, usize) {
        match self.erasure() {
            TypeRef::Array {
                element,
                dimensions,
            } => {
                let (inner, extra) = element.element_type();
                (inner, dimensions + extra)
            }
            other => (other, 0),
        }
    }

    /// Comparable identity of the erased type, e.g. `java.util.List` or `int[][]`.
    ///
    /// Returns `None` when the type is unknown.
    pub fn erased_identity(&self) -> Option<String> {
        let (element, dimensions) = self.element_type();
        let base = match element {
            TypeRef::Id(fqn) | TypeRef::Raw(fqn) => fqn,
            _ => return None,
        };
        let mut key = base;
        for _ in 0..dimensions {
            key.push_str("[]");
        }
        Some(key)
    }

    /// True for primitive element types, including `void`.
    pub fn is_primitive(&self) -> bool {
        matches!(self.erasure(), TypeRef::Raw(ref name) if is_primitive_name(name))
    }

    /// True for the `void` pseudo type.
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Raw(name) if name == "void")
    }

    /// Short readable name: simple class name plus array brackets.
    pub fn simple_name(&self) -> String {
        let (element, dimensions) = self.element_type();
        let mut name = match element {
            TypeRef::Id(fqn) | TypeRef::Raw(fqn) => simple_name_of(&fqn).to_string(),
            _ => "?".to_string(),
        };
        for _ in 0..dimensions {
            name.push_str("[]");
        }
        name
    }
}

/// Last segment of a dotted or `$`-nested FQN.
pub fn simple_name_of(fqn: &str) -> &str {
    let tail = fqn.rsplit('.').next().unwrap_or(fqn);
    tail.rsplit('$').next().unwrap_or(tail)
}

/// Package part of a FQN; the default package is the empty string.
pub fn package_of(fqn: &str) -> &str {
    fqn.rfind('.').map(|idx| &fqn[..idx]).unwrap_or("")
}

/// Outermost enclosing type of a possibly nested (`Outer$Inner`) FQN.
pub fn top_level_of(fqn: &str) -> &str {
    fqn.split('$').next().unwrap_or(fqn)
}

/// Information about a type (class, interface, enum, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Fully qualified name, e.g., "java.util.List"
    pub fqn: String,
    /// Kind of type
    pub kind: TypeKind,
    /// Modifiers like public, abstract, final
    #[serde(default)]
    pub modifiers: Vec<String>,
}

/// Kind of type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
    Primitive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_spelling() {
        let ty = TypeRef::parse("com.foo.Bar[][]");
        assert_eq!(
            ty,
            TypeRef::Array {
                element: Box::new(TypeRef::id("com.foo.Bar")),
                dimensions: 2
            }
        );
        assert_eq!(TypeRef::parse("int"), TypeRef::raw("int"));
    }

    #[test]
    fn test_nested_arrays_flatten() {
        let inner = TypeRef::array(TypeRef::id("A"), 1);
        let outer = TypeRef::array(inner, 2);
        assert_eq!(outer.element_type(), (TypeRef::id("A"), 3));
    }

    #[test]
    fn test_erasure_strips_generics() {
        let ty = TypeRef::Generic {
            base: Box::new(TypeRef::id("java.util.List")),
            args: vec![TypeRef::id("java.lang.String")],
        };
        assert_eq!(ty.erased_identity().as_deref(), Some("java.util.List"));

        let arr = TypeRef::array(ty, 1);
        assert_eq!(arr.erased_identity().as_deref(), Some("java.util.List[]"));
    }

    #[test]
    fn test_wildcard_erasure() {
        let unbounded = TypeRef::Wildcard {
            bound: None,
            is_upper_bound: true,
        };
        assert_eq!(unbounded.erasure(), TypeRef::id(OBJECT_FQN));

        let upper = TypeRef::Wildcard {
            bound: Some(Box::new(TypeRef::id("java.lang.Number"))),
            is_upper_bound: true,
        };
        assert_eq!(upper.erasure(), TypeRef::id("java.lang.Number"));
    }

    #[test]
    fn test_unknown_has_no_identity() {
        assert_eq!(TypeRef::Unknown.erased_identity(), None);
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(simple_name_of("java.util.Map$Entry"), "Entry");
        assert_eq!(package_of("java.util.List"), "java.util");
        assert_eq!(package_of("Foo"), "");
        assert_eq!(top_level_of("a.Outer$Inner"), "a.Outer");
        assert_eq!(TypeRef::parse("a.b.C[]").simple_name(), "C[]");
    }
}
