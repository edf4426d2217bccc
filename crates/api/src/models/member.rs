//! Member descriptors handed to the chain search.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{TypeRef, package_of};

/// Kind of member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Method,
    Constructor,
    /// A local variable or parameter visible at the invocation site.
    Local,
}

/// Information about a method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name (may be synthetic like "arg0")
    pub name: String,
    /// Parameter type
    pub type_ref: TypeRef,
    /// True when this parameter is declared with `...` varargs syntax.
    #[serde(default)]
    pub is_varargs: bool,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            is_varargs: false,
        }
    }
}

/// Information about a member (field, method, constructor, local)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Simple name, e.g., "get" or "size"
    pub name: String,
    /// Kind of member
    pub kind: MemberKind,
    /// The type that declares this member. Empty for locals.
    #[serde(default)]
    pub declaring_type: String,
    /// Field type, local type or method return type
    pub type_ref: TypeRef,
    /// Method parameters (None for fields and locals)
    #[serde(default)]
    pub parameters: Option<Vec<ParameterInfo>>,
    /// Modifiers like public, static, final
    #[serde(default)]
    pub modifiers: Vec<String>,
}

impl MemberInfo {
    pub fn method(declaring_type: impl Into<String>, name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            declaring_type: declaring_type.into(),
            type_ref: return_type,
            parameters: Some(vec![]),
            modifiers: vec![],
        }
    }

    pub fn field(declaring_type: impl Into<String>, name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            declaring_type: declaring_type.into(),
            type_ref: field_type,
            parameters: None,
            modifiers: vec![],
        }
    }

    pub fn constructor(declaring_type: impl Into<String>) -> Self {
        let declaring_type = declaring_type.into();
        Self {
            name: "<init>".to_string(),
            kind: MemberKind::Constructor,
            type_ref: TypeRef::raw("void"),
            declaring_type,
            parameters: Some(vec![]),
            modifiers: vec![],
        }
    }

    pub fn local(name: impl Into<String>, local_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Local,
            declaring_type: String::new(),
            type_ref: local_type,
            parameters: None,
            modifiers: vec![],
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterInfo>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_modifiers<I, S>(mut self, modifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modifiers = modifiers.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static")
    }

    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// Erased parameter types joined with `,`, empty for non-methods.
    fn erased_parameter_list(&self) -> String {
        self.parameters
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| p.type_ref.erased_identity().unwrap_or_else(|| "?".to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Identity of the member. Two descriptors with equal ids denote the same member.
    pub fn id(&self) -> MemberId {
        let id = match self.kind {
            MemberKind::Local => format!("local:{}", self.name),
            MemberKind::Field => format!("{}#{}", self.declaring_type, self.name),
            MemberKind::Method | MemberKind::Constructor => format!(
                "{}#{}({})",
                self.declaring_type,
                self.name,
                self.erased_parameter_list()
            ),
        };
        MemberId(Arc::from(id))
    }

    /// Key used to collapse overrides and hidden fields while walking a hierarchy.
    ///
    /// Methods: name plus erased parameter types (return type ignored).
    /// Fields: name plus erased field type.
    pub fn signature_key(&self) -> String {
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => {
                format!("{}({})", self.name, self.erased_parameter_list())
            }
            _ => format!(
                "{}:{}",
                self.name,
                self.type_ref.erased_identity().unwrap_or_else(|| "?".to_string())
            ),
        }
    }

    /// Human readable method signature, e.g. `submit(Runnable)`; fields yield their name.
    pub fn readable_name(&self) -> String {
        match self.kind {
            MemberKind::Method | MemberKind::Constructor => {
                let params = self
                    .parameters
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|p| p.type_ref.simple_name())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", self.name, params)
            }
            _ => self.name.clone(),
        }
    }
}

/// Identity of a member, stable for the lifetime of one search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(Arc<str>);

impl MemberId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The location a completion is requested from; decides member visibility.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InvocationSite {
    /// FQN of the type whose body contains the invocation.
    pub enclosing_type: Option<String>,
    /// Package of the invocation; the default package is the empty string.
    pub package: String,
}

impl InvocationSite {
    /// Site inside the body of `enclosing_type`.
    pub fn within(enclosing_type: impl Into<String>) -> Self {
        let enclosing_type = enclosing_type.into();
        Self {
            package: package_of(&enclosing_type).to_string(),
            enclosing_type: Some(enclosing_type),
        }
    }

    /// Site in `package` outside of any type body.
    pub fn in_package(package: impl Into<String>) -> Self {
        Self {
            enclosing_type: None,
            package: package.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overloads_have_distinct_ids() {
        let a = MemberInfo::method("Pool", "submit", TypeRef::id("Future"))
            .with_parameters(vec![ParameterInfo::new("task", TypeRef::id("Runnable"))]);
        let b = MemberInfo::method("Pool", "submit", TypeRef::id("Future"))
            .with_parameters(vec![ParameterInfo::new("task", TypeRef::id("Callable"))]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id().as_str(), "Pool#submit(Runnable)");
    }

    #[test]
    fn test_override_shares_signature_key() {
        let base = MemberInfo::method("Base", "get", TypeRef::id("Object"));
        let sub = MemberInfo::method("Sub", "get", TypeRef::id("String"));
        assert_eq!(base.signature_key(), sub.signature_key());
        assert_ne!(base.id(), sub.id());
    }

    #[test]
    fn test_local_and_field_ids_do_not_collide() {
        let local = MemberInfo::local("pool", TypeRef::id("Pool"));
        let field = MemberInfo::field("Main", "pool", TypeRef::id("Pool"));
        assert_ne!(local.id(), field.id());
    }

    #[test]
    fn test_readable_name() {
        let m = MemberInfo::method("Pool", "submit", TypeRef::id("Future")).with_parameters(vec![
            ParameterInfo::new("task", TypeRef::id("java.lang.Runnable")),
            ParameterInfo::new("n", TypeRef::raw("int")),
        ]);
        assert_eq!(m.readable_name(), "submit(Runnable, int)");
    }

    #[test]
    fn test_site_package() {
        let site = InvocationSite::within("com.acme.Main");
        assert_eq!(site.package, "com.acme");
    }
}
