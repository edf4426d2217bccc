//! In-memory implementation of [`TypeModel`](crate::TypeModel).
//!
//! Can be built with a fluent API or loaded from a JSON snapshot.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::models::{MemberInfo, TypeInfo, TypeKind, TypeRef};
use crate::type_system::{InheritanceProvider, MemberProvider, TypeProvider, VisibilityProvider};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTypeModel {
    types: IndexMap<String, TypeInfo>,
    inheritance: IndexMap<String, (Option<String>, Vec<String>)>, // (superclass, interfaces)
    members: IndexMap<String, Vec<MemberInfo>>,
}

/// Serialized form of one type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub fqn: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Members; `declaring_type` may be omitted and defaults to `fqn`.
    #[serde(default)]
    pub members: Vec<MemberInfo>,
}

/// Serialized form of a whole type model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeModelSnapshot {
    pub types: Vec<TypeDecl>,
}

impl InMemoryTypeModel {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self::default()
    }

    fn declare(&mut self, fqn: &str, kind: TypeKind, super_class: Option<&str>) {
        self.types.insert(
            fqn.to_string(),
            TypeInfo {
                fqn: fqn.to_string(),
                kind,
                modifiers: vec![],
            },
        );
        let entry = self
            .inheritance
            .entry(fqn.to_string())
            .or_insert((None, vec![]));
        entry.0 = super_class.map(|s| s.to_string());
    }

    /// Add a class to the model.
    pub fn add_class(mut self, fqn: &str, super_class: Option<&str>) -> Self {
        self.declare(fqn, TypeKind::Class, super_class);
        self
    }

    /// Add an interface to the model.
    pub fn add_interface(mut self, fqn: &str) -> Self {
        self.declare(fqn, TypeKind::Interface, None);
        self
    }

    /// Add interface implementation (or interface extension) to a type.
    pub fn implements(mut self, type_fqn: &str, interface_fqn: &str) -> Self {
        self.inheritance
            .entry(type_fqn.to_string())
            .or_insert((None, vec![]))
            .1
            .push(interface_fqn.to_string());
        if !self.types.contains_key(interface_fqn) {
            self = self.add_interface(interface_fqn);
        }
        self
    }

    /// Add a parameterless method to a type.
    pub fn add_method(self, class_fqn: &str, name: &str, return_type: TypeRef) -> Self {
        self.add_member(MemberInfo::method(class_fqn, name, return_type))
    }

    /// Add a field to a type.
    pub fn add_field(self, class_fqn: &str, name: &str, field_type: TypeRef) -> Self {
        self.add_member(MemberInfo::field(class_fqn, name, field_type))
    }

    /// Add an arbitrary member; it is registered under its declaring type.
    pub fn add_member(mut self, member: MemberInfo) -> Self {
        self.members
            .entry(member.declaring_type.clone())
            .or_default()
            .push(member);
        self
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn from_snapshot(snapshot: TypeModelSnapshot) -> ApiResult<Self> {
        let mut model = Self::new();
        for decl in snapshot.types {
            if decl.fqn.is_empty() {
                return Err(ApiError::InvalidArgument(
                    "type declaration without fqn".to_string(),
                ));
            }
            model.declare(&decl.fqn, decl.kind, decl.superclass.as_deref());
            if let Some(info) = model.types.get_mut(&decl.fqn) {
                info.modifiers = decl.modifiers;
            }
            for interface in decl.interfaces {
                model = model.implements(&decl.fqn, &interface);
            }
            for mut member in decl.members {
                if member.declaring_type.is_empty() {
                    member.declaring_type = decl.fqn.clone();
                }
                model = model.add_member(member);
            }
        }
        Ok(model)
    }

    pub fn from_json(json: &str) -> ApiResult<Self> {
        let snapshot: TypeModelSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn load(path: &Path) -> ApiResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ApiError::NotFound(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Export the model; interfaces that were only referenced are kept as declarations.
    pub fn to_snapshot(&self) -> TypeModelSnapshot {
        let types = self
            .types
            .values()
            .map(|info| {
                let (superclass, interfaces) = self
                    .inheritance
                    .get(&info.fqn)
                    .cloned()
                    .unwrap_or_default();
                TypeDecl {
                    fqn: info.fqn.clone(),
                    kind: info.kind,
                    modifiers: info.modifiers.clone(),
                    superclass,
                    interfaces,
                    members: self.members.get(&info.fqn).cloned().unwrap_or_default(),
                }
            })
            .collect();
        TypeModelSnapshot { types }
    }
}

impl TypeProvider for InMemoryTypeModel {
    fn get_type_info(&self, fqn: &str) -> Option<TypeInfo> {
        self.types.get(fqn).cloned()
    }
}

impl InheritanceProvider for InMemoryTypeModel {
    fn get_superclass(&self, fqn: &str) -> Option<String> {
        self.inheritance
            .get(fqn)
            .and_then(|(super_class, _)| super_class.clone())
    }

    fn get_interfaces(&self, fqn: &str) -> Vec<String> {
        self.inheritance
            .get(fqn)
            .map(|(_, interfaces)| interfaces.clone())
            .unwrap_or_default()
    }
}

impl MemberProvider for InMemoryTypeModel {
    fn get_all_members(&self, type_fqn: &str) -> Vec<MemberInfo> {
        self.members.get(type_fqn).cloned().unwrap_or_default()
    }
}

impl VisibilityProvider for InMemoryTypeModel {}
