//! Member catalog: which members can continue a chain from a given type.

use std::sync::Arc;

use chainscope_api::{InvocationSite, MemberInfo, MemberKind, TypeModel};
use dashmap::DashMap;
use indexmap::IndexMap;

pub type MemberSet = Arc<[MemberInfo]>;

/// Instance or static view of a type's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberScope {
    /// Non-static fields and relevant non-static methods.
    Instance,
    /// Static fields and relevant static methods (for `Type.` receivers).
    Static,
}

/// Enumerates and memoizes the accessible members of a type and its supertypes.
///
/// Entries are never mutated once computed, so concurrent lookups from graph
/// workers can share one catalog.
pub struct MemberCatalog<'m> {
    model: &'m dyn TypeModel,
    site: InvocationSite,
    instance: DashMap<String, MemberSet>,
    statics: DashMap<String, MemberSet>,
}

impl<'m> MemberCatalog<'m> {
    pub fn new(model: &'m dyn TypeModel, site: InvocationSite) -> Self {
        Self {
            model,
            site,
            instance: DashMap::new(),
            statics: DashMap::new(),
        }
    }

    pub fn model(&self) -> &'m dyn TypeModel {
        self.model
    }

    pub fn site(&self) -> &InvocationSite {
        &self.site
    }

    /// Visible non-static fields and chainable non-static methods of `type_fqn`.
    ///
    /// Unresolvable types yield an empty set.
    pub fn members_of(&self, type_fqn: &str) -> MemberSet {
        self.lookup(type_fqn, MemberScope::Instance)
    }

    /// Visible static fields and chainable static methods of `type_fqn`.
    pub fn static_members_of(&self, type_fqn: &str) -> MemberSet {
        self.lookup(type_fqn, MemberScope::Static)
    }

    pub fn cached_types(&self) -> usize {
        self.instance.len() + self.statics.len()
    }

    fn lookup(&self, type_fqn: &str, scope: MemberScope) -> MemberSet {
        let cache = match scope {
            MemberScope::Instance => &self.instance,
            MemberScope::Static => &self.statics,
        };
        if let Some(hit) = cache.get(type_fqn) {
            return Arc::clone(hit.value());
        }
        let computed = self.collect(type_fqn, scope);
        Arc::clone(
            cache
                .entry(type_fqn.to_string())
                .or_insert(computed)
                .value(),
        )
    }

    fn collect(&self, type_fqn: &str, scope: MemberScope) -> MemberSet {
        if !self.model.is_resolvable(type_fqn) {
            tracing::trace!("No type information for {}, dead end", type_fqn);
            return Arc::from(Vec::new());
        }

        // Most-derived declaration wins; IndexMap keeps first-seen order.
        let mut found: IndexMap<String, MemberInfo> = IndexMap::new();
        for current in self.model.all_supertypes_and_interfaces(type_fqn) {
            for method in self.model.declared_methods(&current) {
                if !is_chainable_method(&method, scope) || !self.model.is_visible(&method, &self.site) {
                    continue;
                }
                found.entry(method.signature_key()).or_insert(method);
            }
            for field in self.model.declared_fields(&current) {
                if field.is_static() != (scope == MemberScope::Static)
                    || !self.model.is_visible(&field, &self.site)
                {
                    continue;
                }
                found.entry(field.signature_key()).or_insert(field);
            }
        }
        found.into_values().collect::<Vec<_>>().into()
    }
}

/// A method whose result is a meaningful object: not void, not primitive, not a constructor.
fn is_chainable_method(method: &MemberInfo, scope: MemberScope) -> bool {
    method.kind == MemberKind::Method
        && method.is_static() == (scope == MemberScope::Static)
        && !method.type_ref.is_primitive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainscope_api::{InMemoryTypeModel, TypeRef};

    fn names(set: &MemberSet) -> Vec<String> {
        set.iter().map(|m| m.name.clone()).collect()
    }

    #[test]
    fn test_filters_void_primitive_static_and_constructors() {
        let ts = InMemoryTypeModel::new()
            .add_class("A", None)
            .add_class("B", None)
            .add_method("A", "getB", TypeRef::id("B"))
            .add_method("A", "run", TypeRef::raw("void"))
            .add_method("A", "size", TypeRef::raw("int"))
            .add_member(MemberInfo::constructor("A"))
            .add_member(MemberInfo::method("A", "create", TypeRef::id("A")).with_modifiers(["static"]))
            .add_field("A", "b", TypeRef::id("B"))
            .add_member(MemberInfo::field("A", "INSTANCE", TypeRef::id("A")).with_modifiers(["static"]));
        let catalog = MemberCatalog::new(&ts, InvocationSite::default());

        assert_eq!(names(&catalog.members_of("A")), vec!["getB", "b"]);
        assert_eq!(names(&catalog.static_members_of("A")), vec!["create", "INSTANCE"]);
    }

    #[test]
    fn test_override_keeps_most_derived() {
        let ts = InMemoryTypeModel::new()
            .add_class("Base", None)
            .add_class("Sub", Some("Base"))
            .add_class("R", None)
            .add_method("Base", "get", TypeRef::id("R"))
            .add_method("Base", "other", TypeRef::id("R"))
            .add_method("Sub", "get", TypeRef::id("R"));
        let catalog = MemberCatalog::new(&ts, InvocationSite::default());

        let members = catalog.members_of("Sub");
        assert_eq!(names(&members), vec!["get", "other"]);
        assert_eq!(members[0].declaring_type, "Sub");
    }

    #[test]
    fn test_unresolvable_type_is_empty() {
        let ts = InMemoryTypeModel::new();
        let catalog = MemberCatalog::new(&ts, InvocationSite::default());
        assert!(catalog.members_of("Missing").is_empty());
    }

    #[test]
    fn test_results_are_memoized() {
        let ts = InMemoryTypeModel::new()
            .add_class("A", None)
            .add_method("A", "self_", TypeRef::id("A"));
        let catalog = MemberCatalog::new(&ts, InvocationSite::default());
        let first = catalog.members_of("A");
        let second = catalog.members_of("A");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(catalog.cached_types(), 1);
    }

    #[test]
    fn test_invisible_members_are_skipped() {
        let ts = InMemoryTypeModel::new()
            .add_class("a.A", None)
            .add_class("a.B", None)
            .add_member(MemberInfo::method("a.A", "hidden", TypeRef::id("a.B")).with_modifiers(["private"]))
            .add_member(MemberInfo::method("a.A", "shown", TypeRef::id("a.B")).with_modifiers(["public"]));
        let catalog = MemberCatalog::new(&ts, InvocationSite::in_package("other"));
        assert_eq!(names(&catalog.members_of("a.A")), vec!["shown"]);
    }
}
