//! Core trait definitions for the type model abstraction.
//!
//! These traits abstract away the data source, allowing the chain search
//! to work with an index, compiled stubs, or an in-memory model.

use std::collections::{HashSet, VecDeque};

use crate::models::{
    InvocationSite, MemberInfo, MemberKind, TypeInfo, package_of, top_level_of,
};

/// Provides type information by FQN.
pub trait TypeProvider: Send + Sync {
    /// Get type info for a fully qualified name.
    ///
    /// Returns `None` if the type cannot be resolved.
    fn get_type_info(&self, fqn: &str) -> Option<TypeInfo>;
}

/// Provides inheritance relationship information.
pub trait InheritanceProvider: Send + Sync {
    /// Get the direct superclass of a type.
    ///
    /// Returns `None` for `java.lang.Object` or interfaces.
    fn get_superclass(&self, fqn: &str) -> Option<String>;

    /// Get the interfaces directly implemented by a type.
    fn get_interfaces(&self, fqn: &str) -> Vec<String>;

    /// Walk all ancestor types (superclasses and interfaces).
    ///
    /// Yields types in BFS order, each at most once, excluding `fqn` itself.
    fn walk_ancestors(&self, fqn: &str) -> Box<dyn Iterator<Item = String> + '_> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(fqn.to_string());
        let mut queue = VecDeque::new();
        queue.extend(self.get_superclass(fqn));
        queue.extend(self.get_interfaces(fqn));

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            queue.extend(self.get_superclass(&current));
            queue.extend(self.get_interfaces(&current));
            result.push(current);
        }

        Box::new(result.into_iter())
    }

    /// The type itself followed by all of its supertypes and superinterfaces.
    fn all_supertypes_and_interfaces(&self, fqn: &str) -> Vec<String> {
        std::iter::once(fqn.to_string())
            .chain(self.walk_ancestors(fqn))
            .collect()
    }

    /// True if `sub` equals `sup` or has it among its ancestors.
    fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.walk_ancestors(sub).any(|ancestor| ancestor == sup)
    }
}

/// Provides member (field/method) lookup within a single type.
pub trait MemberProvider: Send + Sync {
    /// Get all members directly declared in the given type.
    ///
    /// Does NOT search the inheritance hierarchy.
    fn get_all_members(&self, type_fqn: &str) -> Vec<MemberInfo>;

    fn declared_fields(&self, type_fqn: &str) -> Vec<MemberInfo> {
        self.get_all_members(type_fqn)
            .into_iter()
            .filter(|m| m.kind == MemberKind::Field)
            .collect()
    }

    fn declared_methods(&self, type_fqn: &str) -> Vec<MemberInfo> {
        self.get_all_members(type_fqn)
            .into_iter()
            .filter(|m| matches!(m.kind, MemberKind::Method | MemberKind::Constructor))
            .collect()
    }
}

/// Decides whether a member can be accessed from an invocation site.
pub trait VisibilityProvider: InheritanceProvider {
    /// Java access rules on the member's modifiers.
    fn is_visible(&self, member: &MemberInfo, site: &InvocationSite) -> bool {
        if member.kind == MemberKind::Local || member.has_modifier("public") {
            return true;
        }
        let declaring = member.declaring_type.as_str();
        let same_package = package_of(declaring) == site.package;

        if member.has_modifier("private") {
            return site
                .enclosing_type
                .as_deref()
                .is_some_and(|enclosing| top_level_of(enclosing) == top_level_of(declaring));
        }
        if member.has_modifier("protected") {
            return same_package
                || site
                    .enclosing_type
                    .as_deref()
                    .is_some_and(|enclosing| self.is_subtype_of(enclosing, declaring));
        }
        same_package
    }
}

/// The combined type model interface consulted by the chain search.
pub trait TypeModel: TypeProvider + InheritanceProvider + MemberProvider + VisibilityProvider {
    /// True if the FQN resolves to a known type.
    fn is_resolvable(&self, fqn: &str) -> bool {
        self.get_type_info(fqn).is_some()
    }
}

// Blanket implementation: any type implementing all four traits is a TypeModel
impl<T: TypeProvider + InheritanceProvider + MemberProvider + VisibilityProvider> TypeModel for T {}
