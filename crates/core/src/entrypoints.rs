//! Turns what is in scope at a completion site into entry-point edges.

use std::collections::HashSet;
use std::sync::Arc;

use chainscope_api::{MemberInfo, MemberKind, OBJECT_FQN};

use crate::catalog::MemberCatalog;
use crate::edge::{ChainEdge, EdgeCache};

/// Collects entry points for one completion request.
///
/// Only members whose name starts with `prefix` are offered. Members declared
/// by `java.lang.Object` and members with unresolvable types are dropped.
pub struct EntrypointCollector<'c, 'm> {
    catalog: &'c MemberCatalog<'m>,
    edges: &'c EdgeCache,
    prefix: String,
}

impl<'c, 'm> EntrypointCollector<'c, 'm> {
    pub fn new(catalog: &'c MemberCatalog<'m>, edges: &'c EdgeCache) -> Self {
        Self {
            catalog,
            edges,
            prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Entry points for an unqualified completion: locals, then fields, then methods.
    ///
    /// Each list is visited in reverse declaration order, so the closest
    /// declaration comes first. Fields shadowed by a local are marked to render
    /// as `this.name`.
    pub fn visible_scope(
        &self,
        locals: &[MemberInfo],
        fields: &[MemberInfo],
        methods: &[MemberInfo],
    ) -> Vec<Arc<ChainEdge>> {
        let local_names: HashSet<&str> = locals.iter().map(|l| l.name.as_str()).collect();
        let mut result = Vec::new();

        for local in locals.iter().rev() {
            self.offer(local, false, &mut result);
        }
        for field in fields.iter().rev() {
            let shadowed = local_names.contains(field.name.as_str());
            self.offer(field, shadowed, &mut result);
        }
        for method in methods.iter().rev() {
            if method.kind != MemberKind::Method || method.type_ref.is_void() {
                continue;
            }
            self.offer(method, false, &mut result);
        }
        result
    }

    /// Entry points for `this.` (or an unqualified site) inside `enclosing_type`, with `locals` in scope.
    pub fn enclosing_scope(&self, enclosing_type: &str, locals: &[MemberInfo]) -> Vec<Arc<ChainEdge>> {
        let members = self.catalog.members_of(enclosing_type);
        let (methods, fields): (Vec<MemberInfo>, Vec<MemberInfo>) =
            members.iter().cloned().partition(MemberInfo::is_method);
        self.visible_scope(locals, &fields, &methods)
    }

    /// Entry points after `receiver.` where `receiver` has the given type.
    pub fn instance_receiver(&self, receiver_type: &str) -> Vec<Arc<ChainEdge>> {
        let members = self.catalog.members_of(receiver_type);
        self.collect_all(&members)
    }

    /// Entry points after `Type.`: static members only.
    pub fn static_receiver(&self, type_fqn: &str) -> Vec<Arc<ChainEdge>> {
        let members = self.catalog.static_members_of(type_fqn);
        self.collect_all(&members)
    }

    fn collect_all(&self, members: &[MemberInfo]) -> Vec<Arc<ChainEdge>> {
        let mut result = Vec::new();
        for member in members {
            self.offer(member, false, &mut result);
        }
        result
    }

    fn offer(&self, member: &MemberInfo, requires_this: bool, out: &mut Vec<Arc<ChainEdge>>) {
        if !member.name.starts_with(&self.prefix) || member.declaring_type == OBJECT_FQN {
            return;
        }
        let edge = if requires_this {
            Arc::new(ChainEdge::qualified(member.clone()))
        } else {
            self.edges.edge_for(member)
        };
        if !edge.is_usable(self.catalog.model()) {
            tracing::trace!("Dropping entry point {} with unresolvable type", member.id());
            return;
        }
        out.push(edge);
    }
}
