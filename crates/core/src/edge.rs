//! Chain edges: one member access step in a chain.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use chainscope_api::{MemberId, MemberInfo, MemberKind, TypeModel, TypeRef};
use dashmap::DashMap;

/// Kind of an edge. Closed set; constructors never become edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Field,
    Method,
    Local,
}

/// The type an edge produces, split into erased element and array depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedType {
    /// Erased element type (never an array).
    pub element: TypeRef,
    /// Erased identity of `element`, e.g. `java.util.List` or `int`.
    pub key: String,
    pub dimension: usize,
    pub primitive: bool,
}

/// One member wrapped for the search. Equality and hashing use the member id only.
pub struct ChainEdge {
    id: MemberId,
    member: MemberInfo,
    requires_this: bool,
    resolved: OnceLock<Option<ProducedType>>,
}

impl ChainEdge {
    pub fn new(member: MemberInfo) -> Self {
        Self {
            id: member.id(),
            member,
            requires_this: false,
            resolved: OnceLock::new(),
        }
    }

    /// An entry point that must be rendered as `this.name`, because a local shadows it.
    pub fn qualified(member: MemberInfo) -> Self {
        Self {
            requires_this: true,
            ..Self::new(member)
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn member(&self) -> &MemberInfo {
        &self.member
    }

    pub fn requires_this(&self) -> bool {
        self.requires_this
    }

    pub fn kind(&self) -> Option<EdgeKind> {
        match self.member.kind {
            MemberKind::Field => Some(EdgeKind::Field),
            MemberKind::Method => Some(EdgeKind::Method),
            MemberKind::Local => Some(EdgeKind::Local),
            MemberKind::Constructor => None,
        }
    }

    pub fn is_method(&self) -> bool {
        self.kind() == Some(EdgeKind::Method)
    }

    /// Produced type, computed on first access and cached.
    ///
    /// `None` marks the edge unusable: it neither expands nor terminates a chain.
    pub fn produced(&self, model: &dyn TypeModel) -> Option<&ProducedType> {
        self.resolved
            .get_or_init(|| resolve_produced(&self.member, model))
            .as_ref()
    }

    pub fn is_usable(&self, model: &dyn TypeModel) -> bool {
        self.produced(model).is_some()
    }

    /// Produced array depth, zero for unusable edges.
    pub fn dimension(&self, model: &dyn TypeModel) -> usize {
        self.produced(model).map(|p| p.dimension).unwrap_or(0)
    }
}

fn resolve_produced(member: &MemberInfo, model: &dyn TypeModel) -> Option<ProducedType> {
    if member.kind == MemberKind::Constructor {
        return None;
    }
    let (element, dimension) = member.type_ref.element_type();
    let (key, primitive) = match &element {
        TypeRef::Raw(name) if chainscope_api::is_primitive_name(name) => (name.clone(), true),
        TypeRef::Id(fqn) if model.is_resolvable(fqn) => (fqn.clone(), false),
        other => {
            tracing::trace!("Unresolvable type {:?} for member {}", other, member.id());
            return None;
        }
    };
    Some(ProducedType {
        element,
        key,
        dimension,
        primitive,
    })
}

impl PartialEq for ChainEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChainEdge {}

impl Hash for ChainEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ChainEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEdge")
            .field("id", &self.id)
            .field("requires_this", &self.requires_this)
            .finish()
    }
}

impl fmt::Display for ChainEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.member.readable_name())
    }
}

/// Edges memoized by member identity for one search invocation.
///
/// Member identities are not stable across edits, so a cache must not
/// outlive the invocation that created it.
#[derive(Default)]
pub struct EdgeCache {
    edges: DashMap<MemberId, Arc<ChainEdge>>,
}

impl EdgeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_for(&self, member: &MemberInfo) -> Arc<ChainEdge> {
        let id = member.id();
        if let Some(edge) = self.edges.get(&id) {
            return Arc::clone(edge.value());
        }
        Arc::clone(
            self.edges
                .entry(id)
                .or_insert_with(|| Arc::new(ChainEdge::new(member.clone())))
                .value(),
        )
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainscope_api::InMemoryTypeModel;

    fn model() -> InMemoryTypeModel {
        InMemoryTypeModel::new()
            .add_class("A", None)
            .add_class("B", None)
    }

    #[test]
    fn test_array_dimension_is_stripped() {
        let ts = model();
        let edge = ChainEdge::new(MemberInfo::field("A", "bs", TypeRef::parse("B[][]")));
        let produced = edge.produced(&ts).unwrap();
        assert_eq!(produced.key, "B");
        assert_eq!(produced.dimension, 2);
        assert!(!produced.primitive);
    }

    #[test]
    fn test_unresolvable_type_marks_edge_unusable() {
        let ts = model();
        let edge = ChainEdge::new(MemberInfo::method("A", "getZ", TypeRef::id("Z")));
        assert!(!edge.is_usable(&ts));
        let unknown = ChainEdge::new(MemberInfo::method("A", "get", TypeRef::Unknown));
        assert!(!unknown.is_usable(&ts));
    }

    #[test]
    fn test_primitive_edges_resolve() {
        let ts = model();
        let edge = ChainEdge::new(MemberInfo::method("A", "size", TypeRef::raw("int")));
        assert!(edge.produced(&ts).unwrap().primitive);
    }

    #[test]
    fn test_constructor_is_not_an_edge() {
        let ts = model();
        let edge = ChainEdge::new(MemberInfo::constructor("A"));
        assert_eq!(edge.kind(), None);
        assert!(!edge.is_usable(&ts));
    }

    #[test]
    fn test_cache_returns_same_edge_for_same_member() {
        let cache = EdgeCache::new();
        let member = MemberInfo::method("A", "getB", TypeRef::id("B"));
        let first = cache.edge_for(&member);
        let second = cache.edge_for(&member.clone());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_equality_by_identity() {
        let a = ChainEdge::new(MemberInfo::field("A", "b", TypeRef::id("B")));
        let b = ChainEdge::qualified(MemberInfo::field("A", "b", TypeRef::id("B")));
        assert_eq!(a, b);
    }
}
