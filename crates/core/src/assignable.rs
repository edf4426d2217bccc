//! Decides whether an edge can end a chain aimed at an expected type.

use chainscope_api::{MemberId, OBJECT_FQN, TypeModel};
use dashmap::DashMap;

use crate::edge::ChainEdge;
use crate::request::ExpectedType;

type TerminalKey = (MemberId, String, usize);

/// Memoized terminal checks for one search invocation.
///
/// Keyed by edge identity plus the expected element and dimension, since
/// `Foo` and `Foo[]` are different targets for the same edge.
pub struct AssignabilityOracle<'m> {
    model: &'m dyn TypeModel,
    cache: DashMap<TerminalKey, bool>,
}

impl<'m> AssignabilityOracle<'m> {
    pub fn new(model: &'m dyn TypeModel) -> Self {
        Self {
            model,
            cache: DashMap::new(),
        }
    }

    pub fn is_valid_terminal(&self, edge: &ChainEdge, expected: &ExpectedType) -> bool {
        let key = (edge.id().clone(), expected.key.clone(), expected.dimension);
        if let Some(hit) = self.cache.get(&key) {
            return *hit;
        }
        let verdict = self.compute(edge, expected);
        self.cache.insert(key, verdict);
        verdict
    }

    pub fn cached_checks(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, edge: &ChainEdge, expected: &ExpectedType) -> bool {
        let Some(produced) = edge.produced(self.model) else {
            return false;
        };
        // Extra array wrapping is indexed away; missing wrapping cannot be added.
        if produced.dimension < expected.dimension {
            return false;
        }
        if produced.primitive {
            return false;
        }
        if produced.key == expected.key || expected.key == OBJECT_FQN {
            return true;
        }
        self.model
            .walk_ancestors(&produced.key)
            .any(|ancestor| ancestor == expected.key)
    }
}
