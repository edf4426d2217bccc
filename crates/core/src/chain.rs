//! Chains and search results.

use std::fmt;
use std::sync::Arc;

use chainscope_api::{MemberId, TypeModel};
use serde::Serialize;

use crate::budget::StopReason;
use crate::edge::{ChainEdge, EdgeKind};

/// An ordered, non-empty sequence of edges: `entry.edge2. … .edgeN`.
///
/// No edge identity repeats within a chain.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Chain {
    edges: Vec<Arc<ChainEdge>>,
}

impl Chain {
    pub fn new(entrypoint: Arc<ChainEdge>) -> Self {
        Self {
            edges: vec![entrypoint],
        }
    }

    /// Build from a path of edges, returning `None` if it is empty or repeats an edge.
    pub fn from_edges(edges: Vec<Arc<ChainEdge>>) -> Option<Self> {
        if edges.is_empty() {
            return None;
        }
        for (i, edge) in edges.iter().enumerate() {
            if edges[..i].iter().any(|prev| prev.id() == edge.id()) {
                return None;
            }
        }
        Some(Self { edges })
    }

    /// A new chain with `edge` appended, or `None` if `edge` is already on it.
    pub fn extended(&self, edge: Arc<ChainEdge>) -> Option<Self> {
        if self.contains(edge.id()) {
            return None;
        }
        let mut edges = Vec::with_capacity(self.edges.len() + 1);
        edges.extend(self.edges.iter().cloned());
        edges.push(edge);
        Some(Self { edges })
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.edges.iter().any(|edge| edge.id() == id)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Chains are never empty.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edges(&self) -> &[Arc<ChainEdge>] {
        &self.edges
    }

    pub fn entrypoint(&self) -> &Arc<ChainEdge> {
        &self.edges[0]
    }

    pub fn last(&self) -> &Arc<ChainEdge> {
        &self.edges[self.edges.len() - 1]
    }

    pub fn ids(&self) -> Vec<MemberId> {
        self.edges.iter().map(|edge| edge.id().clone()).collect()
    }

    /// Readable code form, e.g. `this.pool.submit(Runnable).get()`.
    ///
    /// Array dimensions not consumed by the expected type render as `[]`.
    pub fn to_code(&self, model: &dyn TypeModel, expected_dimension: usize) -> String {
        let mut code = String::new();
        let last = self.edges.len() - 1;
        for (i, edge) in self.edges.iter().enumerate() {
            if i > 0 {
                code.push('.');
            } else if edge.requires_this() {
                code.push_str("this.");
            }
            match edge.kind() {
                Some(EdgeKind::Method) => code.push_str(&edge.member().readable_name()),
                _ => code.push_str(&edge.member().name),
            }
            let dimension = edge.dimension(model);
            let indexed = if i == last {
                dimension.saturating_sub(expected_dimension)
            } else {
                dimension
            };
            for _ in 0..indexed {
                code.push_str("[]");
            }
        }
        code
    }

    pub fn summary(&self, model: &dyn TypeModel, expected_dimension: usize) -> ChainSummary {
        ChainSummary {
            code: self.to_code(model, expected_dimension),
            length: self.len(),
            members: self
                .edges
                .iter()
                .map(|edge| edge.id().to_string())
                .collect(),
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.edges.iter().map(|edge| edge.id().as_str()))
            .finish()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.edges.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{edge}")?;
        }
        Ok(())
    }
}

/// Serializable view of one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainSummary {
    pub code: String,
    pub length: usize,
    /// Member ids, entry point first.
    pub members: Vec<String>,
}

/// Outcome of one search: chains in discovery order plus why the search stopped.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chains: Vec<Chain>,
    pub stop_reason: StopReason,
    /// Expansions were refused because the frontier was full.
    pub frontier_truncated: bool,
    /// Work was still pending when the search stopped.
    pub pending_work: bool,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            chains: Vec::new(),
            stop_reason: StopReason::Exhausted,
            frontier_truncated: false,
            pending_work: false,
        }
    }

    /// True when the result was cut short by a budget, cancellation or the frontier cap.
    pub fn incomplete(&self) -> bool {
        if self.frontier_truncated {
            return true;
        }
        match self.stop_reason {
            StopReason::Exhausted => false,
            StopReason::ResultLimit => self.pending_work,
            StopReason::Cancelled | StopReason::DeadlineElapsed => true,
        }
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn summaries(&self, model: &dyn TypeModel, expected_dimension: usize) -> Vec<ChainSummary> {
        self.chains
            .iter()
            .map(|chain| chain.summary(model, expected_dimension))
            .collect()
    }
}
