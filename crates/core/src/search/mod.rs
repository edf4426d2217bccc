//! Chain search strategies.
//!
//! Two result-equivalent engines sit behind [`ChainSearch`]: the breadth-first
//! [`ChainFinder`] and the reverse-graph [`GraphSearch`]. Both share one
//! [`SearchContext`] holding the per-invocation caches.

pub mod finder;
pub mod graph;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chainscope_api::{InvocationSite, MemberId, TypeModel};
use serde::{Deserialize, Serialize};

use crate::assignable::AssignabilityOracle;
use crate::budget::{SearchBudget, StopReason};
use crate::catalog::MemberCatalog;
use crate::chain::SearchResult;
use crate::edge::{ChainEdge, EdgeCache};
use crate::entrypoints::EntrypointCollector;
use crate::error::{ChainError, Result};
use crate::request::SearchRequest;

pub use finder::ChainFinder;
pub use graph::{ChainGraph, GraphSearch};

/// Which engine answers a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    #[default]
    Breadth,
    Graph,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Breadth => f.write_str("breadth"),
            SearchStrategy::Graph => f.write_str("graph"),
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "breadth" | "bfs" => Ok(SearchStrategy::Breadth),
            "graph" => Ok(SearchStrategy::Graph),
            other => Err(ChainError::Config(format!("unknown search strategy: {other}"))),
        }
    }
}

/// A chain search engine.
pub trait ChainSearch: Send + Sync {
    /// Run one search. Only a malformed request is an error; budget cuts and
    /// cancellation produce a partial result.
    fn search(&self, request: &SearchRequest, budget: &SearchBudget) -> Result<SearchResult>;

    /// Search several expected types in order, merging results up to the first
    /// request's result cap.
    ///
    /// Expected types that are themselves excluded are skipped. A chain found
    /// for more than one expected type is reported once.
    fn search_all(&self, requests: &[SearchRequest], budget: &SearchBudget) -> Result<SearchResult> {
        let mut merged = SearchResult::empty();
        let Some(cap) = requests.first().map(|r| r.max_results) else {
            return Ok(merged);
        };
        for request in requests {
            request.validate()?;
        }

        let mut seen: HashSet<Vec<MemberId>> = HashSet::new();
        for (i, request) in requests.iter().enumerate() {
            if request.is_excluded(&request.expected.key) {
                tracing::debug!("Skipping excluded expected type {}", request.expected.key);
                continue;
            }
            let remaining = cap - merged.chains.len();
            let request = SearchRequest {
                max_results: remaining,
                ..request.clone()
            };
            let result = self.search(&request, budget)?;
            merged.frontier_truncated |= result.frontier_truncated;
            for chain in result.chains {
                if seen.insert(chain.ids()) {
                    merged.chains.push(chain);
                }
            }

            if merged.chains.len() >= cap {
                merged.stop_reason = StopReason::ResultLimit;
                merged.pending_work = result.pending_work || i + 1 < requests.len();
                break;
            }
            if result.stop_reason != StopReason::Exhausted {
                merged.stop_reason = result.stop_reason;
                merged.pending_work = true;
                break;
            }
        }
        Ok(merged)
    }
}

/// Build the engine selected by `strategy`.
pub fn engine<'m>(
    strategy: SearchStrategy,
    model: &'m dyn TypeModel,
    site: InvocationSite,
    worker_threads: Option<usize>,
) -> Result<Box<dyn ChainSearch + 'm>> {
    Ok(match strategy {
        SearchStrategy::Breadth => Box::new(ChainFinder::new(model, site)),
        SearchStrategy::Graph => Box::new(GraphSearch::new(model, site, worker_threads)?),
    })
}

/// Caches shared by every search of one completion invocation.
///
/// Member identities are only stable within an invocation, so a context
/// should not be reused once the underlying code changes.
pub struct SearchContext<'m> {
    model: &'m dyn TypeModel,
    catalog: MemberCatalog<'m>,
    edges: EdgeCache,
    oracle: AssignabilityOracle<'m>,
}

impl<'m> SearchContext<'m> {
    pub fn new(model: &'m dyn TypeModel, site: InvocationSite) -> Self {
        Self {
            model,
            catalog: MemberCatalog::new(model, site),
            edges: EdgeCache::new(),
            oracle: AssignabilityOracle::new(model),
        }
    }

    pub fn model(&self) -> &'m dyn TypeModel {
        self.model
    }

    pub fn catalog(&self) -> &MemberCatalog<'m> {
        &self.catalog
    }

    pub fn edges(&self) -> &EdgeCache {
        &self.edges
    }

    pub fn oracle(&self) -> &AssignabilityOracle<'m> {
        &self.oracle
    }

    /// Entry-point collection backed by this context's catalog and edge cache.
    pub fn collector(&self) -> EntrypointCollector<'_, 'm> {
        EntrypointCollector::new(&self.catalog, &self.edges)
    }

    pub(crate) fn is_terminal(&self, edge: &ChainEdge, request: &SearchRequest) -> bool {
        self.oracle.is_valid_terminal(edge, &request.expected)
    }

    /// Whether a chain ending in the terminal `edge` at 1-based `position` is reported.
    ///
    /// A lone field or local never is, nor is a chain shorter than the
    /// minimum. Either way a terminal chain is never extended.
    pub(crate) fn accepts(&self, edge: &ChainEdge, position: usize, request: &SearchRequest) -> bool {
        position >= request.min_chain_length && !(position == 1 && !edge.is_method())
    }

    /// Usable edges reachable by one member access from `edge`'s produced type.
    ///
    /// Members declared by excluded types are skipped.
    pub(crate) fn successors(&self, edge: &ChainEdge, request: &SearchRequest) -> Vec<Arc<ChainEdge>> {
        let Some(produced) = edge.produced(self.model) else {
            return Vec::new();
        };
        if produced.primitive {
            return Vec::new();
        }
        self.catalog
            .members_of(&produced.key)
            .iter()
            .filter(|member| !request.is_excluded(&member.declaring_type))
            .map(|member| self.edges.edge_for(member))
            .filter(|next| next.is_usable(self.model))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("graph".parse::<SearchStrategy>().unwrap(), SearchStrategy::Graph);
        assert_eq!("Breadth".parse::<SearchStrategy>().unwrap(), SearchStrategy::Breadth);
        assert!("dfs".parse::<SearchStrategy>().is_err());
        assert_eq!(SearchStrategy::Graph.to_string(), "graph");
    }
}
