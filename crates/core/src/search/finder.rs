use std::collections::{HashSet, VecDeque};

use chainscope_api::{InvocationSite, TypeModel};

use crate::budget::{SearchBudget, StopReason};
use crate::chain::{Chain, SearchResult};
use crate::error::Result;
use crate::request::SearchRequest;

use super::{ChainSearch, SearchContext};

/// Breadth-first chain search over a FIFO frontier.
///
/// Single-threaded; the budget is checked once per loop iteration and a
/// cancelled search returns whatever it found so far.
pub struct ChainFinder<'m> {
    context: SearchContext<'m>,
}

impl<'m> ChainFinder<'m> {
    pub fn new(model: &'m dyn TypeModel, site: InvocationSite) -> Self {
        Self {
            context: SearchContext::new(model, site),
        }
    }

    pub fn context(&self) -> &SearchContext<'m> {
        &self.context
    }
}

impl ChainSearch for ChainFinder<'_> {
    fn search(&self, request: &SearchRequest, budget: &SearchBudget) -> Result<SearchResult> {
        request.validate()?;
        let ctx = &self.context;

        let mut seeded = HashSet::new();
        let mut frontier: VecDeque<Chain> = request
            .entrypoints
            .iter()
            .filter(|edge| seeded.insert(edge.id().clone()))
            .cloned()
            .map(Chain::new)
            .collect();
        let mut result = SearchResult::empty();
        let mut examined = 0usize;

        tracing::debug!(
            "Searching chains to {} from {} entry points (length {}..={})",
            request.expected.key,
            frontier.len(),
            request.min_chain_length,
            request.max_chain_length
        );

        let stop_reason = loop {
            if let Some(reason) = budget.check() {
                break reason;
            }
            if result.chains.len() >= request.max_results {
                break StopReason::ResultLimit;
            }
            let Some(chain) = frontier.pop_front() else {
                break StopReason::Exhausted;
            };
            examined += 1;

            let edge = chain.last();
            if !edge.is_usable(ctx.model()) {
                continue;
            }
            if ctx.is_terminal(edge, request) {
                if ctx.accepts(edge, chain.len(), request) {
                    result.chains.push(chain);
                }
                continue;
            }
            if chain.len() >= request.max_chain_length {
                continue;
            }

            for next in ctx.successors(edge, request) {
                let Some(longer) = chain.extended(next) else {
                    continue;
                };
                if frontier.len() >= request.max_frontier {
                    if !result.frontier_truncated {
                        tracing::warn!(
                            "Frontier reached {} pending chains, dropping further expansions",
                            request.max_frontier
                        );
                    }
                    result.frontier_truncated = true;
                    break;
                }
                frontier.push_back(longer);
            }
        };
        result.stop_reason = stop_reason;
        result.pending_work = !frontier.is_empty();

        tracing::debug!(
            "Found {} chains after examining {} ({:?}, {} pending)",
            result.chains.len(),
            examined,
            result.stop_reason,
            frontier.len()
        );
        Ok(result)
    }
}
