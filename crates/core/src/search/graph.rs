//! Reverse-graph chain search.
//!
//! A worker pool expands every reachable member into a shared map of
//! "type -> edges producing it". A backward walk then starts at each edge
//! that can end a chain and follows producers back to an entry point.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use chainscope_api::{InvocationSite, TypeModel};
use dashmap::DashMap;
use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use crate::budget::{SearchBudget, StopReason};
use crate::chain::{Chain, SearchResult};
use crate::edge::ChainEdge;
use crate::error::{ChainError, Result};
use crate::request::SearchRequest;

use super::{ChainSearch, SearchContext};

/// An edge registered under the node of the type it produces.
#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub edge: Arc<ChainEdge>,
    /// Node the edge is accessed on; `None` for entry points.
    pub source: Option<String>,
    /// Shallowest 1-based chain position the edge was reached at.
    pub depth: usize,
}

#[derive(Debug)]
struct TypeNode {
    incoming: Vec<GraphEdge>,
    best_depth: usize,
}

/// The materialized reverse graph for one request.
pub struct ChainGraph {
    nodes: DashMap<String, TypeNode>,
    registered: AtomicUsize,
    interrupted: OnceLock<StopReason>,
    truncated: OnceLock<()>,
}

impl ChainGraph {
    fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            registered: AtomicUsize::new(0),
            interrupted: OnceLock::new(),
            truncated: OnceLock::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }

    /// Edges producing `type_key`, in no particular order.
    pub fn producers(&self, type_key: &str) -> Vec<GraphEdge> {
        self.nodes
            .get(type_key)
            .map(|node| node.incoming.clone())
            .unwrap_or_default()
    }

    /// Why construction stopped early, if it did.
    pub fn interrupted(&self) -> Option<StopReason> {
        self.interrupted.get().copied()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated.get().is_some()
    }

    /// Register `edge` and report whether its node must be (re)expanded.
    ///
    /// Terminal edges are recorded but never expand their node.
    fn register(
        &self,
        edge: &Arc<ChainEdge>,
        key: &str,
        source: Option<&str>,
        depth: usize,
        terminal: bool,
        cap: usize,
    ) -> bool {
        let mut node = self.nodes.entry(key.to_string()).or_insert_with(|| TypeNode {
            incoming: Vec::new(),
            best_depth: usize::MAX,
        });

        match node
            .incoming
            .iter_mut()
            .find(|known| known.edge.id() == edge.id() && known.source.as_deref() == source)
        {
            Some(known) => known.depth = known.depth.min(depth),
            None => {
                let reserved = self
                    .registered
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| (n < cap).then_some(n + 1));
                if reserved.is_err() {
                    let _ = self.truncated.set(());
                    return false;
                }
                node.incoming.push(GraphEdge {
                    edge: Arc::clone(edge),
                    source: source.map(str::to_string),
                    depth,
                });
            }
        }

        if !terminal && depth < node.best_depth {
            node.best_depth = depth;
            true
        } else {
            false
        }
    }
}

/// Graph-based engine; construction runs on a dedicated rayon pool.
pub struct GraphSearch<'m> {
    context: SearchContext<'m>,
    pool: ThreadPool,
}

impl<'m> GraphSearch<'m> {
    /// `worker_threads` defaults to the available parallelism.
    pub fn new(model: &'m dyn TypeModel, site: InvocationSite, worker_threads: Option<usize>) -> Result<Self> {
        let threads = worker_threads
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
            .max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("chain-graph-{idx}"))
            .build()
            .map_err(|e| ChainError::Internal(format!("failed to start graph workers: {e}")))?;
        Ok(Self {
            context: SearchContext::new(model, site),
            pool,
        })
    }

    pub fn context(&self) -> &SearchContext<'m> {
        &self.context
    }

    /// Build the reverse graph reachable from the request's entry points.
    ///
    /// Returns once every spawned job has finished; the scope is the
    /// completion barrier. On cancellation no new jobs are started.
    pub fn build(&self, request: &SearchRequest, budget: &SearchBudget) -> ChainGraph {
        let graph = ChainGraph::new();
        let worker = Worker {
            context: &self.context,
            request,
            budget,
            graph: &graph,
        };
        self.pool.scope(|scope| {
            for entry in &request.entrypoints {
                let worker = &worker;
                let entry = Arc::clone(entry);
                scope.spawn(move |scope| worker.run(scope, entry, None, 1));
            }
        });
        tracing::debug!(
            "Chain graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Walk the graph backwards from every terminal edge to an entry point.
    pub fn collect(&self, graph: &ChainGraph, request: &SearchRequest, budget: &SearchBudget) -> SearchResult {
        let ctx = &self.context;
        let mut result = SearchResult::empty();
        let mut seen = HashSet::new();
        // An interrupted build is still walked; the partial graph bounds the work.
        let interrupted = graph.interrupted();
        let mut stop = interrupted;
        result.pending_work = interrupted.is_some();

        // Partial paths, last edge first.
        let mut queue: VecDeque<Vec<GraphEdge>> = VecDeque::new();
        for node in graph.nodes.iter() {
            for incoming in &node.incoming {
                if ctx.is_terminal(&incoming.edge, request) {
                    queue.push_back(vec![incoming.clone()]);
                }
            }
        }

        while let Some(path) = queue.pop_front() {
            if interrupted.is_none() {
                if let Some(reason) = budget.check() {
                    stop = Some(reason);
                    result.pending_work = true;
                    break;
                }
            }
            let Some(head) = path.last() else {
                continue;
            };

            match &head.source {
                None => {
                    let edges = path.iter().rev().map(|step| Arc::clone(&step.edge)).collect();
                    if let Some(chain) = Chain::from_edges(edges) {
                        if self.is_forward_result(&chain, request) && seen.insert(chain.ids()) {
                            result.chains.push(chain);
                        }
                    }
                }
                Some(_) if path.len() >= request.max_chain_length => {}
                Some(source) => {
                    for producer in graph.producers(source) {
                        if path.iter().any(|step| step.edge.id() == producer.edge.id()) {
                            continue;
                        }
                        if queue.len() >= request.max_frontier {
                            result.frontier_truncated = true;
                            break;
                        }
                        let mut longer = path.clone();
                        longer.push(producer);
                        queue.push_back(longer);
                    }
                }
            }
        }

        result.chains.sort_by_cached_key(|chain| {
            (chain.len(), chain.to_code(ctx.model(), request.expected.dimension))
        });
        if result.chains.len() > request.max_results {
            result.chains.truncate(request.max_results);
            result.pending_work = true;
        }
        result.stop_reason = match stop {
            Some(reason) => reason,
            None if result.chains.len() >= request.max_results && result.pending_work => {
                StopReason::ResultLimit
            }
            None => StopReason::Exhausted,
        };
        result.frontier_truncated |= graph.is_truncated();
        result
    }

    /// The breadth-first engine would return `chain`: its first terminal edge
    /// is the last one and the chain is reportable at that length.
    fn is_forward_result(&self, chain: &Chain, request: &SearchRequest) -> bool {
        let len = chain.len();
        if len > request.max_chain_length {
            return false;
        }
        let ctx = &self.context;
        let last = chain.last();
        if !ctx.is_terminal(last, request) || !ctx.accepts(last, len, request) {
            return false;
        }
        !chain.edges()[..len - 1]
            .iter()
            .any(|edge| ctx.is_terminal(edge, request))
    }
}

impl ChainSearch for GraphSearch<'_> {
    fn search(&self, request: &SearchRequest, budget: &SearchBudget) -> Result<SearchResult> {
        request.validate()?;
        let graph = self.build(request, budget);
        let result = self.collect(&graph, request, budget);
        tracing::debug!(
            "Graph search found {} chains to {} ({:?})",
            result.chains.len(),
            request.expected.key,
            result.stop_reason
        );
        Ok(result)
    }
}

/// State shared by all jobs of one build.
struct Worker<'a, 'm> {
    context: &'a SearchContext<'m>,
    request: &'a SearchRequest,
    budget: &'a SearchBudget,
    graph: &'a ChainGraph,
}

impl<'a> Worker<'a, '_> {
    fn run(&'a self, scope: &Scope<'a>, edge: Arc<ChainEdge>, source: Option<String>, depth: usize) {
        if let Some(reason) = self.budget.check() {
            let _ = self.graph.interrupted.set(reason);
            return;
        }
        let Some(produced) = edge.produced(self.context.model()) else {
            return;
        };
        let key = produced.key.clone();
        let terminal = self.context.is_terminal(&edge, self.request);
        let expand = self.graph.register(
            &edge,
            &key,
            source.as_deref(),
            depth,
            terminal,
            self.request.max_frontier,
        );
        if !expand || depth >= self.request.max_chain_length {
            return;
        }

        // Spawned jobs are tracked by the scope before any of them runs.
        for next in self.context.successors(&edge, self.request) {
            let source = Some(key.clone());
            scope.spawn(move |scope| self.run(scope, next, source, depth + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ExpectedType;
    use chainscope_api::{InMemoryTypeModel, MemberInfo, TypeRef};

    fn model() -> InMemoryTypeModel {
        InMemoryTypeModel::new()
            .add_class("A", None)
            .add_class("B", None)
            .add_class("C", None)
            .add_method("A", "getB", TypeRef::id("B"))
            .add_method("A", "self_", TypeRef::id("A"))
            .add_method("B", "getC", TypeRef::id("C"))
    }

    fn request() -> SearchRequest {
        SearchRequest::builder(ExpectedType::parse("C").unwrap())
            .entrypoint(ChainEdge::new(MemberInfo::local("a", TypeRef::id("A"))))
            .max_chain_length(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_graph_registers_producers() {
        let ts = model();
        let search = GraphSearch::new(&ts, InvocationSite::default(), Some(2)).unwrap();
        let graph = search.build(&request(), &SearchBudget::unbounded());

        let producers: Vec<String> = graph
            .producers("B")
            .iter()
            .map(|p| p.edge.id().to_string())
            .collect();
        assert_eq!(producers, vec!["A#getB()"]);
        assert_eq!(graph.producers("A").len(), 2);
        assert!(graph.interrupted().is_none());
    }

    #[test]
    fn test_backward_walk_finds_chains_in_length_order() {
        let ts = model();
        let search = GraphSearch::new(&ts, InvocationSite::default(), Some(2)).unwrap();
        let result = search.search(&request(), &SearchBudget::unbounded()).unwrap();
        let codes: Vec<String> = result.chains.iter().map(|c| c.to_code(&ts, 0)).collect();
        assert_eq!(codes, vec!["a.getB().getC()", "a.self_().getB().getC()"]);
        assert_eq!(result.stop_reason, StopReason::Exhausted);
    }

    #[test]
    fn test_cancelled_build_is_incomplete() {
        let ts = model();
        let search = GraphSearch::new(&ts, InvocationSite::default(), Some(1)).unwrap();
        let budget = SearchBudget::unbounded();
        budget.cancel();
        let result = search.search(&request(), &budget).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert!(result.incomplete());
    }
}
