use std::sync::Arc;

use chainscope_api::{
    InMemoryTypeModel, InheritanceProvider, InvocationSite, MemberInfo, MemberProvider,
    ParameterInfo, TypeInfo, TypeModel, TypeProvider, TypeRef, VisibilityProvider,
};
use chainscope_core::{
    AssignabilityOracle, ChainEdge, ChainSearch, ExpectedType, SearchBudget, SearchRequest,
    SearchResult, SearchStrategy,
};
use tokio_util::sync::CancellationToken;

pub const IGNORED: [&str; 3] = ["java.lang.Object", "java.lang.Class", "java.lang.String"];

/// A small executor/future style API with inheritance, arrays, a
/// self-referential field and members on the ignored JDK types.
#[allow(dead_code)]
pub fn service_model() -> InMemoryTypeModel {
    InMemoryTypeModel::new()
        .add_class("java.lang.Object", None)
        .add_class("java.lang.String", Some("java.lang.Object"))
        .add_class("java.lang.Class", Some("java.lang.Object"))
        .add_member(public_method("java.lang.Object", "toString", "java.lang.String"))
        .add_member(public_method("java.lang.Object", "getClass", "java.lang.Class"))
        .add_member(public_method("java.lang.String", "asResult", "app.Result"))
        .add_interface("app.Shape")
        .add_interface("app.Runnable")
        .add_class("app.Base", Some("java.lang.Object"))
        .implements("app.Base", "app.Shape")
        .add_class("app.Result", Some("app.Base"))
        .add_method("app.Result", "size", TypeRef::raw("int"))
        .add_method("app.Result", "shape", TypeRef::id("app.Shape"))
        .add_class("app.Future", Some("java.lang.Object"))
        .add_method("app.Future", "get", TypeRef::id("app.Result"))
        .add_method("app.Future", "reason", TypeRef::id("java.lang.String"))
        .add_class("app.Executor", Some("java.lang.Object"))
        .add_member(
            MemberInfo::method("app.Executor", "submit", TypeRef::id("app.Future"))
                .with_parameters(vec![ParameterInfo::new("task", TypeRef::id("app.Runnable"))]),
        )
        .add_method("app.Executor", "self_", TypeRef::id("app.Executor"))
        .add_method("app.Executor", "results", TypeRef::parse("app.Result[]"))
        .add_method("app.Executor", "shutdown", TypeRef::raw("void"))
        .add_class("app.Holder", Some("java.lang.Object"))
        .add_field("app.Holder", "value", TypeRef::id("app.Result"))
        .add_field("app.Holder", "next", TypeRef::id("app.Holder"))
        .add_method("app.Holder", "executor", TypeRef::id("app.Executor"))
}

/// `a: A` reaches `S` through `a.toC()` and `a.toB().toC()`, where `C implements S`.
#[allow(dead_code)]
pub fn two_route_model() -> InMemoryTypeModel {
    InMemoryTypeModel::new()
        .add_interface("S")
        .add_class("A", None)
        .add_class("B", None)
        .add_class("C", None)
        .implements("C", "S")
        .add_method("A", "toC", TypeRef::id("C"))
        .add_method("A", "toB", TypeRef::id("B"))
        .add_method("B", "toC", TypeRef::id("C"))
}

/// Wraps a model and cancels its token the first time the supertypes of
/// `watched` are asked for, i.e. when an edge producing `watched` is first
/// checked against the expected type. The edge being checked still finishes.
#[allow(dead_code)]
pub struct TripwireModel {
    inner: InMemoryTypeModel,
    watched: String,
    token: CancellationToken,
}

#[allow(dead_code)]
impl TripwireModel {
    pub fn new(inner: InMemoryTypeModel, watched: &str) -> Self {
        Self {
            inner,
            watched: watched.to_string(),
            token: CancellationToken::new(),
        }
    }

    /// A budget tied to this model's token.
    pub fn budget(&self) -> SearchBudget {
        SearchBudget::with_token(self.token.clone())
    }

    pub fn tripped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl TypeProvider for TripwireModel {
    fn get_type_info(&self, fqn: &str) -> Option<TypeInfo> {
        self.inner.get_type_info(fqn)
    }
}

impl InheritanceProvider for TripwireModel {
    fn get_superclass(&self, fqn: &str) -> Option<String> {
        if fqn == self.watched {
            self.token.cancel();
        }
        self.inner.get_superclass(fqn)
    }

    fn get_interfaces(&self, fqn: &str) -> Vec<String> {
        self.inner.get_interfaces(fqn)
    }
}

impl MemberProvider for TripwireModel {
    fn get_all_members(&self, type_fqn: &str) -> Vec<MemberInfo> {
        self.inner.get_all_members(type_fqn)
    }
}

impl VisibilityProvider for TripwireModel {}

#[allow(dead_code)]
fn public_method(declaring: &str, name: &str, returns: &str) -> MemberInfo {
    MemberInfo::method(declaring, name, TypeRef::id(returns)).with_modifiers(["public"])
}

#[allow(dead_code)]
pub fn local(name: &str, type_fqn: &str) -> Arc<ChainEdge> {
    Arc::new(ChainEdge::new(MemberInfo::local(name, TypeRef::parse(type_fqn))))
}

/// Entry points `exec: Executor` and `holder: Holder`.
#[allow(dead_code)]
pub fn service_entrypoints() -> Vec<Arc<ChainEdge>> {
    vec![local("exec", "app.Executor"), local("holder", "app.Holder")]
}

#[allow(dead_code)]
pub fn request(
    expected: &str,
    entrypoints: Vec<Arc<ChainEdge>>,
    min: usize,
    max: usize,
    max_results: usize,
) -> SearchRequest {
    SearchRequest::builder(ExpectedType::parse(expected).unwrap())
        .entrypoints(entrypoints)
        .excluded_types(IGNORED)
        .min_chain_length(min)
        .max_chain_length(max)
        .max_results(max_results)
        .build()
        .unwrap()
}

/// Completion site inside package `app`, where package-private members are visible.
#[allow(dead_code)]
pub fn site() -> InvocationSite {
    InvocationSite::in_package("app")
}

#[allow(dead_code)]
pub fn run(
    strategy: SearchStrategy,
    model: &InMemoryTypeModel,
    request: &SearchRequest,
) -> SearchResult {
    run_at(strategy, model, site(), request)
}

#[allow(dead_code)]
pub fn run_at(
    strategy: SearchStrategy,
    model: &dyn TypeModel,
    site: InvocationSite,
    request: &SearchRequest,
) -> SearchResult {
    let engine = chainscope_core::search::engine(strategy, model, site, Some(2)).unwrap();
    engine.search(request, &SearchBudget::unbounded()).unwrap()
}

#[allow(dead_code)]
pub fn codes(model: &dyn TypeModel, request: &SearchRequest, result: &SearchResult) -> Vec<String> {
    result
        .chains
        .iter()
        .map(|chain| chain.to_code(model, request.expected.dimension))
        .collect()
}

/// Check every universal property of a result against its request.
#[allow(dead_code)]
pub fn assert_result_properties(model: &InMemoryTypeModel, request: &SearchRequest, result: &SearchResult) {
    let oracle = AssignabilityOracle::new(model);
    assert!(result.len() <= request.max_results, "result cap exceeded");

    for chain in &result.chains {
        let ids = chain.ids();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[..i].contains(id), "cycle in {chain:?}");
        }

        assert!(
            chain.len() >= request.min_chain_length && chain.len() <= request.max_chain_length,
            "length out of bounds: {chain:?}"
        );
        assert!(
            oracle.is_valid_terminal(chain.last(), &request.expected),
            "invalid terminal: {chain:?}"
        );
        if chain.len() == 1 {
            assert!(chain.last().is_method(), "lone non-method chain: {chain:?}");
        }
        for edge in &chain.edges()[1..] {
            assert!(
                !request.is_excluded(&edge.member().declaring_type),
                "excluded member in {chain:?}"
            );
        }
    }
}
