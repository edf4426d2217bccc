//! Search requests and their validation.

use std::collections::HashSet;
use std::sync::Arc;

use chainscope_api::TypeRef;

use crate::edge::ChainEdge;
use crate::error::{ChainError, Result};

/// The type (and array depth) a chain must produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpectedType {
    /// Erased element type.
    pub element: TypeRef,
    /// Erased identity of `element`.
    pub key: String,
    pub dimension: usize,
}

impl ExpectedType {
    /// Split an expected type into element and dimension, e.g. `Foo[]` → (`Foo`, 1).
    pub fn new(expected: &TypeRef) -> Result<Self> {
        let (element, dimension) = expected.element_type();
        let key = element.erased_identity().ok_or_else(|| {
            ChainError::InvalidRequest(format!("expected type {expected:?} is unknown"))
        })?;
        Ok(Self {
            element,
            key,
            dimension,
        })
    }

    pub fn parse(spelling: &str) -> Result<Self> {
        Self::new(&TypeRef::parse(spelling))
    }
}

/// Immutable description of one chain search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub entrypoints: Vec<Arc<ChainEdge>>,
    pub expected: ExpectedType,
    /// Erased FQNs whose members are never explored.
    pub excluded_types: HashSet<String>,
    pub min_chain_length: usize,
    pub max_chain_length: usize,
    pub max_results: usize,
    /// Upper bound on pending incomplete chains.
    pub max_frontier: usize,
}

impl SearchRequest {
    pub fn builder(expected: ExpectedType) -> SearchRequestBuilder {
        SearchRequestBuilder::new(expected)
    }

    /// Same limits and entry points, different expected type.
    pub fn with_expected(&self, expected: ExpectedType) -> Self {
        Self {
            expected,
            ..self.clone()
        }
    }

    pub fn is_excluded(&self, fqn: &str) -> bool {
        self.excluded_types.contains(fqn)
    }

    pub fn validate(&self) -> Result<()> {
        if self.entrypoints.is_empty() {
            return Err(ChainError::InvalidRequest(
                "at least one entry point is required".to_string(),
            ));
        }
        validate_limits(
            self.min_chain_length,
            self.max_chain_length,
            self.max_results,
            self.max_frontier,
        )
    }
}

/// Shared precondition checks for requests and configuration.
pub(crate) fn validate_limits(
    min_chain_length: usize,
    max_chain_length: usize,
    max_results: usize,
    max_frontier: usize,
) -> Result<()> {
    if max_chain_length == 0 {
        return Err(ChainError::InvalidRequest(
            "max_chain_length must be at least 1".to_string(),
        ));
    }
    if max_chain_length < min_chain_length {
        return Err(ChainError::InvalidRequest(format!(
            "max_chain_length ({max_chain_length}) is smaller than min_chain_length ({min_chain_length})"
        )));
    }
    if max_results == 0 {
        return Err(ChainError::InvalidRequest(
            "max_results must be at least 1".to_string(),
        ));
    }
    if max_frontier == 0 {
        return Err(ChainError::InvalidRequest(
            "max_frontier must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub struct SearchRequestBuilder {
    request: SearchRequest,
}

impl SearchRequestBuilder {
    fn new(expected: ExpectedType) -> Self {
        Self {
            request: SearchRequest {
                entrypoints: Vec::new(),
                expected,
                excluded_types: HashSet::new(),
                min_chain_length: 1,
                max_chain_length: 4,
                max_results: 20,
                max_frontier: 50_000,
            },
        }
    }

    pub fn entrypoints(mut self, entrypoints: impl IntoIterator<Item = Arc<ChainEdge>>) -> Self {
        self.request.entrypoints.extend(entrypoints);
        self
    }

    pub fn entrypoint(mut self, entrypoint: ChainEdge) -> Self {
        self.request.entrypoints.push(Arc::new(entrypoint));
        self
    }

    pub fn excluded_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request
            .excluded_types
            .extend(types.into_iter().map(Into::into));
        self
    }

    pub fn min_chain_length(mut self, min: usize) -> Self {
        self.request.min_chain_length = min;
        self
    }

    pub fn max_chain_length(mut self, max: usize) -> Self {
        self.request.max_chain_length = max;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.request.max_results = max;
        self
    }

    pub fn max_frontier(mut self, max: usize) -> Self {
        self.request.max_frontier = max;
        self
    }

    /// Validate and build. Contract violations fail here, before any search work.
    pub fn build(self) -> Result<SearchRequest> {
        self.request.validate()?;
        Ok(self.request)
    }
}
