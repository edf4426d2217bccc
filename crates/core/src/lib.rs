pub mod assignable;
pub mod budget;
pub mod catalog;
pub mod chain;
pub mod config;
pub mod edge;
pub mod entrypoints;
pub mod error;
pub mod logging;
pub mod request;
pub mod search;

pub use assignable::AssignabilityOracle;
pub use budget::{SearchBudget, StopReason};
pub use catalog::MemberCatalog;
pub use chain::{Chain, ChainSummary, SearchResult};
pub use config::ChainConfig;
pub use edge::{ChainEdge, EdgeCache, EdgeKind};
pub use entrypoints::EntrypointCollector;
pub use error::{ChainError, Result};
pub use request::{ExpectedType, SearchRequest};
pub use search::{ChainFinder, ChainSearch, GraphSearch, SearchContext, SearchStrategy};
