//! Type model boundary for the chainscope call-chain search.
//!
//! The search engine never looks at source code or class files; it asks a
//! [`TypeModel`] what a type looks like. This crate defines that oracle, the
//! member descriptors it hands out, and an in-memory implementation.

pub mod error;
pub mod memory;
pub mod models;
pub mod type_system;

// Re-export commonly used types
pub use error::{ApiError, ApiResult};
pub use memory::{InMemoryTypeModel, TypeDecl, TypeModelSnapshot};
pub use models::*;
pub use type_system::{InheritanceProvider, MemberProvider, TypeModel, TypeProvider, VisibilityProvider};
