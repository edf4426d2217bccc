pub mod member;
pub mod types;

pub use member::*;
pub use types::*;
