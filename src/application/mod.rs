// Application layer - use cases and orchestration
pub mod error;
pub mod service;
pub mod statement;

pub use error::*;
pub use service::*;
pub use statement::*;
