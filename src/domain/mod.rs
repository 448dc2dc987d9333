mod client;
mod money;
mod transaction;
mod validation;

pub use client::*;
pub use money::*;
pub use transaction::*;
pub use validation::*;
