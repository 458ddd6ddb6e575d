//! Usage Checking Module
//!
//! Asks public chain indexers whether a derived wallet has on-chain
//! history. Only xpubs and addresses ever leave the process.

mod aggregation;
mod config;
mod orchestrator;
mod providers;
mod source;

pub use aggregation::*;
pub use config::*;
pub use orchestrator::*;
pub use providers::*;
pub use source::*;
