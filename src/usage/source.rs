//! Indexer source abstraction
//!
//! Every backend the orchestrator can ask about a unit implements
//! `UsageSource`. The orchestrator only sees this trait, so sources can
//! be reordered, replaced, or mocked without touching the checking flow.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::BrainWalletResult;
use crate::types::{UsageResult, UsageUnit};

/// A chain indexer that can answer "has this unit been used?"
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Source identifier recorded on results (e.g., "mempool.space")
    fn name(&self) -> &str;

    /// Query one unit.
    ///
    /// `Ok` with `has_transactions == false` means the source answered and
    /// saw nothing. Transport and decoding failures are `Err`.
    async fn query(&self, unit: &UsageUnit) -> BrainWalletResult<UsageResult>;

    /// Upper bound for one `query`, given the per-request timeout.
    /// Sources that issue several requests per query widen it.
    fn query_budget(&self, per_request: Duration) -> Duration {
        per_request
    }
}
