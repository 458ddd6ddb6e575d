//! Usage-check orchestration
//!
//! Scheduling rules:
//! - xpub units: one request at a time, `xpub_delay` between requests
//! - address units: batches of `address_batch_size` queried concurrently,
//!   `batch_delay` between batches; within a unit the address sources are
//!   tried in order with `inter_api_delay` between them
//! - every source call is bounded by the source's budget for
//!   `request_timeout` (one timeout per HTTP request it issues)
//!
//! Results always come back in the order of the input units regardless of
//! completion order. A per-unit failure is recorded on that unit's result;
//! only an empty unit list fails the whole call.

use futures::future::join_all;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::time::sleep;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::types::*;
use crate::utils::{build_client, with_timeout};
use crate::wallet::usage_units;
use crate::{log_debug, log_error, log_info, log_warn};

use super::aggregation::aggregate;
use super::config::UsageConfig;
use super::providers::{BlockchainInfoXpubSource, EsploraAddressSource};
use super::source::UsageSource;

/// Runs usage checks against an ordered list of indexer sources
pub struct UsageChecker {
    config: UsageConfig,
    address_sources: Vec<Arc<dyn UsageSource>>,
    xpub_source: Option<Arc<dyn UsageSource>>,
}

impl UsageChecker {
    /// Checker backed by the HTTP indexers named in `config`
    pub fn new(config: UsageConfig) -> BrainWalletResult<Self> {
        config.validate()?;
        let client = build_client(config.request_timeout(), &config.user_agent)?;

        let address_sources: Vec<Arc<dyn UsageSource>> = config
            .address_endpoints
            .iter()
            .map(|base| {
                Arc::new(EsploraAddressSource::new(base, client.clone(), config.request_timeout()))
                    as Arc<dyn UsageSource>
            })
            .collect();
        let xpub_source: Arc<dyn UsageSource> = Arc::new(BlockchainInfoXpubSource::new(
            &config.xpub_endpoint,
            client,
            config.request_timeout(),
        ));

        Ok(Self::with_sources(config, address_sources, Some(xpub_source)))
    }

    /// Checker with explicit sources, tried in the given order
    pub fn with_sources(
        config: UsageConfig,
        address_sources: Vec<Arc<dyn UsageSource>>,
        xpub_source: Option<Arc<dyn UsageSource>>,
    ) -> Self {
        Self {
            config,
            address_sources,
            xpub_source,
        }
    }

    pub fn config(&self) -> &UsageConfig {
        &self.config
    }

    /// Check every unit and return one result per unit, in input order.
    ///
    /// `notify(processed, total)` is called after each xpub and after each
    /// address batch. A panicking callback is logged and otherwise ignored.
    pub async fn check_usage<F>(&self, units: &[UsageUnit], notify: F) -> BrainWalletResult<Vec<UsageResult>>
    where
        F: Fn(usize, usize),
    {
        if units.is_empty() {
            return Err(BrainWalletError::invalid_input("No units to check"));
        }

        let total = units.len();
        let mut processed = 0;
        let mut slots: Vec<Option<UsageResult>> = vec![None; total];

        let (xpubs, addresses): (Vec<_>, Vec<_>) = units
            .iter()
            .enumerate()
            .partition(|(_, unit)| unit.kind == UnitKind::Xpub);

        log_info!(
            "usage",
            "Starting usage check",
            xpubs = xpubs.len(),
            addresses = addresses.len()
        );

        for (n, (index, unit)) in xpubs.iter().enumerate() {
            if n > 0 {
                sleep(self.config.xpub_delay()).await;
            }
            slots[*index] = Some(self.check_xpub(unit).await);
            processed += 1;
            notify_progress(&notify, processed, total);
        }

        let batch_size = self.config.address_batch_size.max(1);
        for (n, batch) in addresses.chunks(batch_size).enumerate() {
            if n > 0 {
                sleep(self.config.batch_delay()).await;
            }

            let checks = batch.iter().map(|(index, unit)| async move { (*index, self.check_address(unit).await) });
            for (index, result) in join_all(checks).await {
                slots[index] = Some(result);
            }

            processed += batch.len();
            log_debug!("usage", "Address batch complete", batch = n + 1, processed = processed);
            notify_progress(&notify, processed, total);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| BrainWalletError::internal("Unit left unchecked")))
            .collect()
    }

    /// Check a whole wallet.
    ///
    /// Accounts are checked by xpub first. Any account whose xpub check
    /// failed, or that has no indexer xpub (Taproot), is checked address by
    /// address instead. The report's `results` keep every result, including
    /// failed xpub checks. The aggregate counts the fallback results in
    /// place of a failed xpub check; a failed xpub check with no fallback
    /// addresses counts as failed. An account with nothing to check at all
    /// is recorded as a failed result.
    pub async fn check_wallet<F>(&self, wallet: &BrainWallet, notify: F) -> BrainWalletResult<UsageReport>
    where
        F: Fn(usize, usize),
    {
        let (xpub_units, address_units) = usage_units(wallet);

        let xpub_results = if xpub_units.is_empty() {
            Vec::new()
        } else {
            self.check_usage(&xpub_units, &notify).await?
        };

        let covered: HashSet<AccountKind> = xpub_results
            .iter()
            .filter(|r| !r.is_error())
            .filter_map(|r| r.unit.account)
            .collect();

        let fallback_units: Vec<UsageUnit> = address_units
            .into_iter()
            .filter(|u| u.account.map_or(true, |kind| !covered.contains(&kind)))
            .collect();

        if xpub_units.is_empty() && fallback_units.is_empty() {
            return Err(BrainWalletError::invalid_input("Wallet has nothing to check"));
        }

        let offset = xpub_results.len();
        let fallback_results = if fallback_units.is_empty() {
            Vec::new()
        } else {
            log_info!(
                "usage",
                "Checking addresses for accounts without a usable xpub result",
                addresses = fallback_units.len()
            );
            self.check_usage(&fallback_units, |done, total| notify(offset + done, offset + total))
                .await?
        };

        let replaced: HashSet<AccountKind> = fallback_units.iter().filter_map(|u| u.account).collect();
        let attempted: HashSet<AccountKind> = xpub_units.iter().filter_map(|u| u.account).collect();

        let unchecked: Vec<UsageResult> = wallet
            .accounts
            .iter()
            .filter(|a| !attempted.contains(&a.kind) && !replaced.contains(&a.kind))
            .map(|account| {
                log_warn!("usage", "Account has nothing to check", account = account.id);
                let reason = account
                    .error
                    .clone()
                    .unwrap_or_else(|| "No indexer xpub and no addresses to check".to_string());
                let unit = UsageUnit::xpub(
                    account.xpub.clone().unwrap_or_default(),
                    account.path.as_str(),
                    account.name.as_str(),
                )
                .for_account(account.kind);
                UsageResult::failed(unit, reason)
            })
            .collect();

        let effective: Vec<UsageResult> = xpub_results
            .iter()
            .filter(|r| !r.is_error() || r.unit.account.map_or(true, |kind| !replaced.contains(&kind)))
            .chain(fallback_results.iter())
            .chain(unchecked.iter())
            .cloned()
            .collect();
        let aggregate = aggregate(&effective);

        let mut results = xpub_results;
        results.extend(fallback_results);
        results.extend(unchecked);

        Ok(UsageReport { results, aggregate })
    }

    async fn check_xpub(&self, unit: &UsageUnit) -> UsageResult {
        let Some(source) = &self.xpub_source else {
            return UsageResult::failed(unit.clone(), "No xpub source configured");
        };

        match self.query(source.as_ref(), unit).await {
            Ok(result) => result,
            Err(e) => {
                log_warn!("usage", "Xpub check failed", source = source.name(), xpub = unit.value, error = e);
                UsageResult::failed(unit.clone(), e.to_string())
            }
        }
    }

    /// Try each address source in order; first one reporting activity wins.
    /// The unit only errors when every source errored.
    async fn check_address(&self, unit: &UsageUnit) -> UsageResult {
        if self.address_sources.is_empty() {
            return UsageResult::failed(unit.clone(), "No address sources configured");
        }

        let mut errors = Vec::new();
        for (n, source) in self.address_sources.iter().enumerate() {
            if n > 0 {
                sleep(self.config.inter_api_delay()).await;
            }

            match self.query(source.as_ref(), unit).await {
                Ok(result) if result.has_transactions => return result,
                Ok(_) => {}
                Err(e) => {
                    if e.is_transient() {
                        log_warn!(
                            "usage",
                            "Address source failed",
                            source = source.name(),
                            address = unit.value,
                            error = e
                        );
                    } else {
                        // Not a network hiccup: the source answered with something unusable
                        log_error!(
                            "usage",
                            "Address source returned an unusable response",
                            source = source.name(),
                            address = unit.value,
                            error = e
                        );
                    }
                    errors.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if errors.len() == self.address_sources.len() {
            UsageResult::failed(unit.clone(), errors.join("; "))
        } else {
            UsageResult::empty(unit.clone())
        }
    }

    async fn query(&self, source: &dyn UsageSource, unit: &UsageUnit) -> BrainWalletResult<UsageResult> {
        let limit = source.query_budget(self.config.request_timeout());
        let mut result = with_timeout(limit, source.name(), source.query(unit)).await?;
        result.unit = unit.clone();
        Ok(result)
    }
}

fn notify_progress<F: Fn(usize, usize)>(notify: &F, processed: usize, total: usize) {
    if catch_unwind(AssertUnwindSafe(|| notify(processed, total))).is_err() {
        log_warn!("usage", "Progress callback panicked", processed = processed, total = total);
    }
}
