//! HTTP indexer sources
//!
//! - `EsploraAddressSource`: mempool.space / blockstream.info address API
//! - `BlockchainInfoXpubSource`: blockchain.info xpub summary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::log_warn;
use crate::types::{UnitKind, UsageResult, UsageUnit};
use crate::utils::{extract_domain, get_json, get_text, parse_json, with_timeout};

use super::source::UsageSource;

// =============================================================================
// Esplora Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct EsploraTx {
    #[serde(default)]
    status: EsploraStatus,
}

#[derive(Debug, Default, Deserialize)]
struct EsploraStatus {
    #[serde(default)]
    confirmed: bool,
    block_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct EsploraAddressInfo {
    chain_stats: EsploraStats,
    #[serde(default)]
    mempool_stats: EsploraStats,
}

#[derive(Debug, Default, Deserialize)]
struct EsploraStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
}

// =============================================================================
// Blockchain.info Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct XpubSummary {
    #[serde(default)]
    n_tx: u64,
    #[serde(default)]
    final_balance: u64,
    #[serde(default)]
    txs: Vec<XpubTx>,
}

#[derive(Debug, Deserialize)]
struct XpubTx {
    time: Option<i64>,
}

/// Activity as reported by a single response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub has_transactions: bool,
    pub earliest_activity: Option<DateTime<Utc>>,
    pub balance_satoshis: u64,
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

/// Parse `GET /address/{a}/txs`.
///
/// Unconfirmed transactions count as activity but carry no timestamp.
/// If only unconfirmed transactions are present, the date is unknown.
pub fn parse_address_txs(body: &str) -> BrainWalletResult<Activity> {
    let txs: Vec<EsploraTx> = parse_json(body)?;

    let earliest = txs
        .iter()
        .filter(|tx| tx.status.confirmed)
        .filter_map(|tx| tx.status.block_time)
        .min()
        .and_then(timestamp);

    Ok(Activity {
        has_transactions: !txs.is_empty(),
        earliest_activity: earliest,
        balance_satoshis: 0,
    })
}

/// Parse `GET /address/{a}`: confirmed plus mempool balance
pub fn parse_address_balance(body: &str) -> BrainWalletResult<u64> {
    let info: EsploraAddressInfo = parse_json(body)?;
    Ok(spendable(&info))
}

fn spendable(info: &EsploraAddressInfo) -> u64 {
    let confirmed = info.chain_stats.funded_txo_sum.saturating_sub(info.chain_stats.spent_txo_sum);
    let unconfirmed = info.mempool_stats.funded_txo_sum.saturating_sub(info.mempool_stats.spent_txo_sum);
    confirmed.saturating_add(unconfirmed)
}

/// Parse `GET /xpub/{xpub}?format=json&limit=1`.
///
/// A positive `n_tx` counts as used even without a transaction list; in
/// that case the date is unknown.
pub fn parse_xpub_summary(body: &str) -> BrainWalletResult<Activity> {
    let summary: XpubSummary = parse_json(body)?;

    let earliest = summary.txs.iter().filter_map(|tx| tx.time).min().and_then(timestamp);

    Ok(Activity {
        has_transactions: summary.n_tx > 0 || !summary.txs.is_empty(),
        earliest_activity: earliest,
        balance_satoshis: summary.final_balance,
    })
}

fn require_kind(unit: &UsageUnit, kind: UnitKind, source: &str) -> BrainWalletResult<()> {
    if unit.kind != kind {
        return Err(BrainWalletError::invalid_input(format!(
            "{} cannot check {:?} units",
            source, unit.kind
        )));
    }
    Ok(())
}

fn into_result(unit: &UsageUnit, activity: Activity, source: &str) -> UsageResult {
    UsageResult {
        unit: unit.clone(),
        has_transactions: activity.has_transactions,
        earliest_activity: activity.earliest_activity,
        balance_satoshis: activity.balance_satoshis,
        source: Some(source.to_string()),
        error: None,
    }
}

// =============================================================================
// Sources
// =============================================================================

/// Address activity from an Esplora-compatible API.
///
/// One query is up to two requests (history, then balance for used
/// addresses), each bounded by `request_timeout` on its own.
pub struct EsploraAddressSource {
    name: String,
    base_url: String,
    client: Client,
    request_timeout: Duration,
}

impl EsploraAddressSource {
    pub fn new(base_url: &str, client: Client, request_timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            name: extract_domain(&base_url),
            base_url,
            client,
            request_timeout,
        }
    }

    async fn fetch_activity(&self, address: &str) -> BrainWalletResult<Activity> {
        let url = format!("{}/address/{}/txs", self.base_url, address);
        let body = with_timeout(self.request_timeout, &self.name, get_text(&self.client, &url)).await?;
        parse_address_txs(&body)
    }

    async fn fetch_balance(&self, address: &str) -> BrainWalletResult<u64> {
        let url = format!("{}/address/{}", self.base_url, address);
        let info: EsploraAddressInfo =
            with_timeout(self.request_timeout, &self.name, get_json(&self.client, &url)).await?;
        Ok(spendable(&info))
    }
}

#[async_trait]
impl UsageSource for EsploraAddressSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, unit: &UsageUnit) -> BrainWalletResult<UsageResult> {
        require_kind(unit, UnitKind::Address, &self.name)?;

        let mut activity = self.fetch_activity(&unit.value).await?;

        if activity.has_transactions {
            // Activity stands even if the balance lookup fails or times out
            match self.fetch_balance(&unit.value).await {
                Ok(balance) => activity.balance_satoshis = balance,
                Err(e) => log_warn!(
                    "usage",
                    "Balance lookup failed",
                    source = self.name,
                    address = unit.value,
                    error = e
                ),
            }
        }

        Ok(into_result(unit, activity, &self.name))
    }

    fn query_budget(&self, per_request: Duration) -> Duration {
        per_request * 2
    }
}

/// Xpub activity and balance from blockchain.info
pub struct BlockchainInfoXpubSource {
    name: String,
    base_url: String,
    client: Client,
    request_timeout: Duration,
}

impl BlockchainInfoXpubSource {
    pub fn new(base_url: &str, client: Client, request_timeout: Duration) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            name: extract_domain(&base_url),
            base_url,
            client,
            request_timeout,
        }
    }
}

#[async_trait]
impl UsageSource for BlockchainInfoXpubSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, unit: &UsageUnit) -> BrainWalletResult<UsageResult> {
        require_kind(unit, UnitKind::Xpub, &self.name)?;

        let url = format!("{}/xpub/{}?format=json&limit=1", self.base_url, unit.value);
        let body = with_timeout(self.request_timeout, &self.name, get_text(&self.client, &url)).await?;
        let activity = parse_xpub_summary(&body)?;

        Ok(into_result(unit, activity, &self.name))
    }
}
