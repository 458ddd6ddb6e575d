//! Shared types for the brain wallet core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization. Everything is a value object; nothing
//! here is mutated after it has been handed to a caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::wallet::bip_purposes;

// =============================================================================
// Network
// =============================================================================

/// Bitcoin network the key tree is derived for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    Bitcoin,
    Testnet,
}

impl Network {
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            Network::Bitcoin => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }

    /// SLIP-0044 coin type used in the account path
    pub fn coin_type(self) -> u32 {
        match self {
            Network::Bitcoin => 0,
            Network::Testnet => 1,
        }
    }

    /// Human readable part for segwit addresses
    pub fn hrp(self) -> &'static str {
        match self {
            Network::Bitcoin => "bc",
            Network::Testnet => "tb",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitcoin" | "btc" | "mainnet" | "main" => Ok(Network::Bitcoin),
            "testnet" | "test" | "tbtc" => Ok(Network::Testnet),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Bitcoin => write!(f, "bitcoin"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// The four fixed account configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountKind {
    Legacy,
    NestedSegwit,
    NativeSegwit,
    Taproot,
}

impl AccountKind {
    /// All account kinds in derivation order
    pub const ALL: [AccountKind; 4] = [
        AccountKind::Legacy,
        AccountKind::NestedSegwit,
        AccountKind::NativeSegwit,
        AccountKind::Taproot,
    ];

    /// BIP purpose number, also used as the account id
    pub fn purpose(self) -> u32 {
        match self {
            AccountKind::Legacy => bip_purposes::BIP44,
            AccountKind::NestedSegwit => bip_purposes::BIP49,
            AccountKind::NativeSegwit => bip_purposes::BIP84,
            AccountKind::Taproot => bip_purposes::BIP86,
        }
    }

    pub fn id(self) -> String {
        self.purpose().to_string()
    }

    pub fn friendly_name(self) -> &'static str {
        match self {
            AccountKind::Legacy => "Legacy (P2PKH)",
            AccountKind::NestedSegwit => "Nested SegWit (P2SH-P2WPKH)",
            AccountKind::NativeSegwit => "Native SegWit (P2WPKH)",
            AccountKind::Taproot => "Taproot (P2TR)",
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "44" | "legacy" | "p2pkh" => Ok(AccountKind::Legacy),
            "49" | "nested-segwit" | "p2sh-p2wpkh" => Ok(AccountKind::NestedSegwit),
            "84" | "native-segwit" | "segwit" | "p2wpkh" => Ok(AccountKind::NativeSegwit),
            "86" | "taproot" | "p2tr" => Ok(AccountKind::Taproot),
            _ => Err(format!("Unknown account type: {}", s)),
        }
    }
}

/// How an address string was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressEncoding {
    /// Built by the standard address constructor
    Standard,
    /// Taproot fallback: witness v1 program encoded by hand
    ManualBech32m,
    /// Taproot last resort. NOT a spendable address.
    Placeholder,
}

impl AddressEncoding {
    pub fn is_valid_address(self) -> bool {
        !matches!(self, AddressEncoding::Placeholder)
    }
}

/// Receive address at `account/0/index`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub index: u32,
    pub path: String,
    pub address: String,
    pub encoding: AddressEncoding,
}

/// Derivation output for one account configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountKeys {
    pub kind: AccountKind,
    pub id: String,
    pub name: String,
    pub path: String,
    /// Public-only extended key; `None` when derivation failed
    pub xpub: Option<String>,
    pub addresses: Vec<DerivedAddress>,
    pub error: Option<String>,
}

/// Complete derivation result for one input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainWallet {
    pub mnemonic: Zeroizing<String>,
    /// Hex of the 64-byte BIP39 seed. Omitted unless explicitly requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_hex: Option<Zeroizing<String>>,
    pub network: Network,
    pub accounts: Vec<AccountKeys>,
}

impl BrainWallet {
    pub fn account(&self, kind: AccountKind) -> Option<&AccountKeys> {
        self.accounts.iter().find(|a| a.kind == kind)
    }

    /// Drop the seed from the bundle before handing it on
    pub fn without_seed(mut self) -> Self {
        self.seed_hex = None;
        self
    }
}

/// Advisory strength of the user's source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputStrength {
    pub chars: usize,
    pub weak: bool,
}

// =============================================================================
// Usage Checking
// =============================================================================

/// What a usage unit carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Xpub,
    Address,
}

/// One thing to ask the indexers about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageUnit {
    pub kind: UnitKind,
    /// Extended public key or address string
    pub value: String,
    pub path: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountKind>,
}

impl UsageUnit {
    pub fn xpub(value: impl Into<String>, path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Xpub,
            value: value.into(),
            path: path.into(),
            label: label.into(),
            account: None,
        }
    }

    pub fn address(value: impl Into<String>, path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: UnitKind::Address,
            value: value.into(),
            path: path.into(),
            label: label.into(),
            account: None,
        }
    }

    pub fn for_account(mut self, kind: AccountKind) -> Self {
        self.account = Some(kind);
        self
    }
}

/// Outcome of checking one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResult {
    pub unit: UsageUnit,
    pub has_transactions: bool,
    pub earliest_activity: Option<DateTime<Utc>>,
    pub balance_satoshis: u64,
    /// Indexer that reported the activity
    pub source: Option<String>,
    pub error: Option<String>,
}

impl UsageResult {
    /// A result with no activity and no error
    pub fn empty(unit: UsageUnit) -> Self {
        Self {
            unit,
            has_transactions: false,
            earliest_activity: None,
            balance_satoshis: 0,
            source: None,
            error: None,
        }
    }

    pub fn failed(unit: UsageUnit, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(unit)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Overall answer to "has this wallet been used?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageVerdict {
    Used,
    Unused,
    /// Every check failed; nothing can be said
    Undetermined,
}

/// Reduction of a set of usage results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub any_used: bool,
    pub total_balance: u64,
    pub earliest_activity: Option<DateTime<Utc>>,
    pub failed_units: usize,
    pub verdict: UsageVerdict,
}

/// Usage check output: raw per-unit results plus their reduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    pub results: Vec<UsageResult>,
    pub aggregate: AggregateReport,
}
