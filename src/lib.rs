//! Brain Wallet Core Library
//!
//! Deterministic Bitcoin wallet derivation from free-form text, plus a
//! rate-limited usage check against public chain indexers.
//!
//! # Architecture
//!
//! This crate provides:
//! - **wallet**: text -> entropy -> BIP39 mnemonic -> seed -> BIP44/49/84/86
//!   accounts, xpubs and receive addresses (synchronous, no I/O)
//! - **usage**: xpub and address activity checks with batching, delays,
//!   per-source fallback and aggregation (async)
//! - **utils**: logging with redaction, HTTP helpers, balance formatting
//!
//! # Security
//!
//! A brain wallet is only as strong as its text. Short or guessable
//! phrases are swept by attackers within minutes of funding; see
//! `input_strength`. Entropy, seed and mnemonic buffers are zeroized on
//! drop, and nothing but public keys and addresses is ever sent over the
//! network.
//!
//! # Example
//!
//! ```rust,ignore
//! use brain_wallet::{generate_brain_wallet, Network};
//!
//! let wallet = generate_brain_wallet("some long memorable sentence", 5, Network::Bitcoin)?;
//! println!("Mnemonic: {}", *wallet.mnemonic);
//! for account in &wallet.accounts {
//!     println!("{}: {:?}", account.name, account.xpub);
//! }
//! ```

pub mod error;
pub mod types;
pub mod usage;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use error::{BrainWalletError, BrainWalletResult, ErrorCode};
pub use types::*;
pub use usage::{aggregate, UsageChecker, UsageConfig, UsageSource};
pub use utils::format_balance;
pub use wallet::{
    derive_accounts, derive_entropy, entropy_to_mnemonic, generate_brain_wallet, input_strength,
    mnemonic_to_entropy, mnemonic_to_seed, restore_from_mnemonic, usage_units, validate_mnemonic,
    DEFAULT_ADDRESS_COUNT,
};
