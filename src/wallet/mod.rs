//! Wallet Module
//!
//! The synchronous half of the pipeline:
//! text -> entropy -> mnemonic -> seed -> account keys -> addresses.
//! Nothing in here touches the network.

mod derivation;
mod derivation_path;
mod entropy;
mod keygen;
mod taproot;
mod validation;

pub use derivation::*;
pub use derivation_path::*;
pub use entropy::*;
pub use keygen::*;
pub use taproot::{encode_manual, encode_p2tr, placeholder_address, taproot_address, TaprootAddress};
pub use validation::*;

use zeroize::Zeroizing;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::log_warn;
use crate::types::*;

/// Derive the full wallet bundle from free-form text.
///
/// Empty text is rejected here; weak (short) text is not. Use
/// `input_strength` to warn about it.
pub fn generate_brain_wallet(
    text: &str,
    address_count: u32,
    network: Network,
) -> BrainWalletResult<BrainWallet> {
    if text.is_empty() {
        return Err(BrainWalletError::invalid_input("Input text must not be empty"));
    }

    let entropy = derive_entropy(text);
    let mnemonic = entropy_to_mnemonic(&entropy)?;
    Ok(wallet_from_mnemonic(&mnemonic, address_count, network))
}

/// Restore the same bundle from an existing mnemonic phrase
pub fn restore_from_mnemonic(
    phrase: &str,
    address_count: u32,
    network: Network,
) -> BrainWalletResult<BrainWallet> {
    let mnemonic = parse_mnemonic(phrase)?;
    Ok(wallet_from_mnemonic(&mnemonic, address_count, network))
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> bool {
    is_valid_mnemonic(phrase)
}

/// Split a wallet into the units an indexer can be asked about:
/// `(xpub_units, address_units)`.
///
/// Xpub units carry the script-type encoding the xpub indexer expects, so
/// Taproot accounts only contribute address units. Placeholder Taproot
/// addresses, and anything that does not parse as an address for the
/// wallet's network, are never emitted.
pub fn usage_units(wallet: &BrainWallet) -> (Vec<UsageUnit>, Vec<UsageUnit>) {
    let mut xpubs = Vec::new();
    let mut addresses = Vec::new();

    for account in &wallet.accounts {
        if let Some(xpub) = &account.xpub {
            match indexer_xpub(xpub, account.kind, wallet.network) {
                Ok(Some(encoded)) => xpubs.push(
                    UsageUnit::xpub(encoded, account.path.as_str(), account.name.as_str()).for_account(account.kind),
                ),
                Ok(None) => {}
                Err(e) => log_warn!(
                    "wallet",
                    "Cannot re-encode xpub for indexer",
                    account = account.id,
                    error = e
                ),
            }
        }

        let checkable = account
            .addresses
            .iter()
            .filter(|a| a.encoding.is_valid_address() && is_valid_address(&a.address, wallet.network));
        for derived in checkable {
            addresses.push(
                UsageUnit::address(
                    derived.address.as_str(),
                    derived.path.as_str(),
                    format!("{} #{}", account.name, derived.index),
                )
                .for_account(account.kind),
            );
        }
    }

    (xpubs, addresses)
}

fn wallet_from_mnemonic(mnemonic: &bip39::Mnemonic, address_count: u32, network: Network) -> BrainWallet {
    let seed = mnemonic_to_seed(mnemonic, "");
    let accounts = derive_accounts(&seed, address_count, network);

    BrainWallet {
        mnemonic: Zeroizing::new(mnemonic.to_string()),
        seed_hex: Some(seed.to_hex()),
        network,
        accounts,
    }
}
