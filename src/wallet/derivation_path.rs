//! Account and receive paths for the four script types
//!
//! Account nodes live at `m/purpose'/coin'/0'`; receive addresses at
//! `account/0/index`.

use bitcoin::bip32::{ChildNumber, DerivationPath};
use std::str::FromStr;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::types::{AccountKind, Network};

/// Standard BIP purposes
pub mod bip_purposes {
    pub const BIP44: u32 = 44; // Legacy (P2PKH)
    pub const BIP49: u32 = 49; // SegWit compatible (P2SH-P2WPKH)
    pub const BIP84: u32 = 84; // Native SegWit (P2WPKH)
    pub const BIP86: u32 = 86; // Taproot (P2TR)
}

/// Only the first account is ever derived
pub const ACCOUNT_INDEX: u32 = 0;

/// External (receive) chain
pub const RECEIVE_CHAIN: u32 = 0;

/// Hardened account path, e.g. `m/84'/0'/0'`
pub fn account_path(kind: AccountKind, network: Network) -> String {
    format!("m/{}'/{}'/{}'", kind.purpose(), network.coin_type(), ACCOUNT_INDEX)
}

/// Full receive path, e.g. `m/84'/0'/0'/0/3`
pub fn receive_path(kind: AccountKind, network: Network, index: u32) -> String {
    format!("{}/{}/{}", account_path(kind, network), RECEIVE_CHAIN, index)
}

/// Parse an account path
pub fn parse_account_path(kind: AccountKind, network: Network) -> BrainWalletResult<DerivationPath> {
    let path = account_path(kind, network);
    DerivationPath::from_str(&path).map_err(|e| {
        BrainWalletError::derivation_failed(format!("Invalid derivation path '{}'", path))
            .with_details(e.to_string())
    })
}

/// Non-hardened `0/index` suffix relative to an account node
pub fn receive_suffix(index: u32) -> BrainWalletResult<[ChildNumber; 2]> {
    let chain = ChildNumber::from_normal_idx(RECEIVE_CHAIN)?;
    let child = ChildNumber::from_normal_idx(index)?;
    Ok([chain, child])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_account_paths() {
        let paths: Vec<String> = AccountKind::ALL
            .iter()
            .map(|k| account_path(*k, Network::Bitcoin))
            .collect();
        assert_eq!(paths, vec!["m/44'/0'/0'", "m/49'/0'/0'", "m/84'/0'/0'", "m/86'/0'/0'"]);
    }

    #[test]
    fn test_testnet_coin_type() {
        assert_eq!(account_path(AccountKind::Taproot, Network::Testnet), "m/86'/1'/0'");
    }

    #[test]
    fn test_receive_path() {
        assert_eq!(
            receive_path(AccountKind::NativeSegwit, Network::Bitcoin, 3),
            "m/84'/0'/0'/0/3"
        );
    }

    #[test]
    fn test_account_path_is_hardened() {
        let path = parse_account_path(AccountKind::Legacy, Network::Bitcoin).unwrap();
        let components: &[ChildNumber] = path.as_ref();
        assert_eq!(components.len(), 3);
        assert!(components.iter().all(|c| c.is_hardened()));
    }

    #[test]
    fn test_receive_suffix_rejects_hardened_range() {
        assert!(receive_suffix(7).is_ok());
        assert!(receive_suffix(0x8000_0000).is_err());
    }
}
