//! Address and Mnemonic Validation

use bip39::Mnemonic;
use bitcoin::Address;
use std::str::FromStr;

use crate::types::Network;

/// Check if a mnemonic phrase is valid (wordlist + checksum)
pub fn is_valid_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse(phrase.trim()).is_ok()
}

/// True if `address` decodes as a standard address for `network`
pub fn is_valid_address(address: &str, network: Network) -> bool {
    Address::from_str(address.trim())
        .map(|a| a.is_valid_for_network(network.to_bitcoin()))
        .unwrap_or(false)
}
