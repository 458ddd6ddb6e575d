//! Taproot (P2TR) address construction with fallbacks
//!
//! Key-path-only BIP86 outputs: the x-only internal key is tweaked with an
//! empty script tree and the 32-byte output key is committed under witness
//! version 1.
//!
//! Construction is attempted three ways, in order:
//! 1. `bitcoin::Address::p2tr`, verified to round-trip as a P2TR address
//! 2. manual bech32m encoding of the tweaked output key
//! 3. a placeholder derived from `SHA256(x-only key)`. This string is NOT a
//!    valid address; it is flagged as `AddressEncoding::Placeholder` and
//!    logged at error level.

use bech32::{u5, ToBase32, Variant};
use bitcoin::key::{TapTweak, XOnlyPublicKey};
use bitcoin::secp256k1::{Secp256k1, Verification};
use bitcoin::{Address, AddressType};
use sha2::{Digest, Sha256};
use std::str::FromStr;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::types::{AddressEncoding, Network};
use crate::{log_error, log_warn};

/// Hex characters of the hash kept in a placeholder
const PLACEHOLDER_HASH_CHARS: usize = 58;

/// Taproot address together with how it was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootAddress {
    pub address: String,
    pub encoding: AddressEncoding,
}

/// Build the P2TR address for an internal key, falling back as needed
pub fn taproot_address<C: Verification>(
    secp: &Secp256k1<C>,
    internal_key: XOnlyPublicKey,
    network: Network,
) -> TaprootAddress {
    resolve_with_fallbacks(
        &internal_key,
        network,
        || encode_p2tr(secp, internal_key, network),
        || encode_manual(secp, internal_key, network),
    )
}

/// Primary route through the address library
pub fn encode_p2tr<C: Verification>(
    secp: &Secp256k1<C>,
    internal_key: XOnlyPublicKey,
    network: Network,
) -> BrainWalletResult<String> {
    let address = Address::p2tr(secp, internal_key, None, network.to_bitcoin());
    let encoded = address.to_string();

    // Must parse back as P2TR on the same network
    let reparsed = Address::from_str(&encoded)
        .map_err(|e| BrainWalletError::address_encoding(format!("P2TR re-parse failed: {}", e)))?
        .require_network(network.to_bitcoin())
        .map_err(|e| BrainWalletError::address_encoding(format!("P2TR network mismatch: {}", e)))?;
    if reparsed.address_type() != Some(AddressType::P2tr) {
        return Err(BrainWalletError::address_encoding("Constructed address is not P2TR"));
    }

    Ok(encoded)
}

/// Fallback: witness v1 + tweaked output key, bech32m by hand
pub fn encode_manual<C: Verification>(
    secp: &Secp256k1<C>,
    internal_key: XOnlyPublicKey,
    network: Network,
) -> BrainWalletResult<String> {
    let (output_key, _parity) = internal_key.tap_tweak(secp, None);
    let program = output_key.to_x_only_public_key().serialize();

    let mut data = Vec::with_capacity(1 + 52);
    data.push(u5::try_from_u8(1)?);
    data.extend(program.to_base32());

    Ok(bech32::encode(network.hrp(), data, Variant::Bech32m)?)
}

/// Last resort: deterministic, clearly-flagged, unspendable string
pub fn placeholder_address(internal_key: &XOnlyPublicKey, network: Network) -> String {
    let digest = hex::encode(Sha256::digest(internal_key.serialize()));
    format!("{}1p{}", network.hrp(), &digest[..PLACEHOLDER_HASH_CHARS])
}

pub(crate) fn resolve_with_fallbacks<P, M>(
    internal_key: &XOnlyPublicKey,
    network: Network,
    primary: P,
    manual: M,
) -> TaprootAddress
where
    P: FnOnce() -> BrainWalletResult<String>,
    M: FnOnce() -> BrainWalletResult<String>,
{
    let primary_err = match primary() {
        Ok(address) => {
            return TaprootAddress {
                address,
                encoding: AddressEncoding::Standard,
            }
        }
        Err(e) => e,
    };

    log_warn!(
        "taproot",
        "Standard P2TR construction failed, trying manual bech32m",
        reason = primary_err
    );

    match manual() {
        Ok(address) => TaprootAddress {
            address,
            encoding: AddressEncoding::ManualBech32m,
        },
        Err(manual_err) => {
            log_error!(
                "taproot",
                "Taproot address construction failed; emitting INVALID placeholder",
                primary = primary_err,
                manual = manual_err
            );
            TaprootAddress {
                address: placeholder_address(internal_key, network),
                encoding: AddressEncoding::Placeholder,
            }
        }
    }
}
