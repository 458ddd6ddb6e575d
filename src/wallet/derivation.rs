//! Key Derivation
//!
//! Derives the four account nodes (BIP44/49/84/86) from a BIP39 seed,
//! serializes their public halves and computes receive addresses.
//!
//! Receive addresses are derived from the account xpub, so no private
//! material is touched below the hardened account level.
//!
//! SECURITY: The seed should be wrapped in Zeroizing by the caller.

use bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{All, Secp256k1};
use bitcoin::Address;

use crate::error::{BrainWalletError, BrainWalletResult};
use crate::{log_debug, log_warn};
use crate::types::*;

use super::derivation_path::{account_path, parse_account_path, receive_path, receive_suffix};
use super::keygen::Seed;
use super::taproot::taproot_address;

/// Receive addresses derived per account unless the caller asks otherwise
pub const DEFAULT_ADDRESS_COUNT: u32 = 5;

/// Derive every account configuration from a seed.
///
/// Never fails as a whole: an account whose derivation errors carries the
/// error string and no xpub, and the remaining accounts are unaffected.
pub fn derive_accounts(seed: &Seed, address_count: u32, network: Network) -> Vec<AccountKeys> {
    derive_accounts_with(seed, address_count, network, parse_account_path)
}

/// Same as `derive_accounts`, with the account path resolver supplied
fn derive_accounts_with<P>(seed: &Seed, address_count: u32, network: Network, resolve_path: P) -> Vec<AccountKeys>
where
    P: Fn(AccountKind, Network) -> BrainWalletResult<DerivationPath>,
{
    let secp = Secp256k1::new();

    let master = match Xpriv::new_master(network.to_bitcoin(), seed.as_bytes()) {
        Ok(master) => master,
        Err(e) => {
            let err = BrainWalletError::from(e);
            return AccountKind::ALL
                .iter()
                .map(|kind| failed_account(*kind, network, &err))
                .collect();
        }
    };

    AccountKind::ALL
        .iter()
        .map(|kind| {
            let derived = resolve_path(*kind, network)
                .and_then(|path| derive_account(&secp, &master, &path, *kind, address_count, network));
            match derived {
                Ok(keys) => keys,
                Err(e) => {
                    log_warn!("derivation", "Account derivation failed", account = kind.id(), error = e);
                    failed_account(*kind, network, &e)
                }
            }
        })
        .collect()
}

fn failed_account(kind: AccountKind, network: Network, err: &BrainWalletError) -> AccountKeys {
    AccountKeys {
        kind,
        id: kind.id(),
        name: kind.friendly_name().to_string(),
        path: account_path(kind, network),
        xpub: None,
        addresses: Vec::new(),
        error: Some(err.to_string()),
    }
}

fn derive_account(
    secp: &Secp256k1<All>,
    master: &Xpriv,
    path: &DerivationPath,
    kind: AccountKind,
    address_count: u32,
    network: Network,
) -> BrainWalletResult<AccountKeys> {
    let account = master.derive_priv(secp, path)?;
    let xpub = Xpub::from_priv(secp, &account);

    let addresses = (0..address_count)
        .map(|index| derive_receive_address(secp, &xpub, kind, network, index))
        .collect::<BrainWalletResult<Vec<_>>>()?;

    log_debug!(
        "derivation",
        "Derived account",
        account = kind.friendly_name(),
        xpub = xpub,
        count = addresses.len()
    );

    Ok(AccountKeys {
        kind,
        id: kind.id(),
        name: kind.friendly_name().to_string(),
        path: account_path(kind, network),
        xpub: Some(xpub.to_string()),
        addresses,
        error: None,
    })
}

/// Address at `account/0/index` for the account's script type
pub fn derive_receive_address(
    secp: &Secp256k1<All>,
    account_xpub: &Xpub,
    kind: AccountKind,
    network: Network,
    index: u32,
) -> BrainWalletResult<DerivedAddress> {
    let child = account_xpub.derive_pub(secp, &receive_suffix(index)?)?;
    let compressed = CompressedPublicKey(child.public_key);
    let btc_network = network.to_bitcoin();

    let (address, encoding) = match kind {
        AccountKind::Legacy => (
            Address::p2pkh(compressed.pubkey_hash(), btc_network).to_string(),
            AddressEncoding::Standard,
        ),
        AccountKind::NestedSegwit => (
            Address::p2shwpkh(&compressed, btc_network).to_string(),
            AddressEncoding::Standard,
        ),
        AccountKind::NativeSegwit => (
            Address::p2wpkh(&compressed, btc_network).to_string(),
            AddressEncoding::Standard,
        ),
        AccountKind::Taproot => {
            let (x_only, _parity) = child.public_key.x_only_public_key();
            let taproot = taproot_address(secp, x_only, network);
            (taproot.address, taproot.encoding)
        }
    };

    Ok(DerivedAddress {
        index,
        path: receive_path(kind, network, index),
        address,
        encoding,
    })
}

// =============================================================================
// Indexer key formats
// =============================================================================

/// SLIP-0132 version bytes an xpub indexer expects for each script type.
/// Taproot has no registered prefix.
fn slip132_version(kind: AccountKind, network: Network) -> Option<[u8; 4]> {
    match (kind, network) {
        (AccountKind::Legacy, Network::Bitcoin) => Some([0x04, 0x88, 0xb2, 0x1e]), // xpub
        (AccountKind::NestedSegwit, Network::Bitcoin) => Some([0x04, 0x9d, 0x7c, 0xb2]), // ypub
        (AccountKind::NativeSegwit, Network::Bitcoin) => Some([0x04, 0xb2, 0x47, 0x46]), // zpub
        (AccountKind::Legacy, Network::Testnet) => Some([0x04, 0x35, 0x87, 0xcf]), // tpub
        (AccountKind::NestedSegwit, Network::Testnet) => Some([0x04, 0x4a, 0x52, 0x62]), // upub
        (AccountKind::NativeSegwit, Network::Testnet) => Some([0x04, 0x5f, 0x1c, 0xf6]), // vpub
        (AccountKind::Taproot, _) => None,
    }
}

/// Re-encode a standard xpub with the script-type prefix an indexer
/// needs to scan the right address type. `None` for Taproot.
pub fn indexer_xpub(xpub: &str, kind: AccountKind, network: Network) -> BrainWalletResult<Option<String>> {
    let Some(version) = slip132_version(kind, network) else {
        return Ok(None);
    };

    let mut payload = bitcoin::base58::decode_check(xpub)
        .map_err(|e| BrainWalletError::parse_error(format!("Invalid extended key: {}", e)))?;
    if payload.len() != 78 {
        return Err(BrainWalletError::parse_error(format!(
            "Extended key payload is {} bytes, expected 78",
            payload.len()
        )));
    }
    payload[..4].copy_from_slice(&version);
    Ok(Some(bitcoin::base58::encode_check(&payload)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::keygen::{mnemonic_to_seed, parse_mnemonic};
    use std::str::FromStr;

    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn abandon_accounts(count: u32) -> Vec<AccountKeys> {
        let mnemonic = parse_mnemonic(ABANDON).unwrap();
        let seed = mnemonic_to_seed(&mnemonic, "");
        derive_accounts(&seed, count, Network::Bitcoin)
    }

    fn account(accounts: &[AccountKeys], kind: AccountKind) -> &AccountKeys {
        accounts.iter().find(|a| a.kind == kind).unwrap()
    }

    #[test]
    fn test_bip44_reference_vector() {
        let accounts = abandon_accounts(1);
        let legacy = account(&accounts, AccountKind::Legacy);
        assert_eq!(
            legacy.xpub.as_deref(),
            Some("xpub6BosfCnifzxcFwrSzQiqu2DBVTshkCXacvNsWGYJVVhhawA7d4R5WSWGFNbi8Aw6ZRc1brxMyWMzG3DSSSSoekkudhUd9yLb6qx39T9nMdj")
        );
        assert_eq!(legacy.addresses[0].address, "1LqBGSKuX5yYUonjxT5qGfpUsXKYYWeabA");
    }

    #[test]
    fn test_bip49_reference_vector() {
        let accounts = abandon_accounts(1);
        let nested = account(&accounts, AccountKind::NestedSegwit);
        assert_eq!(nested.addresses[0].address, "37VucYSaXLCAsxYyAPfbSi9eh4iEcbShgf");
    }

    #[test]
    fn test_bip84_reference_vector() {
        let accounts = abandon_accounts(2);
        let native = account(&accounts, AccountKind::NativeSegwit);
        assert_eq!(native.addresses[0].address, "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
        assert_eq!(native.addresses[1].address, "bc1qnjg0jd8228aq7egyzacy8cys3knf9xvrerkf9g");
        assert_eq!(native.addresses[1].path, "m/84'/0'/0'/0/1");
    }

    #[test]
    fn test_bip86_reference_vector() {
        let accounts = abandon_accounts(2);
        let taproot = account(&accounts, AccountKind::Taproot);
        assert_eq!(
            taproot.xpub.as_deref(),
            Some("xpub6BgBgsespWvERF3LHQu6CnqdvfEvtMcQjYrcRzx53QJjSxarj2afYWcLteoGVky7D3UKDP9QyrLprQ3VCECoY49yfdDEHGCtMMj92pReUsQ")
        );
        assert_eq!(
            taproot.addresses[0].address,
            "bc1p5cyxnuxmeuwuvkwfem96lqzszd02n6xdcjrs20cac6yqjjwudpxqkedrcr"
        );
        assert_eq!(
            taproot.addresses[1].address,
            "bc1p4qhjn9zdvkux4e44uhx8tc55attvtyu358kutcqkudyccelu0was9fqzwh"
        );
        assert_eq!(taproot.addresses[0].encoding, AddressEncoding::Standard);
    }

    #[test]
    fn test_address_prefixes() {
        let accounts = abandon_accounts(5);
        let prefixes = [
            (AccountKind::Legacy, "1"),
            (AccountKind::NestedSegwit, "3"),
            (AccountKind::NativeSegwit, "bc1q"),
            (AccountKind::Taproot, "bc1p"),
        ];
        for (kind, prefix) in prefixes {
            let acc = account(&accounts, kind);
            assert_eq!(acc.addresses.len(), 5);
            for addr in &acc.addresses {
                assert!(addr.address.starts_with(prefix), "{} does not start with {}", addr.address, prefix);
                Address::from_str(&addr.address)
                    .unwrap()
                    .require_network(bitcoin::Network::Bitcoin)
                    .unwrap();
            }
        }
    }

    #[test]
    fn test_testnet_prefixes() {
        let mnemonic = parse_mnemonic(ABANDON).unwrap();
        let seed = mnemonic_to_seed(&mnemonic, "");
        let accounts = derive_accounts(&seed, 1, Network::Testnet);
        assert!(account(&accounts, AccountKind::NativeSegwit).addresses[0].address.starts_with("tb1q"));
        assert!(account(&accounts, AccountKind::Taproot).addresses[0].address.starts_with("tb1p"));
        assert!(account(&accounts, AccountKind::Legacy).xpub.as_deref().unwrap().starts_with("tpub"));
        assert_eq!(account(&accounts, AccountKind::Legacy).path, "m/44'/1'/0'");
    }

    #[test]
    fn test_zero_addresses_still_yields_xpub() {
        let accounts = abandon_accounts(0);
        assert_eq!(accounts.len(), 4);
        assert!(accounts.iter().all(|a| a.xpub.is_some() && a.addresses.is_empty()));
    }

    #[test]
    fn test_failed_account_does_not_abort_siblings() {
        let mnemonic = parse_mnemonic(ABANDON).unwrap();
        let seed = mnemonic_to_seed(&mnemonic, "");
        let accounts = derive_accounts_with(&seed, 2, Network::Bitcoin, |kind, network| {
            if kind == AccountKind::NestedSegwit {
                return Err(BrainWalletError::derivation_failed("unsupported path"));
            }
            parse_account_path(kind, network)
        });
        let reference = abandon_accounts(2);

        assert_eq!(accounts.len(), 4);
        let nested = account(&accounts, AccountKind::NestedSegwit);
        assert!(nested.xpub.is_none());
        assert!(nested.addresses.is_empty());
        assert!(nested.error.as_deref().unwrap().contains("unsupported path"));
        assert_eq!(nested.path, "m/49'/0'/0'");

        for kind in [AccountKind::Legacy, AccountKind::NativeSegwit, AccountKind::Taproot] {
            let derived = account(&accounts, kind);
            let expected = account(&reference, kind);
            assert!(derived.error.is_none());
            assert_eq!(derived.xpub, expected.xpub);
            assert_eq!(derived.addresses, expected.addresses);
        }
    }

    #[test]
    fn test_indexer_xpub_prefixes() {
        let accounts = abandon_accounts(0);
        let xpub_of = |kind| account(&accounts, kind).xpub.clone().unwrap();

        let legacy = indexer_xpub(&xpub_of(AccountKind::Legacy), AccountKind::Legacy, Network::Bitcoin).unwrap();
        assert_eq!(legacy, Some(xpub_of(AccountKind::Legacy)));

        let nested = indexer_xpub(&xpub_of(AccountKind::NestedSegwit), AccountKind::NestedSegwit, Network::Bitcoin)
            .unwrap()
            .unwrap();
        assert_eq!(
            nested,
            "ypub6Ww3ibxVfGzLrAH1PNcjyAWenMTbbAosGNB6VvmSEgytSER9azLDWCxoJwW7Ke7icmizBMXrzBx9979FfaHxHcrArf3zbeJJJUZPf663zsP"
        );

        let native = indexer_xpub(&xpub_of(AccountKind::NativeSegwit), AccountKind::NativeSegwit, Network::Bitcoin)
            .unwrap()
            .unwrap();
        assert_eq!(
            native,
            "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs"
        );

        let taproot = indexer_xpub(&xpub_of(AccountKind::Taproot), AccountKind::Taproot, Network::Bitcoin).unwrap();
        assert_eq!(taproot, None);
    }

    #[test]
    fn test_indexer_xpub_rejects_garbage() {
        assert!(indexer_xpub("not-an-xpub", AccountKind::Legacy, Network::Bitcoin).is_err());
    }
}
