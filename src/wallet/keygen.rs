//! Mnemonic and Seed Pipeline
//!
//! Entropy -> BIP39 mnemonic (English wordlist) -> 64-byte seed.
//!
//! SECURITY: Seeds and recovered entropy are zeroized on drop.

use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::error::{BrainWalletError, BrainWalletResult, ErrorCode};

use super::entropy::EntropySeed;

/// Seed length produced by PBKDF2-HMAC-SHA512
pub const SEED_LEN: usize = 64;

/// 64-byte BIP39 seed. Never leaves the process.
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(AsRef::<[u8]>::as_ref(&*self.0)))
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Encode entropy as a checksummed mnemonic (16 bytes -> 12 words)
pub fn entropy_to_mnemonic(entropy: &EntropySeed) -> BrainWalletResult<Mnemonic> {
    Mnemonic::from_entropy(entropy.as_bytes())
        .map_err(|e| BrainWalletError::crypto_error(format!("Failed to create mnemonic: {}", e)))
}

/// Stretch a mnemonic into its seed (2048 rounds of HMAC-SHA512)
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Seed {
    Seed(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// Parse and checksum-validate a phrase
pub fn parse_mnemonic(phrase: &str) -> BrainWalletResult<Mnemonic> {
    Mnemonic::parse(phrase.trim()).map_err(|e| {
        BrainWalletError::new(ErrorCode::InvalidMnemonic, format!("Invalid mnemonic: {}", e))
    })
}

/// Recover the entropy a mnemonic encodes
pub fn mnemonic_to_entropy(mnemonic: &Mnemonic) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(mnemonic.to_entropy())
}
