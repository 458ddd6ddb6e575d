//! Entropy Derivation
//!
//! Turns free-form text into 128 bits of mnemonic entropy:
//! `SHA256(utf8(text))[..16]`.
//!
//! SECURITY: A brain wallet is only as strong as the text behind it.
//! The entropy buffer is zeroized on drop.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::types::InputStrength;

/// Entropy length in bytes (128 bits = 12 words)
pub const ENTROPY_LEN: usize = 16;

/// Below this many characters the input is flagged as weak
pub const MIN_RECOMMENDED_CHARS: usize = 20;

/// Fixed-size mnemonic entropy derived from user text
pub struct EntropySeed(Zeroizing<[u8; ENTROPY_LEN]>);

impl EntropySeed {
    pub fn from_bytes(bytes: [u8; ENTROPY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ENTROPY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(AsRef::<[u8]>::as_ref(&*self.0)))
    }
}

impl std::fmt::Debug for EntropySeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EntropySeed([REDACTED])")
    }
}

impl PartialEq for EntropySeed {
    fn eq(&self, other: &Self) -> bool {
        AsRef::<[u8]>::as_ref(&*self.0) == AsRef::<[u8]>::as_ref(&*other.0)
    }
}

impl Eq for EntropySeed {}

/// Derive mnemonic entropy from text.
///
/// The caller must reject empty text before calling. The bytes hashed are
/// exactly the UTF-8 encoding of `text`; no trimming or normalization
/// happens here.
pub fn derive_entropy(text: &str) -> EntropySeed {
    let digest: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(text.as_bytes()).into());

    let mut entropy = [0u8; ENTROPY_LEN];
    entropy.copy_from_slice(&digest[..ENTROPY_LEN]);
    EntropySeed::from_bytes(entropy)
}

/// Advisory check on the source text. Never rejects anything.
pub fn input_strength(text: &str) -> InputStrength {
    let chars = text.chars().count();
    InputStrength {
        chars,
        weak: chars < MIN_RECOMMENDED_CHARS,
    }
}
