//! Unified error types for the brain wallet core
//!
//! Every fallible operation returns `BrainWalletResult`. Per-item failures
//! (one account, one usage unit) are flattened into `Option<String>` fields
//! on the item itself via `Display`, so nothing here ever crosses the
//! usage-check boundary as a hard failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all brain wallet operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainWalletError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl BrainWalletError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn derivation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DerivationFailed, msg)
    }

    pub fn address_encoding(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AddressEncoding, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, msg)
    }

    pub fn http_status(status: u16) -> Self {
        Self::new(ErrorCode::HttpStatus, format!("API error: {}", status))
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// True for failures a caller may retry later (network side)
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::NetworkError | ErrorCode::Timeout | ErrorCode::HttpStatus
        )
    }
}

impl fmt::Display for BrainWalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for BrainWalletError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidMnemonic,
    InvalidConfig,

    // Derivation errors
    CryptoError,
    DerivationFailed,
    AddressEncoding,

    // Network errors
    NetworkError,
    Timeout,
    HttpStatus,

    // Parse errors
    ParseError,
    JsonError,

    // Internal
    Internal,
}

/// Result type alias for brain wallet operations
pub type BrainWalletResult<T> = Result<T, BrainWalletError>;

// Conversions from common error types

impl From<serde_json::Error> for BrainWalletError {
    fn from(e: serde_json::Error) -> Self {
        BrainWalletError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<std::io::Error> for BrainWalletError {
    fn from(e: std::io::Error) -> Self {
        BrainWalletError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<reqwest::Error> for BrainWalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BrainWalletError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            BrainWalletError::new(ErrorCode::NetworkError, "Connection failed")
        } else if e.is_decode() {
            BrainWalletError::new(ErrorCode::ParseError, e.to_string())
        } else {
            BrainWalletError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<bitcoin::bip32::Error> for BrainWalletError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        BrainWalletError::new(ErrorCode::DerivationFailed, format!("BIP32 error: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for BrainWalletError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        BrainWalletError::new(ErrorCode::CryptoError, format!("Secp256k1 error: {}", e))
    }
}

impl From<bip39::Error> for BrainWalletError {
    fn from(e: bip39::Error) -> Self {
        BrainWalletError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}

impl From<bech32::Error> for BrainWalletError {
    fn from(e: bech32::Error) -> Self {
        BrainWalletError::new(ErrorCode::AddressEncoding, format!("Bech32 error: {}", e))
    }
}

impl From<url::ParseError> for BrainWalletError {
    fn from(e: url::ParseError) -> Self {
        BrainWalletError::new(ErrorCode::InvalidConfig, format!("Invalid URL: {}", e))
    }
}
