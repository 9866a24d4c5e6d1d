//! Errors returned by [`CryptoGateway`](super::CryptoGateway) operations.

use common::{ChannelError, ErrorCode};
use thiserror::Error;

use super::configuration::ConfigError;

/// Failure of a single encrypt or decrypt call.
///
/// Every variant is terminal for that call only; the gateway stays usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// No configuration has been stored and none was supplied inline.
    #[error("gateway is not configured")]
    NotConfigured,

    /// An inline configuration was incomplete.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The ciphertext argument is not valid base64.
    #[error("invalid base64 ciphertext: {0}")]
    InvalidEncoding(String),

    /// The decrypted bytes are not valid UTF-8.
    #[error("decrypted plaintext is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The key-management service rejected or failed the encrypt request.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// The key-management service rejected or failed the decrypt request.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}

impl CryptoError {
    /// The wire code reported to method-channel callers.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CryptoError::NotConfigured | CryptoError::Config(_) => ErrorCode::ConfigurationError,
            CryptoError::InvalidEncoding(_) => ErrorCode::InvalidBase64String,
            CryptoError::EncryptionFailed(_) => ErrorCode::EncryptionError,
            CryptoError::InvalidUtf8(_) | CryptoError::DecryptionFailed(_) => {
                ErrorCode::DecryptionError
            }
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            CryptoError::NotConfigured => "Gateway is not configured",
            CryptoError::Config(_) => "Invalid configuration",
            CryptoError::InvalidEncoding(_) => "Invalid Base64 string",
            CryptoError::EncryptionFailed(_) => "Failed to encrypt data",
            CryptoError::InvalidUtf8(_) | CryptoError::DecryptionFailed(_) => {
                "Failed to decrypt data"
            }
        }
    }
}

impl From<CryptoError> for ChannelError {
    fn from(e: CryptoError) -> Self {
        ChannelError::new(e.error_code(), e.summary()).with_details(e.to_string())
    }
}
