//! Error codes and the error triple returned across the method channel.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable error code carried by every failed method call.
///
/// Codes map to HTTP status codes when the channel is served over HTTP:
/// - argument, configuration and encoding problems → 400
/// - failures reported by the key-management service → 502
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A required argument is missing or has the wrong type.
    InvalidArguments,
    /// The gateway is unconfigured, or a supplied configuration is incomplete.
    ConfigurationError,
    /// `encryptedText` is not valid base64.
    InvalidBase64String,
    /// The encrypt request failed.
    EncryptionError,
    /// The decrypt request failed, or produced bytes that are not UTF-8.
    DecryptionError,
}

impl ErrorCode {
    /// The wire spelling of this code, e.g. `"INVALID_ARGUMENTS"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArguments => "INVALID_ARGUMENTS",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
            ErrorCode::InvalidBase64String => "INVALID_BASE64_STRING",
            ErrorCode::EncryptionError => "ENCRYPTION_ERROR",
            ErrorCode::DecryptionError => "DECRYPTION_ERROR",
        }
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidArguments
            | ErrorCode::ConfigurationError
            | ErrorCode::InvalidBase64String => 400,
            ErrorCode::EncryptionError | ErrorCode::DecryptionError => 502,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed method call: `(code, message, details)`.
///
/// `message` is a short summary safe to show to users; `details` carries the
/// underlying diagnostic (for example the service error text) when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ChannelError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ChannelError {
    /// Construct a [`ChannelError`] without details.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach a diagnostic detail string.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Shorthand for an [`ErrorCode::InvalidArguments`] error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArguments, message)
    }
}
