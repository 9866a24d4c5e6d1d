//! The key-management backend seam.
//!
//! A [`KmsConnector`] opens one short-lived [`KmsClient`] per gateway call,
//! bound to the region and credentials of a [`Configuration`]. The client is
//! released by dropping it.
//!
//! # Invariants
//!
//! - Plaintext and ciphertext bytes never appear in log fields; only their
//!   lengths do.
//! - Backend errors carry the service's own message so callers can see why a
//!   request was rejected (throttling, access denied, unknown key).

pub mod aws;
#[cfg(test)]
pub(crate) mod stub;

pub use aws::AwsKmsConnector;

use async_trait::async_trait;
use thiserror::Error;

use crate::gateway::Configuration;

/// Errors produced by a KMS backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KmsError {
    /// A client could not be built for the configuration.
    #[error("failed to open KMS client: {0}")]
    Connect(String),

    /// The service returned an error for the request.
    #[error("{0}")]
    Service(String),

    /// The service reported success but omitted the named field.
    #[error("KMS response contained no {0}")]
    EmptyResponse(&'static str),
}

/// A client bound to one configuration, valid for the duration of one call.
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// Encrypt `plaintext` under `key_id`, returning the ciphertext blob.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError>;

    /// Decrypt a ciphertext blob.
    ///
    /// When `key_id` is `None` the service infers the key from the blob's
    /// metadata; when given, the service rejects blobs made under another key.
    async fn decrypt(&self, key_id: Option<&str>, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError>;
}

/// Opens scoped [`KmsClient`]s.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KmsConnector: Send + Sync {
    /// Build a client for the region and credentials in `config`.
    async fn connect(&self, config: &Configuration) -> Result<Box<dyn KmsClient>, KmsError>;
}
