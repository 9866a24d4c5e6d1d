//! [`CryptoGateway`]: credential-scoped encrypt/decrypt against a KMS backend.
//!
//! # Lifecycle
//!
//! 1. The gateway starts unconfigured.
//! 2. [`CryptoGateway::configure`] validates and stores a [`Configuration`],
//!    replacing any previous one. An invalid configuration never reaches the
//!    slot.
//! 3. Each encrypt/decrypt call snapshots the current configuration, opens a
//!    scoped KMS client, issues one request, and drops the client on every
//!    exit path.
//! 4. [`CryptoGateway::clear`] returns the gateway to the unconfigured state
//!    on teardown.
//!
//! A `configure` racing with in-flight calls may be observed by them either
//! way; each call uses whichever snapshot it loaded.

pub mod configuration;
pub mod error;

pub use configuration::{ConfigError, Configuration, Secret};
pub use error::CryptoError;

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use crate::kms::{KmsClient, KmsConnector, KmsError};

/// Encrypts and decrypts through a KMS backend using at most one stored
/// configuration.
///
/// Cheap to clone; clones share the configuration slot and the connector.
#[derive(Clone)]
pub struct CryptoGateway {
    connector: Arc<dyn KmsConnector>,
    slot: Arc<ArcSwapOption<Configuration>>,
    bind_key_on_decrypt: bool,
}

impl CryptoGateway {
    /// Create an unconfigured gateway over `connector`.
    pub fn new(connector: Arc<dyn KmsConnector>) -> Self {
        Self {
            connector,
            slot: Arc::new(ArcSwapOption::empty()),
            bind_key_on_decrypt: false,
        }
    }

    /// Pass the configured key id on decrypt so the service rejects
    /// ciphertext produced under a different key. Off by default; KMS can
    /// infer the key from the ciphertext metadata.
    pub fn with_decrypt_key_binding(mut self, bind: bool) -> Self {
        self.bind_key_on_decrypt = bind;
        self
    }

    /// Validate the four fields and store them as the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if any field is empty. The
    /// previously stored configuration is left untouched in that case.
    pub fn configure(
        &self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let cfg = Configuration::new(access_key_id, secret_access_key, region, key_id)?;
        self.set_configuration(cfg);
        Ok(())
    }

    /// Store an already-validated configuration, replacing any previous one.
    pub fn set_configuration(&self, cfg: Configuration) {
        debug!(region = cfg.region(), key_id = cfg.key_id(), "gateway configured");
        self.slot.store(Some(Arc::new(cfg)));
    }

    /// Forget the stored configuration.
    pub fn clear(&self) {
        if self.slot.swap(None).is_some() {
            debug!("gateway configuration cleared");
        }
    }

    pub fn is_configured(&self) -> bool {
        self.slot.load().is_some()
    }

    /// Snapshot of the current configuration, if any.
    pub fn current(&self) -> Option<Arc<Configuration>> {
        self.slot.load_full()
    }

    /// Encrypt `plaintext` with the stored configuration.
    ///
    /// Returns the ciphertext blob as standard padded base64.
    ///
    /// # Errors
    ///
    /// [`CryptoError::NotConfigured`] before any successful `configure`;
    /// [`CryptoError::EncryptionFailed`] for any backend failure.
    pub async fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cfg = self.current().ok_or(CryptoError::NotConfigured)?;
        self.encrypt_with(&cfg, plaintext).await
    }

    /// Encrypt with an inline configuration. The stored slot is not read or
    /// modified.
    pub async fn encrypt_with(
        &self,
        cfg: &Configuration,
        plaintext: &str,
    ) -> Result<String, CryptoError> {
        debug!(key_id = cfg.key_id(), plaintext_len = plaintext.len(), "encrypting");

        let client = ScopedClient::open(self.connector.as_ref(), cfg)
            .await
            .map_err(|e| encrypt_failed(&e))?;

        let blob = client
            .encrypt(cfg.key_id(), plaintext.as_bytes())
            .await
            .map_err(|e| encrypt_failed(&e))?;

        Ok(STANDARD.encode(blob))
    }

    /// Decrypt base64 ciphertext with the stored configuration.
    ///
    /// # Errors
    ///
    /// [`CryptoError::NotConfigured`] before any successful `configure`;
    /// [`CryptoError::InvalidEncoding`] for malformed base64 (no client is
    /// opened); [`CryptoError::DecryptionFailed`] for any backend failure;
    /// [`CryptoError::InvalidUtf8`] if the plaintext is not text.
    pub async fn decrypt(&self, ciphertext_b64: &str) -> Result<String, CryptoError> {
        let cfg = self.current().ok_or(CryptoError::NotConfigured)?;
        self.decrypt_with(&cfg, ciphertext_b64).await
    }

    /// Decrypt with an inline configuration. The stored slot is not read or
    /// modified.
    pub async fn decrypt_with(
        &self,
        cfg: &Configuration,
        ciphertext_b64: &str,
    ) -> Result<String, CryptoError> {
        let blob = STANDARD
            .decode(ciphertext_b64)
            .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;

        debug!(key_id = cfg.key_id(), ciphertext_len = blob.len(), "decrypting");

        let client = ScopedClient::open(self.connector.as_ref(), cfg)
            .await
            .map_err(|e| decrypt_failed(&e))?;

        let key_id = self.bind_key_on_decrypt.then(|| cfg.key_id());
        let plaintext = client
            .decrypt(key_id, &blob)
            .await
            .map_err(|e| decrypt_failed(&e))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::InvalidUtf8(e.to_string()))
    }
}

fn encrypt_failed(e: &KmsError) -> CryptoError {
    warn!(error = %e, "KMS encrypt failed");
    CryptoError::EncryptionFailed(e.to_string())
}

fn decrypt_failed(e: &KmsError) -> CryptoError {
    warn!(error = %e, "KMS decrypt failed");
    CryptoError::DecryptionFailed(e.to_string())
}

/// A KMS client that lives for one gateway call and is released on drop.
struct ScopedClient {
    inner: Box<dyn KmsClient>,
}

impl ScopedClient {
    async fn open(connector: &dyn KmsConnector, cfg: &Configuration) -> Result<Self, KmsError> {
        let inner = connector.connect(cfg).await?;
        Ok(Self { inner })
    }
}

impl std::ops::Deref for ScopedClient {
    type Target = dyn KmsClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl Drop for ScopedClient {
    fn drop(&mut self) {
        debug!("KMS client released");
    }
}
