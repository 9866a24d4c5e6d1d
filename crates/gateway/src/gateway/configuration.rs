//! [`Configuration`]: the validated credential/key record a gateway operates with.

use std::fmt;

use thiserror::Error;
use zeroize::Zeroize;

/// Errors produced while building a [`Configuration`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required field is absent or blank.
    #[error("{0} is required and must not be empty")]
    MissingField(&'static str),
}

/// A string holding credential material.
///
/// Overwritten with zeroes when dropped and redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Credentials, region and key id for one KMS key.
///
/// All four fields are required together; a value of this type is always
/// complete because [`Configuration::new`] is the only way to build one.
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    access_key_id: String,
    secret_access_key: Secret,
    region: String,
    key_id: String,
}

impl Configuration {
    /// Validate and build a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first field that is
    /// empty or whitespace-only.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            access_key_id: access_key_id.into(),
            secret_access_key: Secret(secret_access_key.into()),
            region: region.into(),
            key_id: key_id.into(),
        };
        ensure_non_empty(&cfg.access_key_id, "accessKeyId")?;
        ensure_non_empty(cfg.secret_access_key.expose(), "secretAccessKey")?;
        ensure_non_empty(&cfg.region, "region")?;
        ensure_non_empty(&cfg.key_id, "keyId")?;
        Ok(cfg)
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &Secret {
        &self.secret_access_key
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Key id, alias or ARN of the KMS key used for encryption.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key)
            .field("region", &self.region)
            .field("key_id", &self.key_id)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(name));
    }
    Ok(())
}
