//! Configuration loading and validation for the gateway process.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if any variable is invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::gateway::Configuration;

/// Validated gateway process configuration.
///
/// Not `Debug`: it may hold a preset secret access key.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP method-channel server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Tracing log level (e.g. `"info"`, `"debug"`). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Override for the KMS endpoint URL (e.g. LocalStack).
    #[serde(default)]
    pub kms_endpoint_url: Option<String>,

    /// Pass the configured key id on decrypt requests.
    #[serde(default)]
    pub decrypt_bind_key_id: bool,

    /// Preset access key id. The four `KMS_*` credential variables must be
    /// set together or not at all.
    #[serde(default)]
    pub kms_access_key_id: Option<String>,

    /// Preset secret access key.
    #[serde(default)]
    pub kms_secret_access_key: Option<String>,

    /// Preset region.
    #[serde(default)]
    pub kms_region: Option<String>,

    /// Preset key id, alias or ARN.
    #[serde(default)]
    pub kms_key_id: Option<String>,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the preset
    /// credentials are only partially set.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// The preset gateway configuration, if the `KMS_*` variables supply one.
    ///
    /// # Errors
    ///
    /// Returns an error if some but not all of the four variables are set, or
    /// if any of them is blank.
    pub fn preset(&self) -> Result<Option<Configuration>> {
        match (
            &self.kms_access_key_id,
            &self.kms_secret_access_key,
            &self.kms_region,
            &self.kms_key_id,
        ) {
            (None, None, None, None) => Ok(None),
            (Some(access_key_id), Some(secret), Some(region), Some(key_id)) => {
                let cfg = Configuration::new(
                    access_key_id.as_str(),
                    secret.as_str(),
                    region.as_str(),
                    key_id.as_str(),
                )
                .context("invalid preset KMS configuration")?;
                Ok(Some(cfg))
            }
            _ => anyhow::bail!(
                "KMS_ACCESS_KEY_ID, KMS_SECRET_ACCESS_KEY, KMS_REGION and KMS_KEY_ID \
                 must be set together"
            ),
        }
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.listen_port == 0 {
            anyhow::bail!("LISTEN_PORT must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        if let Some(url) = &self.kms_endpoint_url {
            ensure_non_empty(url, "KMS_ENDPOINT_URL")?;
        }
        self.preset()?;
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty when set");
    }
    Ok(())
}
