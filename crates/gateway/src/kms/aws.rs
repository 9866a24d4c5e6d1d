//! AWS KMS backend built on `aws-sdk-kms`.

use async_trait::async_trait;
use aws_config::{retry::RetryConfig, BehaviorVersion};
use aws_sdk_kms::config::{Credentials, Region};
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use tracing::debug;

use super::{KmsClient, KmsConnector, KmsError};
use crate::gateway::Configuration;

/// Provider name attached to the static credentials handed to the SDK.
const CREDENTIALS_PROVIDER: &str = "kms-gateway";

/// Opens one `aws_sdk_kms::Client` per call from static credentials.
///
/// SDK retries are disabled: a throttled or failed request is reported to
/// the caller as-is.
#[derive(Debug, Clone, Default)]
pub struct AwsKmsConnector {
    endpoint_url: Option<String>,
}

impl AwsKmsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route requests to `url` instead of the regional AWS endpoint
    /// (e.g. LocalStack).
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }
}

#[async_trait]
impl KmsConnector for AwsKmsConnector {
    async fn connect(&self, config: &Configuration) -> Result<Box<dyn KmsClient>, KmsError> {
        let credentials = Credentials::new(
            config.access_key_id(),
            config.secret_access_key().expose(),
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_owned()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let mut builder = aws_sdk_kms::config::Builder::from(&sdk_config);
        if let Some(url) = &self.endpoint_url {
            builder = builder.endpoint_url(url);
        }

        debug!(region = config.region(), "KMS client opened");
        Ok(Box::new(AwsKmsClient {
            client: aws_sdk_kms::Client::from_conf(builder.build()),
        }))
    }
}

struct AwsKmsClient {
    client: aws_sdk_kms::Client,
}

#[async_trait]
impl KmsClient for AwsKmsClient {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let resp = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext))
            .send()
            .await
            .map_err(|e| KmsError::Service(DisplayErrorContext(&e).to_string()))?;

        let blob = resp
            .ciphertext_blob()
            .ok_or(KmsError::EmptyResponse("ciphertext blob"))?;
        Ok(blob.as_ref().to_vec())
    }

    async fn decrypt(&self, key_id: Option<&str>, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let resp = self
            .client
            .decrypt()
            .set_key_id(key_id.map(str::to_owned))
            .ciphertext_blob(Blob::new(ciphertext))
            .send()
            .await
            .map_err(|e| KmsError::Service(DisplayErrorContext(&e).to_string()))?;

        let plaintext = resp.plaintext().ok_or(KmsError::EmptyResponse("plaintext"))?;
        Ok(plaintext.as_ref().to_vec())
    }
}
