//! `kms-gateway`: encrypt and decrypt through AWS KMS with one
//! credential-scoped configuration.
//!
//! [`CryptoGateway`] holds at most one [`Configuration`] and forwards each
//! call to a short-lived KMS client. [`MethodChannel`] exposes it as the
//! named operations `configure`, `encrypt` and `decrypt`, and [`server`]
//! serves that channel over HTTP.

pub mod channel;
pub mod config;
pub mod gateway;
pub mod kms;
pub mod server;
pub mod telemetry;

pub use channel::MethodChannel;
pub use gateway::{ConfigError, Configuration, CryptoError, CryptoGateway};
pub use kms::{AwsKmsConnector, KmsClient, KmsConnector, KmsError};
