//! [`MethodChannel`]: the named-operation boundary in front of a
//! [`CryptoGateway`].
//!
//! Operations:
//! - `configure`: `accessKeyId`, `secretAccessKey`, `region`, `keyId`
//! - `encrypt`: `plaintext`, plus optional inline credentials
//! - `decrypt`: `encryptedText`, plus optional inline credentials
//!
//! Any other method name yields [`MethodResult::NotImplemented`].

mod args;

use common::{ChannelError, MethodCall, MethodResult};
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::gateway::CryptoGateway;

pub const METHOD_CONFIGURE: &str = "configure";
pub const METHOD_ENCRYPT: &str = "encrypt";
pub const METHOD_DECRYPT: &str = "decrypt";

/// Result string returned by a successful `configure`.
pub const CONFIGURED: &str = "configured";

/// Routes method calls to a shared [`CryptoGateway`].
#[derive(Clone)]
pub struct MethodChannel {
    gateway: CryptoGateway,
}

impl MethodChannel {
    pub fn new(gateway: CryptoGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &CryptoGateway {
        &self.gateway
    }

    /// Run `call` as an independent task and deliver its result through the
    /// returned receiver.
    ///
    /// The task runs to completion even if the receiver is dropped.
    pub fn dispatch(&self, call: MethodCall) -> oneshot::Receiver<MethodResult> {
        let (tx, rx) = oneshot::channel();
        let channel = self.clone();
        let span = info_span!("method_call", call_id = %Uuid::new_v4(), method = %call.method);

        tokio::spawn(
            async move {
                let result = channel.handle(call).await;
                if tx.send(result).is_err() {
                    debug!("caller went away before the result was delivered");
                }
            }
            .instrument(span),
        );
        rx
    }

    /// Run `call` on the current task.
    pub async fn handle(&self, call: MethodCall) -> MethodResult {
        let outcome = match call.method.as_str() {
            METHOD_CONFIGURE => self.configure(&call.arguments),
            METHOD_ENCRYPT => self.encrypt(&call.arguments).await,
            METHOD_DECRYPT => self.decrypt(&call.arguments).await,
            other => {
                debug!(method = other, "method not implemented");
                return MethodResult::NotImplemented {
                    method: other.to_owned(),
                };
            }
        };

        match outcome {
            Ok(result) => MethodResult::success(result),
            Err(e) => {
                debug!(code = %e.code, "method call failed");
                MethodResult::Error(e)
            }
        }
    }

    fn configure(&self, args: &Map<String, Value>) -> Result<String, ChannelError> {
        let cfg = args::configuration(args)?;
        self.gateway.set_configuration(cfg);
        Ok(CONFIGURED.to_owned())
    }

    async fn encrypt(&self, args: &Map<String, Value>) -> Result<String, ChannelError> {
        let plaintext = args::required(args, args::PLAINTEXT)?;
        let ciphertext = match args::inline_configuration(args)? {
            Some(cfg) => self.gateway.encrypt_with(&cfg, plaintext).await?,
            None => self.gateway.encrypt(plaintext).await?,
        };
        Ok(ciphertext)
    }

    async fn decrypt(&self, args: &Map<String, Value>) -> Result<String, ChannelError> {
        let encrypted = args::required(args, args::ENCRYPTED_TEXT)?;
        let plaintext = match args::inline_configuration(args)? {
            Some(cfg) => self.gateway.decrypt_with(&cfg, encrypted).await?,
            None => self.gateway.decrypt(encrypted).await?,
        };
        Ok(plaintext)
    }
}
