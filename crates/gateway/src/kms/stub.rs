//! In-memory KMS stand-in for tests.
//!
//! Counts connects and live clients so tests can check that every call
//! releases its client, including on failure paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{KmsClient, KmsConnector, KmsError};
use crate::gateway::Configuration;

const MASK: u8 = 0xA5;

#[derive(Debug, Clone)]
pub(crate) enum Behaviour {
    /// Reversible encoding that records the key id inside the blob.
    Faithful,
    /// Every encrypt returns these bytes.
    FixedCiphertext(Vec<u8>),
    /// Every decrypt returns these bytes.
    FixedPlaintext(Vec<u8>),
    /// Every request fails with this service message.
    Fail(String),
    /// `connect` itself fails.
    RefuseConnect(String),
}

#[derive(Debug)]
struct Counters {
    connects: AtomicUsize,
    live: AtomicUsize,
    completed: AtomicUsize,
}

#[derive(Debug, Clone)]
pub(crate) struct StubKms {
    behaviour: Behaviour,
    delay: Option<Duration>,
    counters: Arc<Counters>,
}

impl StubKms {
    pub(crate) fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            delay: None,
            counters: Arc::new(Counters {
                connects: AtomicUsize::new(0),
                live: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }),
        }
    }

    /// Hold every request for `delay` before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn faithful() -> Self {
        Self::new(Behaviour::Faithful)
    }

    pub(crate) fn connects(&self) -> usize {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn live_clients(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    /// Requests that ran to the end, successful or not.
    pub(crate) fn completed(&self) -> usize {
        self.counters.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KmsConnector for StubKms {
    async fn connect(&self, _config: &Configuration) -> Result<Box<dyn KmsClient>, KmsError> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        if let Behaviour::RefuseConnect(msg) = &self.behaviour {
            return Err(KmsError::Connect(msg.clone()));
        }
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubClient {
            behaviour: self.behaviour.clone(),
            delay: self.delay,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct StubClient {
    behaviour: Behaviour,
    delay: Option<Duration>,
    counters: Arc<Counters>,
}

impl StubClient {
    async fn settle(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.counters.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn seal(key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let key = key_id.as_bytes();
        let len = u8::try_from(key.len())
            .map_err(|_| KmsError::Service(format!("key id of {} bytes is too long", key.len())))?;
        let mut blob = Vec::with_capacity(1 + key.len() + plaintext.len());
        blob.push(len);
        blob.extend_from_slice(key);
        blob.extend(plaintext.iter().map(|b| b ^ MASK));
        Ok(blob)
    }
}

impl Drop for StubClient {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KmsClient for StubClient {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        self.settle().await;
        match &self.behaviour {
            Behaviour::FixedCiphertext(bytes) => Ok(bytes.clone()),
            Behaviour::Fail(msg) => Err(KmsError::Service(msg.clone())),
            _ => Self::seal(key_id, plaintext),
        }
    }

    async fn decrypt(&self, key_id: Option<&str>, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        self.settle().await;
        match &self.behaviour {
            Behaviour::FixedPlaintext(bytes) => Ok(bytes.clone()),
            Behaviour::Fail(msg) => Err(KmsError::Service(msg.clone())),
            _ => {
                let invalid = || KmsError::Service("InvalidCiphertextException".into());
                let (&len, rest) = ciphertext.split_first().ok_or_else(invalid)?;
                let len = usize::from(len);
                if rest.len() < len {
                    return Err(invalid());
                }
                let (key, body) = rest.split_at(len);
                if let Some(expected) = key_id {
                    if expected.as_bytes() != key {
                        return Err(KmsError::Service("IncorrectKeyException".into()));
                    }
                }
                Ok(body.iter().map(|b| b ^ MASK).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn faithful_round_trip_checks_key() {
        let stub = StubKms::faithful();
        let cfg = Configuration::new("AKIA", "secret", "eu-west-1", "alias/app").unwrap();
        let client = stub.connect(&cfg).await.unwrap();

        let blob = client.encrypt("alias/app", b"hi").await.unwrap();
        assert_eq!(client.decrypt(None, &blob).await.unwrap(), b"hi");
        assert!(client.decrypt(Some("alias/other"), &blob).await.is_err());
        assert_eq!(stub.completed(), 3);
    }

    #[tokio::test]
    async fn oversized_key_id_is_rejected() {
        let stub = StubKms::faithful();
        let cfg = Configuration::new("AKIA", "secret", "eu-west-1", "alias/app").unwrap();
        let client = stub.connect(&cfg).await.unwrap();

        let key_id = "k".repeat(256);
        let err = client.encrypt(&key_id, b"hi").await.unwrap_err();
        assert!(err.to_string().contains("too long"));
    }
}
