//! Shared application state injected into every Axum handler.

use crate::channel::MethodChannel;
use crate::gateway::CryptoGateway;

/// Application state shared across all request handlers.
///
/// Cheap to clone: the channel shares one gateway and its configuration slot.
#[derive(Clone)]
pub struct AppState {
    pub channel: MethodChannel,
}

impl AppState {
    pub fn new(gateway: CryptoGateway) -> Self {
        Self {
            channel: MethodChannel::new(gateway),
        }
    }
}
