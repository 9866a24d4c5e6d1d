//! Wire types shared between `kms-gateway` and its clients.

pub mod error;
pub mod protocol;

pub use error::{ChannelError, ErrorCode};
pub use protocol::{ErrorResponse, HealthResponse, MethodCall, MethodResult};
