//! Method-channel messages exchanged between a client application and the
//! gateway.
//!
//! These types are serialised as JSON on the HTTP transport. A call names an
//! operation and carries a free-form argument bag; the result is either a
//! success value, an error triple, or a "not implemented" marker for unknown
//! method names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ChannelError;

// ---------------------------------------------------------------------------
// Method call
// ---------------------------------------------------------------------------

/// Request body for `POST /invoke`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Operation name: `"configure"`, `"encrypt"` or `"decrypt"`.
    pub method: String,
    /// Named arguments. Values that the operation expects are strings.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl MethodCall {
    /// Construct a call with an empty argument bag.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Map::new(),
        }
    }

    /// Add a string argument.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments
            .insert(name.into(), Value::String(value.into()));
        self
    }
}

// ---------------------------------------------------------------------------
// Method result
// ---------------------------------------------------------------------------

/// Outcome of a single method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResult {
    /// The operation succeeded.
    Success { result: String },
    /// The operation failed.
    Error(ChannelError),
    /// No operation with this name exists.
    NotImplemented { method: String },
}

impl MethodResult {
    pub fn success(result: impl Into<String>) -> Self {
        MethodResult::Success {
            result: result.into(),
        }
    }

    /// HTTP status to send alongside this result.
    pub fn http_status(&self) -> u16 {
        match self {
            MethodResult::Success { .. } => 200,
            MethodResult::Error(e) => e.code.http_status(),
            MethodResult::NotImplemented { .. } => 501,
        }
    }
}

impl From<ChannelError> for MethodResult {
    fn from(e: ChannelError) -> Self {
        MethodResult::Error(e)
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Body returned for HTTP failures outside the method channel, such as an
/// unknown route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `"NOT_FOUND"`.
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INTERNAL_ERROR: &'static str = "INTERNAL_ERROR";

    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when a configuration is held, `"unconfigured"` otherwise.
    pub status: String,
    /// Whether encrypt/decrypt can run without inline credentials.
    pub configured: bool,
}
