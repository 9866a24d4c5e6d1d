//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, ciphertext or secret key material** may appear in any
//!   span attribute or log field. Lengths, regions and key ids are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden
//!   by `RUST_LOG`.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
