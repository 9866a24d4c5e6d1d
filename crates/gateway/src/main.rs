//! `kms-gateway` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 3. Build the [`CryptoGateway`] over AWS KMS and apply any preset
//!    configuration.
//! 4. Serve the method channel over HTTP until a shutdown signal.
//! 5. Clear the configuration slot on teardown.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use kms_gateway::config::Config;
use kms_gateway::server::{self, state::AppState};
use kms_gateway::{telemetry, AwsKmsConnector, CryptoGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "kms-gateway starting"
    );

    // -----------------------------------------------------------------------
    // 3. Gateway
    // -----------------------------------------------------------------------
    let mut connector = AwsKmsConnector::new();
    if let Some(url) = &cfg.kms_endpoint_url {
        info!(endpoint = %url, "using KMS endpoint override");
        connector = connector.with_endpoint_url(url.as_str());
    }
    let gateway = CryptoGateway::new(Arc::new(connector))
        .with_decrypt_key_binding(cfg.decrypt_bind_key_id);

    if let Some(preset) = cfg.preset()? {
        gateway.set_configuration(preset);
        info!("preset KMS configuration applied");
    }

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let result = server::serve(AppState::new(gateway.clone()), cfg.listen_port).await;

    // -----------------------------------------------------------------------
    // 5. Teardown
    // -----------------------------------------------------------------------
    gateway.clear();
    telemetry::shutdown_telemetry();
    info!("kms-gateway stopped");
    result
}
