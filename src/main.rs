use clap::Parser;
use std::{sync::Arc, time::Duration};

mod app;
mod assertion;
mod audience;
mod cli;
mod error;
mod extract;
mod jwks;
mod metadata;
mod redirect;
mod tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing::setup();

    let args = cli::Args::parse();

    let client = outbound_client(Duration::from_secs(args.outbound_timeout_secs))?;

    let metadata = metadata::MetadataServer::new(
        client.clone(),
        metadata::base_url(&args.metadata_host)?,
        args.metadata_detection,
    );
    let keys = jwks::IapPublicKeys::new(client, args.public_keys_url.clone());

    let validator = Arc::new(assertion::AssertionValidator::new(
        audience::AudienceResolver::new(Arc::new(metadata)),
        Arc::new(keys),
        &args.issuer,
    ));

    let app = app::router().with_state(validator);
    let http_server = axum::Server::try_bind(&args.bind)?.serve(app.into_make_service());

    ::tracing::info!("App listening on {}", http_server.local_addr());
    ::tracing::info!("Press Ctrl+C to quit.");

    http_server.with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// HTTP client for the metadata server and the key endpoint; a call that runs past
/// `timeout` fails instead of holding the request open.
fn outbound_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        ::tracing::error!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}
