mod config;
mod document_client;
mod editor;
mod errors;
mod layout;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::document_client::HttpDocumentService;
use crate::editor::remote::reload_template;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting layout editor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize document service client
    let docs = HttpDocumentService::new(
        &config.document_service_url,
        config.document_service_timeout,
    )?;
    info!("Document service client initialized ({})", config.document_service_url);

    let state = AppState::new(config.clone(), Arc::new(docs));

    // Pick up whatever template the document service already has.
    match reload_template(&state.session, state.docs.as_ref()).await {
        Ok(template) => info!(
            "Template ready: {}x{}",
            template.size.width, template.size.height
        ),
        Err(e) => warn!("Initial template load failed, using default canvas: {e}"),
    }

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
