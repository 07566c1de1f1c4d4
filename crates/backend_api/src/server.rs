use std::net::SocketAddr;
use std::sync::Arc;

use crate::{orchestrator::Orchestrator, router::create_router};

/// Install the global tracing subscriber (RUST_LOG overrides the default filter)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend_api=debug,tower_http=debug,axum=trace".into()),
        )
        .init();
}

/// Run the API server
pub async fn run_server(orchestrator: Arc<Orchestrator>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(orchestrator);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
