use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use herald_core::HeraldConfig;
use herald_server::{build_orchestrator, router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    fmt()
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = HeraldConfig::load();
    let orchestrator = Arc::new(build_orchestrator(&config)?);
    let app = router(AppState::new(orchestrator));

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(target: "server", url = %format!("http://{}", addr), "Herald server ready");

    axum::serve(listener, app).await?;
    Ok(())
}
