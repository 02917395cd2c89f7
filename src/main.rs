use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use health_saathi::adapters::{api_router, AppState, GeminiProvider, TokioPacer};
use health_saathi::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    if !config.ai.has_api_key() {
        tracing::warn!("GEMINI_API_KEY is not set, every reply will use fallback text");
    }

    let provider = Arc::new(GeminiProvider::new(config.gemini())?);
    let state = AppState::assemble(provider, Arc::new(TokioPacer), &config.chat)?;
    let sweep = config.chat.sessions.idle_timeout().map(|max_idle| {
        state
            .orchestrator
            .spawn_idle_sweep(max_idle, config.chat.sessions.sweep_interval())
    });
    let app = api_router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Health Saathi listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweep) = sweep {
        sweep.abort();
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
