use std::sync::Arc;

use tracing::info;

use clarity_gateway::logging;
use clarity_gateway::server;
use clarity_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = clarity_core::Config::load()?;

    // Initialize tracing; keep the guard so the log file is flushed on exit
    let _log_guard = logging::init_tracing(&config.settings)?;

    info!("Starting Clarity Agent...");
    info!(
        "Configuration: Host={}, Port={}",
        config.settings.server.host, config.settings.server.port
    );
    info!("Default provider: {}", config.default_provider());

    config.warn_on_key_issues();

    let bind_addr = config.bind_addr();
    let state = Arc::new(AppState::new(config));

    server::run(state, &bind_addr).await?;

    Ok(())
}
