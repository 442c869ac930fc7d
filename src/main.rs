use log::*;
use service::{config::Config, init_event_queue, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::new();

    Logger::init_logger(&config)?;

    info!(
        "Starting agent diagnostics backend (env={}, log_level={})",
        config.runtime_env(),
        config.log_level
    );

    let event_queue = Arc::new(init_event_queue(&config));
    let app_state = AppState::new(config, &event_queue);

    web::init_server(app_state).await?;

    Ok(())
}
