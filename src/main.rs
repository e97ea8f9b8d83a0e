use std::sync::Arc;

use anyhow::Context;
use vitalcheck_lib::api::{ctrl_c_signal, start_server, ApiContext};
use vitalcheck_lib::assessment::AssessmentService;
use vitalcheck_lib::config::{self, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    vitalcheck_lib::init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    // Blocking HTTP clients must be built and dropped outside the runtime.
    let startup_config = config.clone();
    let service = tokio::task::spawn_blocking(move || AssessmentService::from_config(&startup_config))
        .await
        .context("Startup task failed")?
        .context("Cannot build assessment service")?;
    let service = Arc::new(service);

    let server = start_server(ApiContext::new(service.clone()), config.bind_addr)
        .await
        .map_err(anyhow::Error::msg)?;
    tracing::info!(
        addr = %server.session.addr,
        session = %server.session.session_id,
        "Listening"
    );

    server.run_until(ctrl_c_signal()).await;

    tokio::task::spawn_blocking(move || drop(service))
        .await
        .context("Shutdown task failed")?;
    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
