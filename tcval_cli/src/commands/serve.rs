use anyhow::{Context, Result};

use tcval_core::{create_validation_service, run_api_server, ServiceConfig, StorageType};

pub async fn run_serve_command(
    port: Option<u16>,
    db_path: Option<String>,
    in_memory: bool,
) -> Result<()> {
    tcval_core::init_tracing();

    let mut config = ServiceConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = port {
        config.port = port;
    }
    if in_memory {
        config.storage.storage_type = StorageType::Memory;
        config.storage.db_path = None;
    }
    if let Some(path) = db_path {
        config.storage.storage_type = StorageType::Sqlite;
        config.storage.db_path = Some(path);
    }

    let service = create_validation_service(&config)
        .await
        .context("Failed to initialize the validation service")?;

    log::info!("Starting server...");
    run_api_server(config.port, service.router())
        .await
        .context("API server terminated")?;

    Ok(())
}
