// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Tcval Project
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

pub mod api;
pub mod callback;
pub mod config;
pub mod correlation;
pub mod oracle;
pub mod sqlite_storage;
pub mod storage;
pub mod user;

// Re-export common types
pub use api::{create_api_router, run_api_server};
pub use callback::{
    create_callback_handler, decode_validity, encode_validity, CallbackError, CallbackHandler,
    FulfillmentOutcome,
};
pub use config::ServiceConfig;
pub use correlation::{CorrelationError, CorrelationTable, RequestState};
pub use oracle::{
    create_oracle_client, derive_endpoint_id, OracleClient, OracleError, RequestParameters,
};
pub use sqlite_storage::SqliteUserStorage;
pub use storage::{
    create_storage, InMemoryUserStorage, StorageConfig, StorageError, StorageType, UserStorage,
};
pub use user::{IdentityDocument, NewUser, UserRecord};

use std::sync::Arc;

use axum::Router;

/// The fully wired validation service: storage, correlation table, oracle
/// client, and callback handler sharing one set of handles.
pub struct ValidationService {
    pub storage: Arc<dyn UserStorage>,
    pub table: Arc<CorrelationTable>,
    pub oracle: Arc<OracleClient>,
    pub callback: Arc<CallbackHandler>,
}

impl ValidationService {
    /// Build the HTTP router over this service's components
    pub fn router(&self) -> Router {
        create_api_router(
            self.storage.clone(),
            self.oracle.clone(),
            self.callback.clone(),
        )
    }
}

/// Create a validation service from a configuration. The storage handle is
/// constructed once here and injected into every component.
pub async fn create_validation_service(
    config: &ServiceConfig,
) -> Result<ValidationService, StorageError> {
    let storage = create_storage(&config.storage).await?;
    let table = Arc::new(CorrelationTable::new());
    let oracle = create_oracle_client(table.clone());
    let callback = create_callback_handler(storage.clone(), table.clone());

    if let Some(parameters) = &config.oracle {
        oracle.set_request_parameters(parameters.clone()).await;
    }

    Ok(ValidationService {
        storage,
        table,
        oracle,
        callback,
    })
}

/// Install the global tracing subscriber, honoring `RUST_LOG`
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_service_wiring_from_config() {
        let config = ServiceConfig {
            storage: StorageConfig {
                storage_type: StorageType::Memory,
                db_path: None,
            },
            oracle: Some(RequestParameters::default()),
            ..Default::default()
        };

        let service = create_validation_service(&config).await.unwrap();
        assert!(service.oracle.request_parameters().await.is_some());
        assert!(service.table.is_empty());

        // The router builds without panicking.
        let _router = service.router();
    }
}
