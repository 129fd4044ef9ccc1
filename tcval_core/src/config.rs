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

use serde::{Deserialize, Serialize};

use crate::oracle::RequestParameters;
use crate::storage::StorageConfig;

/// Configuration for the validation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// TCP port the API listens on
    pub port: u16,
    /// Storage backend settings
    pub storage: StorageConfig,
    /// Oracle request parameters applied at startup, if any
    pub oracle: Option<RequestParameters>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            storage: StorageConfig::default(),
            oracle: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment on top of the defaults.
    ///
    /// Variables use the `TCVAL_` prefix with `__` as the nesting
    /// separator, e.g. `TCVAL_PORT=8080`,
    /// `TCVAL_STORAGE__STORAGE_TYPE=memory`,
    /// `TCVAL_STORAGE__DB_PATH=/var/lib/tcval/users.db`. A `.env` file in
    /// the working directory is honored when present.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::Environment::with_prefix("TCVAL").separator("__"))
            .build()?
            .try_deserialize()
    }
}
