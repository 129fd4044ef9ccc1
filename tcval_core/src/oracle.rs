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

//! Outbound side of the oracle workflow: request parameters, request-id
//! derivation, and recording of pending verification requests.
//!
//! Requesting never waits on the oracle network: the request id is
//! derived, the correlation entry is recorded, and the call returns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ethereum_types::{Address, H256};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::correlation::{CorrelationError, CorrelationTable};

/// Errors related to raising verification requests
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("request parameters have not been set")]
    ParametersNotSet,

    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

/// Parameters every outbound request carries, set once at startup or
/// through the administrative endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    /// Address of the oracle node wallet
    pub airnode: Address,
    /// Endpoint the request targets
    pub endpoint_id: H256,
    /// Sponsor account funding the fulfillment
    pub sponsor: Address,
    /// Sponsor wallet the oracle fulfills from
    pub sponsor_wallet: Address,
}

/// Raises verification requests and records them in the correlation table.
pub struct OracleClient {
    parameters: RwLock<Option<RequestParameters>>,
    table: Arc<CorrelationTable>,
    nonce: AtomicU64,
}

impl OracleClient {
    pub fn new(table: Arc<CorrelationTable>) -> Self {
        Self {
            parameters: RwLock::new(None),
            table,
            nonce: AtomicU64::new(0),
        }
    }

    /// Set the parameters applied to every subsequent request
    pub async fn set_request_parameters(&self, parameters: RequestParameters) {
        info!(
            airnode = ?parameters.airnode,
            endpoint_id = ?parameters.endpoint_id,
            "Request parameters set"
        );
        *self.parameters.write().await = Some(parameters);
    }

    pub async fn request_parameters(&self) -> Option<RequestParameters> {
        self.parameters.read().await.clone()
    }

    /// Raise a verification request for a user. Derives a fresh request id,
    /// records the pending entry, and returns immediately; fulfillment
    /// arrives asynchronously, if at all.
    pub async fn request_verification(
        &self,
        user_id: i64,
        requester: Address,
    ) -> Result<H256, OracleError> {
        let parameters = self
            .parameters
            .read()
            .await
            .clone()
            .ok_or(OracleError::ParametersNotSet)?;

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let request_id = derive_request_id(parameters.endpoint_id, requester, nonce);

        self.table.record_request(request_id, requester, user_id)?;
        info!(
            request_id = ?request_id,
            requester = ?requester,
            user_id,
            "Verification request recorded"
        );

        Ok(request_id)
    }
}

/// Create an oracle client backed by the given correlation table
pub fn create_oracle_client(table: Arc<CorrelationTable>) -> Arc<OracleClient> {
    Arc::new(OracleClient::new(table))
}

fn derive_request_id(endpoint_id: H256, requester: Address, nonce: u64) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(endpoint_id.as_bytes());
    hasher.update(requester.as_bytes());
    hasher.update(nonce.to_be_bytes());
    H256::from_slice(&hasher.finalize())
}

/// Derive the id of an oracle endpoint from its API title and name.
pub fn derive_endpoint_id(api_title: &str, endpoint_name: &str) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(api_title.as_bytes());
    hasher.update(b"/");
    hasher.update(endpoint_name.as_bytes());
    H256::from_slice(&hasher.finalize())
}
