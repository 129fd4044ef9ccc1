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

//! Oracle-facing routes: raising verification requests and consuming
//! fulfillment callbacks.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ethereum_types::{Address, H256};
use serde::Deserialize;
use tracing::{error, warn};

use crate::callback::{CallbackError, CallbackHandler, FulfillmentOutcome};
use crate::oracle::{OracleClient, OracleError, RequestParameters};

// Router state
pub struct OracleRouterState {
    oracle: Arc<OracleClient>,
    callback: Arc<CallbackHandler>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    user_id: Option<i64>,
    requester: Option<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    request_id: Option<H256>,
    /// Hex-encoded fulfillment payload, with or without a 0x prefix
    data: Option<String>,
}

// Error handling
enum ApiError {
    BadRequest(String),
    ParametersNotSet,
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::ParametersNotSet => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Oracle request parameters not configured".to_string(),
            ),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<OracleError> for ApiError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::ParametersNotSet => ApiError::ParametersNotSet,
            OracleError::Correlation(inner) => ApiError::BadRequest(inner.to_string()),
        }
    }
}

impl From<CallbackError> for ApiError {
    fn from(err: CallbackError) -> Self {
        match err {
            CallbackError::Storage(inner) => {
                error!(error = %inner, "Storage failure during fulfillment");
                ApiError::InternalError(inner.to_string())
            }
            rejected => {
                // Callback-path rejections are logged, never fatal.
                warn!(error = %rejected, "Fulfillment rejected");
                ApiError::BadRequest(rejected.to_string())
            }
        }
    }
}

// Create the oracle router
pub fn create_oracle_router(
    oracle: Arc<OracleClient>,
    callback: Arc<CallbackHandler>,
) -> Router {
    let state = OracleRouterState { oracle, callback };

    Router::new()
        .route(
            "/oracle/parameters",
            get(get_parameters).post(set_parameters),
        )
        .route("/oracle/request", post(request_verification))
        .route("/oracle/fulfill", post(fulfill))
        .with_state(Arc::new(state))
}

// Handler to inspect the configured request parameters
async fn get_parameters(
    State(state): State<Arc<OracleRouterState>>,
) -> Result<Json<RequestParameters>, ApiError> {
    state
        .oracle
        .request_parameters()
        .await
        .map(Json)
        .ok_or(ApiError::ParametersNotSet)
}

// Handler to set the request parameters
async fn set_parameters(
    State(state): State<Arc<OracleRouterState>>,
    Json(parameters): Json<RequestParameters>,
) -> StatusCode {
    state.oracle.set_request_parameters(parameters).await;
    StatusCode::OK
}

// Handler to raise a verification request. Returns as soon as the pending
// entry is recorded; fulfillment arrives asynchronously.
async fn request_verification(
    State(state): State<Arc<OracleRouterState>>,
    Json(body): Json<VerificationRequest>,
) -> Result<Response, ApiError> {
    let user_id = body
        .user_id
        .ok_or_else(|| ApiError::BadRequest("Missing user id".to_string()))?;
    let requester = body
        .requester
        .ok_or_else(|| ApiError::BadRequest("Missing requester address".to_string()))?;

    let request_id = state.oracle.request_verification(user_id, requester).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "requestId": request_id })),
    )
        .into_response())
}

// Handler to consume one fulfillment notification
async fn fulfill(
    State(state): State<Arc<OracleRouterState>>,
    Json(body): Json<FulfillmentRequest>,
) -> Result<Json<FulfillmentOutcome>, ApiError> {
    let request_id = body
        .request_id
        .ok_or_else(|| ApiError::BadRequest("Missing request id".to_string()))?;
    let data = body
        .data
        .ok_or_else(|| ApiError::BadRequest("Missing fulfillment data".to_string()))?;

    let payload = hex::decode(data.trim_start_matches("0x"))
        .map_err(|err| ApiError::BadRequest(format!("Invalid hex payload: {}", err)))?;

    let outcome = state.callback.handle_fulfillment(request_id, &payload).await?;

    Ok(Json(outcome))
}
