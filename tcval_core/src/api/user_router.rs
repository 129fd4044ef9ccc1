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

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;

use crate::storage::{StorageError, UserStorage};
use crate::user::{IdentityDocument, NewUser};

// Router state
pub struct UserRouterState {
    storage: Arc<dyn UserStorage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    legal_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    id: Option<i64>,
}

// Wire names follow the original identity-submission payload, including
// the historical "expirityDate" spelling.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest {
    identity_document: Option<String>,
    identity_document_country: Option<String>,
    issue_date: Option<NaiveDate>,
    issue_place: Option<String>,
    #[serde(rename = "expirityDate")]
    expiry_date: Option<NaiveDate>,
}

// Error handling
pub(crate) enum ApiError {
    NotFound,
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound,
            other => {
                error!(error = %other, "Storage failure");
                ApiError::InternalError(other.to_string())
            }
        }
    }
}

// Reject absent and blank strings alike
pub(crate) fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::BadRequest(format!("Missing {}", name))),
    }
}

fn require_date(value: Option<NaiveDate>, name: &str) -> Result<NaiveDate, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Missing {}", name)))
}

// Create the user router
pub fn create_user_router(storage: Arc<dyn UserStorage>) -> Router {
    let state = UserRouterState { storage };

    Router::new()
        .route("/user", post(register_user))
        .route("/user/status", get(get_user_status))
        .route("/identity", post(submit_identity))
        .with_state(Arc::new(state))
}

// Handler to register a new user
async fn register_user(
    State(state): State<Arc<UserRouterState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let legal_name = require_field(body.legal_name, "legal name")?;
    let date_of_birth = require_date(body.date_of_birth, "date of birth")?;

    let user = state
        .storage
        .create_user(NewUser {
            username: None,
            legal_name: Some(legal_name),
            date_of_birth: Some(date_of_birth),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "userId": user.id })),
    )
        .into_response())
}

// Handler to get the validation status of a user. Exposes only the flag.
async fn get_user_status(
    State(state): State<Arc<UserRouterState>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Missing user id".to_string()))?;

    let user = state.storage.get_user(user_id).await?;

    Ok(Json(serde_json::json!({ "valid": user.valid })))
}

// Handler to submit identity documents for a user
async fn submit_identity(
    State(state): State<Arc<UserRouterState>>,
    Query(query): Query<UserIdQuery>,
    Json(body): Json<IdentityRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = query
        .id
        .ok_or_else(|| ApiError::BadRequest("Missing user id".to_string()))?;

    let document = IdentityDocument {
        document: require_field(body.identity_document, "identity document")?,
        country: require_field(body.identity_document_country, "document country")?,
        issue_date: require_date(body.issue_date, "issue date")?,
        issue_place: require_field(body.issue_place, "issue place")?,
        expiry_date: require_date(body.expiry_date, "expiry date")?,
    };

    let user = state.storage.submit_identity(user_id, document).await?;

    Ok(Json(serde_json::json!({
        "userId": user.id,
        "valid": user.valid,
    })))
}
