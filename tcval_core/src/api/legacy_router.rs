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

//! The simplified routes kept for existing consumers: create by username
//! only, status by path id, administrative approval.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::user_router::{require_field, ApiError};
use crate::storage::UserStorage;
use crate::user::NewUser;

// Router state
pub struct LegacyRouterState {
    storage: Arc<dyn UserStorage>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    username: Option<String>,
}

// Create the legacy router
pub fn create_legacy_router(storage: Arc<dyn UserStorage>) -> Router {
    let state = LegacyRouterState { storage };

    Router::new()
        .route("/create", post(create_user))
        .route("/status/:id", get(get_status))
        .route("/approve/:id", post(approve_user))
        .with_state(Arc::new(state))
}

// Handler to create a user from a bare username
async fn create_user(
    State(state): State<Arc<LegacyRouterState>>,
    Json(body): Json<CreateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = require_field(body.username, "user id")?;

    let user = state
        .storage
        .create_user(NewUser {
            username: Some(username),
            legal_name: None,
            date_of_birth: None,
        })
        .await?;

    Ok(Json(serde_json::json!({ "id": user.id })))
}

// Handler to get the validation status of a user
async fn get_status(
    State(state): State<Arc<LegacyRouterState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state.storage.get_user(user_id).await?;

    Ok(Json(serde_json::json!({ "status": user.valid })))
}

// Handler to approve a user unconditionally. Idempotent: approving an
// already-valid user succeeds silently.
async fn approve_user(
    State(state): State<Arc<LegacyRouterState>>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.storage.set_valid(user_id, true).await?;

    Ok(StatusCode::OK)
}
