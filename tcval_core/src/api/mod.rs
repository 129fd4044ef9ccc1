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

//! API routers and handlers for the validation service

pub mod legacy_router;
pub mod oracle_router;
pub mod user_router;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tracing::info;

use crate::callback::CallbackHandler;
use crate::oracle::OracleClient;
use crate::storage::UserStorage;

/// Create a complete API router with all endpoints
pub fn create_api_router(
    storage: Arc<dyn UserStorage>,
    oracle: Arc<OracleClient>,
    callback: Arc<CallbackHandler>,
) -> Router {
    info!("Creating API router with all endpoints");

    Router::new()
        .route("/", get(health))
        .merge(user_router::create_user_router(storage.clone()))
        .merge(legacy_router::create_legacy_router(storage))
        .merge(oracle_router::create_oracle_router(oracle, callback))
}

async fn health() -> &'static str {
    "Healthy!"
}

/// Bind the router and serve until the process is stopped
pub async fn run_api_server(port: u16, router: Router) -> Result<(), hyper::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "API listening");

    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::callback::encode_validity;
    use crate::correlation::CorrelationTable;
    use crate::oracle::RequestParameters;
    use crate::storage::InMemoryUserStorage;

    fn test_router() -> Router {
        let storage: Arc<dyn UserStorage> = Arc::new(InMemoryUserStorage::new());
        let table = Arc::new(CorrelationTable::new());
        let oracle = Arc::new(OracleClient::new(table.clone()));
        let callback = Arc::new(CallbackHandler::new(storage.clone(), table));
        create_api_router(storage, oracle, callback)
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let router = test_router();

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&bytes[..], b"Healthy!");
    }

    #[tokio::test]
    async fn test_register_then_status_starts_invalid() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/user",
                r#"{"legalName":"Alice","dateOfBirth":"1990-01-01"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let user_id = body_json(response).await["userId"].as_i64().unwrap();

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/user/status?id={}", user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "valid": false }));
    }

    #[tokio::test]
    async fn test_register_with_missing_field_is_rejected() {
        let router = test_router();

        let response = router
            .oneshot(json_request(
                Method::POST,
                "/user",
                r#"{"legalName":"Alice"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_of_unknown_user_is_not_found() {
        let router = test_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/user/status?id=99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_identity_submission_validates_user() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/user",
                r#"{"legalName":"Alice","dateOfBirth":"1990-01-01"}"#,
            ))
            .await
            .unwrap();
        let user_id = body_json(response).await["userId"].as_i64().unwrap();

        let body = r#"{
            "identityDocument": "Passport",
            "identityDocumentCountry": "PT",
            "issueDate": "2020-01-01",
            "issuePlace": "Lisbon",
            "expirityDate": "2030-01-01"
        }"#;
        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/identity?id={}", user_id),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/user/status?id={}", user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!({ "valid": true }));
    }

    #[tokio::test]
    async fn test_identity_submission_with_missing_field_is_rejected() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/user",
                r#"{"legalName":"Alice","dateOfBirth":"1990-01-01"}"#,
            ))
            .await
            .unwrap();
        let user_id = body_json(response).await["userId"].as_i64().unwrap();

        let response = router
            .oneshot(json_request(
                Method::POST,
                &format!("/identity?id={}", user_id),
                r#"{"identityDocument": "Passport"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_legacy_create_approve_status_flow() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/create",
                r#"{"username":"alice"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let id = body_json(response).await["id"].as_i64().unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/status/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!({ "status": false }));

        // Approve twice; the second call must succeed as well.
        for _ in 0..2 {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .method(Method::POST)
                        .uri(format!("/approve/{}", id))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/status/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!({ "status": true }));
    }

    #[tokio::test]
    async fn test_legacy_create_without_username_is_rejected() {
        let router = test_router();

        let response = router
            .oneshot(json_request(Method::POST, "/create", r#"{}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oracle_flow_end_to_end() {
        let router = test_router();

        // Request without parameters is unavailable.
        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/oracle/request",
                r#"{"userId":1,"requester":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let parameters = serde_json::to_string(&RequestParameters::default()).unwrap();
        let response = router
            .clone()
            .oneshot(json_request(Method::POST, "/oracle/parameters", &parameters))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/user",
                r#"{"legalName":"Alice","dateOfBirth":"1990-01-01"}"#,
            ))
            .await
            .unwrap();
        let user_id = body_json(response).await["userId"].as_i64().unwrap();

        let request = format!(
            r#"{{"userId":{},"requester":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"}}"#,
            user_id
        );
        let response = router
            .clone()
            .oneshot(json_request(Method::POST, "/oracle/request", &request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let request_id = body_json(response).await["requestId"]
            .as_str()
            .unwrap()
            .to_string();

        let fulfill = format!(
            r#"{{"requestId":"{}","data":"0x{}"}}"#,
            request_id,
            hex::encode(encode_validity(true))
        );
        let response = router
            .clone()
            .oneshot(json_request(Method::POST, "/oracle/fulfill", &fulfill))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["valid"], serde_json::json!(true));

        // The verdict is visible through the status endpoint.
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/user/status?id={}", user_id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!({ "valid": true }));

        // A second delivery for the same request id is rejected.
        let response = router
            .oneshot(json_request(Method::POST, "/oracle/fulfill", &fulfill))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
