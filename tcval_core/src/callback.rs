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

//! Fulfillment side of the oracle workflow.
//!
//! A fulfillment is accepted or rejected atomically: the payload decodes
//! before any state is touched, the correlation entry is claimed exactly
//! once, and a failed storage write releases the claim so nothing is
//! half-applied.

use std::sync::Arc;

use ethereum_types::{Address, H256};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::correlation::CorrelationTable;
use crate::storage::{StorageError, UserStorage};

/// Length of an ABI-encoded word
pub const WORD_LEN: usize = 32;

/// Errors related to fulfillment handling
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("request {0:?} is unknown or already fulfilled")]
    DuplicateOrUnknownRequest(H256),

    #[error("malformed fulfillment payload: {0}")]
    MalformedPayload(String),

    #[error("storage failure during fulfillment: {0}")]
    Storage(#[from] StorageError),
}

/// Result of an accepted fulfillment
#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentOutcome {
    pub request_id: H256,
    pub requester: Address,
    pub user_id: i64,
    pub valid: bool,
}

/// Applies asynchronous oracle verdicts to persisted user records.
pub struct CallbackHandler {
    storage: Arc<dyn UserStorage>,
    table: Arc<CorrelationTable>,
}

impl CallbackHandler {
    pub fn new(storage: Arc<dyn UserStorage>, table: Arc<CorrelationTable>) -> Self {
        Self { storage, table }
    }

    /// Consume one fulfillment notification. Accepted at most once per
    /// request id; rejected fulfillments have no side effect.
    pub async fn handle_fulfillment(
        &self,
        request_id: H256,
        payload: &[u8],
    ) -> Result<FulfillmentOutcome, CallbackError> {
        // Decode before touching any state.
        let valid = decode_validity(payload)?;

        let (requester, user_id) = self
            .table
            .claim(request_id)
            .map_err(|_| CallbackError::DuplicateOrUnknownRequest(request_id))?;

        match self.storage.set_valid(user_id, valid).await {
            Ok(record) => {
                info!(
                    request_id = ?request_id,
                    requester = ?requester,
                    user_id,
                    valid = record.valid,
                    "User status updated"
                );
                Ok(FulfillmentOutcome {
                    request_id,
                    requester,
                    user_id,
                    valid: record.valid,
                })
            }
            Err(err) => {
                // Put the entry back so the oracle may re-deliver.
                self.table.release(request_id);
                warn!(
                    request_id = ?request_id,
                    user_id,
                    error = %err,
                    "Fulfillment aborted, request released"
                );
                Err(CallbackError::Storage(err))
            }
        }
    }
}

/// Create a callback handler over the given storage and correlation table
pub fn create_callback_handler(
    storage: Arc<dyn UserStorage>,
    table: Arc<CorrelationTable>,
) -> Arc<CallbackHandler> {
    Arc::new(CallbackHandler::new(storage, table))
}

/// Decode an ABI-encoded boolean word: 32 bytes, 31 zero bytes of padding,
/// final byte 0 or 1.
pub fn decode_validity(payload: &[u8]) -> Result<bool, CallbackError> {
    if payload.len() != WORD_LEN {
        return Err(CallbackError::MalformedPayload(format!(
            "expected a {}-byte word, got {} bytes",
            WORD_LEN,
            payload.len()
        )));
    }
    if payload[..WORD_LEN - 1].iter().any(|byte| *byte != 0) {
        return Err(CallbackError::MalformedPayload(
            "non-zero padding in boolean word".to_string(),
        ));
    }
    match payload[WORD_LEN - 1] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CallbackError::MalformedPayload(format!(
            "invalid boolean byte: {:#04x}",
            other
        ))),
    }
}

/// Encode a validity result the way the oracle network delivers it
pub fn encode_validity(valid: bool) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 1] = valid as u8;
    word
}
