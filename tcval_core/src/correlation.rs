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

//! Correlation table for outstanding oracle requests.
//!
//! Each outbound verification request gets a `Pending` entry keyed by its
//! request id. A fulfillment claims the entry exactly once; `Fulfilled` is
//! terminal. Entries are never evicted: the oracle network owns timeout
//! policy, and an entry that is never fulfilled simply stays pending.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ethereum_types::{Address, H256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to request correlation
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("request {0:?} already recorded")]
    DuplicateRequest(H256),

    #[error("request {0:?} is unknown or already fulfilled")]
    DuplicateOrUnknownRequest(H256),
}

/// Lifecycle of a recorded request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Awaiting fulfillment from the oracle network
    Pending,
    /// Fulfillment accepted; terminal
    Fulfilled,
}

/// A single outstanding (or completed) request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEntry {
    /// On-chain address the request was raised for, immutable
    pub requester: Address,
    /// User record the requester resolves to, recorded at request time
    pub user_id: i64,
    pub state: RequestState,
}

/// Concurrent map from request id to its originating context.
pub struct CorrelationTable {
    entries: DashMap<H256, CorrelationEntry>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record a new pending request. Request ids are unique; recording the
    /// same id twice is an error.
    pub fn record_request(
        &self,
        request_id: H256,
        requester: Address,
        user_id: i64,
    ) -> Result<(), CorrelationError> {
        match self.entries.entry(request_id) {
            Entry::Occupied(_) => Err(CorrelationError::DuplicateRequest(request_id)),
            Entry::Vacant(slot) => {
                slot.insert(CorrelationEntry {
                    requester,
                    user_id,
                    state: RequestState::Pending,
                });
                Ok(())
            }
        }
    }

    /// Atomically transition a pending entry to `Fulfilled` and return its
    /// originating context. At most one caller ever succeeds per id; any
    /// later (or unknown) claim is rejected.
    pub fn claim(&self, request_id: H256) -> Result<(Address, i64), CorrelationError> {
        let mut entry = self
            .entries
            .get_mut(&request_id)
            .ok_or(CorrelationError::DuplicateOrUnknownRequest(request_id))?;

        if entry.state != RequestState::Pending {
            return Err(CorrelationError::DuplicateOrUnknownRequest(request_id));
        }
        entry.state = RequestState::Fulfilled;
        Ok((entry.requester, entry.user_id))
    }

    /// Return a claimed entry to `Pending`. Used when the write that
    /// follows a successful claim fails, so the oracle may re-deliver.
    pub fn release(&self, request_id: H256) {
        if let Some(mut entry) = self.entries.get_mut(&request_id) {
            entry.state = RequestState::Pending;
        }
    }

    /// Whether the id has a pending entry awaiting fulfillment
    pub fn is_awaiting(&self, request_id: H256) -> bool {
        self.state(request_id) == Some(RequestState::Pending)
    }

    pub fn state(&self, request_id: H256) -> Option<RequestState> {
        self.entries.get(&request_id).map(|entry| entry.state)
    }

    /// Requester and user recorded for an id, regardless of state
    pub fn context(&self, request_id: H256) -> Option<(Address, i64)> {
        self.entries
            .get(&request_id)
            .map(|entry| (entry.requester, entry.user_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_id(byte: u8) -> H256 {
        H256::repeat_byte(byte)
    }

    #[test]
    fn test_record_and_claim() {
        let table = CorrelationTable::new();
        let requester = Address::repeat_byte(0xaa);

        table.record_request(request_id(1), requester, 7).unwrap();
        assert!(table.is_awaiting(request_id(1)));

        let (claimed_requester, user_id) = table.claim(request_id(1)).unwrap();
        assert_eq!(claimed_requester, requester);
        assert_eq!(user_id, 7);
        assert_eq!(table.state(request_id(1)), Some(RequestState::Fulfilled));
    }

    #[test]
    fn test_duplicate_record_is_rejected() {
        let table = CorrelationTable::new();
        let requester = Address::repeat_byte(0xaa);

        table.record_request(request_id(1), requester, 1).unwrap();
        let err = table
            .record_request(request_id(1), requester, 2)
            .unwrap_err();
        assert!(matches!(err, CorrelationError::DuplicateRequest(_)));
    }

    #[test]
    fn test_second_claim_is_rejected() {
        let table = CorrelationTable::new();
        table
            .record_request(request_id(1), Address::repeat_byte(0xaa), 1)
            .unwrap();

        table.claim(request_id(1)).unwrap();
        let err = table.claim(request_id(1)).unwrap_err();
        assert!(matches!(err, CorrelationError::DuplicateOrUnknownRequest(_)));
    }

    #[test]
    fn test_unknown_claim_is_rejected() {
        let table = CorrelationTable::new();
        let err = table.claim(request_id(9)).unwrap_err();
        assert!(matches!(err, CorrelationError::DuplicateOrUnknownRequest(_)));
    }

    #[test]
    fn test_release_makes_entry_claimable_again() {
        let table = CorrelationTable::new();
        table
            .record_request(request_id(1), Address::repeat_byte(0xaa), 1)
            .unwrap();

        table.claim(request_id(1)).unwrap();
        table.release(request_id(1));
        assert!(table.is_awaiting(request_id(1)));
        table.claim(request_id(1)).unwrap();
    }
}
