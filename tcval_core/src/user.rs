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

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted user identity record.
///
/// `legal_name` and `date_of_birth` are required by the full registration
/// flow; the legacy creation path supplies only a username label, so both
/// stay optional at the storage level.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    /// Store-assigned identifier, immutable once created
    pub id: i64,
    /// Opaque unique label, assigned at creation when not supplied
    pub username: String,
    /// Legal name as registered
    pub legal_name: Option<String>,
    /// Date of birth as registered
    pub date_of_birth: Option<NaiveDate>,
    /// Identity document name, set only by identity submission
    pub identity_document: Option<String>,
    /// Issuing country of the identity document
    pub identity_document_country: Option<String>,
    /// Document issue date
    pub issue_date: Option<NaiveDate>,
    /// Document issue place
    pub issue_place: Option<String>,
    /// Document expiry date
    pub expiry_date: Option<NaiveDate>,
    /// Whether the user passed validation
    pub valid: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a user record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    /// Explicit username label; a UUIDv4 is assigned when absent
    pub username: Option<String>,
    pub legal_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Identity document details supplied by the submission flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityDocument {
    /// Document name, e.g. "Passport"
    pub document: String,
    /// Issuing country
    pub country: String,
    pub issue_date: NaiveDate,
    pub issue_place: String,
    pub expiry_date: NaiveDate,
}
