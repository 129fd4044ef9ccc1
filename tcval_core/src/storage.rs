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

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::sqlite_storage::SqliteUserStorage;
use crate::user::{IdentityDocument, NewUser, UserRecord};

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("User not found: {0}")]
    NotFound(i64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration for the storage module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend (SQLite or Memory)
    pub storage_type: StorageType,
    /// Database file path (for SQLite storage)
    pub db_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Sqlite,
            db_path: Some("./tcval_users.db".to_string()),
        }
    }
}

/// Type of storage backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// In-memory storage (non-persistent)
    Memory,
    /// SQLite database storage
    Sqlite,
}

/// Trait for storing and retrieving user records.
///
/// Mutations targeting one record serialize inside a single call so a
/// racing approve and callback cannot interleave a read-modify-write.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Persist a new user record with `valid = false` and assign its id
    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StorageError>;

    /// Fetch a user by id
    async fn get_user(&self, user_id: i64) -> Result<UserRecord, StorageError>;

    /// Attach identity document fields and mark the user valid
    async fn submit_identity(
        &self,
        user_id: i64,
        document: IdentityDocument,
    ) -> Result<UserRecord, StorageError>;

    /// Set the validity flag for a user in one atomic write
    async fn set_valid(&self, user_id: i64, valid: bool) -> Result<UserRecord, StorageError>;
}

/// In-memory implementation of user storage
pub struct InMemoryUserStorage {
    /// Stored records keyed by id
    users: Arc<RwLock<HashMap<i64, UserRecord>>>,
    /// Next id to assign
    next_id: AtomicI64,
}

impl InMemoryUserStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryUserStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StorageError> {
        let username = new_user
            .username
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut users = self.users.write().await;
        if users.values().any(|user| user.username == username) {
            return Err(StorageError::DatabaseError(format!(
                "username {} already exists",
                username
            )));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            username,
            legal_name: new_user.legal_name,
            date_of_birth: new_user.date_of_birth,
            identity_document: None,
            identity_document_country: None,
            issue_date: None,
            issue_place: None,
            expiry_date: None,
            valid: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn get_user(&self, user_id: i64) -> Result<UserRecord, StorageError> {
        let users = self.users.read().await;
        users
            .get(&user_id)
            .cloned()
            .ok_or(StorageError::NotFound(user_id))
    }

    async fn submit_identity(
        &self,
        user_id: i64,
        document: IdentityDocument,
    ) -> Result<UserRecord, StorageError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(&user_id)
            .ok_or(StorageError::NotFound(user_id))?;

        record.identity_document = Some(document.document);
        record.identity_document_country = Some(document.country);
        record.issue_date = Some(document.issue_date);
        record.issue_place = Some(document.issue_place);
        record.expiry_date = Some(document.expiry_date);
        record.valid = true;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn set_valid(&self, user_id: i64, valid: bool) -> Result<UserRecord, StorageError> {
        let mut users = self.users.write().await;
        let record = users
            .get_mut(&user_id)
            .ok_or(StorageError::NotFound(user_id))?;

        record.valid = valid;
        record.updated_at = Utc::now();

        Ok(record.clone())
    }
}

/// Create a new user storage with the given configuration
pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn UserStorage>, StorageError> {
    match config.storage_type {
        StorageType::Memory => {
            info!("Using in-memory user storage");
            Ok(Arc::new(InMemoryUserStorage::new()))
        }
        StorageType::Sqlite => {
            let path = config.db_path.as_deref().unwrap_or("./tcval_users.db");
            info!(path, "Using SQLite user storage");
            let storage = SqliteUserStorage::connect(path).await?;
            Ok(Arc::new(storage))
        }
    }
}
