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

//! SQLite-backed user storage.
//!
//! Every mutation is a single `UPDATE ... WHERE id = ?` statement, so
//! concurrent writers targeting the same record serialize inside the
//! database rather than racing across two round trips.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;
use uuid::Uuid;

use crate::storage::{StorageError, UserStorage};
use crate::user::{IdentityDocument, NewUser, UserRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id                        INTEGER PRIMARY KEY AUTOINCREMENT,
    username                  TEXT    NOT NULL UNIQUE,
    legal_name                TEXT,
    date_of_birth             TEXT,
    identity_document         TEXT,
    identity_document_country TEXT,
    issue_date                TEXT,
    issue_place               TEXT,
    expiry_date               TEXT,
    valid                     BOOLEAN NOT NULL DEFAULT 0,
    created_at                TEXT    NOT NULL,
    updated_at                TEXT    NOT NULL
)
"#;

const SELECT_USER: &str = "SELECT * FROM users WHERE id = ?";

/// Durable user storage over a SQLite database file.
pub struct SqliteUserStorage {
    pool: SqlitePool,
}

impl SqliteUserStorage {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub async fn connect(path: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let storage = Self { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        debug!("User schema ready");
        Ok(())
    }

    async fn fetch_user(&self, user_id: i64) -> Result<UserRecord, StorageError> {
        sqlx::query_as::<_, UserRecord>(SELECT_USER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or(StorageError::NotFound(user_id))
    }
}

fn db_error(err: sqlx::Error) -> StorageError {
    StorageError::DatabaseError(err.to_string())
}

#[async_trait]
impl UserStorage for SqliteUserStorage {
    async fn create_user(&self, new_user: NewUser) -> Result<UserRecord, StorageError> {
        let username = new_user
            .username
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (username, legal_name, date_of_birth, valid, created_at, updated_at) \
             VALUES (?, ?, ?, 0, ?, ?)",
        )
        .bind(&username)
        .bind(&new_user.legal_name)
        .bind(new_user.date_of_birth)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        self.fetch_user(result.last_insert_rowid()).await
    }

    async fn get_user(&self, user_id: i64) -> Result<UserRecord, StorageError> {
        self.fetch_user(user_id).await
    }

    async fn submit_identity(
        &self,
        user_id: i64,
        document: IdentityDocument,
    ) -> Result<UserRecord, StorageError> {
        let result = sqlx::query(
            "UPDATE users SET identity_document = ?, identity_document_country = ?, \
             issue_date = ?, issue_place = ?, expiry_date = ?, valid = 1, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&document.document)
        .bind(&document.country)
        .bind(document.issue_date)
        .bind(&document.issue_place)
        .bind(document.expiry_date)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(user_id));
        }
        self.fetch_user(user_id).await
    }

    async fn set_valid(&self, user_id: i64, valid: bool) -> Result<UserRecord, StorageError> {
        let result = sqlx::query("UPDATE users SET valid = ?, updated_at = ? WHERE id = ?")
            .bind(valid)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(user_id));
        }
        self.fetch_user(user_id).await
    }
}
