// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// The requested complaint was not found.
    NotFound(String),
    /// The stored row changed since the caller read it.
    StaleWrite {
        /// The complaint whose row moved on.
        complaint_id: String,
    },
    /// A complaint with the same normalized id already exists.
    DuplicateId(String),
    /// The addressed sheet row does not exist.
    RowOutOfRange {
        /// The 1-based row number.
        row_number: usize,
    },
    /// A located row could not be decoded into a complaint.
    CorruptRow {
        /// The 1-based row number.
        row_number: usize,
    },
    /// The directory snapshot could not be loaded.
    DirectoryLoadFailed(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::StaleWrite { complaint_id } => {
                write!(
                    f,
                    "Complaint {complaint_id} was modified by another request"
                )
            }
            Self::DuplicateId(id) => write!(f, "Complaint {id} already exists"),
            Self::RowOutOfRange { row_number } => {
                write!(f, "Row {row_number} does not exist")
            }
            Self::CorruptRow { row_number } => {
                write!(f, "Row {row_number} does not hold a valid complaint")
            }
            Self::DirectoryLoadFailed(msg) => write!(f, "Failed to load directory: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl PersistenceError {
    /// Returns true if the error means the store itself could not be used,
    /// as opposed to a problem with the addressed record.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::DatabaseConnectionFailed(_)
                | Self::MigrationFailed(_)
                | Self::QueryFailed(_)
                | Self::InitializationError(_)
        )
    }
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<time::error::Format> for PersistenceError {
    fn from(err: time::error::Format) -> Self {
        Self::SerializationError(err.to_string())
    }
}
