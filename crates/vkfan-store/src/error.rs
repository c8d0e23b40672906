use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid schema for {table}: {reason}")]
    InvalidSchema { table: String, reason: String },
    #[error("table {0} already exists with a different schema")]
    SchemaConflict(String),
    #[error("unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },
    #[error("missing value for column {column} in table {table}")]
    MissingColumn { table: String, column: String },
    #[error("column {column} in table {table} expects {expected}")]
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
    },
    #[error("cannot open database at {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
