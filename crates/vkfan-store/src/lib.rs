//! Table persistence for call results.
//!
//! Callers describe a table with a [`TableSchema`]; a [`TableFactory`] turns it
//! into a [`TableHandle`] that accepts rows matching the schema.

pub mod error;
pub mod redb_tables;
pub mod schema;
pub mod settings;

pub use error::StoreError;
pub use redb_tables::{RedbTables, TableHandle};
pub use schema::{Column, ColumnOptions, ColumnType, Row, TableSchema};
pub use settings::DbSettings;

/// Creates tables from schema descriptions.
pub trait TableFactory {
    type Handle;

    fn create_table(&self, schema: &TableSchema) -> Result<Self::Handle, StoreError>;
}
