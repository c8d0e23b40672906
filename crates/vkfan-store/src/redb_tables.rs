use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::debug;

use crate::{DbSettings, Row, StoreError, TableFactory, TableSchema};

const CATALOG: TableDefinition<&str, &str> = TableDefinition::new("__schemas");

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(e.to_string())
}

fn rows_table(name: &str) -> String {
    format!("rows:{name}")
}

/// Tables kept in a single redb file, with their schemas in a catalog table.
#[derive(Clone)]
pub struct RedbTables {
    db: Arc<Database>,
}

impl RedbTables {
    pub fn open(settings: &DbSettings) -> Result<Self, StoreError> {
        if let Some(parent) = settings.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                path: settings.path.clone(),
                reason: e.to_string(),
            })?;
        }

        let mut builder = redb::Builder::new();
        if let Some(bytes) = settings.cache_size {
            builder.set_cache_size(bytes);
        }
        let db = builder.create(&settings.path).map_err(|e| StoreError::Open {
            path: settings.path.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %settings.path.display(), "opened result store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Schema previously registered under `name`.
    pub fn schema(&self, name: &str) -> Result<Option<TableSchema>, StoreError> {
        let txn = self.db.begin_read().map_err(db_err)?;
        let catalog = match txn.open_table(CATALOG) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(db_err(e)),
        };
        match catalog.get(name).map_err(db_err)? {
            Some(raw) => Ok(Some(serde_json::from_str(raw.value())?)),
            None => Ok(None),
        }
    }

    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let txn = self.db.begin_read().map_err(db_err)?;
        let catalog = match txn.open_table(CATALOG) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(db_err(e)),
        };
        let mut names = Vec::new();
        for entry in catalog.iter().map_err(db_err)? {
            let (name, _) = entry.map_err(db_err)?;
            names.push(name.value().to_string());
        }
        Ok(names)
    }
}

impl TableFactory for RedbTables {
    type Handle = TableHandle;

    /// Register `schema` and create its table. Re-creating with the same
    /// schema returns a handle to the existing table.
    fn create_table(&self, schema: &TableSchema) -> Result<TableHandle, StoreError> {
        schema.validate()?;
        let encoded = serde_json::to_string(schema)?;

        let txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut catalog = txn.open_table(CATALOG).map_err(db_err)?;
            let existing = catalog
                .get(schema.name.as_str())
                .map_err(db_err)?
                .map(|raw| raw.value().to_string());
            match existing {
                Some(raw) => {
                    let stored: TableSchema = serde_json::from_str(&raw)?;
                    if &stored != schema {
                        return Err(StoreError::SchemaConflict(schema.name.clone()));
                    }
                }
                None => {
                    catalog
                        .insert(schema.name.as_str(), encoded.as_str())
                        .map_err(db_err)?;
                }
            }
            let rows_name = rows_table(&schema.name);
            let rows: TableDefinition<&str, &str> = TableDefinition::new(&rows_name);
            txn.open_table(rows).map_err(db_err)?;
        }
        txn.commit().map_err(db_err)?;

        debug!(table = %schema.name, columns = schema.columns.len(), "table ready");
        Ok(TableHandle {
            db: self.db.clone(),
            schema: schema.clone(),
        })
    }
}

/// Access to one table's rows. Rows are validated against the schema on insert.
#[derive(Clone)]
pub struct TableHandle {
    db: Arc<Database>,
    schema: TableSchema,
}

impl TableHandle {
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Store `row` under its primary key, replacing any previous row. Returns the key.
    pub fn insert(&self, row: &Row) -> Result<String, StoreError> {
        let key = self.schema.check_row(row)?;
        let encoded = serde_json::to_string(row)?;
        let name = rows_table(&self.schema.name);

        let txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = txn
                .open_table(TableDefinition::<&str, &str>::new(&name))
                .map_err(db_err)?;
            table.insert(key.as_str(), encoded.as_str()).map_err(db_err)?;
        }
        txn.commit().map_err(db_err)?;
        Ok(key)
    }

    /// Insert every row in one transaction. Nothing is written if any row is invalid.
    pub fn insert_all<'a>(&self, rows: impl IntoIterator<Item = &'a Row>) -> Result<usize, StoreError> {
        let mut encoded = Vec::new();
        for row in rows {
            encoded.push((self.schema.check_row(row)?, serde_json::to_string(row)?));
        }
        let name = rows_table(&self.schema.name);

        let txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = txn
                .open_table(TableDefinition::<&str, &str>::new(&name))
                .map_err(db_err)?;
            for (key, row) in &encoded {
                table.insert(key.as_str(), row.as_str()).map_err(db_err)?;
            }
        }
        txn.commit().map_err(db_err)?;
        Ok(encoded.len())
    }

    pub fn get(&self, key: &str) -> Result<Option<Row>, StoreError> {
        let name = rows_table(&self.schema.name);
        let txn = self.db.begin_read().map_err(db_err)?;
        let table = txn
            .open_table(TableDefinition::<&str, &str>::new(&name))
            .map_err(db_err)?;
        match table.get(key).map_err(db_err)? {
            Some(raw) => Ok(Some(serde_json::from_str(raw.value())?)),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> Result<u64, StoreError> {
        let name = rows_table(&self.schema.name);
        let txn = self.db.begin_read().map_err(db_err)?;
        let table = txn
            .open_table(TableDefinition::<&str, &str>::new(&name))
            .map_err(db_err)?;
        table.len().map_err(db_err)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
