//! Saving call results into a table store.

use serde_json::{Map, Value};
use tracing::{info, warn};
use vkfan_store::{ColumnType, Row, TableFactory, TableHandle, TableSchema};

use crate::{ClientError, ResultTree};

/// Schema of a results table: the item id and the item itself.
pub fn results_schema(name: &str) -> TableSchema {
    TableSchema::new(name)
        .primary_key("id", ColumnType::Integer)
        .required("data", ColumnType::Json)
}

/// Integer id of an item: the item itself when it is a number, else its `id` field.
fn item_id(item: &Value) -> Option<i64> {
    item.as_i64()
        .or_else(|| item.get("id").and_then(Value::as_i64))
}

/// Store `items` in table `name`, keyed by id. Items without an id are skipped.
/// Returns how many rows were written.
pub fn save_items<F>(tables: &F, name: &str, items: &[Value]) -> Result<usize, ClientError>
where
    F: TableFactory<Handle = TableHandle>,
{
    let table = tables.create_table(&results_schema(name))?;
    let mut rows: Vec<Row> = Vec::with_capacity(items.len());
    for item in items {
        let Some(id) = item_id(item) else {
            warn!(table = name, "skipping item without an id");
            continue;
        };
        let mut row = Map::new();
        row.insert("id".to_string(), Value::from(id));
        row.insert("data".to_string(), item.clone());
        rows.push(row);
    }
    let written = table.insert_all(&rows)?;
    info!(table = name, rows = written, "saved results");
    Ok(written)
}

/// Store every non-empty list of `tree` in a table named `{prefix}_{entity}_{submethod}`.
pub fn save_tree<F>(tables: &F, prefix: &str, tree: &ResultTree) -> Result<usize, ClientError>
where
    F: TableFactory<Handle = TableHandle>,
{
    let mut written = 0;
    for (entity, submethod, items) in tree.lists() {
        if !items.is_empty() {
            written += save_items(tables, &format!("{prefix}_{entity}_{submethod}"), items)?;
        }
    }
    Ok(written)
}
