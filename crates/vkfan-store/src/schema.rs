use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::StoreError;

/// A row as column name -> value.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Boolean,
    /// Any JSON value, stored as-is.
    Json,
}

impl ColumnType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ColumnType::Integer => value.is_i64() || value.is_u64(),
            ColumnType::Float => value.is_number(),
            ColumnType::Text => value.is_string(),
            ColumnType::Boolean => value.is_boolean(),
            ColumnType::Json => true,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOptions {
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Default for ColumnOptions {
    fn default() -> Self {
        Self {
            primary_key: false,
            nullable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
    #[serde(default)]
    pub options: ColumnOptions,
}

/// Table name plus its columns. Exactly one column is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            ty,
            options: ColumnOptions::default(),
        });
        self
    }

    pub fn required(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            ty,
            options: ColumnOptions {
                primary_key: false,
                nullable: false,
            },
        });
        self
    }

    pub fn primary_key(mut self, name: impl Into<String>, ty: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.into(),
            ty,
            options: ColumnOptions {
                primary_key: true,
                nullable: false,
            },
        });
        self
    }

    pub fn key_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.options.primary_key)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        let invalid = |reason: &str| StoreError::InvalidSchema {
            table: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() || self.name.starts_with("__") {
            return Err(invalid("table name must be non-empty and not start with `__`"));
        }
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(invalid(&format!("duplicate column `{}`", column.name)));
            }
        }
        match self.columns.iter().filter(|c| c.options.primary_key).count() {
            1 => Ok(()),
            0 => Err(invalid("no primary key column")),
            _ => Err(invalid("more than one primary key column")),
        }
    }

    /// Check `row` against the columns and return its key as text.
    pub fn check_row(&self, row: &Row) -> Result<String, StoreError> {
        for name in row.keys() {
            if !self.columns.iter().any(|c| &c.name == name) {
                return Err(StoreError::UnknownColumn {
                    table: self.name.clone(),
                    column: name.clone(),
                });
            }
        }

        let mut key = None;
        for column in &self.columns {
            let value = row.get(&column.name).filter(|v| !v.is_null());
            match value {
                None if !column.options.nullable => {
                    return Err(StoreError::MissingColumn {
                        table: self.name.clone(),
                        column: column.name.clone(),
                    })
                }
                None => {}
                Some(value) if !column.ty.accepts(value) => {
                    return Err(StoreError::TypeMismatch {
                        table: self.name.clone(),
                        column: column.name.clone(),
                        expected: column.ty.to_string(),
                    })
                }
                Some(value) => {
                    if column.options.primary_key {
                        key = Some(match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        });
                    }
                }
            }
        }

        key.ok_or_else(|| StoreError::InvalidSchema {
            table: self.name.clone(),
            reason: "no primary key column".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> TableSchema {
        TableSchema::new("users")
            .primary_key("id", ColumnType::Integer)
            .required("first_name", ColumnType::Text)
            .column("data", ColumnType::Json)
    }

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn schema_needs_one_key() {
        assert!(users().validate().is_ok());
        let keyless = TableSchema::new("t").column("a", ColumnType::Text);
        assert!(matches!(keyless.validate(), Err(StoreError::InvalidSchema { .. })));
        let dup = TableSchema::new("t")
            .primary_key("a", ColumnType::Text)
            .column("a", ColumnType::Text);
        assert!(dup.validate().is_err());
        assert!(TableSchema::new("__catalog")
            .primary_key("a", ColumnType::Text)
            .validate()
            .is_err());
    }

    #[test]
    fn rows_are_checked() {
        let schema = users();
        let key = schema
            .check_row(&row(json!({"id": 1, "first_name": "Pavel", "data": [1]})))
            .unwrap();
        assert_eq!(key, "1");

        let unknown = schema.check_row(&row(json!({"id": 1, "first_name": "a", "age": 3})));
        assert!(matches!(unknown, Err(StoreError::UnknownColumn { .. })));

        let missing = schema.check_row(&row(json!({"id": 1})));
        assert!(matches!(missing, Err(StoreError::MissingColumn { .. })));

        let wrong = schema.check_row(&row(json!({"id": "x", "first_name": "a"})));
        assert!(matches!(wrong, Err(StoreError::TypeMismatch { .. })));
    }

    #[test]
    fn schema_from_toml() {
        let schema: TableSchema = toml::from_str(
            r#"
            name = "groups"
            [[columns]]
            name = "id"
            type = "integer"
            options = { primary_key = true, nullable = false }
            [[columns]]
            name = "name"
            type = "text"
            "#,
        )
        .unwrap();
        assert_eq!(schema.key_column().map(|c| c.name.as_str()), Some("id"));
        assert!(schema.columns[1].options.nullable);
    }
}
