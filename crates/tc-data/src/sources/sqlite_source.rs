//! SQLite data source implementation

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{types::ValueRef, Connection};
use tc_core::{ColumnMapping, RecordStore};

use super::TreeSource;
use crate::config::NullConfig;
use crate::schema::ColumnsConfig;
use crate::DataError;

/// Reads tree records from one table of a SQLite database
pub struct SqliteSource {
    path: PathBuf,
    table_name: String,
    columns: ColumnsConfig,
    null_config: NullConfig,
}

impl SqliteSource {
    pub fn new(path: PathBuf, table_name: String, columns: ColumnsConfig, null_config: NullConfig) -> Self {
        Self { path, table_name, columns, null_config }
    }

    fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Render a cell the way the CSV export would spell it
    fn value_to_string(value: ValueRef<'_>) -> String {
        match value {
            ValueRef::Null => String::new(),
            ValueRef::Integer(i) => i.to_string(),
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    fn read_table(
        path: &Path,
        table_name: &str,
        columns: &ColumnsConfig,
        null_config: &NullConfig,
    ) -> Result<RecordStore, DataError> {
        let conn = Connection::open(path)?;

        let names = columns.names();
        let select = names
            .iter()
            .map(|c| Self::quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT {} FROM {}", select, Self::quote_identifier(table_name));

        let mut stmt = conn.prepare(&query)?;
        let mut rows = stmt.query([])?;

        let mut raw_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(names.len());
            for idx in 0..names.len() {
                values.push(Self::value_to_string(row.get_ref(idx)?));
            }
            raw_rows.push(values);
        }

        let headers: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let mapping = ColumnMapping::from(columns);
        Ok(RecordStore::load_with(&headers, raw_rows, &mapping, |v| null_config.is_null(v))?)
    }
}

#[async_trait]
impl TreeSource for SqliteSource {
    async fn load(&self) -> Result<RecordStore, DataError> {
        let path = self.path.clone();
        let table_name = self.table_name.clone();
        let columns = self.columns.clone();
        let null_config = self.null_config.clone();

        tracing::info!("Loading tree census table '{}' from {:?}", table_name, path);
        tokio::task::spawn_blocking(move || {
            Self::read_table(&path, &table_name, &columns, &null_config)
        })
        .await?
    }

    fn source_name(&self) -> &str {
        &self.table_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE census (
                OBJECTID INTEGER, Year INTEGER, latitude REAL, longitude REAL,
                spc_common TEXT, boroname TEXT, status TEXT, health TEXT
            );
            INSERT INTO census VALUES (1, 2015, 40.61, -74.08, 'callery pear', 'Staten Island', 'Alive', 'Good');
            INSERT INTO census VALUES (2, 2015, 40.85, -73.88, 'pin oak', 'Bronx', 'Dead', NULL);",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_load_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trees.db");
        create_db(&path);

        let source = SqliteSource::new(
            path,
            "census".to_string(),
            ColumnsConfig::default(),
            NullConfig::default(),
        );
        let store = source.load().await.unwrap();

        assert_eq!(store.len(), 2);
        let first = store.get(0).unwrap();
        assert_eq!(&*first.borough, "Staten Island");
        assert_eq!(first.latitude, 40.61);
        assert_eq!(&*store.get(1).unwrap().health, "");
    }

    #[tokio::test]
    async fn test_missing_table_is_sqlite_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trees.db");
        create_db(&path);

        let source = SqliteSource::new(
            path,
            "trees".to_string(),
            ColumnsConfig::default(),
            NullConfig::default(),
        );
        assert!(matches!(source.load().await, Err(DataError::Sqlite(_))));
    }

    #[test]
    fn test_identifiers_are_quoted() {
        assert_eq!(SqliteSource::quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
