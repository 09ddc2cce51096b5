use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use async_trait::async_trait;
use csv::ReaderBuilder;
use tc_core::{ColumnMapping, RecordStore};

use super::TreeSource;
use crate::config::NullConfig;
use crate::schema::ColumnsConfig;
use crate::DataError;

/// CSV data source for the tree census export
pub struct CsvSource {
    /// Path to the CSV file
    path: PathBuf,
    columns: ColumnsConfig,
    null_config: NullConfig,
}

impl CsvSource {
    pub fn new(path: PathBuf, columns: ColumnsConfig, null_config: NullConfig) -> Self {
        Self { path, columns, null_config }
    }

    /// Parse a whole CSV document. Rows are streamed into the store, so
    /// the unused census columns are never kept around.
    pub fn parse_reader<R: Read>(
        reader: R,
        columns: &ColumnsConfig,
        null_config: &NullConfig,
    ) -> Result<RecordStore, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            // Short rows are reported per field by the record store
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.to_string()).collect();

        let missing = columns.missing_from(&headers);
        if !missing.is_empty() {
            tracing::warn!("CSV is missing required columns: {}", missing.join(", "));
        }

        let mut csv_error = None;
        let rows = csv_reader.records().map_while(|result| match result {
            Ok(record) => Some(record.iter().map(|v| v.to_string()).collect::<Vec<_>>()),
            Err(e) => {
                csv_error = Some(e);
                None
            }
        });

        let mapping = ColumnMapping::from(columns);
        let store = RecordStore::load_with(&headers, rows, &mapping, |v| null_config.is_null(v));

        if let Some(e) = csv_error {
            return Err(e.into());
        }
        Ok(store?)
    }
}

#[async_trait]
impl TreeSource for CsvSource {
    async fn load(&self) -> Result<RecordStore, DataError> {
        let path = self.path.clone();
        let columns = self.columns.clone();
        let null_config = self.null_config.clone();

        tracing::info!("Loading tree census CSV: {:?}", path);
        tokio::task::spawn_blocking(move || {
            let file = File::open(&path)?;
            Self::parse_reader(BufReader::new(file), &columns, &null_config)
        })
        .await?
    }

    fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
    }
}
