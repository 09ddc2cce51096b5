pub mod csv_source;
pub mod sqlite_source;

pub use csv_source::CsvSource;
pub use sqlite_source::SqliteSource;

use async_trait::async_trait;
use tc_core::RecordStore;

use crate::config::{DashboardConfig, DatasetConfig};
use crate::DataError;

/// A place tree records can be loaded from, once, at startup
#[async_trait]
pub trait TreeSource: Send + Sync {
    /// Read and parse every record
    async fn load(&self) -> Result<RecordStore, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}

/// Build the source described by the configuration
pub fn open_source(config: &DashboardConfig) -> Box<dyn TreeSource> {
    match &config.dataset {
        DatasetConfig::Csv { path } => Box::new(CsvSource::new(
            path.clone(),
            config.columns.clone(),
            config.null_config.clone(),
        )),
        DatasetConfig::Sqlite { path, table } => Box::new(SqliteSource::new(
            path.clone(),
            table.clone(),
            config.columns.clone(),
            config.null_config.clone(),
        )),
    }
}
