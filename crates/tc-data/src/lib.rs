//! Data loading for the tree census dashboard

pub mod boundary;
pub mod config;
pub mod schema;
pub mod sources;

use tc_core::ParseError;
use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use boundary::{BoundaryLayer, Region};
pub use config::{DashboardConfig, DatasetConfig, MapView, NullConfig};
pub use schema::ColumnsConfig;
pub use sources::{open_source, CsvSource, SqliteSource, TreeSource};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("SQLite error: {0}")]
    Sqlite(String),

    #[error("Invalid dataset: {0}")]
    Parse(#[from] ParseError),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                DataError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<rusqlite::Error> for DataError {
    fn from(error: rusqlite::Error) -> Self {
        DataError::Sqlite(error.to_string())
    }
}

impl From<geojson::Error> for DataError {
    fn from(error: geojson::Error) -> Self {
        DataError::GeoJson(error.to_string())
    }
}
