//! Dashboard configuration

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use super::null_handling::NullConfig;
use crate::schema::ColumnsConfig;
use crate::DataError;

/// Where the tree records come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatasetConfig {
    Csv { path: PathBuf },
    Sqlite { path: PathBuf, table: String },
}

impl Default for DatasetConfig {
    fn default() -> Self {
        DatasetConfig::Csv {
            path: PathBuf::from("data/NYCTreeCensus_2015.csv"),
        }
    }
}

/// Map centre and zoom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        // New York City
        Self {
            latitude: 40.7128,
            longitude: -74.0060,
            zoom: 11.0,
        }
    }
}

/// Everything the dashboard reads at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,

    /// GeoJSON borough polygons
    pub boundaries: PathBuf,

    pub columns: ColumnsConfig,

    pub null_config: NullConfig,

    /// Most markers drawn at once
    pub display_limit: usize,

    /// From this zoom level on, markers are drawn individually
    pub cluster_off_zoom: f64,

    /// Zoom cap when fitting the map to a borough
    pub fit_max_zoom: f64,

    pub initial_view: MapView,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            boundaries: PathBuf::from("data/boroughs.geojson"),
            columns: ColumnsConfig::default(),
            null_config: NullConfig::default(),
            display_limit: 25_000,
            cluster_off_zoom: 15.0,
            fit_max_zoom: 13.0,
            initial_view: MapView::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::info!("Loaded dashboard config from {:?}", path);
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| DataError::Config(e.to_string()))?;

        if config.display_limit == 0 {
            return Err(DataError::Config("display_limit must be positive".to_string()));
        }
        Ok(config)
    }

    pub fn dataset_path(&self) -> &Path {
        match &self.dataset {
            DatasetConfig::Csv { path } | DatasetConfig::Sqlite { path, .. } => path,
        }
    }
}
