//! Column layout of the tree census dataset

use serde::{Deserialize, Serialize};
use tc_core::ColumnMapping;

/// Header names of the required columns, overridable from the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    pub id: String,
    pub year: String,
    pub latitude: String,
    pub longitude: String,
    pub species: String,
    pub borough: String,
    pub status: String,
    pub health: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        let m = ColumnMapping::default();
        Self {
            id: m.id,
            year: m.year,
            latitude: m.latitude,
            longitude: m.longitude,
            species: m.species,
            borough: m.borough,
            status: m.status,
            health: m.health,
        }
    }
}

impl From<&ColumnsConfig> for ColumnMapping {
    fn from(c: &ColumnsConfig) -> Self {
        ColumnMapping {
            id: c.id.clone(),
            year: c.year.clone(),
            latitude: c.latitude.clone(),
            longitude: c.longitude.clone(),
            species: c.species.clone(),
            borough: c.borough.clone(),
            status: c.status.clone(),
            health: c.health.clone(),
        }
    }
}

impl ColumnsConfig {
    /// Required column names in record field order
    pub fn names(&self) -> [&str; 8] {
        [
            self.id.as_str(),
            self.year.as_str(),
            self.latitude.as_str(),
            self.longitude.as_str(),
            self.species.as_str(),
            self.borough.as_str(),
            self.status.as_str(),
            self.health.as_str(),
        ]
    }

    /// Required columns absent from `headers`
    pub fn missing_from(&self, headers: &[String]) -> Vec<String> {
        self.names()
            .iter()
            .filter(|name| !headers.iter().any(|h| h.trim() == **name))
            .map(|name| name.to_string())
            .collect()
    }
}
