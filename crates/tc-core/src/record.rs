//! Immutable tree census records

use std::sync::Arc;
use ahash::AHashMap;
use thiserror::Error;

/// One row of the tree census
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRecord {
    pub id: i64,
    pub year: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub species: Arc<str>,
    pub borough: Arc<str>,
    pub status: Arc<str>,
    pub health: Arc<str>,
}

/// Errors raised while building a record store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("required column '{0}' is missing from the header")]
    MissingColumn(String),

    #[error("row {row}: field '{column}' is missing")]
    MissingField { row: usize, column: String },

    #[error("row {row}: field '{column}' is not a valid number: '{value}'")]
    InvalidNumber { row: usize, column: String, value: String },
}

/// Header names of the required dataset columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub id: String,
    pub year: String,
    pub latitude: String,
    pub longitude: String,
    pub species: String,
    pub borough: String,
    pub status: String,
    pub health: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "OBJECTID".to_string(),
            year: "Year".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            species: "spc_common".to_string(),
            borough: "boroname".to_string(),
            status: "status".to_string(),
            health: "health".to_string(),
        }
    }
}

/// Resolved header positions for each required column
struct ColumnIndices {
    id: usize,
    year: usize,
    latitude: usize,
    longitude: usize,
    species: usize,
    borough: usize,
    status: usize,
    health: usize,
}

impl ColumnIndices {
    fn resolve(headers: &[String], columns: &ColumnMapping) -> Result<Self, ParseError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            id: find(&columns.id)?,
            year: find(&columns.year)?,
            latitude: find(&columns.latitude)?,
            longitude: find(&columns.longitude)?,
            species: find(&columns.species)?,
            borough: find(&columns.borough)?,
            status: find(&columns.status)?,
            health: find(&columns.health)?,
        })
    }
}

/// Shares one allocation per distinct categorical value
#[derive(Default)]
struct Interner {
    values: AHashMap<String, Arc<str>>,
}

impl Interner {
    fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.values.get(value) {
            return existing.clone();
        }
        let shared: Arc<str> = Arc::from(value);
        self.values.insert(value.to_string(), shared.clone());
        shared
    }
}

/// The full, immutable set of records for a session
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<TreeRecord>,
}

impl RecordStore {
    /// Build a store from raw string rows using the default column names.
    /// Empty categorical values are kept as empty strings.
    pub fn load<I>(headers: &[String], rows: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        Self::load_with(headers, rows, &ColumnMapping::default(), |value| value.is_empty())
    }

    /// Build a store from raw string rows.
    ///
    /// `is_null` decides which raw values count as missing: a null numeric
    /// value is a parse error, a null categorical value becomes `""`.
    /// Numbers are parsed here once and never again.
    pub fn load_with<I, F>(
        headers: &[String],
        rows: I,
        columns: &ColumnMapping,
        is_null: F,
    ) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Vec<String>>,
        F: Fn(&str) -> bool,
    {
        let indices = ColumnIndices::resolve(headers, columns)?;
        let mut interner = Interner::default();
        let mut records = Vec::new();

        for (row_idx, row) in rows.into_iter().enumerate() {
            // Row numbers are 1-based to match what a user sees in the file
            let row_nr = row_idx + 1;

            let field = |idx: usize, column: &str| {
                row.get(idx)
                    .map(|v| v.trim())
                    .ok_or_else(|| ParseError::MissingField {
                        row: row_nr,
                        column: column.to_string(),
                    })
            };

            let number = |idx: usize, column: &str| -> Result<f64, ParseError> {
                let raw = field(idx, column)?;
                let parsed = if is_null(raw) { None } else { raw.parse::<f64>().ok() };
                match parsed {
                    Some(v) if v.is_finite() => Ok(v),
                    _ => Err(ParseError::InvalidNumber {
                        row: row_nr,
                        column: column.to_string(),
                        value: raw.to_string(),
                    }),
                }
            };

            // Integral and within [min, max)
            let integer = |idx: usize, column: &str, min: f64, max: f64| -> Result<f64, ParseError> {
                let v = number(idx, column)?;
                if v.fract() == 0.0 && v >= min && v < max {
                    Ok(v)
                } else {
                    Err(ParseError::InvalidNumber {
                        row: row_nr,
                        column: column.to_string(),
                        value: field(idx, column)?.to_string(),
                    })
                }
            };

            let mut category = |idx: usize, column: &str| -> Result<Arc<str>, ParseError> {
                let raw = field(idx, column)?;
                Ok(interner.intern(if is_null(raw) { "" } else { raw }))
            };

            let record = TreeRecord {
                id: integer(indices.id, &columns.id, i64::MIN as f64, i64::MAX as f64)? as i64,
                year: integer(indices.year, &columns.year, i32::MIN as f64, i32::MAX as f64 + 1.0)? as i32,
                latitude: number(indices.latitude, &columns.latitude)?,
                longitude: number(indices.longitude, &columns.longitude)?,
                species: category(indices.species, &columns.species)?,
                borough: category(indices.borough, &columns.borough)?,
                status: category(indices.status, &columns.status)?,
                health: category(indices.health, &columns.health)?,
            };
            records.push(record);
        }

        tracing::debug!("Parsed {} tree records", records.len());
        Ok(Self { records })
    }

    /// Build a store from already typed records
    pub fn from_records(records: Vec<TreeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TreeRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&TreeRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["OBJECTID", "Year", "latitude", "longitude", "spc_common", "boroname", "status", "health"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_coerces_numbers_once() {
        let rows = vec![
            row(&["1", "2015", "40.7", "-73.9", "pin oak", "Queens", "Alive", "Good"]),
            row(&["2", "2015", "40.6", "-74.0", "London planetree", "Brooklyn", "Dead", ""]),
        ];
        let store = RecordStore::load(&headers(), rows).unwrap();

        assert_eq!(store.len(), 2);
        let first = store.get(0).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.year, 2015);
        assert_eq!(first.latitude, 40.7);
        assert_eq!(&*first.borough, "Queens");
        assert_eq!(&*store.get(1).unwrap().health, "");
    }

    #[test]
    fn test_load_shares_categorical_values() {
        let rows = vec![
            row(&["1", "2015", "40.7", "-73.9", "pin oak", "Queens", "Alive", "Good"]),
            row(&["2", "2015", "40.6", "-74.0", "pin oak", "Queens", "Alive", "Good"]),
        ];
        let store = RecordStore::load(&headers(), rows).unwrap();
        let a = store.get(0).unwrap();
        let b = store.get(1).unwrap();
        assert!(Arc::ptr_eq(&a.borough, &b.borough));
    }

    #[test]
    fn test_load_rejects_non_numeric() {
        let rows = vec![row(&["1", "2015", "north", "-73.9", "pin oak", "Queens", "Alive", "Good"])];
        let err = RecordStore::load(&headers(), rows).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber { row: 1, column: "latitude".to_string(), value: "north".to_string() }
        );
    }

    #[test]
    fn test_load_rejects_empty_numeric() {
        let rows = vec![row(&["1", "", "40.7", "-73.9", "pin oak", "Queens", "Alive", "Good"])];
        assert!(matches!(
            RecordStore::load(&headers(), rows),
            Err(ParseError::InvalidNumber { row: 1, .. })
        ));
    }

    #[test]
    fn test_load_rejects_fractional_and_out_of_range_integers() {
        let load = |id: &str, year: &str| {
            RecordStore::load(&headers(), vec![row(&[id, year, "40.7", "-73.9", "pin oak", "Queens", "Alive", "Good"])])
        };

        assert_eq!(
            load("1.5", "2015").unwrap_err(),
            ParseError::InvalidNumber { row: 1, column: "OBJECTID".to_string(), value: "1.5".to_string() }
        );
        assert_eq!(
            load("1e30", "2015").unwrap_err(),
            ParseError::InvalidNumber { row: 1, column: "OBJECTID".to_string(), value: "1e30".to_string() }
        );
        assert_eq!(
            load("7", "2015.8").unwrap_err(),
            ParseError::InvalidNumber { row: 1, column: "Year".to_string(), value: "2015.8".to_string() }
        );
        assert!(matches!(load("7", "99999999999"), Err(ParseError::InvalidNumber { .. })));

        let store = load("7", "2015.0").unwrap();
        assert_eq!(store.get(0).unwrap().id, 7);
        assert_eq!(store.get(0).unwrap().year, 2015);
    }

    #[test]
    fn test_load_rejects_missing_column_and_field() {
        let mut short_headers = headers();
        short_headers.pop();
        assert_eq!(
            RecordStore::load(&short_headers, Vec::new()).unwrap_err(),
            ParseError::MissingColumn("health".to_string())
        );

        let rows = vec![
            row(&["1", "2015", "40.7", "-73.9", "pin oak", "Queens", "Alive", "Good"]),
            row(&["2", "2015", "40.7", "-73.9", "pin oak"]),
        ];
        assert_eq!(
            RecordStore::load(&headers(), rows).unwrap_err(),
            ParseError::MissingField { row: 2, column: "boroname".to_string() }
        );
    }

    #[test]
    fn test_load_with_custom_null_patterns() {
        let rows = vec![row(&["1", "2015", "40.7", "-73.9", "N/A", "Queens", "Alive", "n/a"])];
        let store = RecordStore::load_with(&headers(), rows, &ColumnMapping::default(), |v| {
            v.is_empty() || v.eq_ignore_ascii_case("n/a")
        })
        .unwrap();
        let record = store.get(0).unwrap();
        assert_eq!(&*record.species, "");
        assert_eq!(&*record.health, "");
    }
}
