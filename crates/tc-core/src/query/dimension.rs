//! Filterable projections of a record

use std::fmt;
use std::sync::Arc;

use super::key::{DimensionKey, KeyKind};
use super::predicate::FilterPredicate;
use super::FilterError;
use crate::record::TreeRecord;

type KeyFn = dyn Fn(&TreeRecord) -> DimensionKey + Send + Sync;

/// A named key function plus the dimension's active filter
#[derive(Clone)]
pub struct Dimension {
    name: String,
    kind: KeyKind,
    key_fn: Arc<KeyFn>,
    filter: Option<FilterPredicate>,
}

impl Dimension {
    /// Define a dimension from a key function. The function must return keys
    /// of `kind` for every record.
    pub fn define<F>(name: impl Into<String>, kind: KeyKind, key_fn: F) -> Self
    where
        F: Fn(&TreeRecord) -> DimensionKey + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            key_fn: Arc::new(key_fn),
            filter: None,
        }
    }

    /// Dimension over a categorical field
    pub fn categorical<F>(name: impl Into<String>, field: F) -> Self
    where
        F: Fn(&TreeRecord) -> &Arc<str> + Send + Sync + 'static,
    {
        Self::define(name, KeyKind::Text, move |r| DimensionKey::Text(field(r).clone()))
    }

    pub fn numeric<F>(name: impl Into<String>, field: F) -> Self
    where
        F: Fn(&TreeRecord) -> f64 + Send + Sync + 'static,
    {
        Self::define(name, KeyKind::Number, move |r| DimensionKey::number(field(r)))
    }

    /// Composite (latitude, longitude) dimension
    pub fn location(name: impl Into<String>) -> Self {
        Self::define(name, KeyKind::Location, |r| DimensionKey::location(r.latitude, r.longitude))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn key(&self, record: &TreeRecord) -> DimensionKey {
        let key = (self.key_fn)(record);
        debug_assert_eq!(key.kind(), self.kind, "dimension '{}' produced a foreign key", self.name);
        key
    }

    /// Replace the active filter, returning the previous one
    pub fn set_filter(&mut self, predicate: FilterPredicate) -> Result<Option<FilterPredicate>, FilterError> {
        if !predicate.is_compatible_with(self.kind) {
            return Err(FilterError::KindMismatch {
                dimension: self.name.clone(),
                expected: self.kind,
            });
        }
        Ok(self.filter.replace(predicate))
    }

    /// Reset to "accept all", returning the previous filter
    pub fn clear_filter(&mut self) -> Option<FilterPredicate> {
        self.filter.take()
    }

    pub fn current_filter(&self) -> Option<&FilterPredicate> {
        self.filter.as_ref()
    }

    pub fn accepts(&self, key: &DimensionKey) -> bool {
        self.filter.as_ref().map_or(true, |p| p.matches(key))
    }
}

impl fmt::Debug for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dimension")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TreeRecord {
        TreeRecord {
            id: 7,
            year: 2015,
            latitude: 40.7,
            longitude: -74.0,
            species: Arc::from("pin oak"),
            borough: Arc::from("Queens"),
            status: Arc::from("Alive"),
            health: Arc::from("Good"),
        }
    }

    #[test]
    fn test_set_filter_replaces() {
        let mut dim = Dimension::categorical("borough", |r| &r.borough);
        assert_eq!(dim.set_filter(FilterPredicate::exact("Queens")).unwrap(), None);
        let previous = dim.set_filter(FilterPredicate::exact("Bronx")).unwrap();
        assert_eq!(previous, Some(FilterPredicate::exact("Queens")));
        assert_eq!(dim.current_filter(), Some(&FilterPredicate::exact("Bronx")));
        assert!(!dim.accepts(&dim.key(&record())));
    }

    #[test]
    fn test_kind_mismatch_keeps_previous_filter() {
        let mut dim = Dimension::numeric("year", |r| r.year as f64);
        dim.set_filter(FilterPredicate::number_range(2000.0, 2020.0)).unwrap();
        let err = dim.set_filter(FilterPredicate::exact("2015")).unwrap_err();
        assert!(matches!(err, FilterError::KindMismatch { expected: KeyKind::Number, .. }));
        assert!(dim.accepts(&dim.key(&record())));
    }

    #[test]
    fn test_clear_filter_accepts_all() {
        let mut dim = Dimension::location("location");
        dim.set_filter(FilterPredicate::Within(super::super::GeoBounds::new(0.0, 0.0, 1.0, 1.0)))
            .unwrap();
        assert!(!dim.accepts(&dim.key(&record())));
        assert!(dim.clear_filter().is_some());
        assert!(dim.current_filter().is_none());
        assert!(dim.accepts(&dim.key(&record())));
    }
}
