//! Dimension keys and their kinds

use std::fmt;
use std::sync::Arc;
use ordered_float::OrderedFloat;

/// The type of key a dimension produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Text,
    Number,
    Location,
}

/// A key a record is projected onto by a dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionKey {
    Text(Arc<str>),
    Number(OrderedFloat<f64>),
    /// Composite (latitude, longitude)
    Location(OrderedFloat<f64>, OrderedFloat<f64>),
}

impl DimensionKey {
    pub fn text(value: impl Into<Arc<str>>) -> Self {
        DimensionKey::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        DimensionKey::Number(OrderedFloat(value))
    }

    pub fn location(latitude: f64, longitude: f64) -> Self {
        DimensionKey::Location(OrderedFloat(latitude), OrderedFloat(longitude))
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            DimensionKey::Text(_) => KeyKind::Text,
            DimensionKey::Number(_) => KeyKind::Number,
            DimensionKey::Location(_, _) => KeyKind::Location,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DimensionKey::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_location(&self) -> Option<(f64, f64)> {
        match self {
            DimensionKey::Location(lat, lon) => Some((lat.0, lon.0)),
            _ => None,
        }
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKey::Text(s) => write!(f, "{}", s),
            DimensionKey::Number(v) if v.0.fract() == 0.0 => write!(f, "{}", v.0 as i64),
            DimensionKey::Number(v) => write!(f, "{}", v.0),
            DimensionKey::Location(lat, lon) => write!(f, "({:.5}, {:.5})", lat.0, lon.0),
        }
    }
}

impl From<&str> for DimensionKey {
    fn from(value: &str) -> Self {
        DimensionKey::text(value)
    }
}

/// Axis-aligned latitude/longitude box, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self { min_lat, min_lon, max_lat, max_lon }
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }
}
