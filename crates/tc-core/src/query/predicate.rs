use super::key::{DimensionKey, GeoBounds, KeyKind};

/// The active acceptance rule of one dimension
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Key equals the value
    Exact(DimensionKey),
    /// `min <= key < max`
    Range { min: DimensionKey, max: DimensionKey },
    /// Location key inside the box
    Within(GeoBounds),
}

impl FilterPredicate {
    pub fn exact(value: impl Into<DimensionKey>) -> Self {
        FilterPredicate::Exact(value.into())
    }

    pub fn number_range(min: f64, max: f64) -> Self {
        FilterPredicate::Range {
            min: DimensionKey::number(min),
            max: DimensionKey::number(max),
        }
    }

    /// Whether this predicate can be applied to keys of `kind`
    pub fn is_compatible_with(&self, kind: KeyKind) -> bool {
        match self {
            FilterPredicate::Exact(key) => key.kind() == kind,
            FilterPredicate::Range { min, max } => {
                kind != KeyKind::Location && min.kind() == kind && max.kind() == kind
            }
            FilterPredicate::Within(_) => kind == KeyKind::Location,
        }
    }

    pub fn matches(&self, key: &DimensionKey) -> bool {
        match self {
            FilterPredicate::Exact(value) => key == value,
            FilterPredicate::Range { min, max } => key >= min && key < max,
            FilterPredicate::Within(bounds) => key
                .as_location()
                .map(|(lat, lon)| bounds.contains(lat, lon))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_half_open() {
        let range = FilterPredicate::number_range(2000.0, 2010.0);
        assert!(range.matches(&DimensionKey::number(2000.0)));
        assert!(range.matches(&DimensionKey::number(2009.5)));
        assert!(!range.matches(&DimensionKey::number(2010.0)));
    }

    #[test]
    fn test_compatibility() {
        assert!(FilterPredicate::exact("Queens").is_compatible_with(KeyKind::Text));
        assert!(!FilterPredicate::exact("Queens").is_compatible_with(KeyKind::Number));
        assert!(!FilterPredicate::number_range(0.0, 1.0).is_compatible_with(KeyKind::Location));

        let bounds = FilterPredicate::Within(GeoBounds::new(40.0, -74.5, 41.0, -73.5));
        assert!(bounds.is_compatible_with(KeyKind::Location));
        assert!(bounds.matches(&DimensionKey::location(40.7, -74.0)));
        assert!(!bounds.matches(&DimensionKey::location(42.0, -74.0)));
    }
}
