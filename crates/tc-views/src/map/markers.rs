use egui::Color32;
use tc_core::{QueryCoordinator, TreeRecord};

use crate::charts::category_label;
use crate::colors;

/// Circle radius in screen pixels
pub const MARKER_RADIUS: f32 = 5.0;

/// A tree as drawn on the map
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub color: Color32,
    pub popup: String,
}

impl Marker {
    pub fn from_record(record: &TreeRecord) -> Self {
        Self {
            latitude: record.latitude,
            longitude: record.longitude,
            color: colors::health_marker_color(&record.health),
            popup: popup_text(record),
        }
    }
}

pub fn popup_text(record: &TreeRecord) -> String {
    format!(
        "Species: {}\nBorough: {}\nStatus: {}\nHealth: {}",
        category_label(&record.species),
        category_label(&record.borough),
        category_label(&record.status),
        category_label(&record.health)
    )
}

/// Markers for the first `limit` passing records, in store order
pub fn build_markers(coordinator: &QueryCoordinator, limit: usize) -> Vec<Marker> {
    let markers: Vec<Marker> = coordinator
        .passing_records(limit)
        .iter()
        .map(Marker::from_record)
        .collect();
    tracing::debug!(
        "Built {} markers ({} trees pass)",
        markers.len(),
        coordinator.passing_count()
    );
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tc_core::query::dims;
    use tc_core::{FilterPredicate, RecordStore};

    fn tree(id: i64, borough: &str, health: &str) -> TreeRecord {
        TreeRecord {
            id,
            year: 2015,
            latitude: 40.6 + id as f64 * 0.001,
            longitude: -73.9,
            species: Arc::from("london planetree"),
            borough: Arc::from(borough),
            status: Arc::from("Alive"),
            health: Arc::from(health),
        }
    }

    #[test]
    fn test_marker_colour_and_popup() {
        let marker = Marker::from_record(&tree(1, "Brooklyn", "Poor"));
        assert_eq!(marker.color, Color32::from_rgb(0xd6, 0x27, 0x28));
        assert_eq!(
            marker.popup,
            "Species: london planetree\nBorough: Brooklyn\nStatus: Alive\nHealth: Poor"
        );
    }

    #[test]
    fn test_popup_names_blank_values_unknown() {
        let marker = Marker::from_record(&tree(2, "Queens", ""));
        assert_eq!(marker.color, colors::UNKNOWN_HEALTH);
        assert_eq!(
            marker.popup,
            "Species: london planetree\nBorough: Queens\nStatus: Alive\nHealth: Unknown"
        );
    }

    #[test]
    fn test_build_markers_follows_filters_and_limit() {
        let records = (0..10)
            .map(|i| tree(i, if i % 2 == 0 { "Queens" } else { "Bronx" }, "Good"))
            .collect();
        let coordinator = QueryCoordinator::tree_census(RecordStore::from_records(records));

        assert_eq!(build_markers(&coordinator, 4).len(), 4);

        coordinator
            .set_filter(dims::BOROUGH, FilterPredicate::exact("Bronx"))
            .unwrap();
        let markers = build_markers(&coordinator, 100);
        assert_eq!(markers.len(), 5);
        assert!((markers[0].latitude - 40.601).abs() < 1e-9);
    }
}
