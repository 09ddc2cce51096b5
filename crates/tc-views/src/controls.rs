//! Data counter, reset buttons and the health legend

use egui::{Sense, Ui, Vec2};
use tc_core::query::dims;
use tc_core::{FilterContext, FilterError, QueryCoordinator};

use crate::colors;

/// `1234567` as `1,234,567`
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Summary line above the charts
pub fn data_counter_text(context: &FilterContext) -> String {
    if context.passing == context.total {
        format!("Showing all {} trees. Click charts to filter.", format_count(context.total))
    } else {
        format!(
            "{} selected out of {} trees",
            format_count(context.passing),
            format_count(context.total)
        )
    }
}

/// What a reset button clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    All,
    Borough,
    Species,
    Health,
}

impl ResetTarget {
    pub const ALL: [ResetTarget; 4] =
        [ResetTarget::All, ResetTarget::Borough, ResetTarget::Species, ResetTarget::Health];

    pub fn label(&self) -> &'static str {
        match self {
            ResetTarget::All => "Reset all",
            ResetTarget::Borough => "Reset borough",
            ResetTarget::Species => "Reset species",
            ResetTarget::Health => "Reset health",
        }
    }

    /// Whether the map goes back to its starting view as well
    pub fn resets_map_view(&self) -> bool {
        matches!(self, ResetTarget::All | ResetTarget::Borough)
    }

    /// Clear the filters this target covers
    pub fn apply(&self, coordinator: &QueryCoordinator) -> Result<(), FilterError> {
        match self {
            ResetTarget::All => {
                coordinator.clear_all();
                Ok(())
            }
            ResetTarget::Borough => coordinator.clear_filter(dims::BOROUGH),
            ResetTarget::Species => coordinator.clear_filter(dims::SPECIES),
            ResetTarget::Health => coordinator.clear_filter(dims::HEALTH),
        }
    }
}

/// One button per target; returns the one pressed this frame
pub fn reset_buttons(ui: &mut Ui) -> Option<ResetTarget> {
    let mut pressed = None;
    ui.horizontal(|ui| {
        for target in ResetTarget::ALL {
            if ui.button(target.label()).clicked() {
                pressed = Some(target);
            }
        }
    });
    pressed
}

pub fn health_legend(ui: &mut Ui) {
    ui.strong("Tree Health Legend");
    for (label, color) in colors::health_legend() {
        ui.horizontal(|ui| {
            let (swatch, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
            ui.painter().circle_filled(swatch.center(), 6.0, color);
            ui.label(label);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tc_core::{FilterPredicate, RecordStore, TreeRecord};

    fn coordinator() -> QueryCoordinator {
        let tree = |id, borough: &str, species: &str, health: &str| TreeRecord {
            id,
            year: 2015,
            latitude: 40.7,
            longitude: -73.9,
            species: Arc::from(species),
            borough: Arc::from(borough),
            status: Arc::from("Alive"),
            health: Arc::from(health),
        };
        QueryCoordinator::tree_census(RecordStore::from_records(vec![
            tree(1, "Queens", "pin oak", "Good"),
            tree(2, "Bronx", "pin oak", "Poor"),
            tree(3, "Bronx", "ginkgo", "Good"),
        ]))
    }

    #[test]
    fn test_format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(25_000), "25,000");
        assert_eq!(format_count(683_788), "683,788");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_counter_text() {
        let coordinator = coordinator();
        assert_eq!(
            data_counter_text(&coordinator.context()),
            "Showing all 3 trees. Click charts to filter."
        );

        coordinator.set_filter(dims::BOROUGH, FilterPredicate::exact("Bronx")).unwrap();
        assert_eq!(data_counter_text(&coordinator.context()), "2 selected out of 3 trees");
    }

    #[test]
    fn test_single_resets_leave_other_filters() {
        let coordinator = coordinator();
        coordinator.set_filter(dims::BOROUGH, FilterPredicate::exact("Bronx")).unwrap();
        coordinator.set_filter(dims::HEALTH, FilterPredicate::exact("Good")).unwrap();
        assert_eq!(coordinator.passing_count(), 1);

        ResetTarget::Health.apply(&coordinator).unwrap();
        assert_eq!(coordinator.passing_count(), 2);
        assert!(coordinator.current_filter(dims::BOROUGH).is_some());

        ResetTarget::Species.apply(&coordinator).unwrap();
        assert_eq!(coordinator.passing_count(), 2);

        ResetTarget::All.apply(&coordinator).unwrap();
        assert_eq!(coordinator.passing_count(), 3);
        assert!(ResetTarget::Borough.resets_map_view());
        assert!(!ResetTarget::Species.resets_map_view());
    }
}
