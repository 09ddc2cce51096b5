//! The assembled dashboard: charts and map wired to one coordinator

use std::sync::Arc;

use parking_lot::Mutex;
use tc_core::query::dims;
use tc_core::{FilterChange, FilterChangeKind, FilterPredicate, QueryCoordinator, SubscriptionId};
use tc_data::{BoundaryLayer, DashboardConfig};

use crate::charts::ChartView;
use crate::controls::{self, ResetTarget};
use crate::map::MapPanel;

pub struct Dashboard {
    coordinator: Arc<QueryCoordinator>,
    boundaries: Option<Arc<BoundaryLayer>>,

    borough_chart: ChartView,
    species_chart: ChartView,
    health_chart: ChartView,
    borough_ring: ChartView,
    map: MapPanel,

    /// Changes published since the last frame
    pending: Arc<Mutex<Vec<FilterChange>>>,
    subscription: SubscriptionId,
    synced_generation: Option<u64>,
}

impl Dashboard {
    /// Subscribe to `coordinator`. With a `repaint` context every filter
    /// change also wakes the UI.
    pub fn new(
        coordinator: Arc<QueryCoordinator>,
        config: &DashboardConfig,
        repaint: Option<egui::Context>,
    ) -> Self {
        let pending = Arc::new(Mutex::new(Vec::new()));
        let queue = pending.clone();
        let subscription = coordinator.on_filter_changed(move |change| {
            queue.lock().push(change.clone());
            if let Some(ctx) = &repaint {
                ctx.request_repaint();
            }
        });

        let mut dashboard = Self {
            coordinator,
            boundaries: None,
            borough_chart: ChartView::borough_bar(),
            species_chart: ChartView::species_row(),
            health_chart: ChartView::health_donut(),
            borough_ring: ChartView::borough_ring(),
            map: MapPanel::new(config),
            pending,
            subscription,
            synced_generation: None,
        };
        dashboard.sync();
        dashboard
    }

    pub fn coordinator(&self) -> &Arc<QueryCoordinator> {
        &self.coordinator
    }

    pub fn map(&self) -> &MapPanel {
        &self.map
    }

    pub fn charts(&self) -> [&ChartView; 4] {
        [&self.borough_chart, &self.species_chart, &self.health_chart, &self.borough_ring]
    }

    pub fn set_boundaries(&mut self, layer: Arc<BoundaryLayer>) {
        self.map.set_boundaries(&layer);
        self.boundaries = Some(layer);
    }

    /// React to queued filter changes and refresh derived views if the
    /// filter state moved on
    pub fn sync(&mut self) {
        let changes: Vec<FilterChange> = std::mem::take(&mut *self.pending.lock());
        for change in &changes {
            self.on_change(change);
        }

        let generation = self.coordinator.context().generation;
        if self.synced_generation == Some(generation) {
            return;
        }

        for chart in [
            &mut self.borough_chart,
            &mut self.species_chart,
            &mut self.health_chart,
            &mut self.borough_ring,
        ] {
            chart.refresh(&self.coordinator);
        }
        self.map.refresh_markers(&self.coordinator);
        self.synced_generation = Some(generation);
    }

    /// Selecting a borough, from any chart or the map, frames it
    fn on_change(&mut self, change: &FilterChange) {
        if !change.affects(dims::BOROUGH) {
            return;
        }
        let FilterChangeKind::Set { predicate: FilterPredicate::Exact(key), .. } = &change.kind else {
            return;
        };

        let Some(name) = key.as_text() else { return };
        match self.boundaries.as_ref().and_then(|layer| layer.region(name)) {
            Some(region) => self.map.fit_region(region),
            None => tracing::debug!("No boundary to fit for borough '{}'", name),
        }
    }

    pub fn reset(&mut self, target: ResetTarget) {
        if let Err(e) = target.apply(&self.coordinator) {
            tracing::warn!("Reset failed: {}", e);
        }
        if target.resets_map_view() {
            self.map.reset_view();
        }
    }

    /// Lay the dashboard out over the whole window
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.sync();

        egui::TopBottomPanel::top("dashboard_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("NYC Street Tree Census");
                ui.separator();
                ui.label(controls::data_counter_text(&self.coordinator.context()));
            });
            if let Some(target) = controls::reset_buttons(ui) {
                self.reset(target);
            }
        });

        egui::SidePanel::left("dashboard_charts")
            .resizable(true)
            .default_width(460.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().id_source("chart_column").show(ui, |ui| {
                    self.borough_chart.ui(ui, &self.coordinator);
                    ui.separator();
                    self.health_chart.ui(ui, &self.coordinator);
                    ui.separator();
                    self.species_chart.ui(ui, &self.coordinator);
                });
            });

        egui::SidePanel::right("dashboard_map_side")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.borough_ring.ui(ui, &self.coordinator);
                ui.separator();
                controls::health_legend(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let boundaries = self.boundaries.clone();
            self.map.ui(ui, &self.coordinator, boundaries.as_deref());
        });
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.coordinator.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::{DimensionKey, RecordStore, TreeRecord};

    use crate::charts::toggle_key;
    use crate::map::{select_region, MapViewport};

    const BOROUGHS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Staten Island" },
                "geometry": { "type": "Polygon", "coordinates":
                    [[[-74.26, 40.49], [-74.05, 40.49], [-74.05, 40.65], [-74.26, 40.65], [-74.26, 40.49]]] }
            }
        ]
    }"#;

    fn coordinator() -> Arc<QueryCoordinator> {
        let tree = |id, borough: &str, lat, lon| TreeRecord {
            id,
            year: 2015,
            latitude: lat,
            longitude: lon,
            species: Arc::from("pin oak"),
            borough: Arc::from(borough),
            status: Arc::from("Alive"),
            health: Arc::from("Good"),
        };
        Arc::new(QueryCoordinator::tree_census(RecordStore::from_records(vec![
            tree(1, "Staten Island", 40.58, -74.15),
            tree(2, "Queens", 40.72, -73.80),
            tree(3, "Queens", 40.73, -73.81),
        ])))
    }

    fn initial_view() -> MapViewport {
        MapViewport::from(DashboardConfig::default().initial_view)
    }

    #[test]
    fn test_views_follow_filter_changes() {
        let coordinator = coordinator();
        let mut dashboard = Dashboard::new(coordinator.clone(), &DashboardConfig::default(), None);
        assert_eq!(dashboard.map().markers().len(), 3);

        toggle_key(&coordinator, dims::BOROUGH, &DimensionKey::text("Queens")).unwrap();
        dashboard.sync();

        assert_eq!(dashboard.map().markers().len(), 2);
        let ring = dashboard.charts()[3];
        assert!(ring.slices().iter().any(|s| s.selected && s.label == "Queens"));
    }

    #[test]
    fn test_borough_selection_fits_map_and_reset_restores() {
        let coordinator = coordinator();
        let mut dashboard = Dashboard::new(coordinator.clone(), &DashboardConfig::default(), None);
        dashboard.set_boundaries(Arc::new(BoundaryLayer::from_geojson(BOROUGHS).unwrap()));

        select_region(&coordinator, "Staten Island").unwrap();
        dashboard.sync();
        let fitted = dashboard.map().viewport();
        assert_ne!(fitted, initial_view());
        assert!(fitted.zoom <= 13.0);
        assert!(fitted.latitude < 40.65 && fitted.latitude > 40.49);

        dashboard.reset(ResetTarget::Species);
        assert_eq!(dashboard.map().viewport(), fitted);

        dashboard.reset(ResetTarget::Borough);
        dashboard.sync();
        assert_eq!(dashboard.map().viewport(), initial_view());
        assert_eq!(coordinator.passing_count(), 3);
    }

    #[test]
    fn test_selection_without_boundaries_keeps_view() {
        let coordinator = coordinator();
        let mut dashboard = Dashboard::new(coordinator.clone(), &DashboardConfig::default(), None);

        select_region(&coordinator, "Staten Island").unwrap();
        dashboard.sync();
        assert_eq!(dashboard.map().viewport(), initial_view());
        assert_eq!(dashboard.map().markers().len(), 1);
    }

    #[test]
    fn test_other_dimensions_leave_map_view() {
        let coordinator = coordinator();
        let mut dashboard = Dashboard::new(coordinator.clone(), &DashboardConfig::default(), None);
        dashboard.set_boundaries(Arc::new(BoundaryLayer::from_geojson(BOROUGHS).unwrap()));

        toggle_key(&coordinator, dims::SPECIES, &DimensionKey::text("pin oak")).unwrap();
        dashboard.sync();
        assert_eq!(dashboard.map().viewport(), initial_view());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let coordinator = coordinator();
        let dashboard = Dashboard::new(coordinator.clone(), &DashboardConfig::default(), None);
        let subscription = dashboard.subscription;
        drop(dashboard);
        assert!(!coordinator.unsubscribe(subscription));
    }
}
