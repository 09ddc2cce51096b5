use std::sync::Arc;
use parking_lot::RwLock;

use crate::events::{events, EventBus};
use crate::query::QueryCoordinator;
use crate::record::RecordStore;

/// Progress of a one-time startup load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// The dashboard's session state.
///
/// Holds the query coordinator once the dataset is in, plus the status of
/// both startup loads. Views receive the coordinator from here explicitly.
pub struct DashboardState {
    /// The event bus
    pub event_bus: Arc<EventBus>,

    /// Created when the dataset finishes loading
    coordinator: Arc<RwLock<Option<Arc<QueryCoordinator>>>>,

    dataset_status: Arc<RwLock<LoadStatus>>,

    boundary_status: Arc<RwLock<LoadStatus>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            event_bus: Arc::new(EventBus::new()),
            coordinator: Arc::new(RwLock::new(None)),
            dataset_status: Arc::new(RwLock::new(LoadStatus::Loading)),
            boundary_status: Arc::new(RwLock::new(LoadStatus::Loading)),
        }
    }

    /// Build the coordinator over a freshly loaded store
    pub fn install_dataset(&self, source_name: &str, store: RecordStore) -> Arc<QueryCoordinator> {
        let row_count = store.len();
        let coordinator = Arc::new(QueryCoordinator::tree_census(store));

        *self.coordinator.write() = Some(coordinator.clone());
        *self.dataset_status.write() = LoadStatus::Ready;

        tracing::info!("Loaded {} trees from {}", row_count, source_name);
        self.event_bus.publish(events::DatasetLoaded {
            source_name: source_name.to_string(),
            row_count,
        });

        coordinator
    }

    /// Record a failed dataset load. The dashboard keeps running without data.
    pub fn fail_dataset(&self, source_name: &str, error: &str) {
        tracing::error!("Error loading tree data from {}: {}", source_name, error);
        *self.dataset_status.write() = LoadStatus::Failed(error.to_string());
        self.event_bus.publish(events::DatasetLoadFailed {
            source_name: source_name.to_string(),
            error: error.to_string(),
        });
    }

    pub fn boundary_ready(&self, source_name: &str, region_count: usize) {
        *self.boundary_status.write() = LoadStatus::Ready;
        tracing::info!("Loaded {} boundary regions from {}", region_count, source_name);
        self.event_bus.publish(events::BoundaryLoaded {
            source_name: source_name.to_string(),
            region_count,
        });
    }

    /// Record a failed boundary load. Only the first failure is logged and
    /// published; region filtering stays off for the rest of the session.
    pub fn fail_boundary(&self, source_name: &str, error: &str) {
        {
            let mut status = self.boundary_status.write();
            if matches!(*status, LoadStatus::Failed(_)) {
                return;
            }
            *status = LoadStatus::Failed(error.to_string());
        }

        tracing::error!("Error loading boundary data from {}: {}", source_name, error);
        self.event_bus.publish(events::BoundaryUnavailable {
            source_name: source_name.to_string(),
            error: error.to_string(),
        });
    }

    pub fn coordinator(&self) -> Option<Arc<QueryCoordinator>> {
        self.coordinator.read().clone()
    }

    pub fn dataset_status(&self) -> LoadStatus {
        self.dataset_status.read().clone()
    }

    pub fn boundary_status(&self) -> LoadStatus {
        self.boundary_status.read().clone()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}
