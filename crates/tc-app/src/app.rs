use std::sync::Arc;

use eframe::egui::{self, Context};
use parking_lot::RwLock;
use tc_core::events::{events, handler_from_fn, Event, EventBus};
use tc_core::{DashboardState, LoadStatus};
use tc_data::{open_source, BoundaryLayer, DashboardConfig};
use tc_views::Dashboard;

use crate::theme;

/// Main application state
pub struct TreeCensusApp {
    config: DashboardConfig,
    state: Arc<DashboardState>,

    /// Filled by the boundary load task
    boundaries: Arc<RwLock<Option<Arc<BoundaryLayer>>>>,
    boundaries_attached: bool,

    /// Built on the first frame after the dataset is in
    dashboard: Option<Dashboard>,

    /// Runs the startup loads
    runtime: tokio::runtime::Runtime,
}

/// Wake the UI whenever an `E` is published
fn repaint_on<E: Event>(bus: &EventBus, ctx: &Context) {
    let ctx = ctx.clone();
    bus.subscribe::<E>(handler_from_fn(move |_| ctx.request_repaint()));
}

impl TreeCensusApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        config: DashboardConfig,
    ) -> Self {
        theme::apply_theme(&cc.egui_ctx);

        let state = Arc::new(DashboardState::new());
        repaint_on::<events::DatasetLoaded>(&state.event_bus, &cc.egui_ctx);
        repaint_on::<events::DatasetLoadFailed>(&state.event_bus, &cc.egui_ctx);
        repaint_on::<events::BoundaryLoaded>(&state.event_bus, &cc.egui_ctx);
        repaint_on::<events::BoundaryUnavailable>(&state.event_bus, &cc.egui_ctx);

        let app = Self {
            config,
            state,
            boundaries: Arc::new(RwLock::new(None)),
            boundaries_attached: false,
            dashboard: None,
            runtime,
        };
        app.spawn_loads();
        app
    }

    /// Start the dataset and boundary loads; neither waits for the other
    fn spawn_loads(&self) {
        let source = open_source(&self.config);
        let state = self.state.clone();
        self.runtime.spawn(async move {
            let name = source.source_name().to_string();
            match source.load().await {
                Ok(store) => {
                    state.install_dataset(&name, store);
                }
                Err(e) => state.fail_dataset(&name, &e.to_string()),
            }
        });

        let path = self.config.boundaries.clone();
        let state = self.state.clone();
        let slot = self.boundaries.clone();
        self.runtime.spawn(async move {
            let name = path.display().to_string();
            match BoundaryLayer::load(&path).await {
                Ok(layer) => {
                    let count = layer.len();
                    *slot.write() = Some(Arc::new(layer));
                    state.boundary_ready(&name, count);
                }
                Err(e) => state.fail_boundary(&name, &e.to_string()),
            }
        });
    }

    fn status_banner(&self, ctx: &Context) {
        let dataset = self.state.dataset_status();
        let boundary = self.state.boundary_status();

        let dataset_error = match &dataset {
            LoadStatus::Failed(e) => Some(e.clone()),
            _ => None,
        };
        let boundary_failed = matches!(boundary, LoadStatus::Failed(_));
        if dataset_error.is_none() && !boundary_failed {
            return;
        }

        egui::TopBottomPanel::bottom("status_banner").show(ctx, |ui| {
            if let Some(e) = &dataset_error {
                ui.colored_label(theme::error_color(), format!("Error loading tree data: {}", e));
            }
            if boundary_failed {
                ui.colored_label(
                    theme::warning_color(),
                    "Borough boundaries unavailable; selecting boroughs on the map is disabled",
                );
            }
        });
    }
}

impl eframe::App for TreeCensusApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if self.dashboard.is_none() {
            if let Some(coordinator) = self.state.coordinator() {
                self.dashboard = Some(Dashboard::new(coordinator, &self.config, Some(ctx.clone())));
            }
        }

        if !self.boundaries_attached {
            let layer = self.boundaries.read().clone();
            if let (Some(dashboard), Some(layer)) = (self.dashboard.as_mut(), layer) {
                dashboard.set_boundaries(layer);
                self.boundaries_attached = true;
            }
        }

        self.status_banner(ctx);

        match self.dashboard.as_mut() {
            Some(dashboard) => dashboard.ui(ctx),
            None => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| match self.state.dataset_status() {
                        LoadStatus::Loading => {
                            ui.spinner();
                        }
                        _ => {
                            ui.label("No tree data to show");
                        }
                    });
                });
            }
        }
    }
}
