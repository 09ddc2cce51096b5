//! Cross-filter charts: each one renders the group counts of a single
//! dimension and turns clicks into filters on that same dimension.

mod bar;
mod pie;

pub use pie::slice_at_angle;

use egui::{Color32, Ui};
use tc_core::query::dims;
use tc_core::{DimensionKey, FilterError, FilterPredicate, QueryCoordinator};

use crate::colors;

/// How a chart lays out its groups
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartKind {
    /// Vertical bars, one per key
    Bar,
    /// Horizontal rows sorted by key
    Row,
    /// Ring with a hole of `inner_ratio` times the outer radius; 0 is a full pie
    Donut { inner_ratio: f32 },
}

/// Colour assignment for a chart's keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Borough,
    Health,
    Species,
}

impl Palette {
    fn color(&self, key: &str, index: usize) -> Color32 {
        match self {
            Palette::Borough => colors::borough_color(key),
            Palette::Health => colors::health_chart_color(key),
            Palette::Species => colors::species_color(index),
        }
    }
}

/// One group as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub key: DimensionKey,
    pub label: String,
    pub count: u64,
    pub color: Color32,
    /// The dimension's filter is exactly this key
    pub selected: bool,
}

impl ChartSlice {
    /// Hover text, "key: count"
    pub fn tooltip(&self) -> String {
        format!("{}: {}", self.label, self.count)
    }

    /// Fill to draw with, greyed out while another key is selected
    pub fn display_color(&self, any_selected: bool) -> Color32 {
        if any_selected && !self.selected {
            colors::DESELECTED
        } else {
            self.color
        }
    }
}

/// A chart bound to one dimension of the coordinator
pub struct ChartView {
    title: String,
    dimension: String,
    kind: ChartKind,
    palette: Palette,
    axis_labels: Option<(String, String)>,
    slices: Vec<ChartSlice>,
}

impl ChartView {
    pub fn new(title: &str, dimension: &str, kind: ChartKind, palette: Palette) -> Self {
        Self {
            title: title.to_string(),
            dimension: dimension.to_string(),
            kind,
            palette,
            axis_labels: None,
            slices: Vec::new(),
        }
    }

    pub fn with_axis_labels(mut self, x: &str, y: &str) -> Self {
        self.axis_labels = Some((x.to_string(), y.to_string()));
        self
    }

    /// Trees per borough
    pub fn borough_bar() -> Self {
        Self::new("Trees by Borough", dims::BOROUGH, ChartKind::Bar, Palette::Borough)
            .with_axis_labels("Borough", "Number of Trees")
    }

    /// Trees per species, one row each
    pub fn species_row() -> Self {
        Self::new("Trees by Species", dims::SPECIES, ChartKind::Row, Palette::Species)
    }

    pub fn health_donut() -> Self {
        Self::new(
            "Tree Health",
            dims::HEALTH,
            ChartKind::Donut { inner_ratio: 0.55 },
            Palette::Health,
        )
    }

    /// Borough ring shown next to the map
    pub fn borough_ring() -> Self {
        Self::new(
            "Select a Borough",
            dims::BOROUGH,
            ChartKind::Donut { inner_ratio: 0.55 },
            Palette::Borough,
        )
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn slices(&self) -> &[ChartSlice] {
        &self.slices
    }

    fn any_selected(&self) -> bool {
        self.slices.iter().any(|s| s.selected)
    }

    /// Pull the current groups. Every key of the dimension is kept, zero
    /// counts included, so bars hold their position while other filters change.
    pub fn refresh(&mut self, coordinator: &QueryCoordinator) {
        let selected = match coordinator.current_filter(&self.dimension) {
            Some(FilterPredicate::Exact(key)) => Some(key),
            _ => None,
        };

        self.slices = coordinator
            .group_counts_with_zeros(&self.dimension)
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let label = display_label(&entry.key);
                let color = self.palette.color(&entry.key.to_string(), index);
                ChartSlice {
                    selected: selected.as_ref() == Some(&entry.key),
                    key: entry.key,
                    label,
                    count: entry.count,
                    color,
                }
            })
            .collect();
    }

    /// Draw the chart and apply a click, if any
    pub fn ui(&mut self, ui: &mut Ui, coordinator: &QueryCoordinator) {
        ui.strong(&self.title);

        if self.slices.is_empty() {
            ui.label(egui::RichText::new("No data").weak());
            return;
        }

        let any_selected = self.any_selected();
        let clicked = match self.kind {
            ChartKind::Bar => bar::show_bars(ui, &self.dimension, &self.slices, any_selected, self.axis_labels.as_ref()),
            ChartKind::Row => bar::show_rows(ui, &self.dimension, &self.slices, any_selected),
            ChartKind::Donut { inner_ratio } => pie::show_donut(ui, &self.slices, any_selected, inner_ratio),
        };

        if let Some(index) = clicked {
            if let Some(slice) = self.slices.get(index) {
                if let Err(e) = toggle_key(coordinator, &self.dimension, &slice.key) {
                    tracing::warn!("Chart '{}' could not filter: {}", self.title, e);
                }
            }
        }
    }
}

/// Click behaviour shared by every chart: clicking the selected key clears
/// the dimension, clicking any other key replaces the filter with it.
pub fn toggle_key(
    coordinator: &QueryCoordinator,
    dimension: &str,
    key: &DimensionKey,
) -> Result<(), FilterError> {
    let already_selected = matches!(
        coordinator.current_filter(dimension),
        Some(FilterPredicate::Exact(ref current)) if current == key
    );

    coordinator.clear_filter(dimension)?;
    if !already_selected {
        coordinator.set_filter(dimension, FilterPredicate::Exact(key.clone()))?;
    }
    Ok(())
}

/// Blank categories read as "Unknown"
pub fn category_label(value: &str) -> &str {
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}

/// Label shown for a key
pub fn display_label(key: &DimensionKey) -> String {
    match key.as_text() {
        Some(text) => category_label(text).to_string(),
        None => key.to_string(),
    }
}
