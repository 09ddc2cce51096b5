use egui::epaint::Mesh;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};
use tc_core::QueryCoordinator;
use tc_data::{BoundaryLayer, DashboardConfig, Region};

use super::cluster::{cluster_markers, Cluster};
use super::markers::{build_markers, Marker, MARKER_RADIUS};
use super::regions::{region_at_click, region_style, select_region, selected_borough, RegionMesh};
use super::viewport::MapViewport;

/// Padding kept around a region the map is fitted to
const FIT_PADDING: f32 = 50.0;

/// The tree map: borough polygons, clustered markers, pan and zoom
pub struct MapPanel {
    viewport: MapViewport,
    initial: MapViewport,
    display_limit: usize,
    cluster_off_zoom: f64,
    fit_max_zoom: f64,

    meshes: Vec<RegionMesh>,
    markers: Vec<Marker>,
    clusters: Vec<Cluster>,
    /// Whole zoom level `clusters` were built for, and whether clustering was off
    clustered_at: Option<(f64, bool)>,
    last_size: Vec2,
}

impl MapPanel {
    pub fn new(config: &DashboardConfig) -> Self {
        let initial = MapViewport::from(config.initial_view);
        Self {
            viewport: initial,
            initial,
            display_limit: config.display_limit,
            cluster_off_zoom: config.cluster_off_zoom,
            fit_max_zoom: config.fit_max_zoom,
            meshes: Vec::new(),
            markers: Vec::new(),
            clusters: Vec::new(),
            clustered_at: None,
            last_size: Vec2::new(800.0, 600.0),
        }
    }

    pub fn viewport(&self) -> MapViewport {
        self.viewport
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn set_boundaries(&mut self, layer: &BoundaryLayer) {
        self.meshes = layer.regions().iter().map(RegionMesh::build).collect();
    }

    /// Rebuild markers from the records currently passing
    pub fn refresh_markers(&mut self, coordinator: &QueryCoordinator) {
        self.markers = build_markers(coordinator, self.display_limit);
        self.clustered_at = None;
    }

    /// Back to the starting view
    pub fn reset_view(&mut self) {
        self.viewport = self.initial;
    }

    /// Frame `region` in the last known map size
    pub fn fit_region(&mut self, region: &Region) {
        self.viewport.fit_bounds(&region.bounds, self.last_size, FIT_PADDING, self.fit_max_zoom);
    }

    fn recluster(&mut self) {
        let zoom = self.viewport.zoom;
        let key = (zoom.floor(), zoom >= self.cluster_off_zoom);
        if self.clustered_at != Some(key) {
            self.clusters = cluster_markers(&self.markers, zoom, self.cluster_off_zoom);
            self.clustered_at = Some(key);
        }
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        coordinator: &QueryCoordinator,
        boundaries: Option<&BoundaryLayer>,
    ) {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        self.last_size = rect.size();

        if response.dragged() {
            self.viewport.pan(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.scroll_delta.y);
            if scroll != 0.0 {
                let anchor = response.hover_pos().unwrap_or(rect.center());
                self.viewport.zoom_around(scroll as f64 / 200.0, anchor, rect);
            }
        }
        self.recluster();

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(0xf2, 0xef, 0xe9));

        let selected = selected_borough(coordinator);
        self.draw_regions(&painter, rect, selected.as_deref());
        let hovered = self.draw_markers(&painter, rect, response.hover_pos());

        if response.clicked() {
            self.handle_click(&response, rect, coordinator, boundaries, hovered);
        }
        if let Some(index) = hovered {
            let cluster = &self.clusters[index];
            let text = if cluster.is_single() {
                self.markers[cluster.members[0]].popup.clone()
            } else {
                format!("{} trees, click to zoom in", cluster.len())
            };
            response.on_hover_text(text);
        }
    }

    fn draw_regions(&self, painter: &egui::Painter, rect: Rect, selected: Option<&str>) {
        for mesh in &self.meshes {
            let style = region_style(&mesh.name, selected);

            let mut fill = Mesh::default();
            for [lon, lat] in &mesh.vertices {
                fill.colored_vertex(self.viewport.to_screen(*lat, *lon, rect), style.fill);
            }
            for triangle in mesh.indices.chunks_exact(3) {
                fill.add_triangle(triangle[0] as u32, triangle[1] as u32, triangle[2] as u32);
            }
            painter.add(Shape::mesh(fill));

            for outline in &mesh.outlines {
                let points: Vec<Pos2> = outline
                    .iter()
                    .map(|[lon, lat]| self.viewport.to_screen(*lat, *lon, rect))
                    .collect();
                painter.add(Shape::closed_line(points, Stroke::new(style.weight, style.outline)));
            }
        }
    }

    /// Draw every visible cluster; returns the one under the pointer
    fn draw_markers(&self, painter: &egui::Painter, rect: Rect, pointer: Option<Pos2>) -> Option<usize> {
        let visible = rect.expand(20.0);
        let mut hovered = None;

        for (index, cluster) in self.clusters.iter().enumerate() {
            let pos = self.viewport.to_screen(cluster.latitude, cluster.longitude, rect);
            if !visible.contains(pos) {
                continue;
            }

            let radius = if cluster.is_single() {
                let marker = &self.markers[cluster.members[0]];
                painter.circle(
                    pos,
                    MARKER_RADIUS,
                    crate::colors::with_opacity(marker.color, 0.8),
                    Stroke::new(0.5, Color32::BLACK),
                );
                MARKER_RADIUS
            } else {
                let radius = 12.0 + (cluster.len() as f32).log10() * 4.0;
                painter.circle(
                    pos,
                    radius,
                    Color32::from_rgba_unmultiplied(110, 204, 57, 200),
                    Stroke::new(4.0, Color32::from_rgba_unmultiplied(181, 226, 140, 160)),
                );
                painter.text(
                    pos,
                    Align2::CENTER_CENTER,
                    cluster.len().to_string(),
                    FontId::proportional(11.0),
                    Color32::BLACK,
                );
                radius
            };

            if pointer.map_or(false, |p| (p - pos).length() <= radius) {
                hovered = Some(index);
            }
        }
        hovered
    }

    fn handle_click(
        &mut self,
        response: &egui::Response,
        rect: Rect,
        coordinator: &QueryCoordinator,
        boundaries: Option<&BoundaryLayer>,
        hovered: Option<usize>,
    ) {
        if let Some(cluster) = hovered.and_then(|i| self.clusters.get(i)) {
            if !cluster.is_single() {
                let bounds = cluster.bounds;
                self.viewport.fit_bounds(&bounds, rect.size(), FIT_PADDING, self.cluster_off_zoom);
                return;
            }
        }

        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };
        let (latitude, longitude) = self.viewport.from_screen(pos, rect);
        if let Some(region) = region_at_click(boundaries, latitude, longitude) {
            if let Err(e) = select_region(coordinator, &region.name) {
                tracing::warn!("Could not select borough '{}': {}", region.name, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tc_core::{RecordStore, TreeRecord};

    fn coordinator(count: usize) -> QueryCoordinator {
        let records = (0..count)
            .map(|i| TreeRecord {
                id: i as i64,
                year: 2015,
                latitude: 40.70 + (i % 7) as f64 * 0.01,
                longitude: -73.95,
                species: Arc::from("pin oak"),
                borough: Arc::from("Brooklyn"),
                status: Arc::from("Alive"),
                health: Arc::from("Good"),
            })
            .collect();
        QueryCoordinator::tree_census(RecordStore::from_records(records))
    }

    #[test]
    fn test_markers_capped_by_display_limit() {
        let config = DashboardConfig { display_limit: 30, ..Default::default() };
        let mut panel = MapPanel::new(&config);
        panel.refresh_markers(&coordinator(100));
        assert_eq!(panel.markers().len(), 30);
    }

    #[test]
    fn test_recluster_only_on_level_change() {
        let mut panel = MapPanel::new(&DashboardConfig::default());
        panel.refresh_markers(&coordinator(14));
        panel.recluster();
        assert_eq!(panel.clustered_at, Some((11.0, false)));
        let at_eleven = panel.clusters.len();

        panel.viewport.zoom = 16.0;
        panel.recluster();
        assert_eq!(panel.clusters.len(), 14);
        assert!(panel.clusters.len() >= at_eleven);
    }

    #[test]
    fn test_recluster_within_level_when_clustering_turns_off() {
        let config = DashboardConfig { cluster_off_zoom: 14.5, ..Default::default() };
        let mut panel = MapPanel::new(&config);
        panel.refresh_markers(&coordinator(14));

        panel.viewport.zoom = 14.2;
        panel.recluster();
        assert_eq!(panel.clusters.len(), 7);

        panel.viewport.zoom = 14.7;
        panel.recluster();
        assert_eq!(panel.clusters.len(), 14);
        assert!(panel.clusters.iter().all(Cluster::is_single));
    }

    #[test]
    fn test_fit_and_reset_view() {
        let layer = BoundaryLayer::from_geojson(
            r#"{"type": "Feature", "properties": {"name": "Bronx"},
                "geometry": {"type": "Polygon", "coordinates":
                    [[[-73.93, 40.79], [-73.76, 40.79], [-73.76, 40.92], [-73.93, 40.92], [-73.93, 40.79]]]}}"#,
        )
        .unwrap();

        let mut panel = MapPanel::new(&DashboardConfig::default());
        panel.set_boundaries(&layer);
        panel.fit_region(layer.region("Bronx").unwrap());
        assert!(panel.viewport().zoom <= 13.0);
        assert!(panel.viewport().latitude > 40.79 && panel.viewport().latitude < 40.92);

        panel.reset_view();
        assert_eq!(panel.viewport(), MapViewport::from(DashboardConfig::default().initial_view));
    }
}
