//! Borough polygons on the map: styling, triangulation and click-to-filter

use egui::Color32;
use tc_core::query::dims;
use tc_core::{DimensionKey, FilterError, FilterPredicate, QueryCoordinator};
use tc_data::{BoundaryLayer, Region};

use crate::colors;

/// Fill and outline of one region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStyle {
    pub fill: Color32,
    pub outline: Color32,
    pub weight: f32,
}

/// Style for `name` given the borough currently selected, if any
pub fn region_style(name: &str, selected: Option<&str>) -> RegionStyle {
    match selected {
        None => RegionStyle {
            fill: colors::with_opacity(colors::borough_color(name), 0.4),
            outline: Color32::WHITE,
            weight: 2.0,
        },
        Some(selected) if selected == name => RegionStyle {
            fill: colors::with_opacity(colors::borough_color(name), 0.4),
            outline: Color32::from_rgb(0x22, 0x22, 0x22),
            weight: 4.0,
        },
        Some(_) => RegionStyle {
            fill: colors::with_opacity(colors::DESELECTED, 0.2),
            outline: colors::with_opacity(Color32::from_rgb(0xee, 0xee, 0xee), 0.5),
            weight: 1.0,
        },
    }
}

/// Borough the borough dimension is filtered to, if it holds a single key
pub fn selected_borough(coordinator: &QueryCoordinator) -> Option<String> {
    match coordinator.current_filter(dims::BOROUGH) {
        Some(FilterPredicate::Exact(key)) => key.as_text().map(str::to_string),
        _ => None,
    }
}

/// Filter the borough dimension to `name`, replacing any previous selection
pub fn select_region(coordinator: &QueryCoordinator, name: &str) -> Result<(), FilterError> {
    coordinator.clear_filter(dims::BOROUGH)?;
    coordinator.set_filter(dims::BOROUGH, FilterPredicate::Exact(DimensionKey::text(name)))
}

/// Region under a map click. Without a boundary layer nothing is hit.
pub fn region_at_click(
    boundaries: Option<&BoundaryLayer>,
    latitude: f64,
    longitude: f64,
) -> Option<&Region> {
    boundaries?.region_at(latitude, longitude)
}

/// A region triangulated once for filling, in (longitude, latitude)
#[derive(Debug, Clone)]
pub struct RegionMesh {
    pub name: String,
    pub vertices: Vec<[f64; 2]>,
    /// Triangle list into `vertices`
    pub indices: Vec<usize>,
    pub outlines: Vec<Vec<[f64; 2]>>,
}

impl RegionMesh {
    pub fn build(region: &Region) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        let mut outlines = Vec::new();

        for polygon in &region.shape.0 {
            let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());

            let base = vertices.len();
            let mut coords = Vec::new();
            let mut holes = Vec::new();
            let mut ring_vertices = Vec::new();

            for (ring_index, ring) in rings.enumerate() {
                let mut points: Vec<[f64; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
                if points.len() >= 2 && points.first() == points.last() {
                    points.pop();
                }
                if points.len() < 3 {
                    continue;
                }
                if ring_index == 0 {
                    outlines.push(points.clone());
                } else {
                    holes.push(ring_vertices.len());
                }
                coords.extend(points.iter().flat_map(|p| p.iter().copied()));
                ring_vertices.extend(points);
            }

            if ring_vertices.len() < 3 {
                continue;
            }
            match earcutr::earcut(&coords, &holes, 2) {
                Ok(triangles) => {
                    indices.extend(triangles.into_iter().map(|i| base + i));
                    vertices.extend(ring_vertices);
                }
                Err(e) => {
                    tracing::warn!("Could not triangulate part of '{}': {:?}", region.name, e);
                }
            }
        }

        Self { name: region.name.clone(), vertices, indices, outlines }
    }
}
