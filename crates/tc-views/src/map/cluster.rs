//! Grid clustering of markers by zoom level

use indexmap::IndexMap;
use tc_core::GeoBounds;

use super::markers::Marker;
use super::viewport::project;

/// Side of a clustering cell in screen pixels
pub const CLUSTER_CELL_PX: f64 = 80.0;

/// Markers grouped into one grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub latitude: f64,
    pub longitude: f64,
    /// Indices into the marker slice
    pub members: Vec<usize>,
    pub bounds: GeoBounds,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }
}

#[derive(Default)]
struct Cell {
    lat_sum: f64,
    lon_sum: f64,
    members: Vec<usize>,
    bounds: Option<GeoBounds>,
}

/// Bucket markers into cells of [`CLUSTER_CELL_PX`] at the whole zoom level
/// below `zoom`. From `cluster_off_zoom` on every marker stands alone.
/// Clusters come out in order of their first member.
pub fn cluster_markers(markers: &[Marker], zoom: f64, cluster_off_zoom: f64) -> Vec<Cluster> {
    if zoom >= cluster_off_zoom {
        return markers
            .iter()
            .enumerate()
            .map(|(index, m)| Cluster {
                latitude: m.latitude,
                longitude: m.longitude,
                members: vec![index],
                bounds: GeoBounds::new(m.latitude, m.longitude, m.latitude, m.longitude),
            })
            .collect();
    }

    let level = zoom.floor();
    let mut cells: IndexMap<(i64, i64), Cell> = IndexMap::new();

    for (index, marker) in markers.iter().enumerate() {
        let (x, y) = project(marker.latitude, marker.longitude, level);
        let key = ((x / CLUSTER_CELL_PX).floor() as i64, (y / CLUSTER_CELL_PX).floor() as i64);

        let cell = cells.entry(key).or_default();
        cell.lat_sum += marker.latitude;
        cell.lon_sum += marker.longitude;
        cell.members.push(index);
        cell.bounds = Some(match cell.bounds {
            None => GeoBounds::new(marker.latitude, marker.longitude, marker.latitude, marker.longitude),
            Some(b) => GeoBounds::new(
                b.min_lat.min(marker.latitude),
                b.min_lon.min(marker.longitude),
                b.max_lat.max(marker.latitude),
                b.max_lon.max(marker.longitude),
            ),
        });
    }

    cells
        .into_values()
        .filter_map(|cell| {
            let n = cell.members.len() as f64;
            Some(Cluster {
                latitude: cell.lat_sum / n,
                longitude: cell.lon_sum / n,
                bounds: cell.bounds?,
                members: cell.members,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    fn marker(latitude: f64, longitude: f64) -> Marker {
        Marker { latitude, longitude, color: Color32::WHITE, popup: String::new() }
    }

    fn sample() -> Vec<Marker> {
        vec![marker(40.7000, -74.0000), marker(40.8000, -73.9000), marker(40.7001, -74.0001)]
    }

    #[test]
    fn test_nearby_markers_share_a_cluster() {
        let clusters = cluster_markers(&sample(), 10.4, 15.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![0, 2]);
        assert!((clusters[0].latitude - 40.70005).abs() < 1e-9);
        assert_eq!(clusters[0].bounds, GeoBounds::new(40.7000, -74.0001, 40.7001, -74.0000));
        assert!(clusters[1].is_single());
    }

    #[test]
    fn test_clustering_disabled_from_cutoff_zoom() {
        let clusters = cluster_markers(&sample(), 15.0, 15.0);
        assert_eq!(clusters.len(), 3);
        assert!(clusters.iter().all(Cluster::is_single));
    }

    #[test]
    fn test_low_zoom_merges_everything() {
        let clusters = cluster_markers(&sample(), 3.0, 15.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }
}
