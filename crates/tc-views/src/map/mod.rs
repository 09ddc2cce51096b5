//! Tree map: borough regions, health-coloured markers and clustering

pub mod cluster;
pub mod markers;
mod panel;
pub mod regions;
pub mod viewport;

pub use cluster::{cluster_markers, Cluster};
pub use markers::{build_markers, popup_text, Marker, MARKER_RADIUS};
pub use panel::MapPanel;
pub use regions::{region_at_click, region_style, select_region, selected_borough, RegionMesh, RegionStyle};
pub use viewport::MapViewport;
