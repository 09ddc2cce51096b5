//! Borough boundary polygons loaded from GeoJSON

use std::path::Path;

use geo::{BoundingRect, Contains};
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon};
use geojson::{Feature, GeoJson, Value};
use tc_core::GeoBounds;

use crate::DataError;

/// One named region, matched against the borough dimension by name
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    /// Coordinates are (longitude, latitude)
    pub shape: MultiPolygon<f64>,
    pub bounds: GeoBounds,
}

impl Region {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.bounds.contains(latitude, longitude)
            && self.shape.contains(&Point::new(longitude, latitude))
    }

    /// Exterior rings as (longitude, latitude) pairs, for drawing
    pub fn outlines(&self) -> Vec<Vec<[f64; 2]>> {
        self.shape
            .0
            .iter()
            .map(|polygon| polygon.exterior().coords().map(|c| [c.x, c.y]).collect())
            .collect()
    }
}

/// The set of regions the map can be filtered by
#[derive(Debug, Clone, Default)]
pub struct BoundaryLayer {
    regions: Vec<Region>,
}

impl BoundaryLayer {
    /// Read a GeoJSON file without blocking the runtime
    pub async fn load(path: &Path) -> Result<Self, DataError> {
        let text = tokio::fs::read_to_string(path).await?;
        let layer = Self::from_geojson(&text)?;
        tracing::info!("Loaded {} regions from {:?}", layer.len(), path);
        Ok(layer)
    }

    /// Parse a FeatureCollection (or single Feature) of polygons keyed by the
    /// `name` property. Features without a name or a polygon are skipped.
    pub fn from_geojson(text: &str) -> Result<Self, DataError> {
        let features = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(collection) => collection.features,
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::Geometry(_) => {
                return Err(DataError::GeoJson(
                    "expected features with a name property, found a bare geometry".to_string(),
                ))
            }
        };

        let regions = features
            .iter()
            .enumerate()
            .filter_map(|(idx, feature)| Self::region_from_feature(idx, feature))
            .collect();

        Ok(Self { regions })
    }

    fn region_from_feature(idx: usize, feature: &Feature) -> Option<Region> {
        let Some(name) = feature.property("name").and_then(|v| v.as_str()) else {
            tracing::warn!("Skipping boundary feature {} without a name", idx);
            return None;
        };

        let polygons = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => vec![polygon_from_rings(rings)],
            Some(Value::MultiPolygon(polygons)) => {
                polygons.iter().map(|rings| polygon_from_rings(rings)).collect()
            }
            _ => {
                tracing::warn!("Skipping boundary '{}': not a polygon", name);
                return None;
            }
        };

        let shape = MultiPolygon::new(polygons);
        let rect = shape.bounding_rect()?;
        let bounds = GeoBounds::new(rect.min().y, rect.min().x, rect.max().y, rect.max().x);

        Some(Region { name: name.to_string(), shape, bounds })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region whose name equals `name` exactly
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Region containing the point, if any
    pub fn region_at(&self, latitude: f64, longitude: f64) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(latitude, longitude))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// GeoJSON rings are [exterior, holes...] of [lon, lat, ...] positions
fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Polygon<f64> {
    let to_line = |ring: &Vec<Vec<f64>>| {
        LineString::new(
            ring.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| Coord { x: p[0], y: p[1] })
                .collect(),
        )
    };

    let mut iter = rings.iter();
    let exterior = iter.next().map(to_line).unwrap_or_else(|| LineString::new(Vec::new()));
    let interiors = iter.map(to_line).collect();
    Polygon::new(exterior, interiors)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOROUGHS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Manhattan" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-74.02, 40.70], [-73.93, 40.70], [-73.93, 40.88], [-74.02, 40.88], [-74.02, 40.70]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Staten Island" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-74.26, 40.50], [-74.05, 40.50], [-74.05, 40.65], [-74.26, 40.65], [-74.26, 40.50]]],
                        [[[-74.20, 40.66], [-74.18, 40.66], [-74.18, 40.67], [-74.20, 40.67], [-74.20, 40.66]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "borocode": 9 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Central Park Obelisk" },
                "geometry": { "type": "Point", "coordinates": [-73.965, 40.779] }
            }
        ]
    }"#;

    #[test]
    fn test_parse_skips_unnamed_and_non_polygon_features() {
        let layer = BoundaryLayer::from_geojson(BOROUGHS).unwrap();
        let names: Vec<&str> = layer.regions().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Manhattan", "Staten Island"]);
    }

    #[test]
    fn test_region_lookup_by_point_and_name() {
        let layer = BoundaryLayer::from_geojson(BOROUGHS).unwrap();

        assert_eq!(layer.region_at(40.78, -73.97).map(|r| r.name.as_str()), Some("Manhattan"));
        assert_eq!(layer.region_at(40.665, -74.19).map(|r| r.name.as_str()), Some("Staten Island"));
        assert!(layer.region_at(40.60, -73.80).is_none());

        let staten = layer.region("Staten Island").unwrap();
        assert_eq!(staten.bounds, GeoBounds::new(40.50, -74.26, 40.67, -74.05));
        assert_eq!(staten.outlines().len(), 2);
        assert!(layer.region("staten island").is_none());
    }

    #[test]
    fn test_bare_geometry_is_rejected() {
        let err = BoundaryLayer::from_geojson(r#"{ "type": "Point", "coordinates": [0.0, 0.0] }"#);
        assert!(matches!(err, Err(DataError::GeoJson(_))));
        assert!(matches!(BoundaryLayer::from_geojson("not json"), Err(DataError::GeoJson(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = BoundaryLayer::load(&dir.path().join("boroughs.geojson")).await;
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}
