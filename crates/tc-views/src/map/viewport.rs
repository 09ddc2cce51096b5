//! Web Mercator viewport with slippy-map zoom levels

use std::f64::consts::PI;

use egui::{Pos2, Rect, Vec2};
use tc_core::GeoBounds;
use tc_data::MapView;

const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 19.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Width of the whole world in pixels at `zoom`
fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Project to world pixels at `zoom`
pub fn project(latitude: f64, longitude: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (longitude + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`]
pub fn unproject(x: f64, y: f64, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let longitude = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let latitude = n.sinh().atan().to_degrees();
    (latitude, longitude)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl From<MapView> for MapViewport {
    fn from(view: MapView) -> Self {
        Self {
            latitude: view.latitude,
            longitude: view.longitude,
            zoom: view.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }
}

impl MapViewport {
    pub fn to_screen(&self, latitude: f64, longitude: f64, rect: Rect) -> Pos2 {
        let (cx, cy) = project(self.latitude, self.longitude, self.zoom);
        let (x, y) = project(latitude, longitude, self.zoom);
        rect.center() + Vec2::new((x - cx) as f32, (y - cy) as f32)
    }

    pub fn from_screen(&self, pos: Pos2, rect: Rect) -> (f64, f64) {
        let (cx, cy) = project(self.latitude, self.longitude, self.zoom);
        let offset = pos - rect.center();
        unproject(cx + offset.x as f64, cy + offset.y as f64, self.zoom)
    }

    /// Move the map along with a drag of `delta` screen pixels
    pub fn pan(&mut self, delta: Vec2) {
        let (cx, cy) = project(self.latitude, self.longitude, self.zoom);
        let (lat, lon) = unproject(cx - delta.x as f64, cy - delta.y as f64, self.zoom);
        self.latitude = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        self.longitude = lon;
    }

    /// Change zoom by `levels`, keeping the point under `anchor` fixed
    pub fn zoom_around(&mut self, levels: f64, anchor: Pos2, rect: Rect) {
        let target = (self.zoom + levels).clamp(MIN_ZOOM, MAX_ZOOM);
        if target == self.zoom {
            return;
        }
        let (anchor_lat, anchor_lon) = self.from_screen(anchor, rect);
        self.zoom = target;

        let offset = anchor - rect.center();
        let (ax, ay) = project(anchor_lat, anchor_lon, self.zoom);
        let (lat, lon) = unproject(ax - offset.x as f64, ay - offset.y as f64, self.zoom);
        self.latitude = lat;
        self.longitude = lon;
    }

    /// Centre on `bounds` at the largest whole zoom level that shows all of it
    /// inside `size` less `padding` on every side, capped at `max_zoom`
    pub fn fit_bounds(&mut self, bounds: &GeoBounds, size: Vec2, padding: f32, max_zoom: f64) {
        let (x0, y0) = project(bounds.max_lat, bounds.min_lon, 0.0);
        let (x1, y1) = project(bounds.min_lat, bounds.max_lon, 0.0);

        let avail_w = (size.x - 2.0 * padding).max(1.0) as f64;
        let avail_h = (size.y - 2.0 * padding).max(1.0) as f64;
        let span_w = (x1 - x0).abs();
        let span_h = (y1 - y0).abs();

        let fit = |avail: f64, span: f64| if span > 0.0 { (avail / span).log2() } else { f64::INFINITY };
        let zoom = fit(avail_w, span_w).min(fit(avail_h, span_h)).floor();

        self.zoom = zoom.min(max_zoom).clamp(MIN_ZOOM, MAX_ZOOM);
        let (lat, lon) = unproject((x0 + x1) / 2.0, (y0 + y1) / 2.0, 0.0);
        self.latitude = lat;
        self.longitude = lon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nyc() -> MapViewport {
        MapViewport::from(MapView::default())
    }

    fn screen() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn test_project_round_trip() {
        let (x, y) = project(40.7128, -74.0060, 11.0);
        let (lat, lon) = unproject(x, y, 11.0);
        assert!((lat - 40.7128).abs() < 1e-9);
        assert!((lon + 74.0060).abs() < 1e-9);
    }

    #[test]
    fn test_center_maps_to_rect_center() {
        let view = nyc();
        assert_eq!(view.to_screen(40.7128, -74.0060, screen()), screen().center());
        // North is up, east is right
        let north_east = view.to_screen(40.8, -73.9, screen());
        assert!(north_east.x > 400.0 && north_east.y < 300.0);
    }

    #[test]
    fn test_fit_bounds_shows_whole_city() {
        let mut view = nyc();
        let city = GeoBounds::new(40.49, -74.26, 40.92, -73.70);
        view.fit_bounds(&city, Vec2::new(800.0, 600.0), 50.0, 13.0);

        assert_eq!(view.zoom, 10.0);
        for (lat, lon) in [(40.49, -74.26), (40.92, -73.70)] {
            let p = view.to_screen(lat, lon, screen());
            assert!(screen().shrink(50.0).contains(p), "{:?} not visible", p);
        }
    }

    #[test]
    fn test_fit_bounds_caps_zoom() {
        let mut view = nyc();
        let block = GeoBounds::new(40.7500, -73.9900, 40.7510, -73.9890);
        view.fit_bounds(&block, Vec2::new(800.0, 600.0), 50.0, 13.0);
        assert_eq!(view.zoom, 13.0);
        assert!((view.latitude - 40.7505).abs() < 1e-4);
        assert!((view.longitude + 73.9895).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_around_keeps_anchor() {
        let mut view = nyc();
        let anchor = Pos2::new(600.0, 150.0);
        let before = view.from_screen(anchor, screen());
        view.zoom_around(1.5, anchor, screen());

        assert_eq!(view.zoom, 12.5);
        let after = view.to_screen(before.0, before.1, screen());
        assert!((after - anchor).length() < 0.01);
    }
}
