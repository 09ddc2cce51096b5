//! Colour palettes shared by the charts, the map and the legend

use egui::Color32;

/// Marker fill for trees with no recorded health
pub const UNKNOWN_HEALTH: Color32 = Color32::from_rgb(0x7f, 0x7f, 0x7f);

/// Fill of deselected chart entries and dimmed regions
pub const DESELECTED: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);

/// Marker colour by tree health
pub fn health_marker_color(health: &str) -> Color32 {
    match health {
        "Good" => Color32::from_rgb(0x2c, 0xa0, 0x2c),
        "Fair" => Color32::from_rgb(0xff, 0x7f, 0x0e),
        "Poor" => Color32::from_rgb(0xd6, 0x27, 0x28),
        _ => UNKNOWN_HEALTH,
    }
}

/// Borough colour used by the bar chart, the ring chart and the region layer
pub fn borough_color(name: &str) -> Color32 {
    match name {
        "Manhattan" => Color32::from_rgb(0xda, 0xf7, 0xa6),
        "Brooklyn" => Color32::from_rgb(0x33, 0xa0, 0x2c),
        "Queens" => Color32::from_rgb(0x36, 0x8d, 0x99),
        "Bronx" => Color32::from_rgb(0xa5, 0xc0, 0x16),
        "Staten Island" => Color32::from_rgb(0x02, 0x66, 0x3d),
        _ => Color32::from_rgb(0xb2, 0xdf, 0x8a),
    }
}

/// Slice colour of the health donut
pub fn health_chart_color(health: &str) -> Color32 {
    match health {
        "Good" => Color32::from_rgb(0x4c, 0xaf, 0x50),
        "Fair" => Color32::from_rgb(0xff, 0xc1, 0x07),
        "Poor" => Color32::from_rgb(0xf4, 0x43, 0x36),
        _ => Color32::from_rgb(0x9e, 0x9e, 0x9e),
    }
}

/// Cycling palette for the species rows
pub fn species_color(index: usize) -> Color32 {
    const PALETTE: &[Color32] = &[
        Color32::from_rgb(0x6b, 0xae, 0xd6),
        Color32::from_rgb(0x1f, 0x78, 0xb4),
        Color32::from_rgb(0xb2, 0xdf, 0x8a),
        Color32::from_rgb(0x33, 0xa0, 0x2c),
        Color32::from_rgb(0xfb, 0x9a, 0x99),
    ];
    PALETTE[index % PALETTE.len()]
}

/// Same colour with `opacity` in [0, 1] applied as alpha
pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Health legend rows, in display order
pub fn health_legend() -> [(&'static str, Color32); 4] {
    [
        ("Good", health_marker_color("Good")),
        ("Fair", health_marker_color("Fair")),
        ("Poor", health_marker_color("Poor")),
        ("Unknown", UNKNOWN_HEALTH),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlisted_keys_fall_back() {
        assert_eq!(health_marker_color(""), UNKNOWN_HEALTH);
        assert_eq!(health_marker_color("good"), UNKNOWN_HEALTH);
        assert_eq!(borough_color("Hoboken"), Color32::from_rgb(0xb2, 0xdf, 0x8a));
        assert_eq!(health_chart_color("Unknown"), Color32::from_rgb(0x9e, 0x9e, 0x9e));
    }

    #[test]
    fn test_legend_matches_marker_colours() {
        let legend = health_legend();
        assert_eq!(legend[0], ("Good", Color32::from_rgb(0x2c, 0xa0, 0x2c)));
        assert_eq!(legend[3].0, "Unknown");
        assert_eq!(species_color(5), species_color(0));
    }

    #[test]
    fn test_with_opacity_sets_alpha() {
        let faded = with_opacity(Color32::WHITE, 0.4);
        assert_eq!(faded.a(), 102);
    }
}
