//! Pie and donut charts drawn straight on the painter

use std::f64::consts::{FRAC_PI_2, TAU};

use egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};

use super::ChartSlice;

const MAX_DIAMETER: f32 = 240.0;

/// Slice under `angle`, measured clockwise from twelve o'clock in radians.
/// Slices with a zero count cover no angle and are never hit.
pub fn slice_at_angle(counts: &[u64], angle: f64) -> Option<usize> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return None;
    }

    let angle = angle.rem_euclid(TAU);
    let mut end = 0.0;
    for (index, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        end += count as f64 / total as f64 * TAU;
        if angle < end {
            return Some(index);
        }
    }
    // Rounding can leave the last sliver just short of a full turn
    counts.iter().rposition(|&c| c > 0)
}

fn draw_segment(
    painter: &egui::Painter,
    center: Pos2,
    inner_radius: f32,
    outer_radius: f32,
    start: f64,
    end: f64,
    color: Color32,
) {
    let steps = ((end - start).to_degrees() / 3.0).ceil().max(1.0) as usize;
    let point = |angle: f64, radius: f32| {
        // Zero angle points up; screen y grows downwards so this turns clockwise
        let a = angle - FRAC_PI_2;
        center + Vec2::new(radius * a.cos() as f32, radius * a.sin() as f32)
    };

    for i in 0..steps {
        let a0 = start + (end - start) * (i as f64 / steps as f64);
        let a1 = start + (end - start) * ((i + 1) as f64 / steps as f64);
        let quad = if inner_radius > 0.0 {
            vec![point(a0, inner_radius), point(a0, outer_radius), point(a1, outer_radius), point(a1, inner_radius)]
        } else {
            vec![center, point(a0, outer_radius), point(a1, outer_radius)]
        };
        painter.add(Shape::convex_polygon(quad, color, Stroke::NONE));
    }
}

/// Draw the ring and a legend under it; returns the clicked slice
pub(super) fn show_donut(
    ui: &mut Ui,
    slices: &[ChartSlice],
    any_selected: bool,
    inner_ratio: f32,
) -> Option<usize> {
    let diameter = ui.available_width().min(MAX_DIAMETER).max(60.0);
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(diameter), Sense::click());
    let painter = ui.painter_at(rect);

    let center = rect.center();
    let outer_radius = diameter / 2.0 * 0.95;
    let inner_radius = outer_radius * inner_ratio.clamp(0.0, 0.95);

    let counts: Vec<u64> = slices.iter().map(|s| s.count).collect();
    let total: u64 = counts.iter().sum();

    if total == 0 {
        painter.text(center, Align2::CENTER_CENTER, "No trees", FontId::proportional(14.0), Color32::GRAY);
        return None;
    }

    let mut start = 0.0;
    for slice in slices.iter().filter(|s| s.count > 0) {
        let end = start + slice.count as f64 / total as f64 * TAU;
        draw_segment(&painter, center, inner_radius, outer_radius, start, end, slice.display_color(any_selected));
        start = end;
    }

    if inner_radius > 0.0 {
        painter.text(
            center,
            Align2::CENTER_CENTER,
            total.to_string(),
            FontId::proportional(16.0),
            ui.visuals().text_color(),
        );
    }

    let hovered = response.hover_pos().and_then(|pos| {
        let offset = pos - center;
        let distance = offset.length();
        if distance < inner_radius || distance > outer_radius {
            return None;
        }
        let angle = (offset.y as f64).atan2(offset.x as f64) + FRAC_PI_2;
        slice_at_angle(&counts, angle)
    });

    let clicked = response.clicked();
    if let Some(index) = hovered {
        response.on_hover_text(slices[index].tooltip());
    }

    ui.horizontal_wrapped(|ui| {
        for slice in slices.iter().filter(|s| s.count > 0) {
            let (swatch, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
            ui.painter().rect_filled(swatch, 2.0, slice.display_color(any_selected));
            ui.label(&slice.label);
        }
    });

    hovered.filter(|_| clicked)
}
