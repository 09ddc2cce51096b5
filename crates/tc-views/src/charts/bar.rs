//! Bar and row charts on egui_plot

use egui::{Align2, Color32, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use super::ChartSlice;

const BAR_WIDTH: f64 = 0.7;
const BAR_CHART_HEIGHT: f32 = 260.0;
const ROW_HEIGHT: f32 = 18.0;

/// Index of the bar whose centre is nearest `coord`, if the pointer is on it
fn hit_index(coord: f64, len: usize) -> Option<usize> {
    let nearest = coord.round();
    if nearest < 0.0 || (coord - nearest).abs() > BAR_WIDTH / 2.0 {
        return None;
    }
    let index = nearest as usize;
    (index < len).then_some(index)
}

/// Vertical bars at x = 0, 1, 2...; returns the clicked bar
pub(super) fn show_bars(
    ui: &mut Ui,
    id: &str,
    slices: &[ChartSlice],
    any_selected: bool,
    axis_labels: Option<&(String, String)>,
) -> Option<usize> {
    let labels: Vec<String> = slices.iter().map(|s| s.label.clone()).collect();

    let mut plot = Plot::new(format!("bar_{}", id))
        .height(BAR_CHART_HEIGHT)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_grid([false, true])
        .include_y(0.0)
        .label_formatter(|_, _| String::new())
        .x_axis_formatter(move |value, _chars, _range| {
            let nearest = value.round();
            if (value - nearest).abs() > f64::EPSILON || nearest < 0.0 {
                return String::new();
            }
            labels.get(nearest as usize).cloned().unwrap_or_default()
        });

    if let Some((x, y)) = axis_labels {
        plot = plot.x_axis_label(x.clone()).y_axis_label(y.clone());
    }

    let response = plot.show(ui, |plot_ui| {
        let bars = slices
            .iter()
            .enumerate()
            .map(|(i, slice)| {
                Bar::new(i as f64, slice.count as f64)
                    .width(BAR_WIDTH)
                    .name(&slice.label)
                    .fill(slice.display_color(any_selected))
            })
            .collect();
        plot_ui.bar_chart(BarChart::new(bars));
        plot_ui.pointer_coordinate()
    });

    let hovered = response.inner.and_then(|p| hit_index(p.x, slices.len()));
    finish(response.response, hovered, slices)
}

/// Horizontal rows, first key on top; returns the clicked row
pub(super) fn show_rows(
    ui: &mut Ui,
    id: &str,
    slices: &[ChartSlice],
    any_selected: bool,
) -> Option<usize> {
    let height = slices.len() as f32 * ROW_HEIGHT + 40.0;

    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_source(format!("rows_{}", id))
        .max_height(400.0)
        .show(ui, |ui| {
            let response = Plot::new(format!("row_{}", id))
                .height(height)
                .allow_zoom(false)
                .allow_drag(false)
                .allow_scroll(false)
                .allow_boxed_zoom(false)
                .show_axes([true, false])
                .show_grid([true, false])
                .include_x(0.0)
                .label_formatter(|_, _| String::new())
                .show(ui, |plot_ui| {
                    let rows = slices
                        .iter()
                        .enumerate()
                        .map(|(i, slice)| {
                            Bar::new(-(i as f64), slice.count as f64)
                                .width(BAR_WIDTH)
                                .name(&slice.label)
                                .fill(slice.display_color(any_selected))
                        })
                        .collect();
                    plot_ui.bar_chart(BarChart::new(rows).horizontal());

                    for (i, slice) in slices.iter().enumerate() {
                        plot_ui.text(
                            Text::new(PlotPoint::new(0.0, -(i as f64)), format!("  {}", slice.label))
                                .anchor(Align2::LEFT_CENTER)
                                .color(Color32::from_gray(30)),
                        );
                    }
                    plot_ui.pointer_coordinate()
                });

            let hovered = response.inner.and_then(|p| hit_index(-p.y, slices.len()));
            clicked = finish(response.response, hovered, slices);
        });
    clicked
}

fn finish(response: egui::Response, hovered: Option<usize>, slices: &[ChartSlice]) -> Option<usize> {
    let clicked = response.clicked();
    match hovered {
        Some(index) => {
            response.on_hover_text(slices[index].tooltip());
            clicked.then_some(index)
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_index_within_bar_width() {
        assert_eq!(hit_index(0.1, 3), Some(0));
        assert_eq!(hit_index(1.3, 3), Some(1));
        assert_eq!(hit_index(2.34, 3), Some(2));
    }

    #[test]
    fn test_hit_index_between_or_outside_bars() {
        assert_eq!(hit_index(0.5, 3), None);
        assert_eq!(hit_index(-0.2, 3), Some(0));
        assert_eq!(hit_index(-0.8, 3), None);
        assert_eq!(hit_index(3.0, 3), None);
    }
}
