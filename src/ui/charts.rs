use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Plot, PlotPoint, Text};

use us_population_dashboard::data::views::PivotMatrix;
use us_population_dashboard::data::PopulationRecord;

use crate::theme::ColorTheme;
use crate::ui::format;

const HEATMAP_HEIGHT: f32 = 300.0;
const HEATMAP_LABEL_WIDTH: f32 = 44.0;

const TOP_STATES_HEIGHT: f32 = 360.0;
const BAR_COLOR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

const DONUT_INNER: f32 = 44.0;
const DONUT_OUTER: f32 = 62.0;
const DONUT_TRACK: Color32 = Color32::from_rgb(0xe6, 0xe6, 0xe6);

// ---------------------------------------------------------------------------
// Heatmap (year × state)
// ---------------------------------------------------------------------------

/// Paint the pivot matrix as a grid of coloured cells, one row per year.
pub fn heatmap(ui: &mut Ui, pivot: &PivotMatrix, theme: ColorTheme) {
    let n_rows = pivot.years().len();
    let n_cols = pivot.states().len();
    if n_rows == 0 || n_cols == 0 {
        ui.label("Nothing to show.");
        return;
    }

    let desired = egui::vec2(ui.available_width(), HEATMAP_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(desired, Sense::hover());
    let grid = egui::Rect::from_min_max(
        rect.min + egui::vec2(HEATMAP_LABEL_WIDTH, 0.0),
        rect.max,
    );
    let cell_w = grid.width() / n_cols as f32;
    let cell_h = grid.height() / n_rows as f32;
    let (min, max) = pivot.value_range().unwrap_or((0.0, 0.0));

    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();

    for (row, (year, cells)) in pivot.rows().enumerate() {
        let top = grid.top() + row as f32 * cell_h;
        painter.text(
            egui::pos2(grid.left() - 6.0, top + cell_h / 2.0),
            Align2::RIGHT_CENTER,
            year.to_string(),
            FontId::proportional(12.0),
            text_color,
        );
        for (col, &value) in cells.iter().enumerate() {
            let cell = egui::Rect::from_min_size(
                egui::pos2(grid.left() + col as f32 * cell_w, top),
                egui::vec2(cell_w, cell_h),
            );
            painter.rect_filled(cell.shrink(0.5), 0.0, theme.color_for(value, min, max));
        }
    }

    let hovered = response
        .hover_pos()
        .filter(|pos| grid.contains(*pos))
        .map(|pos| {
            let col = (((pos.x - grid.left()) / cell_w) as usize).min(n_cols - 1);
            let row = (((pos.y - grid.top()) / cell_h) as usize).min(n_rows - 1);
            (row, col)
        });

    if let Some((row, col)) = hovered {
        let year = pivot.years()[row];
        let state = &pivot.states()[col];
        let value = pivot.cell(row, col).unwrap_or_default();
        response.on_hover_ui_at_pointer(|ui: &mut Ui| {
            ui.label(format!("Year: {year}"));
            ui.label(format!("State: {state}"));
            ui.label(format!("Population: {}", format::population(value)));
        });
    }
}

// ---------------------------------------------------------------------------
// Top states (horizontal bars)
// ---------------------------------------------------------------------------

/// Horizontal bar chart, largest state on top.
pub fn top_states_chart(ui: &mut Ui, top: &[PopulationRecord]) {
    let n = top.len();
    // Bar i sits at y = n - 1 - i so the first record is drawn highest.
    let labels: Vec<String> = top.iter().rev().map(|r| r.state.clone()).collect();

    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new((n - 1 - i) as f64, r.population)
                .name(&r.state)
                .width(0.3)
                .fill(BAR_COLOR)
        })
        .collect();

    Plot::new("top_states")
        .height(TOP_STATES_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_grid([true, false])
        .x_axis_label("Population")
        .x_axis_formatter(|mark, _range| format::millions(mark.value))
        .y_grid_spacer(uniform_grid_spacer(|_input| [1.0, 5.0, 10.0]))
        .y_axis_formatter(move |mark, _range| {
            let v = mark.value;
            if v >= 0.0 && v.fract() == 0.0 {
                labels.get(v as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Population"));
            for (i, r) in top.iter().enumerate() {
                let label = Text::new(
                    PlotPoint::new(r.population, (n - 1 - i) as f64),
                    RichText::new(format!(" {}", format::population(r.population))).size(11.0),
                )
                .anchor(Align2::LEFT_CENTER);
                plot_ui.text(label);
            }
        });
}

// ---------------------------------------------------------------------------
// Donut rings
// ---------------------------------------------------------------------------

/// A ring filled to `percent` with a caption underneath.
pub fn donut(ui: &mut Ui, label: &str, percent: f32, color: Color32) {
    let size = DONUT_OUTER * 2.0 + 8.0;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size + 22.0), Sense::hover());
    let painter = ui.painter_at(rect);

    let center = egui::pos2(rect.center().x, rect.top() + size / 2.0);
    let radius = (DONUT_INNER + DONUT_OUTER) / 2.0;
    let stroke_width = DONUT_OUTER - DONUT_INNER;

    painter.circle_stroke(center, radius, Stroke::new(stroke_width, DONUT_TRACK));

    let fraction = (percent / 100.0).clamp(0.0, 1.0);
    if fraction > 0.0 {
        let sweep = TAU * fraction;
        let steps = ((fraction * 96.0).ceil() as usize).max(2);
        let points: Vec<Pos2> = (0..=steps)
            .map(|i| {
                let angle = -FRAC_PI_2 + sweep * i as f32 / steps as f32;
                center + radius * egui::vec2(angle.cos(), angle.sin())
            })
            .collect();
        painter.add(Shape::line(points, Stroke::new(stroke_width, color)));
    }

    let strong = ui.visuals().strong_text_color();
    painter.text(
        center,
        Align2::CENTER_CENTER,
        format!("{} %", percent.round() as i32),
        FontId::proportional(18.0),
        strong,
    );
    painter.text(
        egui::pos2(center.x, rect.bottom() - 10.0),
        Align2::CENTER_CENTER,
        label,
        FontId::proportional(13.0),
        ui.visuals().text_color(),
    );
}
