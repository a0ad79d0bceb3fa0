use eframe::egui::{self, Align, Color32, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use us_population_dashboard::config::MAX_TOP_N;

use crate::state::AppState;
use crate::theme::ColorTheme;
use crate::ui::{charts, format};

/// Ring percentages shown under "States Migration". Fixed demo values,
/// not derived from the dataset.
const INBOUND_PCT: f32 = 27.0;
const OUTBOUND_PCT: f32 = 2.0;
const INBOUND_COLOR: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
const OUTBOUND_COLOR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

const GAIN_COLOR: Color32 = Color32::from_rgb(0x22, 0xc5, 0x5e);
const LOSS_COLOR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);

// ---------------------------------------------------------------------------
// Left side panel – selectors
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("US Population Dashboard");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // ---- Year selector ----
    ui.strong("Select a Year");
    let current_year = state.selected_year;
    let mut picked_year = None;
    egui::ComboBox::from_id_salt("year_select")
        .selected_text(current_year.map(|y| y.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for year in state.year_options() {
                if ui
                    .selectable_label(current_year == Some(year), year.to_string())
                    .clicked()
                {
                    picked_year = Some(year);
                }
            }
        });
    if let Some(year) = picked_year {
        state.set_year(year);
    }
    ui.add_space(8.0);

    // ---- Theme selector ----
    ui.strong("Select Color Theme");
    egui::ComboBox::from_id_salt("theme_select")
        .selected_text(state.theme.name())
        .show_ui(ui, |ui: &mut Ui| {
            for theme in ColorTheme::ALL {
                ui.selectable_value(&mut state.theme, theme, theme.name());
            }
        });
    ui.add_space(8.0);

    // ---- Top-N ----
    ui.strong("Top states shown");
    let mut n = state.top_n;
    ui.add(egui::DragValue::new(&mut n).range(1..=MAX_TOP_N));
    state.set_top_n(n);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source_path.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} states, {}–{}",
                ds.states().len(),
                ds.min_year(),
                ds.max_year()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – KPIs, charts, table
// ---------------------------------------------------------------------------

/// Render the dashboard body for the selected year.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("US Population Dashboard");
    ui.label(RichText::new("Connect → Clean → Design → Develop").weak());
    ui.add_space(6.0);

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a population file to begin  (File → Open…)");
        });
        return;
    }

    kpi_cards(ui, state);
    ui.separator();

    let theme = state.theme;
    ui.columns(3, |cols: &mut [Ui]| {
        cols[0].heading("States Migration");
        cols[0].horizontal(|ui: &mut Ui| {
            charts::donut(ui, "Inbound", INBOUND_PCT, INBOUND_COLOR);
            charts::donut(ui, "Outbound", OUTBOUND_PCT, OUTBOUND_COLOR);
        });

        cols[1].heading("States Migration Overview");
        if let Some(pivot) = &state.pivot {
            charts::heatmap(&mut cols[1], pivot, theme);
        }

        if let Some(view) = &state.year_view {
            cols[2].heading(format!("Top States ({})", view.metrics.year));
            charts::top_states_chart(&mut cols[2], &view.top);
        }
    });

    ui.add_space(8.0);
    export_section(ui, state);

    ui.add_space(8.0);
    ui.separator();
    ui.label(RichText::new("Source: U.S. Census Bureau").small().weak());
    ui.label(
        RichText::new("Gains/Losses: highest and lowest state for the selected year.")
            .small()
            .weak(),
    );
    ui.label(RichText::new("States Migration: demo rings and heatmap.").small().weak());
}

fn kpi_cards(ui: &mut Ui, state: &AppState) {
    ui.strong("Gains / Losses");
    let Some(view) = &state.year_view else {
        return;
    };
    let m = &view.metrics;
    ui.columns(2, |cols: &mut [Ui]| {
        kpi_card(
            &mut cols[0],
            &m.top_state.record.state,
            m.top_state.record.population,
            m.top_state_delta(),
        );
        kpi_card(
            &mut cols[1],
            &m.low_state.record.state,
            m.low_state.record.population,
            m.low_state_delta(),
        );
    });
}

fn kpi_card(ui: &mut Ui, state: &str, population: f64, delta: Option<f64>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(state).size(14.0));
        ui.label(RichText::new(format::millions(population)).size(26.0).strong());
        let color = match delta {
            Some(d) if d < 0.0 => LOSS_COLOR,
            Some(_) => GAIN_COLOR,
            None => ui.visuals().weak_text_color(),
        };
        ui.label(RichText::new(format::delta_thousands(delta)).color(color));
    });
}

fn export_section(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = &state.year_view else {
        return;
    };
    let rows = &view.export.rows;
    let file_name = view.export.file_name();
    let mut download = false;

    egui::CollapsingHeader::new(RichText::new("Show Filtered Data").strong())
        .id_salt("filtered_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .cell_layout(Layout::left_to_right(Align::Center))
                .column(Column::auto().at_least(140.0))
                .column(Column::auto().at_least(40.0))
                .column(Column::auto().at_least(50.0))
                .column(Column::remainder())
                .max_scroll_height(240.0)
                .header(20.0, |mut header| {
                    for title in ["States", "Id", "Year", "Population"] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rows.len(), |mut row| {
                        let r = &rows[row.index()];
                        row.col(|ui: &mut Ui| {
                            ui.label(&r.state);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(r.id.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(r.year.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format::population(r.population));
                        });
                    });
                });

            ui.add_space(4.0);
            if ui.button("Download filtered data as CSV").clicked() {
                download = true;
            }
        });

    if download {
        save_file_dialog(state, &file_name);
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open population data")
        .add_filter("CSV", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.open_path_reporting(&path);
    }
}

fn save_file_dialog(state: &mut AppState, file_name: &str) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
