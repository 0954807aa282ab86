use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Granularity};

// ---------------------------------------------------------------------------
// Left side panel – navigation and selection widgets
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Navigation");
    ui.separator();

    // ---- Page selector ----
    let mut page = state.page;
    for key in state.catalog.keys() {
        ui.radio_value(&mut page, key, key.label());
    }
    state.select_page(page);
    ui.separator();

    // ---- Year selector ----
    ui.strong("Select Year");
    let mut filter = state.filter;
    egui::ComboBox::from_id_salt("year_filter")
        .selected_text(filter.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for option in state.filter_options() {
                ui.selectable_value(&mut filter, option, option.to_string());
            }
        });
    state.select_filter(filter);

    // ---- Granularity ----
    ui.add_space(4.0);
    ui.strong("Resolution");
    let mut granularity = state.granularity;
    ui.horizontal(|ui: &mut Ui| {
        for g in Granularity::ALL {
            ui.radio_value(&mut granularity, g, g.label());
        }
    });
    state.select_granularity(granularity);
    ui.separator();

    let Some(out) = &state.output else {
        ui.label("No dataset loaded.");
        return;
    };

    // ---- Series legend ----
    if let Some(colors) = &state.colors {
        ui.strong("Series");
        for (name, color) in colors.legend_entries() {
            ui.label(RichText::new(format!("━ {name}")).color(*color));
        }
        ui.separator();
    }

    // ---- Detail-table column picker ----
    let columns: Vec<String> = out.filtered.columns().into_iter().map(str::to_string).collect();
    let visible = state.visible_columns();
    let mut toggled = None;

    egui::CollapsingHeader::new(RichText::new("Table columns").strong())
        .id_salt("table_columns")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    for col in &columns {
                        let mut checked = visible.contains(col);
                        if ui.checkbox(&mut checked, col.as_str()).changed() {
                            toggled = Some(col.clone());
                        }
                    }
                });
        });

    if let Some(col) = toggled {
        state.toggle_table_column(&col);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.refresh();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.data_dir.display()));

        if let Some(out) = &state.output {
            ui.separator();
            ui.label(format!(
                "{} rows loaded, {} shown, {} buckets",
                out.total_rows,
                out.filtered.len(),
                out.resampled.len()
            ));
        }

        let messages = [&state.catalog_error, &state.status_message];
        for msg in messages.into_iter().flatten() {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Page heading above the chart.
pub fn page_title(ui: &mut Ui, state: &AppState) {
    let title = state
        .current_spec()
        .map(|s| s.title.clone())
        .unwrap_or_else(|| format!("{} Data", state.page));
    ui.heading(title);
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open energy data folder")
        .set_directory(&state.data_dir)
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Switching data folder to {}", path.display());
        state.set_data_dir(path);
    }
}
