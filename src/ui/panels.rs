use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::{ExportArtifact, ExportFormat};
use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    if let Some(view) = &state.view {
        ui.label(RichText::new(format!("{} transactions selected", view.indices.len())).strong());
        ui.separator();
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = dataset.distinct_values(dim);

                // Show count of selected / total in the header
                let n_selected = state.selection.get(dim).len();
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", dim.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for value in all_values {
                            let mut text = RichText::new(value);
                            if let Some(cm) = state.label_colors.get(&dim) {
                                text = text.color(cm.color_for(value));
                            }

                            let mut checked = state.selection.contains(dim, value);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(dim, value);
                            }
                        }
                    });
            }
        });
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
        });

        ui.separator();

        if let (Some(ds), Some(path)) = (&state.dataset, &state.source) {
            ui.label(format!("{} records from {}", ds.len(), path.display()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::from_rgb(0xE6, 0x7E, 0x22)));
        }
    });
}

// ---------------------------------------------------------------------------
// Export section
// ---------------------------------------------------------------------------

/// Download buttons for the filtered data.
pub fn export_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("💾 Export Filtered Data");

    let today = chrono::Local::now().date_naive();
    let stamp = today.format("%Y-%m-%d").to_string();

    ui.columns(2, |cols| {
        let buttons = [
            (ExportFormat::Csv, format!("⬇ Download CSV ({stamp})")),
            (ExportFormat::Xlsx, format!("📘 Download Excel ({stamp})")),
        ];
        for (col, (format, label)) in cols.iter_mut().zip(buttons) {
            if col.button(label).clicked() {
                let result = state
                    .export(format, today)
                    .and_then(|artifact| save_artifact(&artifact).map(|saved| (artifact, saved)));
                match result {
                    Ok((artifact, true)) => {
                        state.status_message = Some(format!("Saved {}", artifact.file_name));
                    }
                    Ok((_, false)) => {}
                    Err(e) => {
                        log::error!("Export failed: {e:#}");
                        state.status_message = Some(format!("Export failed: {e:#}"));
                    }
                }
            }
        }
    });
}

/// Ask where to save `artifact` and write it. `false` when cancelled.
fn save_artifact(artifact: &ExportArtifact) -> anyhow::Result<bool> {
    let (filter_name, ext) = match artifact.mime {
        "text/csv" => ("CSV", "csv"),
        _ => ("Excel workbook", "xlsx"),
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(&artifact.file_name)
        .add_filter(filter_name, &[ext])
        .save_file()
    else {
        return Ok(false);
    };

    std::fs::write(&path, &artifact.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Exported {} bytes ({}) to {}",
        artifact.bytes.len(),
        artifact.mime,
        path.display()
    );
    Ok(true)
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("TSV", &["tsv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match state.open(&path) {
            Ok(()) => log::info!("Opened {}", path.display()),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                // A working dataset stays on screen; only report the failure.
                if state.dataset.is_some() {
                    state.status_message = Some(format!("Error: {e:#}"));
                } else {
                    state.load_error = Some(format!("{e:#}"));
                }
            }
        }
    }
}
