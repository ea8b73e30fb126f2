use super::models::ProtprepGui;
use eframe::egui::{Align, Color32, Frame, Layout, RichText, Ui};

const COMPONENT_HEIGHT: f32 = 80.0;
const COMPONENT_WIDTH: f32 = 120.0;

fn hint(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(Color32::from_gray(120)).size(11.0));
}

fn path_label(ui: &mut Ui, path: Option<&std::path::Path>, empty: &str) {
    match path {
        Some(path) => {
            ui.label(RichText::new(path.to_string_lossy()).color(Color32::from_rgb(255, 165, 0)));
        }
        None => {
            ui.label(RichText::new(empty).color(Color32::from_gray(120)));
        }
    }
}

pub struct TargetSelectionComponent;

impl TargetSelectionComponent {
    pub fn render(ui: &mut Ui, app: &mut ProtprepGui) {
        ui.heading("Targets");

        Frame::NONE.inner_margin(0.0).show(ui, |ui| {
            ui.set_min_height(COMPONENT_HEIGHT);
            ui.set_min_width(COMPONENT_WIDTH);

            ui.horizontal(|ui| {
                ui.label("PDB ID or file:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Browse").clicked() {
                        app.select_target_file();
                    }
                });
            });
            ui.text_edit_singleline(&mut app.target);

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("Batch file:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if app.batch_file.is_some() && ui.button("Clear").clicked() {
                        app.batch_file = None;
                    }
                    if ui.button("Browse").clicked() {
                        app.select_batch_file();
                    }
                });
            });
            path_label(ui, app.batch_file.as_deref(), "None selected");
            if app.batch_file.is_some() {
                hint(ui, "Batch entries replace the single target.");
            }

            ui.add_space(10.0);

            ui.horizontal(|ui| {
                ui.label("Output folder:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Browse").clicked() {
                        app.select_output_directory();
                    }
                });
            });
            path_label(ui, app.out_dir.as_deref(), "Current directory");
        });
    }
}

pub struct FilterOptionsComponent;

impl FilterOptionsComponent {
    pub fn render(ui: &mut Ui, app: &mut ProtprepGui) {
        ui.heading("Cleaning");

        Frame::NONE.inner_margin(0.0).show(ui, |ui| {
            ui.set_min_height(COMPONENT_HEIGHT);
            ui.set_min_width(COMPONENT_WIDTH);

            ui.checkbox(&mut app.remove_waters, "Remove waters");
            ui.checkbox(&mut app.remove_hetero, "Remove heteroatoms");

            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.label("Keep chains:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.text_edit_singleline(&mut app.keep_chains);
                });
            });
            hint(ui, "Comma separated, e.g. A,C. Empty keeps all chains.");

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.label("Keep ligands:");
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.text_edit_singleline(&mut app.keep_ligands);
                });
            });
            hint(ui, "Residue names kept despite heteroatom removal, e.g. NAD,HEM.");
        });
    }
}

pub struct ToolkitOptionsComponent;

impl ToolkitOptionsComponent {
    pub fn render(ui: &mut Ui, app: &mut ProtprepGui) {
        ui.heading("Open Babel");

        Frame::NONE.inner_margin(0.0).show(ui, |ui| {
            ui.set_min_height(COMPONENT_HEIGHT * 0.6);
            ui.set_min_width(COMPONENT_WIDTH);

            ui.checkbox(&mut app.add_hydrogens, "Add hydrogens");
            hint(ui, "Adds hydrogens only; no protonation state prediction.");
            ui.checkbox(&mut app.pdbqt, "Convert to PDBQT");
            ui.checkbox(&mut app.no_install, "Do not auto-install Open Babel");
            ui.checkbox(&mut app.verbose, "Verbose log");
        });
    }
}

pub struct FooterComponent;

impl FooterComponent {
    pub fn render(ui: &mut Ui, app: &mut ProtprepGui) {
        ui.horizontal(|ui| {
            let status_color = if app.is_processing {
                Color32::from_rgb(255, 165, 0)
            } else if matches!(app.last_exit_code, Some(rc) if rc != 0) {
                Color32::from_rgb(255, 100, 100)
            } else {
                Color32::from_rgb(100, 200, 100)
            };

            let timing_text = if app.is_processing {
                match app.processing_start_time {
                    Some(start_time) => format!("Processing: {:.2?}", start_time.elapsed()),
                    None => "Processing...".to_string(),
                }
            } else if let Some(duration) = app.last_processing_duration {
                match app.last_exit_code {
                    Some(rc) => format!("Last run: {:.2?} (exit {})", duration, rc),
                    None => format!("Last run: {:.2?}", duration),
                }
            } else {
                "Ready".to_string()
            };

            ui.label(RichText::new(timing_text).color(status_color).size(14.0));

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("To CLI").clicked() {
                    let cli_entry = crate::gui::logging::LogEntry::new(
                        tracing::Level::INFO,
                        format!("CLI Command: {}", app.generate_cli_command()),
                        "cli".to_string(),
                    );
                    if let Ok(mut logs) = app.log_messages.lock() {
                        logs.push(cli_entry);
                    }
                }

                if ui.button("Save Preset").clicked() {
                    if let Err(e) = app.save_preset() {
                        tracing::error!("Failed to save preset: {}", e);
                    }
                }

                if ui.button("Load Preset").clicked() {
                    if let Err(e) = app.load_preset() {
                        tracing::error!("Failed to load preset: {}", e);
                    }
                }

                if ui.button("Save Logs").clicked() {
                    if let Err(e) = app.save_logs_to_file() {
                        tracing::error!("Failed to save logs: {}", e);
                    }
                }

                if ui.button("Clear").clicked() {
                    if let Ok(mut logs) = app.log_messages.lock() {
                        logs.clear();
                    }
                }

                if ui.add_enabled(!app.is_processing, eframe::egui::Button::new("Reset")).clicked() {
                    *app = ProtprepGui::default();
                }
            });
        });
    }
}
