use super::components::*;
use super::logging::MAX_LOG_ENTRIES;
use super::models::ProtprepGui;
use crate::gui::logging::{LogEntry, get_log_buffer};
use eframe::egui;
use tracing::Level;

fn format_log_entry(entry: &LogEntry) -> egui::RichText {
    // Separators
    if entry.message.starts_with("---") {
        return egui::RichText::new(&entry.message)
            .color(egui::Color32::from_rgb(255, 165, 0))
            .monospace()
            .strong();
    }

    if entry.target == "cli" {
        return egui::RichText::new(&entry.message)
            .color(egui::Color32::from_rgb(100, 255, 100))
            .monospace()
            .strong();
    }

    let color = match entry.level {
        Level::ERROR => egui::Color32::from_rgb(255, 100, 100),
        Level::WARN => egui::Color32::from_rgb(255, 200, 100),
        Level::INFO => egui::Color32::from_rgb(100, 200, 255),
        Level::DEBUG => egui::Color32::from_rgb(150, 150, 150),
        Level::TRACE => egui::Color32::from_rgb(100, 100, 100),
    };

    // Subprocess lines already carry their own timestamp and level.
    let formatted_text = if entry.target == "protprep" {
        entry.message.clone()
    } else {
        format!("[{}] {}: {}", entry.timestamp, entry.level, entry.message)
    };

    egui::RichText::new(formatted_text).color(color).monospace()
}

/// Header text for the package license, read from the crate manifest.
fn license_label() -> String {
    format!("{} License", env!("CARGO_PKG_LICENSE").replace(" OR ", " - "))
}

impl ProtprepGui {
    fn is_visible(&self, entry: &LogEntry) -> bool {
        // TRACE doubles as "ALL"
        self.min_log_level == Level::TRACE || entry.level == self.min_log_level
    }

    /// Move buffered entries into the panel. Returns true if any arrived.
    fn drain_log_buffer(&mut self) -> bool {
        let new_messages: Vec<LogEntry> = match get_log_buffer().lock() {
            Ok(mut buf) => buf.drain(..).collect(),
            Err(_) => return false,
        };
        if new_messages.is_empty() {
            return false;
        }
        if let Ok(mut logs) = self.log_messages.lock() {
            logs.extend(new_messages);
            let len = logs.len();
            if len > MAX_LOG_ENTRIES {
                logs.drain(0..(len - MAX_LOG_ENTRIES));
            }
        }
        true
    }
}

impl eframe::App for ProtprepGui {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(crate::gui::models::init_gui_logging);

        let mut style = (*ctx.style()).clone();
        style.visuals.override_text_color = Some(egui::Color32::from_gray(220));
        style.visuals.widgets.noninteractive.bg_fill = egui::Color32::from_rgb(40, 40, 40);
        style.visuals.widgets.inactive.bg_fill = egui::Color32::from_rgb(50, 50, 50);
        style.visuals.widgets.hovered.bg_fill = egui::Color32::from_rgb(60, 60, 60);
        style.visuals.widgets.active.bg_fill = egui::Color32::from_rgb(70, 70, 70);
        style.visuals.panel_fill = egui::Color32::from_rgb(30, 30, 30);
        style.visuals.window_fill = egui::Color32::from_rgb(25, 25, 25);
        style.visuals.faint_bg_color = egui::Color32::from_rgb(45, 45, 45);
        style.visuals.extreme_bg_color = egui::Color32::from_rgb(20, 20, 20);

        ctx.set_style(style);

        self.poll_completion();
        if self.drain_log_buffer() || self.is_processing {
            ctx.request_repaint();
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new("PROTPREP")
                                .size(42.0)
                                .color(egui::Color32::from_gray(220))
                                .strong(),
                        );
                        ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                            ui.label(
                                egui::RichText::new(format!("v{} ", env!("CARGO_PKG_VERSION")))
                                    .size(10.0)
                                    .color(egui::Color32::WHITE),
                            );
                            ui.label(
                                egui::RichText::new(license_label())
                                    .size(10.0)
                                    .color(egui::Color32::from_gray(150)),
                            );
                        });
                    });
                    ui.label(
                        egui::RichText::new("PROTEIN STRUCTURE PREPARATION")
                            .size(12.0)
                            .color(egui::Color32::from_gray(220))
                            .strong(),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_enabled_ui(!self.is_processing, |ui| {
                        if ui
                            .button(
                                egui::RichText::new("Run")
                                    .size(16.0)
                                    .color(egui::Color32::WHITE),
                            )
                            .clicked()
                        {
                            self.process_files();
                        }
                    });
                });
            });
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            FooterComponent::render(ui, self);
        });

        egui::SidePanel::left("left_panel")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::AlwaysHidden)
                    .show(ui, |ui| {
                        ui.add_space(10.0);

                        TargetSelectionComponent::render(ui, self);

                        ui.separator();

                        FilterOptionsComponent::render(ui, self);

                        ui.separator();

                        ToolkitOptionsComponent::render(ui, self);

                        ui.add_space(20.0);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Log Output");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.selectable_value(&mut self.min_log_level, Level::ERROR, "ERROR");
                    ui.selectable_value(&mut self.min_log_level, Level::WARN, "WARN");
                    ui.selectable_value(&mut self.min_log_level, Level::INFO, "INFO");
                    ui.selectable_value(&mut self.min_log_level, Level::DEBUG, "DEBUG");
                    ui.selectable_value(&mut self.min_log_level, Level::TRACE, "ALL");
                });

                if let Ok(logs) = self.log_messages.lock() {
                    let total_logs = logs.len();
                    let visible_logs = logs.iter().filter(|entry| self.is_visible(entry)).count();
                    if total_logs > 0 {
                        ui.label(format!("({} visible / {} total)", visible_logs, total_logs));
                    }
                }
            });

            ui.add_space(5.0);

            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 40.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if let Ok(logs) = self.log_messages.lock() {
                        if logs.is_empty() {
                            ui.centered_and_justified(|ui| {
                                ui.label(
                                    egui::RichText::new("No log messages")
                                        .color(egui::Color32::from_gray(120)),
                                );
                            });
                        } else {
                            for entry in logs.iter().filter(|entry| self.is_visible(entry)) {
                                ui.label(format_log_entry(entry));
                            }
                        }
                    }
                });
        });
    }
}
