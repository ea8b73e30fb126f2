use crate::core::params::FilterConfig;
use crate::gui::logging::{GuiLogLayer, LogEntry};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

static LOGGING_INIT: OnceCell<()> = OnceCell::new();

pub fn init_gui_logging() {
    LOGGING_INIT.get_or_init(|| {
        let gui_layer = GuiLogLayer::new();

        // Keep eframe/winit internals out of the log panel.
        let filter = EnvFilter::new("info,protprep=debug");

        let subscriber = Registry::default().with(gui_layer).with(filter);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Filter and toolkit options saved in `.protprep` preset files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtprepPreset {
    pub filter: FilterConfig,
    pub add_hydrogens: bool,
    pub pdbqt: bool,
    pub no_install: bool,
}

pub struct ProtprepGui {
    // Input parameters
    pub target: String,
    pub batch_file: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,

    // Filter parameters
    pub remove_waters: bool,
    pub remove_hetero: bool,
    pub keep_chains: String,
    pub keep_ligands: String,

    // Toolkit options
    pub add_hydrogens: bool,
    pub pdbqt: bool,
    pub no_install: bool,
    pub verbose: bool,

    pub min_log_level: Level,

    // Status
    pub is_processing: bool,
    pub processing_start_time: Option<Instant>,
    pub last_processing_duration: Option<Duration>,
    pub last_exit_code: Option<i32>,

    pub log_messages: Arc<Mutex<Vec<LogEntry>>>,

    // Exit status of the CLI subprocess, sent by the background thread
    pub completion_receiver: Option<Receiver<Option<i32>>>,
}

impl Default for ProtprepGui {
    fn default() -> Self {
        Self {
            target: String::new(),
            batch_file: None,
            out_dir: None,
            remove_waters: true,
            remove_hetero: true,
            keep_chains: String::new(),
            keep_ligands: String::new(),
            add_hydrogens: false,
            pdbqt: false,
            no_install: false,
            verbose: false,
            min_log_level: Level::TRACE,
            is_processing: false,
            processing_start_time: None,
            last_processing_duration: None,
            last_exit_code: None,
            log_messages: Arc::new(Mutex::new(Vec::new())),
            completion_receiver: None,
        }
    }
}

impl ProtprepGui {
    /// True when there is something to run.
    pub fn has_input(&self) -> bool {
        !self.target.trim().is_empty() || self.batch_file.is_some()
    }

    /// Argument vector for the `protprep` CLI equivalent to the current form.
    pub fn build_cli_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(batch) = &self.batch_file {
            args.push("--batch-file".to_string());
            args.push(batch.to_string_lossy().into_owned());
        } else if !self.target.trim().is_empty() {
            args.push(self.target.trim().to_string());
        }

        if let Some(out_dir) = &self.out_dir {
            args.push("--out-dir".to_string());
            args.push(out_dir.to_string_lossy().into_owned());
        }

        if !self.remove_waters {
            args.push("--no-remove-waters".to_string());
        }
        if !self.remove_hetero {
            args.push("--no-remove-hetero".to_string());
        }
        if !self.keep_chains.trim().is_empty() {
            args.push("--keep-chains".to_string());
            args.push(self.keep_chains.trim().to_string());
        }
        if !self.keep_ligands.trim().is_empty() {
            args.push("--keep-ligands".to_string());
            args.push(self.keep_ligands.trim().to_string());
        }
        if self.add_hydrogens {
            args.push("--add-hydrogens".to_string());
        }
        if self.pdbqt {
            args.push("--pdbqt".to_string());
        }
        if self.no_install {
            args.push("--no-install".to_string());
        }
        if self.verbose {
            args.push("--log".to_string());
        }

        args
    }

    /// Shell-style rendering of the CLI invocation, for display.
    pub fn generate_cli_command(&self) -> String {
        let mut cmd = String::from("protprep");
        for arg in self.build_cli_args() {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                cmd.push_str(&format!(" {:?}", arg));
            } else {
                cmd.push(' ');
                cmd.push_str(&arg);
            }
        }
        cmd
    }

    pub fn preset(&self) -> ProtprepPreset {
        ProtprepPreset {
            filter: FilterConfig::from_lists(
                self.remove_waters,
                self.remove_hetero,
                Some(self.keep_chains.as_str()),
                Some(self.keep_ligands.as_str()),
            ),
            add_hydrogens: self.add_hydrogens,
            pdbqt: self.pdbqt,
            no_install: self.no_install,
        }
    }

    pub fn apply_preset(&mut self, preset: ProtprepPreset) {
        let join = |set: &std::collections::BTreeSet<String>| {
            set.iter().cloned().collect::<Vec<_>>().join(",")
        };
        self.remove_waters = preset.filter.remove_waters();
        self.remove_hetero = preset.filter.remove_hetero();
        self.keep_chains = preset.filter.keep_chains().map(join).unwrap_or_default();
        self.keep_ligands = join(preset.filter.keep_ligands());
        self.add_hydrogens = preset.add_hydrogens;
        self.pdbqt = preset.pdbqt;
        self.no_install = preset.no_install;
    }

    pub fn save_logs_to_file(&self) -> Result<(), Box<dyn std::error::Error>> {
        let logs = self
            .log_messages
            .lock()
            .map_err(|e| format!("Failed to lock logs: {}", e))?;

        if logs.is_empty() {
            return Err("No logs to save".into());
        }

        if let Some(save_path) = rfd::FileDialog::new()
            .add_filter("Log files", &["log", "txt"])
            .set_file_name("protprep_gui.log")
            .save_file()
        {
            let mut log_content = String::new();
            log_content.push_str("=== PROTPREP Log File ===\n");
            log_content.push_str(&format!("Generated: {}\n", chrono::Local::now().to_rfc3339()));
            log_content.push_str(&format!("Total Logs: {}\n", logs.len()));
            log_content.push_str("=========================\n\n");

            for entry in logs.iter() {
                log_content.push_str(&format!(
                    "[{}] {} {}: {}\n",
                    entry.timestamp, entry.level, entry.target, entry.message
                ));
            }

            fs::write(&save_path, log_content)?;
            tracing::info!("Logs saved to: {:?} ({} entries)", save_path, logs.len());
            Ok(())
        } else {
            Err("No save location selected".into())
        }
    }

    pub fn save_preset(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(save_path) = rfd::FileDialog::new()
            .add_filter("PROTPREP Preset files", &["protprep"])
            .set_file_name("preset.protprep")
            .save_file()
        {
            let mut preset_content = String::new();
            preset_content.push_str("// PROTPREP Configuration Preset\n");
            preset_content.push_str(&format!("// Version: {}\n", env!("CARGO_PKG_VERSION")));
            preset_content.push_str(&format!(
                "// Generated: {}\n",
                chrono::Local::now().to_rfc3339()
            ));
            preset_content.push_str("// Note: targets and output folder are not included\n\n");
            preset_content.push_str(&serde_json::to_string_pretty(&self.preset())?);

            fs::write(&save_path, preset_content)?;
            tracing::info!("Preset saved to: {:?}", save_path);
            Ok(())
        } else {
            Err("No save location selected".into())
        }
    }

    pub fn load_preset(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(load_path) = rfd::FileDialog::new()
            .add_filter("PROTPREP Preset files", &["protprep"])
            .pick_file()
        {
            let content = fs::read_to_string(&load_path)?;
            self.apply_preset(parse_preset(&content)?);
            tracing::info!("Preset loaded from: {:?}", load_path);
            Ok(())
        } else {
            Err("No preset file selected".into())
        }
    }
}

/// Parse a preset file, skipping the comment header before the first `{`.
pub fn parse_preset(content: &str) -> Result<ProtprepPreset, Box<dyn std::error::Error>> {
    let json_start = content
        .find('{')
        .ok_or("Invalid preset file: no JSON content found")?;
    Ok(serde_json::from_str(&content[json_start..])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_form_runs_single_target() {
        let gui = ProtprepGui {
            target: " 1a4w ".into(),
            ..Default::default()
        };
        assert_eq!(gui.build_cli_args(), vec!["1a4w"]);
        assert_eq!(gui.generate_cli_command(), "protprep 1a4w");
    }

    #[test]
    fn batch_file_takes_precedence_and_flags_map_to_cli() {
        let gui = ProtprepGui {
            target: "1a4w".into(),
            batch_file: Some(PathBuf::from("ids.txt")),
            out_dir: Some(PathBuf::from("my out")),
            remove_waters: false,
            keep_chains: "A,C".into(),
            add_hydrogens: true,
            pdbqt: true,
            ..Default::default()
        };
        assert_eq!(
            gui.build_cli_args(),
            vec![
                "--batch-file",
                "ids.txt",
                "--out-dir",
                "my out",
                "--no-remove-waters",
                "--keep-chains",
                "A,C",
                "--add-hydrogens",
                "--pdbqt",
            ]
        );
        assert!(gui.generate_cli_command().contains("--out-dir \"my out\""));
    }

    #[test]
    fn preset_round_trip_through_text() {
        let gui = ProtprepGui {
            remove_hetero: false,
            keep_chains: "b, a".into(),
            keep_ligands: "hem".into(),
            pdbqt: true,
            ..Default::default()
        };
        let text = format!(
            "// header\n{}",
            serde_json::to_string_pretty(&gui.preset()).unwrap()
        );

        let mut loaded = ProtprepGui::default();
        loaded.apply_preset(parse_preset(&text).unwrap());
        assert!(!loaded.remove_hetero);
        assert_eq!(loaded.keep_chains, "A,B");
        assert_eq!(loaded.keep_ligands, "HEM");
        assert!(loaded.pdbqt);
    }
}
