use super::logging::{LogEntry, push_entry};
use super::models::{ProtprepGui, init_gui_logging};
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// Name of the CLI binary the GUI drives.
pub const CLI_BINARY: &str = "protprep";

/// Locate the CLI: next to the running GUI executable first, then on `PATH`.
pub fn locate_cli() -> PathBuf {
    let file_name = format!("{}{}", CLI_BINARY, std::env::consts::EXE_SUFFIX);
    if let Ok(exe) = std::env::current_exe() {
        let sibling = exe.with_file_name(&file_name);
        if sibling.is_file() {
            return sibling;
        }
    }
    which::which(CLI_BINARY).unwrap_or_else(|_| PathBuf::from(file_name))
}

/// Forward each line from `stream` into the log panel buffer.
fn forward_lines<R: Read>(stream: R) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) => push_entry(LogEntry::from_cli_line(&line)),
            Err(e) => {
                warn!("Stopped reading CLI output: {}", e);
                break;
            }
        }
    }
}

/// Run the CLI to completion, streaming stdout and stderr as they arrive.
/// Sends the exit code (None if killed or never started) when done.
fn run_cli(program: PathBuf, args: Vec<String>, done: Sender<Option<i32>>) {
    let spawned = Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            error!("Failed to start {:?}: {}", program, e);
            let _ = done.send(None);
            return;
        }
    };

    let stderr_reader = child.stderr.take().map(|err| thread::spawn(move || forward_lines(err)));
    if let Some(out) = child.stdout.take() {
        forward_lines(out);
    }
    if let Some(handle) = stderr_reader {
        let _ = handle.join();
    }

    let code = match child.wait() {
        Ok(status) => status.code(),
        Err(e) => {
            error!("Failed waiting for CLI process: {}", e);
            None
        }
    };
    let _ = done.send(code);
}

impl ProtprepGui {
    pub fn select_target_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PDB files", &["pdb", "ent"])
            .pick_file()
        {
            info!("Selected input file: {:?}", path);
            self.target = path.to_string_lossy().into_owned();
        }
    }

    pub fn select_batch_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Text files", &["txt"])
            .pick_file()
        {
            info!("Selected batch file: {:?}", path);
            self.batch_file = Some(path);
        }
    }

    pub fn select_output_directory(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_folder() {
            info!("Selected output directory: {:?}", path);
            self.out_dir = Some(path);
        }
    }

    /// Re-invoke the CLI with the current form on a background thread.
    pub fn process_files(&mut self) {
        if self.is_processing {
            debug!("Processing already in progress, ignoring request");
            return;
        }

        init_gui_logging();
        if !self.has_input() {
            error!("Please enter a PDB ID or select a batch file.");
            return;
        }

        trace!("Starting CLI subprocess");
        self.is_processing = true;
        self.processing_start_time = Some(Instant::now());
        self.last_processing_duration = None;
        self.last_exit_code = None;

        push_entry(LogEntry::new(
            tracing::Level::INFO,
            "--- Processing Started ---".to_string(),
            "gui".to_string(),
        ));
        push_entry(LogEntry::new(
            tracing::Level::INFO,
            self.generate_cli_command(),
            "cli".to_string(),
        ));

        let program = locate_cli();
        let args = self.build_cli_args();
        debug!("CLI program: {:?}", program);
        let (tx, rx) = std::sync::mpsc::channel();

        thread::spawn(move || run_cli(program, args, tx));

        self.completion_receiver = Some(rx);
        info!("Processing started in background thread");
    }

    /// Poll for subprocess completion; called once per frame.
    pub fn poll_completion(&mut self) {
        let Some(receiver) = &self.completion_receiver else {
            return;
        };
        let Ok(code) = receiver.try_recv() else {
            return;
        };

        if let Some(start_time) = self.processing_start_time {
            let duration = start_time.elapsed();
            self.last_processing_duration = Some(duration);
            info!("Processing completed in {:.2?}", duration);
        }
        match code {
            Some(0) => info!("Process finished with return code 0"),
            Some(rc) => warn!("Process finished with return code {}", rc),
            None => warn!("Process terminated without an exit code"),
        }

        self.last_exit_code = code;
        self.is_processing = false;
        self.processing_start_time = None;
        self.completion_receiver = None;
    }
}
