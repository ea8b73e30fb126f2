//! Open Babel command-line integration.
//!
//! The toolkit is probed once per run and handed to the pipeline as a
//! [`Toolkit`] value. Both operations capture combined output and the exit
//! code; a non-zero exit is data for the caller, not an error.
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Executable names probed in order.
pub const OBABEL_EXECUTABLES: [&str; 2] = ["obabel", "babel"];

/// Skip reason recorded when the toolkit is missing.
pub const UNAVAILABLE_REASON: &str = "OpenBabel not available";

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRun {
    pub cmd: String,
    /// Process exit code; -1 if the process could not be started or was killed by a signal
    pub rc: i32,
    /// Standard output followed by standard error
    pub output: String,
}

impl ToolRun {
    pub fn success(&self) -> bool {
        self.rc == 0
    }
}

/// Result of an optional toolkit step in a target report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Ran(ToolRun),
    Skipped(String),
}

impl StepOutcome {
    pub fn run(&self) -> Option<&ToolRun> {
        match self {
            StepOutcome::Ran(run) => Some(run),
            StepOutcome::Skipped(_) => None,
        }
    }
}

/// External chemistry toolkit capability, selected once at run start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toolkit {
    Available { exe: PathBuf },
    Unavailable { reason: String },
}

/// Look up the first Open Babel executable on `PATH`.
pub fn find_obabel() -> Option<PathBuf> {
    OBABEL_EXECUTABLES
        .iter()
        .find_map(|name| which::which(name).ok())
}

impl Toolkit {
    pub fn probe() -> Self {
        match find_obabel() {
            Some(exe) => {
                debug!("Found Open Babel at {:?}", exe);
                Toolkit::Available { exe }
            }
            None => Toolkit::unavailable(),
        }
    }

    pub fn unavailable() -> Self {
        Toolkit::Unavailable {
            reason: UNAVAILABLE_REASON.to_string(),
        }
    }

    /// Probe, and if missing try a best-effort install before probing again.
    pub fn probe_or_install(auto_install: bool) -> Self {
        let toolkit = Self::probe();
        if toolkit.is_available() {
            return toolkit;
        }
        if !auto_install {
            warn!("OpenBabel CLI not found. Hydrogen addition / PDBQT will be skipped.");
            return toolkit;
        }

        warn!("OpenBabel CLI not found. Will try automatic install (may fail).");
        if try_install_openbabel() {
            info!("OpenBabel appears installed.");
            Self::probe()
        } else {
            warn!("OpenBabel not installed. Hydrogen addition / PDBQT will be skipped.");
            toolkit
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Toolkit::Available { .. })
    }

    /// Add hydrogens: `<exe> <src> -O <dst> -h`.
    pub fn add_hydrogens(&self, src: &Path, dst: &Path) -> StepOutcome {
        self.run(src, dst, &["-h"])
    }

    /// Convert to PDBQT: `<exe> <src> -O <dst>`.
    pub fn convert_to_pdbqt(&self, src: &Path, dst: &Path) -> StepOutcome {
        self.run(src, dst, &[])
    }

    fn run(&self, src: &Path, dst: &Path, flags: &[&str]) -> StepOutcome {
        match self {
            Toolkit::Available { exe } => {
                let mut args = vec![
                    src.as_os_str().to_owned(),
                    "-O".into(),
                    dst.as_os_str().to_owned(),
                ];
                args.extend(flags.iter().map(|f| (*f).into()));
                StepOutcome::Ran(run_captured(exe, &args))
            }
            Toolkit::Unavailable { reason } => StepOutcome::Skipped(reason.clone()),
        }
    }
}

/// Run a command to completion, capturing stdout then stderr.
pub fn run_captured<P, A>(program: P, args: &[A]) -> ToolRun
where
    P: AsRef<OsStr>,
    A: AsRef<OsStr>,
{
    let program = program.as_ref();
    let cmd = std::iter::once(program)
        .chain(args.iter().map(|a| AsRef::<OsStr>::as_ref(a)))
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running: {}", cmd);

    match Command::new(program).args(args).output() {
        Ok(out) => {
            let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            ToolRun {
                cmd,
                rc: out.status.code().unwrap_or(-1),
                output,
            }
        }
        Err(e) => ToolRun {
            cmd,
            rc: -1,
            output: format!("Failed to start process: {}", e),
        },
    }
}

/// Best-effort install: conda (conda-forge) first, then pip `openbabel-wheel`.
///
/// Returns true when Open Babel is found on `PATH` afterwards. May need
/// privileges and is not guaranteed to work.
pub fn try_install_openbabel() -> bool {
    info!("[INSTALL] Attempting to install OpenBabel (conda -> pip fallback)...");

    if let Ok(conda) = which::which("conda") {
        let run = run_captured(&conda, &["install", "-c", "conda-forge", "openbabel", "-y"]);
        if run.success() {
            if find_obabel().is_some() {
                return true;
            }
        } else {
            warn!("Conda install failed (rc={}): {}", run.rc, run.output.trim());
        }
    }

    let python = ["python3", "python"]
        .iter()
        .find_map(|name| which::which(name).ok());
    match python {
        Some(python) => {
            let run = run_captured(&python, &["-m", "pip", "install", "openbabel-wheel"]);
            if run.success() {
                return find_obabel().is_some();
            }
            warn!("pip install openbabel-wheel failed (rc={}): {}", run.rc, run.output.trim());
        }
        None => warn!("No Python interpreter found for pip fallback"),
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_toolkit_skips_both_steps() {
        let tk = Toolkit::unavailable();
        let src = Path::new("in.pdb");
        let dst = Path::new("out.pdb");
        assert_eq!(
            tk.add_hydrogens(src, dst),
            StepOutcome::Skipped(UNAVAILABLE_REASON.to_string())
        );
        assert_eq!(
            tk.convert_to_pdbqt(src, dst),
            StepOutcome::Skipped(UNAVAILABLE_REASON.to_string())
        );
    }

    #[test]
    fn missing_executable_reports_failure_instead_of_erroring() {
        let tk = Toolkit::Available {
            exe: PathBuf::from("/nonexistent/protprep-obabel"),
        };
        let outcome = tk.add_hydrogens(Path::new("a.pdb"), Path::new("b.pdb"));
        let run = outcome.run().expect("step should have run");
        assert_eq!(run.rc, -1);
        assert!(!run.success());
        assert_eq!(run.cmd, "/nonexistent/protprep-obabel a.pdb -O b.pdb -h");
    }

    #[cfg(unix)]
    #[test]
    fn captures_exit_code_and_combined_output() {
        let run = run_captured("sh", &["-c", "echo out; echo err 1>&2; exit 3"]);
        assert_eq!(run.rc, 3);
        assert_eq!(run.output, "out\nerr\n");
        assert_eq!(run.cmd, "sh -c echo out; echo err 1>&2; exit 3");
    }

    #[test]
    fn step_outcome_serializes_externally_tagged() {
        let skipped = serde_json::to_value(StepOutcome::Skipped("x".into())).unwrap();
        assert_eq!(skipped, serde_json::json!({"skipped": "x"}));
    }
}
