//! High-level, ergonomic library API: resolve targets, prepare a single
//! structure, and run a batch end to end with a JSON run log. Prefer these
//! entrypoints over the low-level `core` and `io` modules when integrating
//! PROTPREP.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::core::filter::clean_structure_file;
use crate::core::params::PrepParams;
use crate::error::{Error, Result};
use crate::io::fetch::{RcsbFetcher, StructureFetcher, is_valid_pdb_id};
use crate::io::report::{PreparedTarget, TargetReport, write_run_log};
use crate::io::toolkit::Toolkit;
use crate::types::TargetSource;

/// A target resolved to a concrete structure file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub label: String,
    pub path: PathBuf,
    pub source: TargetSource,
}

/// Output file locations derived from a target label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    pub cleaned: PathBuf,
    pub added_h: PathBuf,
    pub pdbqt: PathBuf,
}

impl TargetPaths {
    pub fn new(out_dir: &Path, label: &str) -> Self {
        Self {
            cleaned: out_dir.join(format!("{}_clean.pdb", label)),
            added_h: out_dir.join(format!("{}_added_h.pdb", label)),
            pdbqt: out_dir.join(format!("{}.pdbqt", label)),
        }
    }
}

/// Resolve `target` to a file: an existing local file is used as-is, otherwise
/// it must be a 4-character PDB ID which is downloaded into `out_dir`.
///
/// Anything else fails before any download is attempted.
pub fn resolve_target(
    target: &str,
    out_dir: &Path,
    fetcher: &dyn StructureFetcher,
) -> Result<ResolvedTarget> {
    let local = Path::new(target);
    if local.is_file() {
        let label = local
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| Error::invalid_target(target))?;
        return Ok(ResolvedTarget {
            label,
            path: local.to_path_buf(),
            source: TargetSource::Local,
        });
    }

    if !is_valid_pdb_id(target) {
        return Err(Error::invalid_target(target));
    }

    let label = target.to_ascii_uppercase();
    let path = out_dir.join(format!("{}.pdb", label));
    fetcher.fetch(&label, &path)?;
    Ok(ResolvedTarget {
        label,
        path,
        source: TargetSource::Remote,
    })
}

/// Read a newline-separated list of targets, skipping blank lines.
pub fn read_batch_file(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(Error::BatchFileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Run one target through resolve → clean → [add hydrogens] → [convert].
///
/// A non-zero hydrogen-addition exit keeps the cleaned file as input for the
/// conversion step. Tool failures never fail the target.
pub fn prepare_target(
    target: &str,
    params: &PrepParams,
    toolkit: &Toolkit,
    fetcher: &dyn StructureFetcher,
) -> Result<PreparedTarget> {
    let resolved = resolve_target(target, &params.out_dir, fetcher)?;
    let paths = TargetPaths::new(&params.out_dir, &resolved.label);

    let removed = clean_structure_file(&resolved.path, &paths.cleaned, &params.filter)?;
    let mut prepared = paths.cleaned.clone();

    let add_hydrogens = if params.add_hydrogens {
        if toolkit.is_available() {
            info!("[OBABEL] Adding hydrogens to {:?} -> {:?}", prepared, paths.added_h);
        }
        let outcome = toolkit.add_hydrogens(&prepared, &paths.added_h);
        match outcome.run() {
            Some(run) if run.success() => prepared = paths.added_h.clone(),
            Some(run) => warn!(
                "OpenBabel returned non-zero exit ({}) during hydrogen addition; continuing with {:?}",
                run.rc, prepared
            ),
            None => warn!("Skipping hydrogen addition for {}: OpenBabel not available", resolved.label),
        }
        Some(outcome)
    } else {
        None
    };

    let pdbqt = if params.convert_pdbqt {
        if toolkit.is_available() {
            info!("[OBABEL] Converting {:?} -> {:?}", prepared, paths.pdbqt);
        }
        let outcome = toolkit.convert_to_pdbqt(&prepared, &paths.pdbqt);
        match outcome.run() {
            Some(run) if run.success() => prepared = paths.pdbqt.clone(),
            Some(run) => warn!("OpenBabel returned non-zero exit ({}) during PDBQT conversion", run.rc),
            None => warn!("Skipping PDBQT conversion for {}: OpenBabel not available", resolved.label),
        }
        Some(outcome)
    } else {
        None
    };

    Ok(PreparedTarget {
        label: resolved.label,
        source: resolved.source,
        fetched: resolved.path,
        cleaned: paths.cleaned,
        removed,
        add_hydrogens,
        pdbqt,
        prepared,
    })
}

/// Prepare one target and turn any failure into an error report.
pub fn process_target(
    target: &str,
    params: &PrepParams,
    toolkit: &Toolkit,
    fetcher: &dyn StructureFetcher,
) -> TargetReport {
    match prepare_target(target, params, toolkit, fetcher) {
        Ok(prepared) => {
            info!("[DONE] {}", prepared.label);
            TargetReport::prepared(target, prepared)
        }
        Err(e) => {
            error!("[ERROR] processing {}: {}", target, e);
            TargetReport::failed(target, e)
        }
    }
}

/// Succeeded/failed counts for a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Reports for every target plus where the run log was written.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub reports: Vec<TargetReport>,
    pub log_path: PathBuf,
    pub summary: BatchSummary,
}

/// Process `targets` strictly in order and write the run log once at the end.
///
/// Per-target failures are recorded and do not stop the batch. Only failing to
/// create the output directory or to write the log is an error.
pub fn run_batch(
    targets: &[String],
    params: &PrepParams,
    toolkit: &Toolkit,
    fetcher: &dyn StructureFetcher,
) -> Result<RunOutcome> {
    fs::create_dir_all(&params.out_dir)?;
    info!("Output directory: {:?}", params.out_dir);

    let mut reports = Vec::with_capacity(targets.len());
    let mut summary = BatchSummary::default();
    for target in targets {
        let report = process_target(target.trim(), params, toolkit, fetcher);
        if report.is_success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        reports.push(report);
    }

    let log_path = write_run_log(&params.out_dir, &reports)?;
    info!(
        "Batch processing complete! Succeeded: {}, Failed: {}",
        summary.succeeded, summary.failed
    );

    Ok(RunOutcome {
        reports,
        log_path,
        summary,
    })
}

/// Toolkit for a run: probed (and installed if allowed) only when a tool
/// step was requested.
pub fn select_toolkit(params: &PrepParams) -> Toolkit {
    if params.needs_toolkit() {
        Toolkit::probe_or_install(params.auto_install)
    } else {
        Toolkit::unavailable()
    }
}

/// Select the toolkit and run the batch against RCSB.
pub fn run(targets: &[String], params: &PrepParams) -> Result<RunOutcome> {
    let toolkit = select_toolkit(params);
    let fetcher = RcsbFetcher::new(params.fetch);
    run_batch(targets, params, &toolkit, &fetcher)
}
