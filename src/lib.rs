#![doc = r#"
PROTPREP: fetch, clean and prepare PDB protein structures for docking.

This crate downloads structures from RCSB by 4-character PDB ID (or takes local
files), strips waters, heteroatoms and unwanted chains with a fixed-column text
filter, and optionally hands the result to Open Babel for hydrogen addition and
PDBQT conversion. It powers both the `protprep` CLI and the `protprepUI` GUI.

Requirements
------------
- Rust 2024 edition toolchain.
- Optional: Open Babel (`obabel` or `babel`) on `PATH` for the hydrogen and
  PDBQT steps. Without it those steps are skipped and recorded as such.

Quick start: clean a local file
-------------------------------
```rust,no_run
use std::path::Path;
use protprep::{FilterConfig, clean_structure_file};

fn main() -> protprep::Result<()> {
    let filter = FilterConfig::from_lists(true, true, Some("A"), Some("HEM"));
    let removed = clean_structure_file(
        Path::new("1a4w.pdb"),
        Path::new("1a4w_clean.pdb"),
        &filter,
    )?;
    println!("waters={} hetero={} chains={}", removed.waters, removed.hetero_residues, removed.skipped_chains);
    Ok(())
}
```

Batch run with a JSON log
-------------------------
```rust,no_run
use std::path::PathBuf;
use protprep::{PrepParams, run};

fn main() -> protprep::Result<()> {
    let params = PrepParams {
        add_hydrogens: true,
        convert_pdbqt: true,
        out_dir: PathBuf::from("prepared"),
        ..PrepParams::default()
    };
    let outcome = run(&["1a4w".to_string(), "4hhb".to_string()], &params)?;
    println!("log written to {:?}", outcome.log_path);
    Ok(())
}
```

Error handling
--------------
All public functions return `protprep::Result<T>`. Within a batch, per-target
errors are captured in the target's report instead of being returned.

```rust,no_run
use std::path::Path;
use protprep::{Error, FilterConfig, clean_structure_file};

fn main() {
    match clean_structure_file(Path::new("in.pdb"), Path::new("out.pdb"), &FilterConfig::default()) {
        Ok(summary) => println!("{summary:?}"),
        Err(Error::EmptyResult { input }) => eprintln!("nothing survived filtering in {input:?}"),
        Err(other) => eprintln!("error: {other}"),
    }
}
```

Feature flags
-------------
- `gui`: builds the GUI module and the `protprepUI` binary.
- `full`: enables the complete feature set.

Useful modules
--------------
- [`api`]: resolve, prepare and batch entry points.
- [`core`]: filter configuration and the record filter.
- [`io`]: RCSB fetcher, Open Babel toolkit, run log.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// GUI module (only available with gui feature)
#[cfg(feature = "gui")]
pub mod gui;

// Curated public API surface
pub use core::filter::{RemovalSummary, clean_structure_file, filter_records};
pub use core::params::{FilterConfig, PrepParams};
pub use error::{Error, Result};
pub use types::{RecordKind, TargetSource, WATER_RESIDUES};

pub use io::{
    FetchConfig, FetchError, PreparedTarget, RcsbFetcher, StepOutcome, StructureFetcher,
    TargetOutcome, TargetReport, ToolRun, Toolkit, read_run_log, write_run_log,
};

pub use api::{
    BatchSummary, ResolvedTarget, RunOutcome, TargetPaths, prepare_target, process_target,
    read_batch_file, resolve_target, run, run_batch, select_toolkit,
};
