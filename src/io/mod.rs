//! I/O layer: RCSB downloads (`fetch`), Open Babel invocation (`toolkit`)
//! the JSON run log (`report`) and temp-file staging (`staging`).
pub mod fetch;
pub use fetch::{FetchConfig, FetchError, RcsbFetcher, StructureFetcher};

pub mod toolkit;
pub use toolkit::{StepOutcome, ToolRun, Toolkit};

pub mod report;
pub use report::{PreparedTarget, TargetOutcome, TargetReport, read_run_log, write_run_log};

pub mod staging;
