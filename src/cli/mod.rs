//! Command Line Interface (CLI) layer for PROTPREP.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that turns a single target or a
//! batch file into one sequential run with a JSON log. It wires
//! user-provided options to the library functionality in `protprep::api`.
//!
//! The GUI drives this same surface as a subprocess, so flag names here are
//! part of the GUI contract.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
