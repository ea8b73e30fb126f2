use std::fs;
use std::io::IsTerminal;
use std::time::Duration;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use protprep::{FetchConfig, FilterConfig, PrepParams, read_batch_file};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .try_init();
}

/// Targets for this run: batch file entries when given, else the positional target.
pub fn collect_targets(args: &CliArgs) -> Result<Vec<String>, AppError> {
    if let Some(batch_file) = &args.batch_file {
        return Ok(read_batch_file(batch_file)?);
    }

    match args.target.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Ok(vec![t.to_string()]),
        _ => Err(AppError::MissingArgument {
            arg: "TARGET or --batch-file".to_string(),
        }),
    }
}

pub fn build_params(args: &CliArgs) -> PrepParams {
    PrepParams {
        filter: FilterConfig::from_lists(
            args.remove_waters,
            args.remove_hetero,
            args.keep_chains.as_deref(),
            args.keep_ligands.as_deref(),
        ),
        fetch: FetchConfig {
            retries: args.retries,
            retry_delay: Duration::from_secs(args.retry_delay),
            timeout: Duration::from_secs(args.timeout),
        },
        add_hydrogens: args.add_hydrogens,
        convert_pdbqt: args.pdbqt,
        auto_install: !args.no_install,
        out_dir: args.out_dir.clone(),
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);

    fs::create_dir_all(&args.out_dir).map_err(|source| AppError::OutputDir {
        path: args.out_dir.clone(),
        source,
    })?;

    let targets = collect_targets(&args)?;
    let params = build_params(&args);
    debug!("Run parameters: {:?}", params);
    info!("Processing {} target(s)", targets.len());

    let outcome = protprep::run(&targets, &params).map_err(AppError::from)?;
    info!(
        "Processed: {}, Errors: {}",
        outcome.summary.succeeded, outcome.summary.failed
    );

    Ok(())
}
