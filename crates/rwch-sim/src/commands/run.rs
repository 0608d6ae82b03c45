use std::fs;
use std::path::PathBuf;

use clap::Args;
use rwch_core::{ErrorInfo, LogContext, RwchError, Verbosity};
use rwch_mcmc::RunConfig;

use super::{init_logging, parse_verbosity, to_json};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Also write the JSON summary to this file.
    #[arg(long)]
    pub summary: Option<PathBuf>,
    /// Worker threads, overriding the configuration (0 for all cores).
    #[arg(long)]
    pub parallel: Option<usize>,
    /// Reporting level, overriding the configuration.
    #[arg(long, value_parser = parse_verbosity)]
    pub verbosity: Option<Verbosity>,
}

pub fn run(args: &RunArgs) -> Result<(), RwchError> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(parallel) = args.parallel {
        config.parallel = parallel;
    }
    if let Some(verbosity) = args.verbosity {
        config.verbosity = verbosity;
    }
    init_logging(config.verbosity);

    let label = args
        .config
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("run");
    let log = LogContext::new(label, config.verbosity);
    let summary = rwch_mcmc::run(&config, &log)?;

    let json = to_json(&summary)?;
    if let Some(path) = &args.summary {
        fs::write(path, &json).map_err(|err| {
            RwchError::Io(
                ErrorInfo::new("summary-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
    }
    println!("{json}");
    Ok(())
}
