use std::path::PathBuf;

use clap::Args;
use rwch_core::{LogContext, RwchError, Verbosity};
use rwch_mcmc::RunConfig;

use super::init_logging;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Print the normalised configuration with every default filled in.
    #[arg(long)]
    pub print: bool,
}

pub fn run(args: &ValidateArgs) -> Result<(), RwchError> {
    let config = RunConfig::load(&args.config)?;
    init_logging(Verbosity::Warn);
    config.validate(&LogContext::new("validate", Verbosity::Warn))?;
    if args.print {
        print!("{}", config.to_yaml()?);
    } else {
        println!(
            "{}: {} of {} with {} {} steps in d={}",
            args.config.display(),
            config.method.name(),
            config.observable.name(),
            config.walk.steps,
            config.walk.kind.name(),
            config.walk.dimension
        );
    }
    Ok(())
}
