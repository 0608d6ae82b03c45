use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commands::{
    inspect::{self, InspectArgs},
    run::{self, RunArgs},
    validate::{self, ValidateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "rwch-sim", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a YAML run configuration and run the sampler it selects.
    Run(RunArgs),
    /// Check a YAML run configuration without sampling.
    Validate(ValidateArgs),
    /// Summarise the records of a binary configuration log.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Validate(args) => validate::run(&args),
        Command::Inspect(args) => inspect::run(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("rwch-sim: {err}");
            if err.is_configuration() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
