use std::path::PathBuf;

use clap::Args;
use rwch_core::RwchError;
use rwch_mcmc::summary::latent_digest;
use rwch_walk::read_configurations;
use serde::Serialize;

use super::to_json;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Configuration log written during a run.
    #[arg(long)]
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
struct RecordInfo {
    index: usize,
    steps: u64,
    dimension: u64,
    latent_len: usize,
    digest: String,
}

pub fn run(args: &InspectArgs) -> Result<(), RwchError> {
    let records: Vec<RecordInfo> = read_configurations(&args.path)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| RecordInfo {
            index,
            steps: record.steps,
            dimension: record.dimension,
            latent_len: record.latent.len(),
            digest: latent_digest(&record.latent),
        })
        .collect();
    println!("{}", to_json(&records)?);
    Ok(())
}
