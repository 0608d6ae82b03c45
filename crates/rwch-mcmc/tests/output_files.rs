use std::fs;

use rwch_core::LogContext;
use rwch_mcmc::output::ROW_COLUMNS;
use rwch_mcmc::summary::latent_digest;
use rwch_mcmc::{run, Method, RunConfig, RunSummary};
use rwch_walk::{read_configurations, WalkKind, WalkParams};
use tempfile::tempdir;

fn metropolis_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.walk = WalkParams::new(WalkKind::Gauss, 3, 16);
    config.method = Method::Metropolis;
    config.theta = vec![-3.0];
    config.iterations = 40;
    config.equilibration.t_eq = Some(5);
    config.seeds.realization = 11;
    config.seeds.monte_carlo = 12;
    config
}

#[test]
fn metropolis_file_has_header_rows_and_footer() {
    let dir = tempdir().unwrap();
    let mut config = metropolis_config();
    let data = dir.path().join("nested").join("run.dat");
    let conf = dir.path().join("run.bin");
    config.output.data_paths = vec![data.clone()];
    config.output.conf_paths = vec![conf.clone()];

    let summary = run(&config, &LogContext::muted()).unwrap();
    let text = fs::read_to_string(&data).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("# large deviation simulation at theta=-3"));
    assert!(lines[1].starts_with("# started "));
    assert_eq!(lines[2], format!("# {ROW_COLUMNS}"));

    let rows: Vec<Vec<&str>> = lines
        .iter()
        .filter(|l| !l.starts_with('#'))
        .map(|l| l.split_whitespace().collect())
        .collect();
    assert_eq!(rows.len(), 40);
    assert!(rows.iter().all(|r| r.len() == ROW_COLUMNS.split_whitespace().count()));
    assert_eq!(rows[0][0], "10");
    assert_eq!(rows[39][0], "49");

    let footer: Vec<&&str> = lines.iter().rev().take(4).collect();
    assert!(footer.iter().any(|l| l.starts_with("# proposed changes: ")));
    assert!(footer.iter().any(|l| l.starts_with("# time/sweep in seconds: ")));

    let records = read_configurations(&conf).unwrap();
    assert_eq!(records.len(), 40);
    assert_eq!(
        latent_digest(&records.last().unwrap().latent),
        summary.latent_digest
    );
}

#[test]
fn simple_sampling_rows_are_numbered_from_zero() {
    let dir = tempdir().unwrap();
    let mut config = RunConfig::default();
    config.walk = WalkParams::new(WalkKind::LoopErased, 2, 12);
    config.iterations = 15;
    config.output.data_paths = vec![dir.path().join("simple.dat")];
    let summary = run(&config, &LogContext::muted()).unwrap();
    assert_eq!(summary.samples, 15);
    assert_eq!(summary.counters.tries, 0);

    let text = fs::read_to_string(&config.output.data_paths[0]).unwrap();
    let sweeps: Vec<usize> = text
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(|l| l.split_whitespace().next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(sweeps, (0..15).collect::<Vec<_>>());
}

#[test]
fn identical_seeds_give_identical_summaries() {
    let config = metropolis_config();
    let a = run(&config, &LogContext::muted()).unwrap();
    let b = run(&config, &LogContext::muted()).unwrap();
    assert_eq!(a, b);

    let mut reseeded = config.clone();
    reseeded.seeds.monte_carlo += 1;
    let c = run(&reseeded, &LogContext::muted()).unwrap();
    assert_ne!(a.latent_digest, c.latent_digest);
}

#[test]
fn summary_serializes_to_json() {
    let summary = run(&metropolis_config(), &LogContext::muted()).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"method\":\"metropolis\""));
    assert!(!json.contains("permutation"));
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back.method, Method::Metropolis);
    assert_eq!(back.counters, summary.counters);
    assert_eq!(back.latent_digest, summary.latent_digest);
    assert_eq!(back.equilibration, summary.equilibration);
}
