use rwch_core::LogContext;
use rwch_hull::HullAlgorithm;
use rwch_mcmc::{run, Method, RunConfig};
use rwch_walk::{Observable, WalkKind};
use tempfile::tempdir;

fn error_code(config: &RunConfig) -> String {
    let err = config.validate(&LogContext::muted()).unwrap_err();
    assert!(err.is_configuration(), "expected a configuration error, got {err:?}");
    err.info().code.clone()
}

#[test]
fn full_document_parses() {
    let yaml = r#"
walk:
  kind: self-avoiding
  dimension: 3
  steps: 64
hull:
  algorithm: library
  cull: true
observable:
  type: surface
method: wang-landau
iterations: 4
sweep: 16
wang_landau:
  borders: [40.0, 10.0, 25.0]
  bins: 20
  overlap: 2
  flatness: 0.7
  lnf_min: 1.0e-4
seeds:
  realization: 13
  monte_carlo: 42
parallel: 2
verbosity: warn
"#;
    let config = RunConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.walk.kind, WalkKind::SelfAvoiding);
    assert_eq!(config.walk.dimension, 3);
    assert!(config.hull.akl_toussaint);
    assert_eq!(config.observable, Observable::Surface);
    assert_eq!(config.method, Method::WangLandau);
    assert_eq!(config.sweep_len(), 16);
    assert_eq!(config.seeds.monte_carlo, 42);
    assert_eq!(config.wang_landau.stage_trial_cap, 100_000_000);
    assert!(config.wang_landau.entropic_pass);
    config.validate(&LogContext::muted()).unwrap();
}

#[test]
fn empty_document_uses_defaults() {
    let config = RunConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.walk.steps, 100);
    assert_eq!(config.sweep_len(), 100);
    assert_eq!(config.theta, vec![10_000.0]);
    assert_eq!(config.equilibration.t_eq_max, 100_000);
    assert_eq!(config.observable, Observable::Volume);
}

#[test]
fn yaml_round_trips() {
    let mut config = RunConfig::default();
    config.method = Method::ParallelTempering;
    config.theta = vec![-5.0, 5.0];
    config.observable = Observable::Passage { start: 3 };
    let text = config.to_yaml().unwrap();
    assert_eq!(RunConfig::from_yaml_str(&text).unwrap(), config);
}

#[test]
fn unknown_method_is_a_parse_error() {
    let err = RunConfig::from_yaml_str("method: annealing").unwrap_err();
    assert_eq!(err.info().code, "config-parse");
}

#[test]
fn load_sorts_borders() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, "method: wang-landau\nwang_landau:\n  borders: [9.0, 1.0, 5.0, 5.0]\n").unwrap();
    let config = RunConfig::load(&path).unwrap();
    assert_eq!(config.wang_landau.borders, vec![1.0, 5.0, 9.0]);

    let missing = RunConfig::load(&dir.path().join("missing.yaml")).unwrap_err();
    assert_eq!(missing.info().code, "config-read");
}

#[test]
fn walk_shape_is_checked() {
    let mut config = RunConfig::default();
    config.walk.dimension = 1;
    assert_eq!(error_code(&config), "walk-dimension");

    let mut config = RunConfig::default();
    config.walk.steps = 0;
    assert_eq!(error_code(&config), "walk-steps");
}

#[test]
fn planar_hull_algorithms_need_two_dimensions() {
    let mut config = RunConfig::default();
    config.walk.dimension = 3;
    config.hull.algorithm = HullAlgorithm::Jarvis;
    assert_eq!(error_code(&config), "hull-dimension");

    let mut config = RunConfig::default();
    config.walk.dimension = 4;
    config.hull.akl_toussaint = true;
    assert_eq!(error_code(&config), "hull-culling-dimension");
}

#[test]
fn metropolis_takes_one_temperature() {
    let mut config = RunConfig::default();
    config.method = Method::Metropolis;
    config.theta = vec![1.0, 2.0];
    let err = config.validate(&LogContext::muted()).unwrap_err();
    assert_eq!(err.info().code, "metropolis-theta");
    assert!(err.info().hint.is_some());

    config.simple_sampling = true;
    config.validate(&LogContext::muted()).unwrap();
}

#[test]
fn temperatures_must_be_finite_and_non_zero() {
    let mut config = RunConfig::default();
    config.theta = vec![0.0];
    assert_eq!(error_code(&config), "theta-value");
    config.theta = vec![f64::INFINITY];
    assert_eq!(error_code(&config), "theta-value");
}

#[test]
fn tempering_needs_one_path_per_temperature() {
    let mut config = RunConfig::default();
    config.method = Method::ParallelTempering;
    config.theta = Vec::new();
    assert_eq!(error_code(&config), "tempering-theta");

    config.theta = vec![-10.0, 10.0, 100.0];
    config.output.data_paths = vec!["a.dat".into(), "b.dat".into()];
    assert_eq!(error_code(&config), "tempering-paths");

    config.output.data_paths.push("c.dat".into());
    config.output.conf_paths = vec!["a.bin".into()];
    assert_eq!(error_code(&config), "tempering-conf-paths");

    config.output.conf_paths.clear();
    config.validate(&LogContext::muted()).unwrap();
}

#[test]
fn wang_landau_parameters_are_checked() {
    let mut config = RunConfig::default();
    config.method = Method::WangLandau;
    config.validate(&LogContext::muted()).unwrap();

    config.wang_landau.borders = vec![3.0, 3.0];
    assert_eq!(error_code(&config), "wang-landau-borders");

    config.wang_landau.borders = vec![0.0, 3.0];
    config.wang_landau.flatness = 1.0;
    assert_eq!(error_code(&config), "wang-landau-flatness");

    config.wang_landau.flatness = 0.8;
    config.wang_landau.lnf_min = 0.0;
    assert_eq!(error_code(&config), "wang-landau-lnf");

    config.wang_landau.lnf_min = 1e-6;
    config.wang_landau.bins = 0;
    assert_eq!(error_code(&config), "wang-landau-bins");
}

#[test]
fn passage_start_must_lie_inside_the_walk() {
    let mut config = RunConfig::default();
    config.walk.steps = 10;
    config.observable = Observable::Passage { start: 10 };
    assert_eq!(error_code(&config), "passage-start");
}

#[test]
fn misapplied_flags_only_warn() {
    let mut config = RunConfig::default();
    config.simple_sampling = true;
    config.wang_landau.borders = vec![0.0, 1.0];
    config.equilibration.t_eq = Some(10);
    config.validate(&LogContext::muted()).unwrap();
}

#[test]
fn invalid_runs_write_nothing() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("out").join("metropolis.dat");
    let mut config = RunConfig::default();
    config.method = Method::Metropolis;
    config.theta = vec![1.0, 2.0];
    config.output.data_paths = vec![data.clone()];

    let err = run(&config, &LogContext::muted()).unwrap_err();
    assert!(err.is_configuration());
    assert!(!data.exists());
    assert!(!dir.path().join("out").exists());
}
