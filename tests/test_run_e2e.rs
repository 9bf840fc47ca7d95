/// End-to-End Integration Test for a complete run
///
/// This test validates the complete workflow:
/// 1. Building parameters and freezing them into a run configuration
/// 2. Running the host loop step by step
/// 3. Verifying the summary (generation count, grid shape, reproducibility)
/// 4. Stopping a run through the `running` flag
///
/// Run with: cargo test --test test_run_e2e -- --nocapture
use genvis::ga::{Evolution, EvolutionError};
use genvis::individual::MutationType;
use genvis::param::{self, Param, ParamError};
use genvis::population::PopulationSize;
use genvis::{run, RunError};
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Helper function to create quick parameters
fn create_test_params() -> Param {
    let mut param = Param::default();

    param.general.seed = 42;
    param.general.display_colorful = false;
    param.general.display_grid = false;

    param.ga.target_color = "#1e90ff".to_string();
    param.ga.population_size = PopulationSize::Small;
    param.ga.mutation_type = MutationType::Gradual;
    param.ga.mutation_chance = 0.3;
    param.ga.decrease_mutation = false;
    param.ga.mating_pool_pct = 0.25;
    param.ga.max_generations = 25;
    param.ga.generations_per_step = 10;

    param
}

#[test]
fn test_run_reaches_max_generations() {
    let param = create_test_params();
    let summary = run(&param, Arc::new(AtomicBool::new(true))).unwrap();

    // 10 + 10 + 5 generations
    assert_eq!(summary.generation, 26);
    assert!(!summary.interrupted);
    assert_eq!(summary.grid.len(), 10);
    assert!(summary.grid.iter().all(|row| row.len() == 10));
    assert_eq!(summary.config.target, [0x1e, 0x90, 0xff]);
    assert_eq!(summary.mutation_chance, 0.3);
    assert!(summary.best_distance < (3.0 * 255.0_f64.powi(2)).sqrt());
    assert!(summary.genvis_version.starts_with(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_is_reproducible() {
    let param = create_test_params();
    let first = run(&param, Arc::new(AtomicBool::new(true))).unwrap();
    let second = run(&param, Arc::new(AtomicBool::new(true))).unwrap();

    assert_eq!(first.grid, second.grid);
    assert_eq!(first.best_color, second.best_color);
}

#[test]
fn test_step_size_does_not_change_result() {
    let mut param = create_test_params();
    param.ga.generations_per_step = 1;
    let one_by_one = run(&param, Arc::new(AtomicBool::new(true))).unwrap();

    param.ga.generations_per_step = 25;
    let all_at_once = run(&param, Arc::new(AtomicBool::new(true))).unwrap();

    assert_eq!(one_by_one.generation, all_at_once.generation);
    assert_eq!(one_by_one.grid, all_at_once.grid);
}

#[test]
fn test_stopped_run_keeps_initial_population() {
    let param = create_test_params();
    let summary = run(&param, Arc::new(AtomicBool::new(false))).unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.generation, 1);
    assert!(summary.grid.iter().flatten().all(|c| c == "#ffffff"));
}

#[test]
fn test_run_with_decreasing_mutation() {
    let mut param = create_test_params();
    param.ga.decrease_mutation = true;
    param.ga.max_generations = 10;
    let summary = run(&param, Arc::new(AtomicBool::new(true))).unwrap();

    assert_eq!(summary.generation, 11);
    assert_eq!(summary.mutation_chance, 0.3 / 10.0);
}

#[test]
fn test_invalid_color_is_rejected() {
    let mut param = create_test_params();
    param.ga.target_color = "blue".to_string();
    let result = run(&param, Arc::new(AtomicBool::new(true)));

    assert!(matches!(result, Err(RunError::Param(ParamError::InvalidColor(_)))));
}

#[test]
fn test_out_of_range_mutation_chance_is_rejected() {
    for chance in [7.5, -0.1, f64::NAN] {
        let mut param = create_test_params();
        param.ga.mutation_chance = chance;
        let result = run(&param, Arc::new(AtomicBool::new(true)));

        assert!(
            matches!(result, Err(RunError::Param(ParamError::InvalidMutationChance(_)))),
            "mutation_chance={} should be rejected",
            chance
        );
    }
}

#[test]
fn test_out_of_range_mating_pool_pct_is_rejected() {
    for pct in [0.0, 1.5, -0.25, f64::NAN] {
        let mut param = create_test_params();
        param.ga.mating_pool_pct = pct;
        let result = run(&param, Arc::new(AtomicBool::new(true)));

        assert!(
            matches!(result, Err(RunError::Param(ParamError::InvalidMatingPoolPct(_)))),
            "mating_pool_pct={} should be rejected",
            pct
        );
    }
}

#[test]
fn test_zero_generations_per_step_is_rejected() {
    let mut param = create_test_params();
    param.ga.generations_per_step = 0;
    param.ga.max_generations = 5;
    let (sender, receiver) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = sender.send(run(&param, Arc::new(AtomicBool::new(true))));
    });

    let result = receiver
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("run should return instead of looping");
    assert!(matches!(result, Err(RunError::Param(ParamError::InvalidGenerationsPerStep))));
}

#[test]
fn test_reported_mutation_chance_is_a_probability() {
    let mut param = create_test_params();
    param.ga.mutation_chance = 1.0;
    param.ga.max_generations = 3;
    let summary = run(&param, Arc::new(AtomicBool::new(true))).unwrap();

    assert!((0.0..=1.0).contains(&summary.mutation_chance));
    assert_eq!(summary.mutation_chance, 1.0);
}

#[test]
fn test_too_small_mating_pool_is_rejected() {
    let mut param = create_test_params();
    param.ga.mating_pool_pct = 0.005;
    let result = run(&param, Arc::new(AtomicBool::new(true)));

    assert!(matches!(
        result,
        Err(RunError::Evolution(EvolutionError::MatingPoolTooSmall { pool: 1, population: 100 }))
    ));
}

#[test]
fn test_param_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("genvis_param_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("param.yaml");

    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "general:\n  seed: 7\nga:\n  target_color: \"#00ff00\"\n  population_size: Large\n  mutation_type: Invert\n  mutation_chance: 0.1\n  decrease_mutation: true\n  mating_pool_pct: 0.5"
    )
    .unwrap();

    let param = param::get(&path).unwrap();
    assert_eq!(param.general.seed, 7);
    let config = param.run_config().unwrap();
    assert_eq!(config.target, [0, 255, 0]);

    let evolution = Evolution::new(config, param.general.seed).unwrap();
    assert_eq!(evolution.population().side(), 36);
    assert_eq!(evolution.population().len(), 1296);

    std::fs::remove_dir_all(&dir).unwrap();
}
