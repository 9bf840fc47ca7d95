pub mod ga;
pub mod individual;
pub mod param;
pub mod population;
pub mod utils;

use chrono::Local;
use ga::{Evolution, EvolutionError, RunConfig};
use log::{debug, info};
use param::{Param, ParamError};
use serde::{Deserialize, Serialize};
use utils::{display_generation, display_generation_legend};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Anything that prevents a run from starting
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
}

/// Final state of a run, as reported to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub id: String,
    pub genvis_version: String,
    pub timestamp: String,

    pub config: RunConfig,
    pub seed: u64,

    pub generation: usize,
    pub mutation_chance: f64,
    pub best_color: String,
    pub best_distance: f64,
    /// Final grid, row-major, as hex colors
    pub grid: Vec<Vec<String>>,

    pub execution_time: f64,
    pub interrupted: bool,
}

pub fn version() -> String {
    format!(
        "{}#{}",
        env!("CARGO_PKG_VERSION"),
        option_env!("GENVIS_GIT_SHA").unwrap_or("unknown")
    )
}

/// Evolves a population as described by the parameters
///
/// Generations are requested `generations_per_step` at a time until
/// `max_generations` generations have been computed. `running` is checked between
/// steps so the host can stop a run without interrupting a generation.
pub fn run(param: &Param, running: Arc<AtomicBool>) -> Result<RunSummary, RunError> {
    let start = std::time::Instant::now();
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let colorful = param.general.display_colorful;

    let config = param.run_config()?;
    info!(
        "Evolving a {} population toward {} ({} mutation, chance {:.0}%{}, mating pool {:.0}%)",
        config.population_size,
        param.ga.target_color,
        config.mutation_type,
        config.mutation_chance * 100.0,
        if config.decrease_mutation { " decreasing" } else { "" },
        config.mating_pool_pct * 100.0
    );

    let mut evolution = Evolution::new(config.clone(), param.general.seed)?;

    crate::cinfo!(colorful, "{}", display_generation_legend());
    crate::cinfo!(colorful, "{}", display_generation(&evolution));

    let mut interrupted = false;
    loop {
        let done = evolution.generation() - 1;
        if done >= param.ga.max_generations {
            info!("Reach max generation");
            break;
        }
        if !running.load(Ordering::Relaxed) {
            info!("Signal received");
            interrupted = true;
            break;
        }

        let times = param.ga.generations_per_step.min(param.ga.max_generations - done);
        evolution.advance(times)?;

        crate::cinfo!(colorful, "{}", display_generation(&evolution));
        if param.general.display_grid {
            crate::cinfo!(colorful, "\n{}", evolution.population().display(colorful));
        }
    }

    let target = evolution.config().target;
    let population = evolution.population();
    let (best_color, best_distance) = population
        .fittest(&target)
        .map(|(individual, distance)| (individual.to_string(), distance))
        .unwrap_or_default();
    let grid: Vec<Vec<String>> = population
        .rows()
        .map(|row| row.iter().map(|i| i.to_string()).collect())
        .collect();

    let summary = RunSummary {
        id: format!("genvis_{}", timestamp),
        genvis_version: version(),
        timestamp,
        config,
        seed: param.general.seed,
        generation: evolution.generation(),
        mutation_chance: evolution.mutation_chance(),
        best_color,
        best_distance,
        grid,
        execution_time: start.elapsed().as_secs_f64(),
        interrupted,
    };

    info!(
        "Run {} stopped at generation {} in {:.2}s: best {} at distance {:.2}",
        summary.id, summary.generation, summary.execution_time, summary.best_color, summary.best_distance
    );
    debug!("{:?}", summary);

    Ok(summary)
}
