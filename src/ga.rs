use crate::individual::{effective_mutation_chance, Individual, MutationType, CHANNELS};
use crate::population::{mating_pool, mating_pool_size, Population, PopulationSize};
use log::{debug, info};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

//-----------------------------------------------------------------------------
// Run configuration and errors
//-----------------------------------------------------------------------------

/// Frozen configuration of a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// The color to optimize for
    pub target: [u8; CHANNELS],
    /// Size class of the square population grid
    pub population_size: PopulationSize,
    /// Fraction of the population kept as parents, in (0, 1]
    pub mating_pool_pct: f64,
    /// Transform applied to mutating channels
    pub mutation_type: MutationType,
    /// Base per-channel mutation probability, in [0, 1]
    pub mutation_chance: f64,
    /// Divide the mutation probability by the generation number
    pub decrease_mutation: bool,
}

/// Configuration that cannot drive an evolution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvolutionError {
    #[error(
        "Mating pool of {pool} individual(s) out of {population}: at least 2 parents are required to produce offspring"
    )]
    MatingPoolTooSmall { pool: usize, population: usize },
    #[error("Mating pool of {pool} individual(s): at least 2 parents are required to pick a pair")]
    NotEnoughParents { pool: usize },
}

/// Checks that a population of `population_len` individuals can breed with the given pool fraction
///
/// A pool keeping the whole population needs no parents and is accepted whatever its size.
///
/// # Returns
///
/// The mating pool size.
pub fn check_mating_pool(population_len: usize, pct: f64) -> Result<usize, EvolutionError> {
    let pool = mating_pool_size(population_len, pct);
    if pool < population_len && pool < 2 {
        return Err(EvolutionError::MatingPoolTooSmall {
            pool,
            population: population_len,
        });
    }
    Ok(pool)
}

//-----------------------------------------------------------------------------
// Genetic Algorithm core functions
//-----------------------------------------------------------------------------

/// Run one evolution step: selection, cross-over, mutation
///
/// # Arguments
///
/// * `individuals` - The current flat population.
/// * `config` - The run configuration.
/// * `generation` - The current generation number, used by the mutation decay.
/// * `rng` - Random number generator.
///
/// # Returns
///
/// The next flat population (mating pool first, fittest first, then offspring)
/// and the effective mutation chance if any offspring was mutated.
///
/// # Errors
///
/// Returns `EvolutionError::MatingPoolTooSmall` if offspring are needed but the
/// mating pool holds fewer than 2 individuals.
pub fn evolve(
    individuals: &[Individual],
    config: &RunConfig,
    generation: usize,
    rng: &mut ChaCha8Rng,
) -> Result<(Vec<Individual>, Option<f64>), EvolutionError> {
    let mut new_pop = mating_pool(individuals, &config.target, config.mating_pool_pct);

    let children_to_create = individuals.len() - new_pop.len();
    debug!(
        "Generation {}: {} parents, {} children to create",
        generation,
        new_pop.len(),
        children_to_create
    );

    let (children, mutation_chance) =
        cross_over(&new_pop, children_to_create, config, generation, rng)?;
    new_pop.extend(children);

    Ok((new_pop, mutation_chance))
}

/// Picks two distinct parents uniformly from the mating pool
///
/// # Errors
///
/// Returns `EvolutionError::NotEnoughParents` if the pool holds fewer than 2 individuals.
pub fn select_parents<'a, R: Rng + ?Sized>(
    parents: &'a [Individual],
    rng: &mut R,
) -> Result<(&'a Individual, &'a Individual), EvolutionError> {
    if parents.len() < 2 {
        return Err(EvolutionError::NotEnoughParents { pool: parents.len() });
    }

    let first = rng.gen_range(0..parents.len());
    let mut second = rng.gen_range(0..parents.len());
    while second == first {
        second = rng.gen_range(0..parents.len());
    }

    Ok((&parents[first], &parents[second]))
}

/// Generate mutated children from the mating pool
///
/// Each child gets its own generator, seeded in order from `rng`, so children can
/// be built in parallel while a run stays reproducible for a given seed.
///
/// # Arguments
///
/// * `parents` - The mating pool.
/// * `children_number` - The number of children to generate.
/// * `config` - The run configuration (mutation type, chance and decay).
/// * `generation` - The current generation number.
/// * `rng` - Random number generator.
///
/// # Returns
///
/// The children and the effective mutation chance used, `None` when no child was requested.
pub fn cross_over(
    parents: &[Individual],
    children_number: usize,
    config: &RunConfig,
    generation: usize,
    rng: &mut ChaCha8Rng,
) -> Result<(Vec<Individual>, Option<f64>), EvolutionError> {
    if children_number == 0 {
        return Ok((Vec::new(), None));
    }
    if parents.len() < 2 {
        return Err(EvolutionError::MatingPoolTooSmall {
            pool: parents.len(),
            population: parents.len() + children_number,
        });
    }

    let seeds: Vec<u64> = (0..children_number).map(|_| rng.gen()).collect();

    let children = seeds
        .into_par_iter()
        .map(|seed| -> Result<(Individual, f64), EvolutionError> {
            let mut child_rng = ChaCha8Rng::seed_from_u64(seed);
            let (p1, p2) = select_parents(parents, &mut child_rng)?;
            let mut child = Individual::crossover(p1, p2, &mut child_rng);
            let chance = child.mutate(
                config.mutation_type,
                generation,
                config.mutation_chance,
                config.decrease_mutation,
                &mut child_rng,
            );
            Ok((child, chance))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mutation_chance = children.last().map(|(_, chance)| *chance);
    Ok((
        children.into_iter().map(|(child, _)| child).collect(),
        mutation_chance,
    ))
}

//-----------------------------------------------------------------------------
// Generation controller
//-----------------------------------------------------------------------------

/// State of a run: the population, the generation counter and the last
/// effective mutation chance
///
/// An advance either completes or leaves the state untouched.
#[derive(Clone, Debug)]
pub struct Evolution {
    config: RunConfig,
    population: Population,
    generation: usize,
    mutation_chance: f64,
    rng: ChaCha8Rng,
}

impl Evolution {
    /// Starts a run on a white population sized after the configuration
    pub fn new(config: RunConfig, seed: u64) -> Result<Evolution, EvolutionError> {
        let population = Population::new(config.population_size);
        Evolution::with_population(config, population, seed)
    }

    /// Starts a run on a given population, ignoring the configured size class
    pub fn with_population(
        config: RunConfig,
        population: Population,
        seed: u64,
    ) -> Result<Evolution, EvolutionError> {
        check_mating_pool(population.len(), config.mating_pool_pct)?;

        let mutation_chance =
            effective_mutation_chance(config.mutation_chance, 1, config.decrease_mutation);
        Ok(Evolution {
            config,
            population,
            generation: 1,
            mutation_chance,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Advances the population by `times` generations
    ///
    /// Generations are computed on a working copy which replaces the current
    /// population only once all of them succeeded.
    pub fn advance(&mut self, times: usize) -> Result<(), EvolutionError> {
        if times == 0 {
            return Ok(());
        }
        check_mating_pool(self.population.len(), self.config.mating_pool_pct)?;

        let mut rng = self.rng.clone();
        let mut individuals = self.population.individuals().to_vec();
        let mut generation = self.generation;
        let mut mutation_chance = self.mutation_chance;

        for _ in 0..times {
            let (next, chance) = evolve(&individuals, &self.config, generation, &mut rng)?;
            individuals = next;
            if let Some(chance) = chance {
                mutation_chance = chance;
            }
            generation += 1;
        }

        self.population.replace(individuals);
        self.generation = generation;
        self.mutation_chance = mutation_chance;
        self.rng = rng;

        info!(
            "Advanced {} generation(s) to generation {} (mutation chance {:.2}%)",
            times,
            self.generation,
            self.mutation_chance * 100.0
        );
        Ok(())
    }

    /// Reorders the population by fitness without touching the generation or any color
    pub fn sort_by_fitness(&mut self) {
        self.population.sort_by_fitness(&self.config.target);
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Last effective mutation chance, in [0, 1]
    pub fn mutation_chance(&self) -> f64 {
        self.mutation_chance
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}
