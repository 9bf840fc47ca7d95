use crate::individual::{Individual, CHANNELS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete population size classes, each one a square grid
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PopulationSize {
    Small,
    Medium,
    Large,
}

impl PopulationSize {
    /// Side length of the square grid
    pub fn side(&self) -> usize {
        match self {
            PopulationSize::Small => 10,
            PopulationSize::Medium => 20,
            PopulationSize::Large => 36,
        }
    }

    /// Number of individuals in the grid
    pub fn count(&self) -> usize {
        self.side() * self.side()
    }
}

impl fmt::Display for PopulationSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PopulationSize::Small => "Small",
            PopulationSize::Medium => "Medium",
            PopulationSize::Large => "Large",
        };
        write!(f, "{} ({}x{})", name, self.side(), self.side())
    }
}

/// Number of individuals kept in the mating pool: `round(len * pct)`, half away from zero
pub fn mating_pool_size(len: usize, pct: f64) -> usize {
    ((len as f64 * pct).round() as usize).min(len)
}

/// A flat vector whose length is not a perfect square
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0} individuals cannot form a square grid")]
pub struct NotSquare(pub usize);

/// A square grid of individuals
///
/// The flat vector is the only storage: it holds the processing order and the
/// grid is its row-major view. It is serialized as that flat vector.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(try_from = "Vec<Individual>", into = "Vec<Individual>")]
pub struct Population {
    individuals: Vec<Individual>,
    side: usize,
}

impl TryFrom<Vec<Individual>> for Population {
    type Error = NotSquare;

    fn try_from(individuals: Vec<Individual>) -> Result<Self, Self::Error> {
        let side = (individuals.len() as f64).sqrt().round() as usize;
        if side * side != individuals.len() {
            return Err(NotSquare(individuals.len()));
        }
        Ok(Population { individuals, side })
    }
}

impl From<Population> for Vec<Individual> {
    fn from(population: Population) -> Self {
        population.individuals
    }
}

impl Population {
    /// Provides a help message describing the `Population` struct and its fields.
    pub fn help() -> &'static str {
        "
        Population Struct:
        -----------------
        Represents a square grid of individuals evolving toward a target color.

        Fields:
        - individuals: Vec<Individual>
            Flat, row-major storage of the grid. After a generation the mating
            pool comes first (fittest first) followed by the new offspring.

        - side: usize
            Side length of the grid, derived from the population size class
            (Small=10, Medium=20, Large=36).
        "
    }

    /// Builds a population of white individuals for the given size class
    pub fn new(size: PopulationSize) -> Population {
        Population::white(size.side())
    }

    /// Builds a `side` x `side` population of white individuals
    pub fn white(side: usize) -> Population {
        Population {
            individuals: vec![Individual::new(); side * side],
            side,
        }
    }

    /// Wraps a flat vector into a grid; the length must be a perfect square
    ///
    /// # Examples
    ///
    /// ```
    /// # use genvis::individual::Individual;
    /// # use genvis::population::Population;
    /// assert!(Population::from_individuals(vec![Individual::new(); 9]).is_some());
    /// assert!(Population::from_individuals(vec![Individual::new(); 8]).is_none());
    /// ```
    pub fn from_individuals(individuals: Vec<Individual>) -> Option<Population> {
        Population::try_from(individuals).ok()
    }

    /// Flat, row-major view of the individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Swaps in the next generation, which must keep the grid size
    pub(crate) fn replace(&mut self, individuals: Vec<Individual>) {
        debug_assert_eq!(individuals.len(), self.individuals.len());
        self.individuals = individuals;
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Grid coordinates (row, column) of a flat index
    pub fn coordinates(&self, index: usize) -> (usize, usize) {
        (index / self.side, index % self.side)
    }

    /// Individual displayed at (row, column)
    pub fn get(&self, row: usize, column: usize) -> Option<&Individual> {
        if row >= self.side || column >= self.side {
            return None;
        }
        self.individuals.get(row * self.side + column)
    }

    /// Row-major view of the grid
    pub fn rows(&self) -> impl Iterator<Item = &[Individual]> {
        self.individuals.chunks(self.side.max(1))
    }

    /// Grid of raw color vectors, as handed to a renderer
    pub fn grid(&self) -> Vec<Vec<[u8; CHANNELS]>> {
        self.rows()
            .map(|row| row.iter().map(|i| i.color).collect())
            .collect()
    }

    /// Sorts individuals by ascending distance to the target (fittest first).
    /// The sort is stable so an already sorted population keeps its order.
    pub fn sort_by_fitness(&mut self, target: &[u8; CHANNELS]) {
        sort_by_fitness(&mut self.individuals, target);
    }

    /// Fittest `round(len * pct)` individuals, fittest first
    ///
    /// # Arguments
    ///
    /// * `target` - The color to optimize for.
    /// * `pct` - Fraction of the population kept, in (0, 1].
    pub fn mating_pool(&self, target: &[u8; CHANNELS], pct: f64) -> Vec<Individual> {
        mating_pool(&self.individuals, target, pct)
    }

    /// Best individual and its distance to the target
    pub fn fittest(&self, target: &[u8; CHANNELS]) -> Option<(&Individual, f64)> {
        self.individuals
            .iter()
            .map(|i| (i, i.distance_to(target)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Average distance of the population to the target
    pub fn mean_distance(&self, target: &[u8; CHANNELS]) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        self.individuals
            .iter()
            .map(|i| i.distance_to(target))
            .sum::<f64>()
            / self.individuals.len() as f64
    }

    /// Renders the grid, one line per row
    ///
    /// With colors each individual is a true-color block, otherwise its hex code.
    pub fn display(&self, colorful: bool) -> String {
        self.rows()
            .map(|row| {
                if colorful {
                    row.iter()
                        .map(|i| {
                            format!(
                                "\x1b[48;2;{};{};{}m  \x1b[0m",
                                i.color[0], i.color[1], i.color[2]
                            )
                        })
                        .collect::<String>()
                } else {
                    row.iter()
                        .map(|i| i.to_string())
                        .collect::<Vec<String>>()
                        .join(" ")
                }
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}

/// Sorts a flat slice of individuals by ascending distance to the target
pub fn sort_by_fitness(individuals: &mut [Individual], target: &[u8; CHANNELS]) {
    individuals.sort_by(|a, b| a.distance_to(target).total_cmp(&b.distance_to(target)));
}

/// Selects the fittest `round(len * pct)` individuals of a flat slice, fittest first
pub fn mating_pool(individuals: &[Individual], target: &[u8; CHANNELS], pct: f64) -> Vec<Individual> {
    let mut sorted = individuals.to_vec();
    sort_by_fitness(&mut sorted, target);
    sorted.truncate(mating_pool_size(individuals.len(), pct));
    sorted
}
