use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of channels of a color vector
pub const CHANNELS: usize = 3;
/// Smallest admissible channel value
pub const CHANNEL_MIN: i32 = 0;
/// Largest admissible channel value
pub const CHANNEL_MAX: i32 = 255;
/// Bound of the uniform step drawn by the gradual mutation, inclusive on both sides
pub const GRADUAL_STEP: i32 = 50;

/// Color of every individual at the start of a run (least evolved state)
pub const WHITE: [u8; CHANNELS] = [255, 255, 255];

/// Per-channel transform applied when a channel mutates
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    /// Adds an integer drawn uniformly in [-50, 50]
    Gradual,
    /// Replaces the channel by its complement (255 - x)
    Invert,
}

impl MutationType {
    /// Applies the transform to a single channel value.
    /// The result may be out of range and must be clamped by the caller.
    pub fn apply<R: Rng + ?Sized>(&self, x: i32, rng: &mut R) -> i32 {
        match self {
            MutationType::Gradual => x + rng.gen_range(-GRADUAL_STEP..=GRADUAL_STEP),
            MutationType::Invert => CHANNEL_MAX - x,
        }
    }
}

impl fmt::Display for MutationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationType::Gradual => write!(f, "Gradual"),
            MutationType::Invert => write!(f, "Invert"),
        }
    }
}

/// Brings any integer back into [0, 255]
pub fn clamp_channel(x: i32) -> u8 {
    x.clamp(CHANNEL_MIN, CHANNEL_MAX) as u8
}

/// Mutation probability actually used at a given generation.
///
/// With `decrease` the base chance is divided by the generation number, a
/// generation of 0 being treated as 1. Without it the base chance is returned as is.
pub fn effective_mutation_chance(base_chance: f64, generation: usize, decrease: bool) -> f64 {
    if decrease {
        base_chance / generation.max(1) as f64
    } else {
        base_chance
    }
}

/// One candidate solution: a color vector evolving toward a target
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct Individual {
    /// Red, green and blue channels, always within [0, 255]
    pub color: [u8; CHANNELS],
}

impl Default for Individual {
    fn default() -> Self {
        Individual::new()
    }
}

impl From<[u8; CHANNELS]> for Individual {
    fn from(color: [u8; CHANNELS]) -> Self {
        Individual { color }
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            self.color[0], self.color[1], self.color[2]
        )
    }
}

impl Individual {
    /// Generates a new white Individual
    ///
    /// # Examples
    ///
    /// ```
    /// # use genvis::individual::{Individual, WHITE};
    /// let individual = Individual::new();
    /// assert_eq!(individual.color, WHITE);
    /// ```
    pub fn new() -> Individual {
        Individual { color: WHITE }
    }

    /// Euclidean distance between the color of the individual and a target color.
    /// The smaller, the fitter.
    ///
    /// # Examples
    ///
    /// ```
    /// # use genvis::individual::Individual;
    /// let individual = Individual::from([3, 4, 0]);
    /// assert_eq!(individual.distance_to(&[0, 0, 0]), 5.0);
    /// ```
    pub fn distance_to(&self, target: &[u8; CHANNELS]) -> f64 {
        self.color
            .iter()
            .zip(target.iter())
            .map(|(&c, &t)| (t as f64 - c as f64).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Mutates the individual in place
    ///
    /// Each channel mutates independently when a uniform draw in [0, 1) is lower
    /// than or equal to the effective chance; mutated channels are clamped to [0, 255].
    ///
    /// # Arguments
    ///
    /// * `mutation_type` - Transform applied to a mutating channel.
    /// * `generation` - Current generation number, used by the decay.
    /// * `base_chance` - Mutation probability before decay.
    /// * `decrease` - Whether the probability decays with the generation number.
    /// * `rng` - Random number generator.
    ///
    /// # Returns
    ///
    /// The effective mutation chance used.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        mutation_type: MutationType,
        generation: usize,
        base_chance: f64,
        decrease: bool,
        rng: &mut R,
    ) -> f64 {
        let chance = effective_mutation_chance(base_chance, generation, decrease);
        for channel in self.color.iter_mut() {
            if rng.gen::<f64>() <= chance {
                let mutated = mutation_type.apply(*channel as i32, rng);
                trace!("{} mutation {} -> {}", mutation_type, channel, mutated);
                *channel = clamp_channel(mutated);
            }
        }
        chance
    }

    /// Produces one offspring by linear interpolation between two parents
    ///
    /// Each channel gets its own random weight `w` in [0, 1): the child channel is
    /// `w * parent1 + (1 - w) * parent2`, rounded to the nearest integer.
    pub fn crossover<R: Rng + ?Sized>(
        parent1: &Individual,
        parent2: &Individual,
        rng: &mut R,
    ) -> Individual {
        let mut child = Individual::new();
        for (i, channel) in child.color.iter_mut().enumerate() {
            let parent1_influence: f64 = rng.gen();
            let value = parent1.color[i] as f64 * parent1_influence
                + parent2.color[i] as f64 * (1.0 - parent1_influence);
            *channel = clamp_channel(value.round() as i32);
        }
        child
    }
}
