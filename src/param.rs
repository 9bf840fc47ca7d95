use crate::ga::RunConfig;
use crate::individual::{MutationType, CHANNELS};
use crate::population::PopulationSize;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Invalid or unreadable parameters, detected once before a run starts
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Cannot read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse parameter file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid target color {0:?}: expected a hex color such as #1a2b3c")]
    InvalidColor(String),
    #[error("Invalid mutation_chance={0:.3}. Must be in range [0, 1].")]
    InvalidMutationChance(f64),
    #[error("Invalid mating_pool_pct={0:.3}. Must be in range (0, 1].")]
    InvalidMatingPoolPct(f64),
    #[error("generations_per_step must be at least 1")]
    InvalidGenerationsPerStep,
}

// Field definitions and associated default values

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Param {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub ga: GA,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct General {
    #[serde(default = "seed_default")]
    pub seed: u64,
    #[serde(default = "log_base_default")]
    pub log_base: String,
    #[serde(default = "log_suffix_default")]
    pub log_suffix: String,
    #[serde(default = "log_level_default")]
    pub log_level: String,
    #[serde(default = "true_default")]
    pub display_colorful: bool,
    #[serde(default = "true_default")]
    pub display_grid: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GA {
    #[serde(default = "target_color_default")]
    pub target_color: String,
    #[serde(default = "population_size_default")]
    pub population_size: PopulationSize,
    #[serde(default = "mutation_type_default")]
    pub mutation_type: MutationType,
    #[serde(default = "mutation_chance_default")]
    pub mutation_chance: f64,
    #[serde(default = "false_default")]
    pub decrease_mutation: bool,
    #[serde(default = "mating_pool_pct_default")]
    pub mating_pool_pct: f64,
    #[serde(default = "max_generations_default")]
    pub max_generations: usize,
    #[serde(default = "generations_per_step_default")]
    pub generations_per_step: usize,
}

// Default section definitions

impl Default for General {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for GA {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Param {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Param {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freezes the GA section into the configuration consumed by the engine
    ///
    /// # Errors
    ///
    /// Returns a `ParamError` if the target color is not a hex color or if a
    /// chance, pool fraction or step size is out of range.
    pub fn run_config(&self) -> Result<RunConfig, ParamError> {
        let ga = &self.ga;
        let target = parse_hex_color(&ga.target_color)?;
        if !(0.0..=1.0).contains(&ga.mutation_chance) {
            return Err(ParamError::InvalidMutationChance(ga.mutation_chance));
        }
        if !(ga.mating_pool_pct > 0.0 && ga.mating_pool_pct <= 1.0) {
            return Err(ParamError::InvalidMatingPoolPct(ga.mating_pool_pct));
        }
        if ga.generations_per_step == 0 {
            return Err(ParamError::InvalidGenerationsPerStep);
        }

        Ok(RunConfig {
            target,
            population_size: ga.population_size,
            mating_pool_pct: ga.mating_pool_pct,
            mutation_type: ga.mutation_type,
            mutation_chance: ga.mutation_chance,
            decrease_mutation: ga.decrease_mutation,
        })
    }
}

/// Reads a parameter file without validating it
pub fn load<P: AsRef<Path>>(param_file: P) -> Result<Param, ParamError> {
    let param_file_reader = File::open(param_file)?;
    let param_reader = BufReader::new(param_file_reader);

    Ok(serde_yaml::from_reader(param_reader)?)
}

pub fn get<P: AsRef<Path>>(param_file: P) -> Result<Param, ParamError> {
    let mut config = load(param_file)?;

    validate(&mut config)?;

    Ok(config)
}

pub fn validate(param: &mut Param) -> Result<(), ParamError> {
    if !param.general.log_base.is_empty() {
        param.general.display_colorful = false;
    }

    param.run_config()?;

    if param.ga.mating_pool_pct == 1.0 {
        warn!("mating_pool_pct=1: the whole population is kept as parents, no offspring will ever be produced.");
    }

    if param.ga.mutation_chance == 0.0 {
        warn!("mutation_chance=0: the population can never leave the initial white color.");
    }

    Ok(())
}

/// Parses a `#rrggbb` (or `rrggbb`) hex string into a color vector
///
/// # Examples
///
/// ```
/// # use genvis::param::parse_hex_color;
/// assert_eq!(parse_hex_color("#ff8000").unwrap(), [255, 128, 0]);
/// assert!(parse_hex_color("#fff").is_err());
/// ```
pub fn parse_hex_color(hex: &str) -> Result<[u8; CHANNELS], ParamError> {
    let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
    if digits.len() != 2 * CHANNELS || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ParamError::InvalidColor(hex.to_string()));
    }

    let mut color = [0u8; CHANNELS];
    for (i, channel) in color.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16)
            .map_err(|_| ParamError::InvalidColor(hex.to_string()))?;
    }
    Ok(color)
}

// Default value definitions

fn seed_default() -> u64 {
    4815162342
}
fn log_base_default() -> String {
    "".to_string()
}
fn log_suffix_default() -> String {
    "log".to_string()
}
fn log_level_default() -> String {
    "info".to_string()
}
fn false_default() -> bool {
    false
}
fn true_default() -> bool {
    true
}
fn target_color_default() -> String {
    "#000000".to_string()
}
fn population_size_default() -> PopulationSize {
    PopulationSize::Medium
}
fn mutation_type_default() -> MutationType {
    MutationType::Gradual
}
fn mutation_chance_default() -> f64 {
    0.3
}
fn mating_pool_pct_default() -> f64 {
    0.25
}
fn max_generations_default() -> usize {
    100
}
fn generations_per_step_default() -> usize {
    10
}
