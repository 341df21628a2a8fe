//! Rating system configuration
//!
//! Every constant the models use lives here so the engine can be tuned and
//! tested without recompiling. [`EngineConfig`] is built once and handed to
//! the models, which never mutate it.

use crate::error::{RatingError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default cap on volatility root-finding iterations
pub const MAX_VOLATILITY_ITERATIONS: usize = 100;

/// Glicko-2 scale factor between the public and internal scales
pub const GLICKO2_SCALE_FACTOR: f64 = 173.7178;

/// Which rating model a ranking category uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSystemKind {
    AdaptiveElo,
    Glicko2,
}

impl std::fmt::Display for RatingSystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingSystemKind::AdaptiveElo => write!(f, "adaptive_elo"),
            RatingSystemKind::Glicko2 => write!(f, "glicko2"),
        }
    }
}

impl std::str::FromStr for RatingSystemKind {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "adaptive_elo" | "elo" => Ok(RatingSystemKind::AdaptiveElo),
            "glicko2" | "glicko_2" => Ok(RatingSystemKind::Glicko2),
            other => Err(RatingError::config(format!(
                "Unknown rating system '{}'",
                other
            ))),
        }
    }
}

/// One step of a K-factor ladder: `k` applies below `below`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KStep {
    pub below: f64,
    pub k: f64,
}

/// Adaptive ELO parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloSettings {
    /// Logistic scale (400 in classic ELO)
    pub scale: f64,
    /// Rating for a player with no history
    pub initial_rating: f64,
    /// Match counts below this are new players (K = max of both ladders)
    pub new_player_matches: u32,
    /// Experience ladder keyed on match count, ascending
    pub experience_steps: Vec<KStep>,
    /// K once the player is past every experience step
    pub experience_floor_k: f64,
    /// Tier ladder keyed on current rating, ascending
    pub tier_steps: Vec<KStep>,
    /// K for ratings past every tier step
    pub tier_floor_k: f64,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            scale: 400.0,
            initial_rating: 1500.0,
            new_player_matches: 10,
            experience_steps: vec![
                KStep {
                    below: 10.0,
                    k: 48.0,
                },
                KStep {
                    below: 30.0,
                    k: 32.0,
                },
            ],
            experience_floor_k: 24.0,
            tier_steps: vec![
                KStep {
                    below: 1200.0,
                    k: 40.0,
                },
                KStep {
                    below: 2000.0,
                    k: 32.0,
                },
            ],
            tier_floor_k: 24.0,
        }
    }
}

impl EloSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(RatingError::config("ELO scale must be positive"));
        }
        if !self.initial_rating.is_finite() || self.initial_rating < 0.0 {
            return Err(RatingError::config(
                "ELO initial rating must be finite and non-negative",
            ));
        }
        validate_ladder("experience", &self.experience_steps, self.experience_floor_k)?;
        validate_ladder("tier", &self.tier_steps, self.tier_floor_k)?;
        Ok(())
    }
}

fn validate_ladder(name: &str, steps: &[KStep], floor_k: f64) -> Result<()> {
    if !(floor_k.is_finite() && floor_k > 0.0) {
        return Err(RatingError::config(format!(
            "{} floor K must be positive",
            name
        )));
    }
    for step in steps {
        if !(step.k.is_finite() && step.k > 0.0) || !step.below.is_finite() {
            return Err(RatingError::config(format!(
                "{} ladder contains an invalid step: {:?}",
                name, step
            )));
        }
    }
    if steps.windows(2).any(|pair| pair[0].below >= pair[1].below) {
        return Err(RatingError::config(format!(
            "{} ladder thresholds must be strictly ascending",
            name
        )));
    }
    Ok(())
}

/// Glicko-2 parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Settings {
    /// Public-scale value that maps to mu = 0
    pub scale_center: f64,
    /// Divisor between public and internal scales
    pub scale_factor: f64,
    /// System constant constraining volatility change per period
    pub tau: f64,
    /// RD floor applied after every update
    pub min_deviation: f64,
    /// RD ceiling, also the RD of an unrated player
    pub max_deviation: f64,
    /// Volatility of an unrated player
    pub initial_volatility: f64,
    /// Convergence tolerance for the volatility root finder
    pub convergence_tolerance: f64,
    /// Iteration budget for each volatility loop
    pub max_iterations: usize,
}

impl Default for Glicko2Settings {
    fn default() -> Self {
        Self::conservative()
    }
}

impl Glicko2Settings {
    /// Low tau: volatility barely moves between periods (the shipped default)
    pub fn conservative() -> Self {
        Self {
            scale_center: 1500.0,
            scale_factor: GLICKO2_SCALE_FACTOR,
            tau: 0.0833,
            min_deviation: 30.0,
            max_deviation: 350.0,
            initial_volatility: 0.06,
            convergence_tolerance: 1e-6,
            max_iterations: MAX_VOLATILITY_ITERATIONS,
        }
    }

    /// Tau from the middle of Glickman's recommended range
    pub fn reference() -> Self {
        Self {
            tau: 0.5,
            ..Self::conservative()
        }
    }

    /// Tau at the top of the recommended range, for fast-changing skill
    pub fn volatile() -> Self {
        Self {
            tau: 1.2,
            ..Self::conservative()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.scale_center.is_finite() {
            return Err(RatingError::config("Glicko-2 scale center must be finite"));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(RatingError::config("Glicko-2 scale factor must be positive"));
        }
        if !(self.tau.is_finite() && self.tau > 0.0) {
            return Err(RatingError::config("Tau must be positive"));
        }
        if !(self.min_deviation.is_finite() && self.min_deviation > 0.0) {
            return Err(RatingError::config("Minimum deviation must be positive"));
        }
        if !self.max_deviation.is_finite() || self.max_deviation < self.min_deviation {
            return Err(RatingError::config(
                "Maximum deviation must be at least the minimum deviation",
            ));
        }
        if !(self.initial_volatility.is_finite() && self.initial_volatility > 0.0) {
            return Err(RatingError::config("Initial volatility must be positive"));
        }
        if !(self.convergence_tolerance.is_finite() && self.convergence_tolerance > 0.0) {
            return Err(RatingError::config(
                "Convergence tolerance must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(RatingError::config(
                "Volatility iteration budget must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Legacy ELO to Glicko-2 bootstrap parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterSettings {
    /// RD for a player with no history
    pub initial_deviation: f64,
    /// RD removed per match of history
    pub deviation_per_match: f64,
    /// Lowest RD a converted rating can start with
    pub deviation_floor: f64,
    /// Match counts below this keep the provisional volatility
    pub provisional_matches: u32,
    pub provisional_volatility: f64,
    pub established_volatility: f64,
    /// Multiple of RD on each side of the confidence band
    pub interval_width: f64,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            initial_deviation: 350.0,
            deviation_per_match: 10.0,
            deviation_floor: 50.0,
            provisional_matches: 10,
            provisional_volatility: 0.06,
            established_volatility: 0.03,
            interval_width: 2.0,
        }
    }
}

impl ConverterSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("initial_deviation", self.initial_deviation),
            ("deviation_floor", self.deviation_floor),
            ("provisional_volatility", self.provisional_volatility),
            ("established_volatility", self.established_volatility),
            ("interval_width", self.interval_width),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RatingError::config(format!("{} must be positive", name)));
            }
        }
        if !self.deviation_per_match.is_finite() || self.deviation_per_match < 0.0 {
            return Err(RatingError::config(
                "deviation_per_match must be non-negative",
            ));
        }
        if self.deviation_floor > self.initial_deviation {
            return Err(RatingError::config(
                "deviation_floor cannot exceed initial_deviation",
            ));
        }
        Ok(())
    }
}

/// Per-category choice of rating model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySettings {
    pub default_system: RatingSystemKind,
    #[serde(default)]
    pub overrides: BTreeMap<String, RatingSystemKind>,
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            default_system: RatingSystemKind::AdaptiveElo,
            overrides: BTreeMap::new(),
        }
    }
}

impl CategorySettings {
    pub fn system_for(&self, category: &str) -> RatingSystemKind {
        self.overrides
            .get(category)
            .copied()
            .unwrap_or(self.default_system)
    }
}

/// Complete engine configuration injected into both models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub elo: EloSettings,
    #[serde(default)]
    pub glicko2: Glicko2Settings,
    #[serde(default)]
    pub converter: ConverterSettings,
    #[serde(default)]
    pub categories: CategorySettings,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.elo.validate()?;
        self.glicko2.validate()?;
        self.converter.validate()?;
        if self.converter.initial_deviation > self.glicko2.max_deviation {
            return Err(RatingError::config(
                "Converter initial deviation exceeds the Glicko-2 maximum deviation",
            ));
        }
        Ok(())
    }
}
