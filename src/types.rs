//! Common types used throughout the rating engine

use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating as SkillEloRating;
use skillratings::glicko2::Glicko2Rating as SkillGlicko2Rating;
use skillratings::Outcomes;

/// Name of a ranking category, e.g. a language or game mode
pub type Category = String;

/// Outcome of a single match from one participant's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// Actual score used by both models (1, 0.5 or 0)
    pub fn score(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.5,
            Outcome::Loss => 0.0,
        }
    }

    /// The same match seen from the opponent's side
    pub fn reverse(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Draw => Outcome::Draw,
            Outcome::Loss => Outcome::Win,
        }
    }

    pub fn from_won(won: bool) -> Self {
        if won {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win => write!(f, "win"),
            Outcome::Draw => write!(f, "draw"),
            Outcome::Loss => write!(f, "loss"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = crate::error::RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "win" | "w" | "1" => Ok(Outcome::Win),
            "draw" | "d" | "0.5" => Ok(Outcome::Draw),
            "loss" | "l" | "0" => Ok(Outcome::Loss),
            other => Err(crate::error::RatingError::invalid(format!(
                "Unknown outcome '{}'",
                other
            ))),
        }
    }
}

impl From<Outcome> for Outcomes {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => Outcomes::WIN,
            Outcome::Draw => Outcomes::DRAW,
            Outcome::Loss => Outcomes::LOSS,
        }
    }
}

/// Adaptive ELO record for one player in one ranking category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    pub rating: f64,
    pub match_count: u32,
}

impl EloRating {
    pub fn new(rating: f64, match_count: u32) -> Self {
        Self {
            rating,
            match_count,
        }
    }
}

impl Default for EloRating {
    fn default() -> Self {
        Self {
            rating: 1500.0,
            match_count: 0,
        }
    }
}

impl From<EloRating> for SkillEloRating {
    fn from(rating: EloRating) -> Self {
        Self {
            rating: rating.rating,
        }
    }
}

/// Glicko-2 rating triple on the public (1500-centred) scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Rating {
    pub rating: f64,
    /// Rating deviation (RD), one standard deviation of uncertainty
    pub deviation: f64,
    /// Volatility (sigma)
    pub volatility: f64,
}

impl Glicko2Rating {
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> Self {
        Self {
            rating,
            deviation,
            volatility,
        }
    }

    /// Check the value-object invariants: finite fields, positive RD and volatility
    pub fn validate(&self, name: &str) -> crate::error::Result<()> {
        crate::error::ensure_finite(&format!("{} rating", name), self.rating)?;
        crate::error::ensure_finite(&format!("{} deviation", name), self.deviation)?;
        crate::error::ensure_finite(&format!("{} volatility", name), self.volatility)?;

        if self.deviation <= 0.0 {
            return Err(crate::error::RatingError::invalid(format!(
                "{} deviation must be positive, got {}",
                name, self.deviation
            )));
        }
        if self.volatility <= 0.0 {
            return Err(crate::error::RatingError::invalid(format!(
                "{} volatility must be positive, got {}",
                name, self.volatility
            )));
        }

        Ok(())
    }
}

impl Default for Glicko2Rating {
    fn default() -> Self {
        Self {
            rating: 1500.0,
            deviation: 350.0,
            volatility: 0.06,
        }
    }
}

impl From<SkillGlicko2Rating> for Glicko2Rating {
    fn from(rating: SkillGlicko2Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.deviation,
            volatility: rating.volatility,
        }
    }
}

impl From<Glicko2Rating> for SkillGlicko2Rating {
    fn from(rating: Glicko2Rating) -> Self {
        Self {
            rating: rating.rating,
            deviation: rating.deviation,
            volatility: rating.volatility,
        }
    }
}

/// One observed result against an opponent snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchObservation {
    pub opponent: Glicko2Rating,
    /// 0 (loss), 0.5 (draw) or 1 (win)
    pub score: f64,
}

impl MatchObservation {
    pub fn new(opponent: Glicko2Rating, outcome: Outcome) -> Self {
        Self {
            opponent,
            score: outcome.score(),
        }
    }

    /// Reject scores outside {0, 0.5, 1} and invalid opponent snapshots
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.score != 0.0 && self.score != 0.5 && self.score != 1.0 {
            return Err(crate::error::RatingError::invalid(format!(
                "Score must be 0, 0.5 or 1, got {}",
                self.score
            )));
        }
        self.opponent.validate("opponent")
    }
}

/// Rounded `rating ± 2·RD` band for matchmaking and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: i64,
    pub rating: i64,
    pub upper: i64,
}

impl ConfidenceInterval {
    pub fn contains(&self, rating: i64) -> bool {
        self.lower <= rating && rating <= self.upper
    }
}
