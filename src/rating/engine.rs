//! Strategy selection and two-sided match resolution
//!
//! Each ranking category is rated by exactly one system, picked from the
//! [`CategorySettings`](crate::config::CategorySettings) in the engine config.
//! The engine itself holds nothing but immutable models, so one instance can be
//! shared across threads.

use crate::config::rating::{EngineConfig, RatingSystemKind};
use crate::error::{RatingError, Result};
use crate::rating::converter::{display_value, RatingConverter};
use crate::rating::elo::AdaptiveEloModel;
use crate::rating::glicko2::Glicko2Model;
use crate::types::{EloRating, Glicko2Rating, Outcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A rating model, one variant per supported system
#[derive(Debug, Clone)]
pub enum RatingSystem {
    AdaptiveElo(AdaptiveEloModel),
    Glicko2(Glicko2Model),
}

/// Persisted rating state, tagged with the system that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum RatingState {
    AdaptiveElo(EloRating),
    Glicko2(Glicko2Rating),
}

impl RatingState {
    pub fn kind(&self) -> RatingSystemKind {
        match self {
            RatingState::AdaptiveElo(_) => RatingSystemKind::AdaptiveElo,
            RatingState::Glicko2(_) => RatingSystemKind::Glicko2,
        }
    }

    /// Raw rating value regardless of system
    pub fn rating(&self) -> f64 {
        match self {
            RatingState::AdaptiveElo(elo) => elo.rating,
            RatingState::Glicko2(glicko) => glicko.rating,
        }
    }
}

impl RatingSystem {
    pub fn kind(&self) -> RatingSystemKind {
        match self {
            RatingSystem::AdaptiveElo(_) => RatingSystemKind::AdaptiveElo,
            RatingSystem::Glicko2(_) => RatingSystemKind::Glicko2,
        }
    }

    pub fn initial_state(&self) -> RatingState {
        match self {
            RatingSystem::AdaptiveElo(model) => RatingState::AdaptiveElo(model.initial_rating()),
            RatingSystem::Glicko2(model) => RatingState::Glicko2(model.unrated()),
        }
    }

    /// Rate one participant against an opponent snapshot.
    ///
    /// `rating_periods_elapsed` only matters for Glicko-2.
    pub fn rate(
        &self,
        player: &RatingState,
        opponent: &RatingState,
        outcome: Outcome,
        rating_periods_elapsed: f64,
    ) -> Result<RatingState> {
        match (self, player, opponent) {
            (
                RatingSystem::AdaptiveElo(model),
                RatingState::AdaptiveElo(player),
                RatingState::AdaptiveElo(opponent),
            ) => Ok(RatingState::AdaptiveElo(
                model.rate(player, opponent, outcome)?,
            )),
            (
                RatingSystem::Glicko2(model),
                RatingState::Glicko2(player),
                RatingState::Glicko2(opponent),
            ) => Ok(RatingState::Glicko2(model.update_1v1(
                player,
                opponent,
                outcome,
                rating_periods_elapsed,
            )?)),
            _ => Err(RatingError::invalid(format!(
                "Cannot rate {} and {} states with the {} system",
                player.kind(),
                opponent.kind(),
                self.kind()
            ))),
        }
    }
}

/// One side of a match as handed in by the match-resolution service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub state: RatingState,
    /// Idle rating periods since this participant's last rated match
    #[serde(default)]
    pub rating_periods_elapsed: f64,
}

impl Participant {
    pub fn new(state: RatingState) -> Self {
        Self {
            state,
            rating_periods_elapsed: 0.0,
        }
    }

    pub fn idle_for(mut self, rating_periods_elapsed: f64) -> Self {
        self.rating_periods_elapsed = rating_periods_elapsed;
        self
    }
}

/// Rating change information for one participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub old: RatingState,
    pub new: RatingState,
    pub delta: f64,
}

impl RatingChange {
    fn new(old: RatingState, new: RatingState) -> Self {
        Self {
            old,
            new,
            delta: new.rating() - old.rating(),
        }
    }
}

/// Both participants' new ratings after one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResolution {
    pub category: String,
    pub system: RatingSystemKind,
    pub player: RatingChange,
    pub opponent: RatingChange,
}

/// Per-category rating engine
#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: EngineConfig,
    adaptive_elo: RatingSystem,
    glicko2: RatingSystem,
    converter: RatingConverter,
}

impl RatingEngine {
    /// Create a new engine; the whole config is validated up front
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let adaptive_elo = RatingSystem::AdaptiveElo(AdaptiveEloModel::new(config.elo.clone())?);
        let glicko2 = RatingSystem::Glicko2(Glicko2Model::new(config.glicko2.clone())?);
        let converter =
            RatingConverter::new(config.converter.clone(), config.glicko2.clone())?;

        Ok(Self {
            config,
            adaptive_elo,
            glicko2,
            converter,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn converter(&self) -> &RatingConverter {
        &self.converter
    }

    pub fn system_for(&self, category: &str) -> RatingSystemKind {
        self.config.categories.system_for(category)
    }

    /// The model used for `category`
    pub fn system(&self, category: &str) -> &RatingSystem {
        match self.system_for(category) {
            RatingSystemKind::AdaptiveElo => &self.adaptive_elo,
            RatingSystemKind::Glicko2 => &self.glicko2,
        }
    }

    pub fn initial_state(&self, category: &str) -> RatingState {
        self.system(category).initial_state()
    }

    /// Rate both participants of a finished match.
    ///
    /// Each side is rated against the other's pre-match snapshot with the
    /// complementary outcome. Either both new states are returned or neither.
    pub fn resolve_match(
        &self,
        category: &str,
        player: &Participant,
        opponent: &Participant,
        outcome: Outcome,
    ) -> Result<MatchResolution> {
        let system = self.system(category);

        let player_new = system.rate(
            &player.state,
            &opponent.state,
            outcome,
            player.rating_periods_elapsed,
        )?;
        let opponent_new = system.rate(
            &opponent.state,
            &player.state,
            outcome.reverse(),
            opponent.rating_periods_elapsed,
        )?;

        let resolution = MatchResolution {
            category: category.to_string(),
            system: system.kind(),
            player: RatingChange::new(player.state, player_new),
            opponent: RatingChange::new(opponent.state, opponent_new),
        };

        debug!(
            category,
            system = %resolution.system,
            %outcome,
            player_delta = resolution.player.delta,
            opponent_delta = resolution.opponent.delta,
            "Resolved match"
        );

        Ok(resolution)
    }

    /// Integer rating for leaderboards and matchmaking bands
    pub fn display_rating(&self, state: &RatingState) -> Result<i64> {
        match state {
            RatingState::AdaptiveElo(elo) => display_value(elo.rating),
            RatingState::Glicko2(glicko) => self.converter.to_display_rating(glicko),
        }
    }

    /// Move a legacy ELO record onto Glicko-2
    pub fn migrate_to_glicko2(&self, record: &EloRating) -> Result<RatingState> {
        Ok(RatingState::Glicko2(self.converter.from_elo_record(record)?))
    }
}
