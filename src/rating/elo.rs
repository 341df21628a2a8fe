//! Adaptive-K ELO rating model
//!
//! The learning rate is picked from two ladders, one keyed on how many matches
//! the player has finished and one keyed on their current rating. New players
//! take the larger of the two so they settle quickly; everyone else takes the
//! smaller so established ratings move slowly.

use crate::config::rating::{EloSettings, KStep};
use crate::error::{ensure_finite, RatingError, Result};
use crate::types::{EloRating, Outcome};
use tracing::{debug, warn};

/// The underdog's expectation never drops below this, so neither side's
/// expected score reaches exactly 0 or 1.
const EXPECTATION_EPSILON: f64 = 1e-10;

/// Adaptive ELO calculator
#[derive(Debug, Clone, Default)]
pub struct AdaptiveEloModel {
    settings: EloSettings,
}

impl AdaptiveEloModel {
    /// Create a new model, validating the K ladders
    pub fn new(settings: EloSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EloSettings {
        &self.settings
    }

    /// Rating for a player with no history
    pub fn initial_rating(&self) -> EloRating {
        EloRating::new(self.settings.initial_rating, 0)
    }

    /// Logistic expectation of `player` scoring against `opponent`.
    ///
    /// Always evaluated on the non-positive side of the rating gap and
    /// mirrored, so `expected_score(a, b) + expected_score(b, a)` is exactly 1.
    /// The result stays strictly inside (0, 1) for any gap.
    pub fn expected_score(&self, player: f64, opponent: f64) -> f64 {
        let gap = opponent - player;
        if gap >= 0.0 {
            underdog_expectation(gap, self.settings.scale)
        } else {
            1.0 - underdog_expectation(-gap, self.settings.scale)
        }
    }

    /// Combined K for a player at `rating` with `match_count` finished matches
    pub fn k_factor(&self, rating: f64, match_count: u32) -> f64 {
        let k_experience = ladder_k(
            &self.settings.experience_steps,
            self.settings.experience_floor_k,
            match_count as f64,
        );
        let k_tier = ladder_k(
            &self.settings.tier_steps,
            self.settings.tier_floor_k,
            rating,
        );

        if match_count < self.settings.new_player_matches {
            k_experience.max(k_tier)
        } else {
            k_experience.min(k_tier)
        }
    }

    /// New rating after a decisive match.
    ///
    /// `match_count` is signed so callers holding raw persisted counts get an
    /// `InvalidArgument` for negatives instead of a silent wrap.
    pub fn update(
        &self,
        player_rating: f64,
        opponent_rating: f64,
        won: bool,
        match_count: i64,
    ) -> Result<f64> {
        if match_count < 0 {
            return Err(RatingError::invalid(format!(
                "Match count must be non-negative, got {}",
                match_count
            )));
        }
        let match_count = u32::try_from(match_count).unwrap_or(u32::MAX);

        self.update_with_outcome(
            player_rating,
            opponent_rating,
            Outcome::from_won(won),
            match_count,
        )
    }

    /// New rating after a match that may also have been drawn
    pub fn update_with_outcome(
        &self,
        player_rating: f64,
        opponent_rating: f64,
        outcome: Outcome,
        match_count: u32,
    ) -> Result<f64> {
        ensure_finite("player rating", player_rating)?;
        ensure_finite("opponent rating", opponent_rating)?;

        let expected = self.expected_score(player_rating, opponent_rating);
        let k = self.k_factor(player_rating, match_count);
        let raw = player_rating + k * (outcome.score() - expected);

        debug!(
            player_rating,
            opponent_rating,
            expected,
            k,
            %outcome,
            "Adaptive ELO update"
        );

        let rounded = raw.round();
        if rounded < 0.0 {
            warn!(raw, "ELO rating fell below zero, clamping");
        }

        // also folds -0.0 into 0.0
        Ok(if rounded <= 0.0 { 0.0 } else { rounded })
    }

    /// Record-level update: the returned record counts this match
    pub fn rate(
        &self,
        player: &EloRating,
        opponent: &EloRating,
        outcome: Outcome,
    ) -> Result<EloRating> {
        let rating =
            self.update_with_outcome(player.rating, opponent.rating, outcome, player.match_count)?;

        Ok(EloRating {
            rating,
            match_count: player.match_count.saturating_add(1),
        })
    }
}

fn underdog_expectation(gap: f64, scale: f64) -> f64 {
    // 10^(gap/scale) overflows for huge gaps; the clamp also covers that
    let expected = 1.0 / (1.0 + 10f64.powf(gap / scale));
    expected.clamp(EXPECTATION_EPSILON, 0.5)
}

fn ladder_k(steps: &[KStep], floor_k: f64, value: f64) -> f64 {
    steps
        .iter()
        .find(|step| value < step.below)
        .map(|step| step.k)
        .unwrap_or(floor_k)
}
