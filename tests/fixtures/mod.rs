//! Test fixtures and builders for integration testing
//!
//! Shared helpers for building engines, participants and ratings so the
//! integration tests read like match histories.

#![allow(dead_code)]

use skill_rating_engine::config::{EngineConfig, Glicko2Settings, RatingSystemKind};
use skill_rating_engine::rating::{Participant, RatingEngine, RatingState};
use skill_rating_engine::types::{EloRating, Glicko2Rating};

pub const ELO_CATEGORY: &str = "python";
pub const GLICKO_CATEGORY: &str = "rust";

/// Engine config with one Glicko-2 category and ELO everywhere else
pub fn mixed_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config
        .categories
        .overrides
        .insert(GLICKO_CATEGORY.to_string(), RatingSystemKind::Glicko2);
    config
}

pub fn mixed_engine() -> RatingEngine {
    RatingEngine::new(mixed_config()).expect("default config is valid")
}

/// Same as [`mixed_engine`] but with the paper's tau
pub fn reference_engine() -> RatingEngine {
    let mut config = mixed_config();
    config.glicko2 = Glicko2Settings::reference();
    RatingEngine::new(config).expect("reference config is valid")
}

pub fn elo(rating: f64, match_count: u32) -> Participant {
    Participant::new(RatingState::AdaptiveElo(EloRating::new(rating, match_count)))
}

pub fn glicko(rating: f64, deviation: f64, volatility: f64) -> Participant {
    Participant::new(RatingState::Glicko2(Glicko2Rating::new(
        rating, deviation, volatility,
    )))
}

pub fn unwrap_glicko(state: &RatingState) -> Glicko2Rating {
    match state {
        RatingState::Glicko2(rating) => *rating,
        other => panic!("expected a Glicko-2 state, got {:?}", other),
    }
}

pub fn unwrap_elo(state: &RatingState) -> EloRating {
    match state {
        RatingState::AdaptiveElo(rating) => *rating,
        other => panic!("expected an ELO state, got {:?}", other),
    }
}
