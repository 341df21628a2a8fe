//! Rating models: adaptive-K ELO and Glicko-2
//!
//! This module provides both rating systems as independent, side-effect free
//! models, the converter between their representations, and the engine that
//! picks one per ranking category.

pub mod converter;
pub mod elo;
pub mod engine;
pub mod glicko2;
pub mod period;

// Re-export commonly used types
pub use converter::RatingConverter;
pub use elo::AdaptiveEloModel;
pub use engine::{
    MatchResolution, Participant, RatingChange, RatingEngine, RatingState, RatingSystem,
};
pub use glicko2::Glicko2Model;
pub use period::rating_periods_elapsed;
