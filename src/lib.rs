//! Skill Rating Engine - adaptive ELO and Glicko-2 player ratings
//!
//! This crate turns match outcomes into updated skill estimates for ranking
//! and matchmaking. Every operation is a pure function of its inputs; storage,
//! transport and scheduling belong to the caller.

pub mod config;
pub mod error;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{RatingError, Result};
pub use types::*;

// Re-export key components
pub use config::EngineConfig;
pub use rating::{AdaptiveEloModel, Glicko2Model, RatingConverter, RatingEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
