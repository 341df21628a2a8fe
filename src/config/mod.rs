//! Configuration management for the rating engine
//!
//! This module holds the engine constants (K ladders, Glicko-2 scale, tau,
//! RD bounds) and the application-level settings loaded from the
//! environment or a TOML file.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use rating::{
    CategorySettings, ConverterSettings, EloSettings, EngineConfig, Glicko2Settings, KStep,
    RatingSystemKind, GLICKO2_SCALE_FACTOR, MAX_VOLATILITY_ITERATIONS,
};
