//! Command line entry point for the skill rating engine
//!
//! Loads configuration the same way a hosting service would (TOML file or
//! environment, then CLI overrides), runs a single rating computation and
//! prints the result as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use skill_rating_engine::config::AppConfig;
use skill_rating_engine::types::{Glicko2Rating, MatchObservation, Outcome};
use skill_rating_engine::RatingEngine;
use std::path::PathBuf;
use tracing::{error, info};

/// Skill Rating Engine - adaptive ELO and Glicko-2 calculations
#[derive(Parser)]
#[command(
    name = "skill-rating",
    version,
    about = "Compute adaptive ELO and Glicko-2 rating updates",
    long_about = "skill-rating runs the rating engine's pure computations from the command line: \
                 adaptive-K ELO updates, Glicko-2 rating-period updates, legacy ELO conversion \
                 and confidence intervals. Results are printed as JSON."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Glicko-2 tau override
    #[arg(long, value_name = "TAU", help = "Override the Glicko-2 system constant")]
    tau: Option<f64>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adaptive ELO update for one player
    Elo {
        #[arg(long, allow_hyphen_values = true)]
        player: f64,
        #[arg(long, allow_hyphen_values = true)]
        opponent: f64,
        #[arg(long, default_value = "win")]
        outcome: Outcome,
        /// Matches the player had finished before this one
        #[arg(long, default_value_t = 0)]
        matches: u32,
    },

    /// Glicko-2 update from a batch of results
    Glicko2 {
        #[arg(long, default_value_t = 1500.0)]
        rating: f64,
        #[arg(long, default_value_t = 350.0)]
        deviation: f64,
        #[arg(long, default_value_t = 0.06)]
        volatility: f64,
        /// Opponent snapshot and score, repeatable
        #[arg(long = "opponent", value_name = "RATING:RD:VOLATILITY:SCORE")]
        opponents: Vec<String>,
        /// Idle rating periods since the last rated match
        #[arg(long, default_value_t = 0.0)]
        periods: f64,
    },

    /// Bootstrap a Glicko-2 rating from a legacy ELO value
    Convert {
        #[arg(long)]
        elo: f64,
        #[arg(long, default_value_t = 0)]
        matches: u32,
    },

    /// Confidence interval for a Glicko-2 rating
    Interval {
        #[arg(long)]
        rating: f64,
        #[arg(long)]
        deviation: f64,
    },

    /// Validate configuration and print the effective settings
    CheckConfig,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(tau) = args.tau {
        config.engine.glicko2.tau = tau;
    }

    skill_rating_engine::config::validate_config(&config)?;
    Ok(config)
}

/// Parse `RATING:RD:VOLATILITY:SCORE` into an observation
fn parse_observation(raw: &str) -> Result<MatchObservation> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        return Err(anyhow!(
            "Opponent '{}' must look like RATING:RD:VOLATILITY:SCORE",
            raw
        ));
    }

    let number = |index: usize, name: &str| -> Result<f64> {
        parts[index]
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid {} in opponent '{}'", name, raw))
    };

    Ok(MatchObservation {
        opponent: Glicko2Rating::new(
            number(0, "rating")?,
            number(1, "deviation")?,
            number(2, "volatility")?,
        ),
        score: number(3, "score")?,
    })
}

fn run(command: &Command, engine: &RatingEngine, config: &AppConfig) -> Result<serde_json::Value> {
    let output = match command {
        Command::Elo {
            player,
            opponent,
            outcome,
            matches,
        } => {
            let model = skill_rating_engine::AdaptiveEloModel::new(config.engine.elo.clone())?;
            let new_rating = model.update_with_outcome(*player, *opponent, *outcome, *matches)?;
            json!({
                "expected_score": model.expected_score(*player, *opponent),
                "k_factor": model.k_factor(*player, *matches),
                "old_rating": player,
                "new_rating": new_rating,
            })
        }
        Command::Glicko2 {
            rating,
            deviation,
            volatility,
            opponents,
            periods,
        } => {
            let model = skill_rating_engine::Glicko2Model::new(config.engine.glicko2.clone())?;
            let player = Glicko2Rating::new(*rating, *deviation, *volatility);
            let observations = opponents
                .iter()
                .map(|raw| parse_observation(raw))
                .collect::<Result<Vec<_>>>()?;

            let updated = model.update(&player, &observations, *periods)?;
            json!({
                "old": player,
                "new": updated,
                "display_rating": engine.converter().to_display_rating(&updated)?,
                "confidence_interval": engine.converter().confidence_interval(&updated)?,
            })
        }
        Command::Convert { elo, matches } => {
            let converted = engine.converter().from_legacy_elo(*elo, *matches)?;
            json!({
                "glicko2": converted,
                "confidence_interval": engine.converter().confidence_interval(&converted)?,
            })
        }
        Command::Interval { rating, deviation } => {
            let glicko = Glicko2Rating::new(*rating, *deviation, config.engine.glicko2.initial_volatility);
            json!(engine.converter().confidence_interval(&glicko)?)
        }
        Command::CheckConfig => serde_json::to_value(config)?,
    };

    Ok(output)
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        service = %config.service.name,
        tau = config.engine.glicko2.tau,
        default_system = %config.engine.categories.default_system,
        "Configuration loaded"
    );

    let engine = RatingEngine::new(config.engine.clone())?;

    match run(&args.command, &engine, &config) {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("Rating computation failed: {}", e);
            Err(e)
        }
    }
}
