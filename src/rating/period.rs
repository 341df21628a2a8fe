//! Rating period arithmetic for Glicko-2 idle inflation

use crate::error::{RatingError, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Fractional number of rating periods between a player's last rated match
/// and `now`. Players who have never played have no idle time to account for.
pub fn rating_periods_elapsed(
    last_match: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    period: Duration,
) -> Result<f64> {
    if period <= Duration::zero() {
        return Err(RatingError::invalid(format!(
            "Rating period must be positive, got {}",
            period
        )));
    }

    let Some(last_match) = last_match else {
        return Ok(0.0);
    };

    let elapsed = now - last_match;
    if elapsed < Duration::zero() {
        warn!(%last_match, %now, "Last match is in the future, treating as no idle time");
        return Ok(0.0);
    }

    Ok(elapsed.num_milliseconds() as f64 / period.num_milliseconds() as f64)
}
