//! Conversions between plain ELO scalars and Glicko-2 triples

use crate::config::rating::{ConverterSettings, Glicko2Settings};
use crate::error::{ensure_finite, RatingError, Result};
use crate::types::{ConfidenceInterval, EloRating, Glicko2Rating};

/// Bootstraps Glicko-2 ratings from legacy ELO data and renders ratings for display
#[derive(Debug, Clone, Default)]
pub struct RatingConverter {
    settings: ConverterSettings,
    glicko2: Glicko2Settings,
}

impl RatingConverter {
    pub fn new(settings: ConverterSettings, glicko2: Glicko2Settings) -> Result<Self> {
        settings.validate()?;
        glicko2.validate()?;
        if settings.initial_deviation > glicko2.max_deviation {
            return Err(RatingError::config(
                "Converter initial deviation exceeds the Glicko-2 maximum deviation",
            ));
        }
        Ok(Self { settings, glicko2 })
    }

    /// Starting Glicko-2 triple for a player known only by an ELO value.
    ///
    /// Each match of history removes a fixed slice of deviation down to the
    /// floor; volatility drops once the player is past the provisional stage.
    pub fn from_legacy_elo(&self, elo: f64, match_count_hint: u32) -> Result<Glicko2Rating> {
        ensure_finite("legacy ELO rating", elo)?;

        let deviation = (self.settings.initial_deviation
            - match_count_hint as f64 * self.settings.deviation_per_match)
            .max(self.settings.deviation_floor);

        let volatility = if match_count_hint < self.settings.provisional_matches {
            self.settings.provisional_volatility
        } else {
            self.settings.established_volatility
        };

        Ok(Glicko2Rating {
            rating: elo,
            deviation,
            volatility,
        })
    }

    /// Same as [`from_legacy_elo`](Self::from_legacy_elo) for a whole record
    pub fn from_elo_record(&self, record: &EloRating) -> Result<Glicko2Rating> {
        self.from_legacy_elo(record.rating, record.match_count)
    }

    /// Rating rounded for leaderboards; deviation and volatility stay internal
    pub fn to_display_rating(&self, rating: &Glicko2Rating) -> Result<i64> {
        display_value(rating.rating)
    }

    /// Display rating as an ELO record, for categories moved back to adaptive ELO
    pub fn to_elo(&self, rating: &Glicko2Rating, match_count: u32) -> Result<EloRating> {
        Ok(EloRating {
            rating: (self.to_display_rating(rating)? as f64).max(0.0),
            match_count,
        })
    }

    /// Rounded `rating ± width·RD` band (width 2 by default)
    pub fn confidence_interval(&self, rating: &Glicko2Rating) -> Result<ConfidenceInterval> {
        ensure_finite("rating", rating.rating)?;
        ensure_finite("deviation", rating.deviation)?;
        if rating.deviation <= 0.0 || rating.deviation > self.glicko2.max_deviation {
            return Err(RatingError::invalid(format!(
                "Deviation must be in (0, {}], got {}",
                self.glicko2.max_deviation, rating.deviation
            )));
        }

        let spread = self.settings.interval_width * rating.deviation;
        Ok(ConfidenceInterval {
            lower: display_value(rating.rating - spread)?,
            rating: display_value(rating.rating)?,
            upper: display_value(rating.rating + spread)?,
        })
    }
}

/// Round a rating to an integer, refusing values the cast would saturate
pub(crate) fn display_value(rating: f64) -> Result<i64> {
    ensure_finite("rating", rating)?;
    let rounded = rating.round();
    if rounded.abs() >= i64::MAX as f64 {
        return Err(RatingError::invalid(format!(
            "Rating {} is out of display range",
            rating
        )));
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> RatingConverter {
        RatingConverter::default()
    }

    #[test]
    fn test_from_legacy_elo_new_player() {
        let rating = converter().from_legacy_elo(1800.0, 0).unwrap();
        assert_eq!(rating.rating, 1800.0);
        assert_eq!(rating.deviation, 350.0);
        assert_eq!(rating.volatility, 0.06);
    }

    #[test]
    fn test_from_legacy_elo_veteran_is_floored() {
        let rating = converter().from_legacy_elo(1800.0, 40).unwrap();
        assert_eq!(rating.rating, 1800.0);
        assert_eq!(rating.deviation, 50.0);
        assert_eq!(rating.volatility, 0.03);
    }

    #[test]
    fn test_from_legacy_elo_deviation_decreases_with_history() {
        let converter = converter();
        let mut previous = f64::INFINITY;
        for matches in 0..50 {
            let rating = converter.from_legacy_elo(1500.0, matches).unwrap();
            assert!(rating.deviation <= previous);
            previous = rating.deviation;
        }
        assert_eq!(converter.from_legacy_elo(1500.0, 9).unwrap().volatility, 0.06);
        assert_eq!(converter.from_legacy_elo(1500.0, 10).unwrap().volatility, 0.03);
        assert_eq!(converter.from_legacy_elo(1500.0, 12).unwrap().deviation, 230.0);
    }

    #[test]
    fn test_from_legacy_elo_rejects_non_finite() {
        assert!(converter().from_legacy_elo(f64::NAN, 3).is_err());
    }

    #[test]
    fn test_display_rating_rounds() {
        let converter = converter();
        assert_eq!(
            converter
                .to_display_rating(&Glicko2Rating::new(1523.4, 80.0, 0.06))
                .unwrap(),
            1523
        );
        assert_eq!(
            converter
                .to_display_rating(&Glicko2Rating::new(1523.6, 80.0, 0.06))
                .unwrap(),
            1524
        );
    }

    #[test]
    fn test_display_rating_rejects_non_finite() {
        let converter = converter();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e300] {
            let err = converter
                .to_display_rating(&Glicko2Rating::new(bad, 100.0, 0.06))
                .unwrap_err();
            assert!(err.is_invalid_argument());
        }
        assert!(converter
            .to_elo(&Glicko2Rating::new(f64::NAN, 100.0, 0.06), 3)
            .is_err());
    }

    #[test]
    fn test_to_elo_floors_at_zero() {
        let converter = converter();
        let record = converter
            .to_elo(&Glicko2Rating::new(-12.0, 80.0, 0.06), 4)
            .unwrap();
        assert_eq!(record.rating, 0.0);
        assert_eq!(record.match_count, 4);
    }

    #[test]
    fn test_confidence_interval() {
        let interval = converter()
            .confidence_interval(&Glicko2Rating::new(1500.4, 100.2, 0.06))
            .unwrap();
        assert_eq!(interval.lower, 1300);
        assert_eq!(interval.rating, 1500);
        assert_eq!(interval.upper, 1701);
        assert!(interval.contains(1500));
        assert!(!interval.contains(1702));
    }

    #[test]
    fn test_confidence_interval_rejects_invalid() {
        let converter = converter();
        assert!(converter
            .confidence_interval(&Glicko2Rating::new(1500.0, 0.0, 0.06))
            .is_err());
        assert!(converter
            .confidence_interval(&Glicko2Rating::new(f64::NAN, 100.0, 0.06))
            .is_err());
        assert!(converter
            .confidence_interval(&Glicko2Rating::new(1500.0, 400.0, 0.06))
            .is_err());
    }

    #[test]
    fn test_mismatched_settings_rejected() {
        let glicko2 = Glicko2Settings {
            max_deviation: 300.0,
            ..Glicko2Settings::default()
        };
        assert!(RatingConverter::new(ConverterSettings::default(), glicko2).is_err());
    }
}
