//! Glicko-2 rating model
//!
//! Implements Glickman's rating-period update: scale conversion, variance and
//! improvement estimates, volatility via the Illinois root finder, and the
//! final deviation/rating update. All constants come from [`Glicko2Settings`].

use crate::config::rating::Glicko2Settings;
use crate::error::{RatingError, Result};
use crate::types::{Glicko2Rating, MatchObservation, Outcome};
use std::f64::consts::PI;
use tracing::{debug, error, warn};

/// Expected scores are kept this far from 0 and 1 so the variance sum
/// never collapses to zero.
const EXPECTATION_EPSILON: f64 = 1e-10;

/// Glicko-2 calculator
#[derive(Debug, Clone, Default)]
pub struct Glicko2Model {
    settings: Glicko2Settings,
}

impl Glicko2Model {
    /// Create a new model, validating the settings
    pub fn new(settings: Glicko2Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Glicko2Settings {
        &self.settings
    }

    /// Rating for a player with no history
    pub fn unrated(&self) -> Glicko2Rating {
        Glicko2Rating {
            rating: self.settings.scale_center,
            deviation: self.settings.max_deviation,
            volatility: self.settings.initial_volatility,
        }
    }

    /// Update `player` from every result observed in the rating period.
    ///
    /// `rating_periods_elapsed` inflates the deviation for idle time before the
    /// results are applied. With no observations only that inflation happens.
    pub fn update(
        &self,
        player: &Glicko2Rating,
        observations: &[MatchObservation],
        rating_periods_elapsed: f64,
    ) -> Result<Glicko2Rating> {
        player.validate("player")?;
        validate_periods(rating_periods_elapsed)?;
        for observation in observations {
            observation.validate()?;
        }

        if observations.is_empty() {
            return Ok(self.inflate_idle(player, rating_periods_elapsed));
        }

        let mu = self.to_mu(player.rating);
        let phi = inflate(
            self.to_phi(player.deviation),
            player.volatility,
            rating_periods_elapsed,
        );

        let mut variance_sum = 0.0;
        let mut improvement_sum = 0.0;
        for observation in observations {
            let mu_j = self.to_mu(observation.opponent.rating);
            let g_j = g(self.to_phi(observation.opponent.deviation));
            let expected = clamped_expectation(mu, mu_j, g_j);

            variance_sum += g_j * g_j * expected * (1.0 - expected);
            improvement_sum += g_j * (observation.score - expected);
        }

        let variance = 1.0 / variance_sum;
        if !(variance_sum > 0.0 && variance.is_finite()) {
            return Err(RatingError::invalid(
                "Observations carry no information (opponent deviations too large)",
            ));
        }
        let delta = variance * improvement_sum;

        let volatility = self.solve_volatility(delta, phi, variance, player.volatility)?;

        let phi_star = (phi * phi + volatility * volatility).sqrt();
        let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / variance).sqrt();
        let mu_new = mu + phi_new * phi_new * improvement_sum;

        debug!(
            variance,
            delta,
            volatility,
            phi_new,
            mu_new,
            observations = observations.len(),
            "Glicko-2 update"
        );

        let rating = self.from_mu(mu_new);
        if !rating.is_finite() {
            return Err(RatingError::invalid(format!(
                "Player rating {} is too large to update",
                player.rating
            )));
        }

        Ok(Glicko2Rating {
            rating,
            deviation: self.clamp_deviation(self.from_phi(phi_new)),
            volatility,
        })
    }

    /// Single-opponent update; identical to [`update`](Self::update) with one
    /// observation.
    pub fn update_1v1(
        &self,
        player: &Glicko2Rating,
        opponent: &Glicko2Rating,
        outcome: Outcome,
        rating_periods_elapsed: f64,
    ) -> Result<Glicko2Rating> {
        self.update(
            player,
            &[MatchObservation::new(*opponent, outcome)],
            rating_periods_elapsed,
        )
    }

    /// Grow the deviation of an idle player; rating and volatility are kept.
    pub fn decay(&self, player: &Glicko2Rating, rating_periods_elapsed: f64) -> Result<Glicko2Rating> {
        player.validate("player")?;
        validate_periods(rating_periods_elapsed)?;
        Ok(self.inflate_idle(player, rating_periods_elapsed))
    }

    /// Probability that `player` beats `opponent`, accounting for both deviations
    pub fn expected_score(&self, player: &Glicko2Rating, opponent: &Glicko2Rating) -> f64 {
        let phi_a = self.to_phi(player.deviation);
        let phi_b = self.to_phi(opponent.deviation);
        let g_ab = g((phi_a * phi_a + phi_b * phi_b).sqrt());
        expectation(self.to_mu(player.rating), self.to_mu(opponent.rating), g_ab)
    }

    fn inflate_idle(&self, player: &Glicko2Rating, periods: f64) -> Glicko2Rating {
        // Same inflation as the internal-scale step, applied on the public
        // scale so the deviation can never shrink from rounding.
        let sigma = player.volatility * self.settings.scale_factor;
        let deviation = if periods == 0.0 {
            player.deviation
        } else {
            (player.deviation * player.deviation + sigma * sigma * periods).sqrt()
        };

        Glicko2Rating {
            deviation: deviation.min(self.settings.max_deviation),
            ..*player
        }
    }

    /// Illinois (modified regula falsi) search for the new volatility.
    ///
    /// Both the bracketing walk and the main loop share the iteration budget
    /// from the settings; running out is reported, never papered over.
    fn solve_volatility(&self, delta: f64, phi: f64, variance: f64, sigma: f64) -> Result<f64> {
        let tau = self.settings.tau;
        let tolerance = self.settings.convergence_tolerance;
        let max_iterations = self.settings.max_iterations;

        let ln_sigma_sq = (sigma * sigma).ln();
        let delta_sq = delta * delta;
        let phi_sq = phi * phi;

        let f = |x: f64| {
            let ex = x.exp();
            let denom = phi_sq + variance + ex;
            ex * (delta_sq - phi_sq - variance - ex) / (2.0 * denom * denom)
                - (x - ln_sigma_sq) / (tau * tau)
        };

        let mut a = ln_sigma_sq;
        let mut b = if delta_sq > phi_sq + variance {
            (delta_sq - phi_sq - variance).ln()
        } else {
            let mut k = 1;
            loop {
                let candidate = ln_sigma_sq - k as f64 * tau;
                if f(candidate) >= 0.0 {
                    break candidate;
                }
                if k >= max_iterations {
                    error!(delta, phi, variance, sigma, tau, "Volatility bracket not found");
                    return Err(RatingError::NumericalNonConvergence {
                        stage: "bracketing",
                        iterations: k,
                    });
                }
                k += 1;
            }
        };

        let mut f_a = f(a);
        let mut f_b = f(b);
        let mut iterations = 0;

        while (b - a).abs() > tolerance {
            if iterations >= max_iterations {
                error!(delta, phi, variance, sigma, tau, "Volatility did not converge");
                return Err(RatingError::NumericalNonConvergence {
                    stage: "illinois iteration",
                    iterations,
                });
            }
            iterations += 1;

            let c = a + (a - b) * f_a / (f_b - f_a);
            if !c.is_finite() {
                error!(a, b, f_a, f_b, "Volatility search left the real line");
                return Err(RatingError::NumericalNonConvergence {
                    stage: "illinois iteration",
                    iterations,
                });
            }
            let f_c = f(c);

            if f_c * f_b <= 0.0 {
                a = b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }
            b = c;
            f_b = f_c;
        }

        Ok((a / 2.0).exp())
    }

    fn clamp_deviation(&self, deviation: f64) -> f64 {
        if deviation < self.settings.min_deviation {
            warn!(
                deviation,
                floor = self.settings.min_deviation,
                "Deviation below floor, clamping"
            );
        }
        deviation.clamp(self.settings.min_deviation, self.settings.max_deviation)
    }

    fn to_mu(&self, rating: f64) -> f64 {
        (rating - self.settings.scale_center) / self.settings.scale_factor
    }

    fn to_phi(&self, deviation: f64) -> f64 {
        deviation / self.settings.scale_factor
    }

    fn from_mu(&self, mu: f64) -> f64 {
        mu * self.settings.scale_factor + self.settings.scale_center
    }

    fn from_phi(&self, phi: f64) -> f64 {
        phi * self.settings.scale_factor
    }
}

fn validate_periods(periods: f64) -> Result<()> {
    if !periods.is_finite() || periods < 0.0 {
        return Err(RatingError::invalid(format!(
            "Rating periods elapsed must be finite and non-negative, got {}",
            periods
        )));
    }
    Ok(())
}

fn inflate(phi: f64, sigma: f64, periods: f64) -> f64 {
    (phi * phi + sigma * sigma * periods).sqrt()
}

/// Down-weights results against opponents whose rating is uncertain
fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

fn expectation(mu: f64, mu_j: f64, g_j: f64) -> f64 {
    1.0 / (1.0 + (-g_j * (mu - mu_j)).exp())
}

fn clamped_expectation(mu: f64, mu_j: f64, g_j: f64) -> f64 {
    let expected = expectation(mu, mu_j, g_j);
    if expected < EXPECTATION_EPSILON || expected > 1.0 - EXPECTATION_EPSILON {
        warn!(expected, "Expected score saturated, clamping");
    }
    expected.clamp(EXPECTATION_EPSILON, 1.0 - EXPECTATION_EPSILON)
}
