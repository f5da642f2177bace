//! Evaluator configuration.
//!
//! The defaults reproduce the standard polyp/salient-object evaluation protocol:
//! 256 thresholds from 1.0 down to 0.0, F-measure with β² = 0.3, S-measure with α = 0.5
//! and the weighted F-measure with β² = 1.

use burn::prelude::*;

use crate::error::{SegEvalError, SegEvalResult};

/// Configuration for the [`Evaluator`](crate::Evaluator).
#[derive(Config, Debug)]
pub struct EvaluatorConfig {
    /// Number of evenly spaced thresholds swept from 1.0 down to 0.0 (inclusive).
    #[config(default = "crate::sweep::DEFAULT_NUM_THRESHOLDS")]
    pub num_thresholds: usize,
    /// β² of the per-threshold F-measure curve.
    #[config(default = "crate::metrics::confusion::DEFAULT_F_BETA_SQUARED")]
    pub f_beta_squared: f64,
    /// β² of the weighted F-measure.
    #[config(default = "crate::metrics::weighted_f_measure::DEFAULT_BETA_SQUARED")]
    pub weighted_f_beta_squared: f64,
    /// Weight of the object score in the S-measure (`1 - alpha` goes to the region score).
    #[config(default = "crate::metrics::s_measure::DEFAULT_ALPHA")]
    pub s_alpha: f64,
    /// Evaluate the images of a dataset on the rayon worker pool.
    #[config(default = "true")]
    pub parallel: bool,
}

impl EvaluatorConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::InvalidConfiguration`] if fewer than two thresholds are
    /// requested, a β² is not strictly positive, or `s_alpha` lies outside `[0, 1]`.
    pub fn validate(&self) -> SegEvalResult<()> {
        if self.num_thresholds < 2 {
            return Err(SegEvalError::InvalidConfiguration {
                reason: format!(
                    "At least 2 thresholds are required, got {}",
                    self.num_thresholds
                ),
            });
        }

        for (name, value) in [
            ("f_beta_squared", self.f_beta_squared),
            ("weighted_f_beta_squared", self.weighted_f_beta_squared),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SegEvalError::InvalidConfiguration {
                    reason: format!("{name} must be a positive number, got {value}"),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.s_alpha) {
            return Err(SegEvalError::InvalidConfiguration {
                reason: format!("s_alpha must lie in [0, 1], got {}", self.s_alpha),
            });
        }

        Ok(())
    }
}
