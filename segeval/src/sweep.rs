//! Threshold sweep.
//!
//! A continuous prediction is binarized at every threshold of a fixed descending sequence
//! and the confusion ratios plus the E-measure are recorded per threshold. Thresholds are
//! independent of one another; only the output ordering is tied to the sequence.

use burn::tensor::{backend::Backend, Tensor};

use crate::{
    error::{SegEvalError, SegEvalResult},
    mask::GroundTruth,
    metrics::{e_measure_from_counts, ConfusionCounts},
};

/// Number of thresholds in the standard protocol.
pub const DEFAULT_NUM_THRESHOLDS: usize = 256;

/// Curve-valued metrics produced by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveMetric {
    Precision,
    Recall,
    Specificity,
    Dice,
    IoU,
    FMeasure,
    EMeasure,
}

impl CurveMetric {
    /// Every curve metric, in storage order.
    pub const ALL: [Self; 7] = [
        Self::Precision,
        Self::Recall,
        Self::Specificity,
        Self::Dice,
        Self::IoU,
        Self::FMeasure,
        Self::EMeasure,
    ];

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Precision => "Precision",
            Self::Recall => "Recall",
            Self::Specificity => "Specificity",
            Self::Dice => "Dice",
            Self::IoU => "IoU",
            Self::FMeasure => "F-measure",
            Self::EMeasure => "E-measure",
        }
    }

    /// Position of the metric in [`CurveMetric::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Per-threshold curves of one image, indexed like the threshold sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCurves {
    curves: [Vec<f64>; 7],
}

impl ThresholdCurves {
    /// Creates empty curves with room for `num_thresholds` values each.
    pub fn with_capacity(num_thresholds: usize) -> Self {
        Self {
            curves: std::array::from_fn(|_| Vec::with_capacity(num_thresholds)),
        }
    }

    /// Builds curves from explicit values, one vector per metric in [`CurveMetric::ALL`]
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::CurveLengthMismatch`] if the vectors differ in length.
    pub fn from_values(curves: [Vec<f64>; 7]) -> SegEvalResult<Self> {
        let expected = curves[0].len();
        for metric in CurveMetric::ALL {
            let actual = curves[metric.index()].len();
            if actual != expected {
                return Err(SegEvalError::CurveLengthMismatch {
                    metric: metric.name(),
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { curves })
    }

    /// The curve of `metric`.
    pub fn get(&self, metric: CurveMetric) -> &[f64] {
        &self.curves[metric.index()]
    }

    /// Number of thresholds covered.
    pub fn len(&self) -> usize {
        self.curves[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, metric: CurveMetric, value: f64) {
        self.curves[metric.index()].push(value);
    }
}

/// A fixed, evenly spaced threshold sequence from 1.0 down to 0.0 inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSweep {
    thresholds: Vec<f64>,
    f_beta_squared: f64,
}

impl ThresholdSweep {
    /// Creates a sweep of `num_thresholds` thresholds `t_j = 1 - j / (n - 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::InvalidConfiguration`] if fewer than two thresholds are
    /// requested.
    pub fn new(num_thresholds: usize, f_beta_squared: f64) -> SegEvalResult<Self> {
        if num_thresholds < 2 {
            return Err(SegEvalError::InvalidConfiguration {
                reason: format!("At least 2 thresholds are required, got {num_thresholds}"),
            });
        }

        let last = (num_thresholds - 1) as f64;
        let thresholds = (0..num_thresholds)
            .map(|j| 1.0 - j as f64 / last)
            .collect();

        Ok(Self {
            thresholds,
            f_beta_squared,
        })
    }

    /// The threshold sequence, descending.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Sweeps `prediction` against `gt`, producing one value per threshold and metric.
    pub fn run<B: Backend>(&self, prediction: &Tensor<B, 2>, gt: &GroundTruth<B>) -> ThresholdCurves {
        let mut curves = ThresholdCurves::with_capacity(self.thresholds.len());

        for &threshold in &self.thresholds {
            let counts = ConfusionCounts::at_threshold(prediction.clone(), gt, threshold);
            let metrics = counts.metrics(self.f_beta_squared);

            curves.push(CurveMetric::Precision, metrics.precision);
            curves.push(CurveMetric::Recall, metrics.recall);
            curves.push(CurveMetric::Specificity, metrics.specificity);
            curves.push(CurveMetric::Dice, metrics.dice);
            curves.push(CurveMetric::IoU, metrics.iou);
            curves.push(CurveMetric::FMeasure, metrics.f_measure);
            curves.push(
                CurveMetric::EMeasure,
                e_measure_from_counts(&counts, gt.kind()),
            );
        }

        curves
    }
}
