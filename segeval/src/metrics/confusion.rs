//! Threshold-dependent confusion metrics.
//!
//! The prediction is binarized as `prediction >= threshold` and compared pixel-wise with
//! the ground truth. All ratios follow one zero-denominator convention: when a
//! denominator is zero its numerator is zero too (there was nothing the ratio could get
//! wrong) and the ratio is exactly 1.0.

use burn::tensor::{backend::Backend, Bool, ElementConversion, Tensor};

use crate::mask::{GroundTruth, MaskPair};

/// Default β² of the F-measure, weighting precision above recall.
pub const DEFAULT_F_BETA_SQUARED: f64 = 0.3;

/// Pixel counts of a binarized prediction against a ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionCounts {
    /// Predicted foreground on ground-truth foreground.
    pub true_positive: u64,
    /// Predicted foreground on ground-truth background.
    pub false_positive: u64,
    /// Predicted background on ground-truth foreground.
    pub false_negative: u64,
    /// Predicted background on ground-truth background.
    pub true_negative: u64,
}

/// Ratios derived from [`ConfusionCounts`], all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfusionMetrics {
    /// TP / (TP + FP).
    pub precision: f64,
    /// TP / (TP + FN), also reported as sensitivity.
    pub recall: f64,
    /// TN / (TN + FP).
    pub specificity: f64,
    /// 2·TP / (2·TP + FP + FN).
    pub dice: f64,
    /// (1 + β²)·P·R / (β²·P + R).
    pub f_measure: f64,
    /// TP / (TP + FP + FN).
    pub iou: f64,
}

impl ConfusionCounts {
    /// Counts a binarized prediction against the ground truth.
    pub fn from_binary<B: Backend>(predicted: Tensor<B, 2, Bool>, gt: &GroundTruth<B>) -> Self {
        let true_positive = count(predicted.clone().bool_and(gt.foreground().clone()));
        let predicted_positive = count(predicted);

        let foreground = gt.foreground_count() as u64;
        let total = gt.pixel_count() as u64;

        let false_positive = predicted_positive - true_positive;
        let false_negative = foreground - true_positive;

        Self {
            true_positive,
            false_positive,
            false_negative,
            true_negative: total - true_positive - false_positive - false_negative,
        }
    }

    /// Binarizes `prediction >= threshold` and counts it against the ground truth.
    pub fn at_threshold<B: Backend>(
        prediction: Tensor<B, 2>,
        gt: &GroundTruth<B>,
        threshold: f64,
    ) -> Self {
        Self::from_binary(prediction.greater_equal_elem(threshold), gt)
    }

    /// Total number of pixels counted.
    pub const fn total(&self) -> u64 {
        self.true_positive + self.false_positive + self.false_negative + self.true_negative
    }

    /// Pixels predicted as foreground.
    pub const fn predicted_positive(&self) -> u64 {
        self.true_positive + self.false_positive
    }

    /// Pixels that are foreground in the ground truth.
    pub const fn actual_positive(&self) -> u64 {
        self.true_positive + self.false_negative
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.predicted_positive())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.actual_positive())
    }

    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negative,
            self.true_negative + self.false_positive,
        )
    }

    pub fn dice(&self) -> f64 {
        ratio(
            2 * self.true_positive,
            2 * self.true_positive + self.false_positive + self.false_negative,
        )
    }

    pub fn iou(&self) -> f64 {
        ratio(
            self.true_positive,
            self.true_positive + self.false_positive + self.false_negative,
        )
    }

    /// F-beta score with the given β². Zero when precision and recall are both zero.
    pub fn f_measure(&self, beta_squared: f64) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denominator = beta_squared.mul_add(precision, recall);
        if denominator > 0.0 {
            (1.0 + beta_squared) * precision * recall / denominator
        } else {
            0.0
        }
    }

    /// All ratios at once.
    pub fn metrics(&self, beta_squared: f64) -> ConfusionMetrics {
        ConfusionMetrics {
            precision: self.precision(),
            recall: self.recall(),
            specificity: self.specificity(),
            dice: self.dice(),
            f_measure: self.f_measure(beta_squared),
            iou: self.iou(),
        }
    }
}

/// Binarizes the pair's prediction at `threshold` and derives every confusion ratio.
pub fn calculate_confusion_metrics<B: Backend>(
    pair: &MaskPair<B>,
    threshold: f64,
    beta_squared: f64,
) -> ConfusionMetrics {
    ConfusionCounts::at_threshold(pair.prediction().clone(), pair.ground_truth(), threshold)
        .metrics(beta_squared)
}

fn count<B: Backend>(mask: Tensor<B, 2, Bool>) -> u64 {
    mask.int().sum().into_scalar().elem::<i64>() as u64
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}
