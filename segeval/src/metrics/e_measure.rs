//! Enhanced-alignment Measure (E-measure).
//!
//! E-measure captures pixel-level and image-level agreement at once: both maps are
//! centred on their own global mean, combined into an alignment matrix that is high where
//! the centred values agree in sign, passed through the quadratic `(a + 1)² / 4`
//! enhancement and summed.

use burn::tensor::{backend::Backend, ElementConversion, Tensor};

use super::confusion::ConfusionCounts;
use crate::mask::{GroundTruth, GroundTruthKind};

const EPSILON: f64 = f64::EPSILON;

/// Calculates the E-measure of a (typically binarized) prediction against `gt`.
///
/// # Arguments
/// * `prediction` - Prediction with shape `[height, width]`, usually `{0, 1}` valued.
/// * `gt` - Binary ground truth of the same shape.
///
/// # Returns
/// The E-measure in `[0, 1]`.
pub fn calculate_e_measure<B: Backend>(prediction: Tensor<B, 2>, gt: &GroundTruth<B>) -> f64 {
    let size = gt.pixel_count() as f64;

    let enhanced_sum = match gt.kind() {
        GroundTruthKind::AllBackground => size - sum(prediction),
        GroundTruthKind::AllForeground => sum(prediction),
        GroundTruthKind::Mixed => {
            let mean_pred = prediction.clone().mean().into_scalar().elem::<f64>();
            let mean_gt = gt.foreground_fraction();

            let align_pred = prediction.sub_scalar(mean_pred);
            let align_gt = gt.mask().clone().sub_scalar(mean_gt);

            let align_matrix = (align_gt.clone() * align_pred.clone()).mul_scalar(2.0)
                / (align_gt.powf_scalar(2.0) + align_pred.powf_scalar(2.0)).add_scalar(EPSILON);
            let enhanced_matrix = align_matrix.add_scalar(1.0).powf_scalar(2.0).div_scalar(4.0);

            sum(enhanced_matrix)
        }
    };

    normalize(enhanced_sum, size)
}

/// Calculates the E-measure of a binarized prediction from its confusion counts.
///
/// A binary prediction takes only two values, so the alignment matrix takes only four:
/// one per (prediction, ground truth) combination. Weighting each by its pixel count gives
/// the same result as [`calculate_e_measure`] without touching the pixels again.
pub fn e_measure_from_counts(counts: &ConfusionCounts, kind: GroundTruthKind) -> f64 {
    let size = counts.total() as f64;
    let predicted_fg = counts.predicted_positive() as f64;

    let enhanced_sum = match kind {
        GroundTruthKind::AllBackground => size - predicted_fg,
        GroundTruthKind::AllForeground => predicted_fg,
        GroundTruthKind::Mixed => {
            let mean_pred = predicted_fg / size;
            let mean_gt = counts.actual_positive() as f64 / size;

            let pred_fg = 1.0 - mean_pred;
            let pred_bg = -mean_pred;
            let gt_fg = 1.0 - mean_gt;
            let gt_bg = -mean_gt;

            [
                (counts.true_positive, pred_fg, gt_fg),
                (counts.false_positive, pred_fg, gt_bg),
                (counts.false_negative, pred_bg, gt_fg),
                (counts.true_negative, pred_bg, gt_bg),
            ]
            .into_iter()
            .map(|(numel, pred_value, gt_value)| {
                numel as f64 * enhanced_alignment(pred_value, gt_value)
            })
            .sum()
        }
    };

    normalize(enhanced_sum, size)
}

fn enhanced_alignment(pred_value: f64, gt_value: f64) -> f64 {
    let align = 2.0 * pred_value * gt_value
        / (pred_value.mul_add(pred_value, gt_value * gt_value) + EPSILON);
    (align + 1.0).powi(2) / 4.0
}

fn normalize(enhanced_sum: f64, size: f64) -> f64 {
    (enhanced_sum / (size - 1.0 + EPSILON)).clamp(0.0, 1.0)
}

fn sum<B: Backend>(tensor: Tensor<B, 2>) -> f64 {
    tensor.sum().into_scalar().elem::<f64>()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::tests::TestBackend;

    fn gt(values: [[f32; 4]; 3]) -> GroundTruth<TestBackend> {
        GroundTruth::new(Tensor::from_floats(values, &Default::default())).unwrap()
    }

    const GT: [[f32; 4]; 3] = [
        [0.0, 1.0, 1.0, 0.0],
        [0.0, 1.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
    ];

    #[test]
    fn closed_form_matches_pixel_form() {
        let device = Default::default();
        let gt = gt(GT);
        let predictions = [
            [[0.0, 1.0, 1.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]],
            [[1.0; 4]; 3],
            [[0.0; 4]; 3],
            GT,
        ];

        for prediction in predictions {
            let tensor = Tensor::<TestBackend, 2>::from_floats(prediction, &device);
            let pixel = calculate_e_measure(tensor.clone(), &gt);
            let counts = ConfusionCounts::at_threshold(tensor, &gt, 0.5);
            let closed = e_measure_from_counts(&counts, gt.kind());
            assert_abs_diff_eq!(pixel, closed, epsilon = 1e-5);
        }
    }

    #[test]
    fn perfect_match_saturates() {
        let device = Default::default();
        let prediction = Tensor::<TestBackend, 2>::from_floats(GT, &device);
        // 12 / 11 before clamping.
        assert_abs_diff_eq!(calculate_e_measure(prediction, &gt(GT)), 1.0);
    }

    #[test]
    fn inverted_prediction_scores_zero() {
        let device = Default::default();
        let inverted = Tensor::<TestBackend, 2>::from_floats(GT, &device)
            .neg()
            .add_scalar(1.0);
        assert_abs_diff_eq!(calculate_e_measure(inverted, &gt(GT)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_ground_truth_uses_prediction_mass() {
        let counts = ConfusionCounts {
            true_negative: 12,
            false_positive: 4,
            ..ConfusionCounts::default()
        };
        assert_abs_diff_eq!(
            e_measure_from_counts(&counts, GroundTruthKind::AllBackground),
            12.0 / 15.0,
            epsilon = 1e-12
        );

        let counts = ConfusionCounts {
            true_positive: 6,
            false_negative: 10,
            ..ConfusionCounts::default()
        };
        assert_abs_diff_eq!(
            e_measure_from_counts(&counts, GroundTruthKind::AllForeground),
            6.0 / 15.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn soft_and_binarized_predictions_match_known_values() {
        let device = Default::default();
        let gt = GroundTruth::new(Tensor::<TestBackend, 2>::from_floats(
            [
                [0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 1.0, 0.0],
                [0.0, 1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 0.0],
            ],
            &device,
        ))
        .unwrap();
        let prediction = Tensor::<TestBackend, 2>::from_floats(
            [
                [0.1, 0.0, 0.2, 0.0],
                [0.0, 0.9, 0.7, 0.3],
                [0.0, 0.8, 0.4, 0.0],
                [0.1, 0.0, 0.0, 0.6],
            ],
            &device,
        );

        let soft = calculate_e_measure(prediction.clone(), &gt);
        assert_abs_diff_eq!(soft, 0.847_284_4, epsilon = 1e-5);

        let counts = ConfusionCounts::at_threshold(prediction, &gt, 0.5);
        let binarized = e_measure_from_counts(&counts, gt.kind());
        assert_abs_diff_eq!(binarized, 0.938_666_7, epsilon = 1e-6);
    }
}
