//! Weighted F-measure.
//!
//! The weighted F-measure replaces the hard confusion counts of the F-measure with
//! continuous, distance-weighted errors:
//!
//! 1. `E = |GT - P|` is the raw error map.
//! 2. Error dependency: every background pixel inherits the error of its nearest
//!    foreground pixel, the result is smoothed with a 7×7 Gaussian (σ = 5) and inside the
//!    foreground the error becomes `min(E, smoothed)`. Errors next to well-predicted
//!    foreground are thereby forgiven.
//! 3. Pixel importance: foreground pixels weigh 1, background pixels weigh
//!    `2 - exp(ln(0.5) / 5 · d)` where `d` is their distance to the foreground.
//! 4. Weighted TP/FP give precision and recall, combined as an F-beta score.

use burn::tensor::{backend::Backend, ElementConversion, Tensor};
use burn_extra_ops::{euclidean_distance_transform, filter2d_replicate, gaussian_kernel};

use crate::mask::{GroundTruth, GroundTruthKind};

/// Default β² of the weighted F-measure (precision and recall weighted equally).
pub const DEFAULT_BETA_SQUARED: f64 = 1.0;

const GAUSSIAN_SIZE: usize = 7;
const GAUSSIAN_SIGMA: f64 = 5.0;
/// Distance at which the background importance reaches 1.5.
const IMPORTANCE_HALF_DISTANCE: f64 = 5.0;

const EPSILON: f64 = f64::EPSILON;

/// Calculates the weighted F-measure of `prediction` against `gt`.
///
/// # Arguments
/// * `prediction` - Prediction with shape `[height, width]`, values in `[0, 1]`.
/// * `gt` - Binary ground truth of the same shape.
/// * `beta_squared` - β² of the F-beta combination.
///
/// # Returns
/// The weighted F-measure in `[0, 1]`; 0 when the ground truth has no foreground.
pub fn calculate_weighted_f_measure<B: Backend>(
    prediction: Tensor<B, 2>,
    gt: &GroundTruth<B>,
    beta_squared: f64,
) -> f64 {
    if gt.kind() == GroundTruthKind::AllBackground {
        return 0.0;
    }

    let [height, width] = gt.dims();
    let device = prediction.device();
    let foreground = gt.foreground().clone();
    let background = foreground.clone().bool_not();

    let error = (gt.mask().clone() - prediction).abs();

    let transform = euclidean_distance_transform(foreground.clone());

    // Foreground pixels are their own nearest foreground pixel, so the gather leaves them
    // untouched and only propagates errors into the background.
    let dependent_error = error
        .clone()
        .reshape([height * width])
        .gather(0, transform.nearest.reshape([height * width]))
        .reshape([height, width]);

    let kernel = gaussian_kernel::<B>(GAUSSIAN_SIZE, GAUSSIAN_SIGMA, &device);
    let smoothed_error = filter2d_replicate(dependent_error, kernel);

    let forgiven = foreground.clone().bool_and(smoothed_error.clone().lower(error.clone()));
    let min_error = error.mask_where(forgiven, smoothed_error);

    let importance = transform
        .distances
        .mul_scalar(0.5f64.ln() / IMPORTANCE_HALF_DISTANCE)
        .exp()
        .neg()
        .add_scalar(2.0)
        .mask_fill(foreground.clone(), 1.0);

    let weighted_error = min_error * importance;

    let fg_error = weighted_error
        .clone()
        .mask_fill(background, 0.0)
        .sum()
        .into_scalar()
        .elem::<f64>();
    let bg_error = weighted_error
        .mask_fill(foreground, 0.0)
        .sum()
        .into_scalar()
        .elem::<f64>();

    let foreground_count = gt.foreground_count() as f64;
    let tp_weighted = foreground_count - fg_error;
    let fp_weighted = bg_error;

    let recall = 1.0 - fg_error / foreground_count;
    let precision = tp_weighted / (tp_weighted + fp_weighted + EPSILON);

    let score =
        (1.0 + beta_squared) * recall * precision / (beta_squared.mul_add(precision, recall) + EPSILON);
    score.clamp(0.0, 1.0)
}
