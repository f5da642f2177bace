//! Structure Measure (S-measure).
//!
//! S-measure evaluates the structural similarity between a continuous prediction and a
//! binary ground truth, combining an object-aware score (how uniformly and confidently the
//! foreground and background are predicted) with a region-aware score (SSIM of the four
//! quadrants around the foreground centroid).

use burn::tensor::{backend::Backend, Bool, ElementConversion, Int, Tensor};

use crate::mask::{GroundTruth, GroundTruthKind};

/// Default weight of the object score.
pub const DEFAULT_ALPHA: f64 = 0.5;

const EPSILON: f64 = f64::EPSILON;

/// Calculates the S-measure of `prediction` against `gt`.
///
/// # Arguments
/// * `prediction` - Prediction with shape `[height, width]`, values in `[0, 1]`.
/// * `gt` - Binary ground truth of the same shape.
/// * `alpha` - Weight of the object score; `1 - alpha` weights the region score.
///
/// # Returns
/// The S-measure in `[0, 1]`. An all-background ground truth scores `1 - mean(prediction)`,
/// an all-foreground one scores `mean(prediction)`.
pub fn calculate_s_measure<B: Backend>(
    prediction: Tensor<B, 2>,
    gt: &GroundTruth<B>,
    alpha: f64,
) -> f64 {
    let score = match gt.kind() {
        GroundTruthKind::AllBackground => 1.0 - mean(prediction),
        GroundTruthKind::AllForeground => mean(prediction),
        GroundTruthKind::Mixed => {
            let object = object_score(prediction.clone(), gt);
            let region = region_score(prediction, gt);
            alpha.mul_add(object, (1.0 - alpha) * region)
        }
    };
    score.clamp(0.0, 1.0)
}

fn object_score<B: Backend>(prediction: Tensor<B, 2>, gt: &GroundTruth<B>) -> f64 {
    let foreground = gt.foreground().clone();
    let background = foreground.clone().bool_not();
    let foreground_count = gt.foreground_count();
    let background_count = gt.pixel_count() - foreground_count;

    let fg_score = s_object(prediction.clone(), foreground, foreground_count);
    let bg_score = s_object(
        prediction.neg().add_scalar(1.0),
        background,
        background_count,
    );

    let u = gt.foreground_fraction();
    u.mul_add(fg_score, (1.0 - u) * bg_score)
}

/// Object similarity of `values` over the `region` pixels: high mean, low spread.
fn s_object<B: Backend>(values: Tensor<B, 2>, region: Tensor<B, 2, Bool>, count: usize) -> f64 {
    let count = count as f64;
    let weights = region.float();

    let x = (values.clone() * weights.clone())
        .sum()
        .into_scalar()
        .elem::<f64>()
        / count;
    let variance = (values.sub_scalar(x) * weights)
        .powf_scalar(2.0)
        .sum()
        .into_scalar()
        .elem::<f64>()
        / count;
    let sigma_x = variance.max(0.0).sqrt();

    2.0 * x / (x.mul_add(x, 1.0) + sigma_x + EPSILON)
}

fn region_score<B: Backend>(prediction: Tensor<B, 2>, gt: &GroundTruth<B>) -> f64 {
    let [height, width] = gt.dims();
    let area = (height * width) as f64;
    let (row, col) = centroid(gt);

    let quadrants = [
        (0..row, 0..col),
        (0..row, col..width),
        (row..height, 0..col),
        (row..height, col..width),
    ];

    quadrants
        .into_iter()
        .filter(|(rows, cols)| !rows.is_empty() && !cols.is_empty())
        .map(|(rows, cols)| {
            let weight = (rows.len() * cols.len()) as f64 / area;
            let pred_region = prediction.clone().slice([rows.clone(), cols.clone()]);
            let gt_region = gt.mask().clone().slice([rows, cols]);
            weight * ssim(pred_region, gt_region)
        })
        .sum()
}

/// Quadrant split point `(row, col)`: the 1-based foreground centroid rounded
/// half-to-even.
fn centroid<B: Backend>(gt: &GroundTruth<B>) -> (usize, usize) {
    let [height, width] = gt.dims();
    let device = gt.mask().device();
    let count = gt.foreground_count() as f64;

    let rows: Tensor<B, 2> = Tensor::<B, 1, Int>::arange(0..height as i64, &device)
        .float()
        .reshape([height, 1]);
    let cols: Tensor<B, 2> = Tensor::<B, 1, Int>::arange(0..width as i64, &device)
        .float()
        .reshape([1, width]);

    let row_sums = gt.mask().clone().sum_dim(1);
    let col_sums = gt.mask().clone().sum_dim(0);

    let row = (row_sums * rows).sum().into_scalar().elem::<f64>() / count;
    let col = (col_sums * cols).sum().into_scalar().elem::<f64>() / count;

    (
        ((row + 1.0).round_ties_even() as usize).min(height),
        ((col + 1.0).round_ties_even() as usize).min(width),
    )
}

/// Structural similarity of one region with sample (N - 1) statistics.
fn ssim<B: Backend>(prediction: Tensor<B, 2>, gt: Tensor<B, 2>) -> f64 {
    let [height, width] = prediction.dims();
    let n = (height * width) as f64;
    let denominator = n - 1.0 + EPSILON;

    let x = mean(prediction.clone());
    let y = mean(gt.clone());

    let pred_centered = prediction.sub_scalar(x);
    let gt_centered = gt.sub_scalar(y);

    let sigma_x2 = scalar(pred_centered.clone().powf_scalar(2.0).sum()) / denominator;
    let sigma_y2 = scalar(gt_centered.clone().powf_scalar(2.0).sum()) / denominator;
    let sigma_xy = scalar((pred_centered * gt_centered).sum()) / denominator;

    let alpha = 4.0 * x * y * sigma_xy;
    let beta = x.mul_add(x, y * y) * (sigma_x2 + sigma_y2);

    if alpha != 0.0 {
        alpha / (beta + EPSILON)
    } else if beta == 0.0 {
        1.0
    } else {
        0.0
    }
}

fn mean<B: Backend>(tensor: Tensor<B, 2>) -> f64 {
    scalar(tensor.mean())
}

fn scalar<B: Backend>(tensor: Tensor<B, 1>) -> f64 {
    tensor.into_scalar().elem::<f64>()
}
