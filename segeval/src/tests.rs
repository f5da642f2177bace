use approx::assert_relative_eq;
use burn::tensor::Tensor;

use crate::{
    metrics::{
        calculate_confusion_metrics, calculate_mae, calculate_s_measure,
        calculate_weighted_f_measure, Aggregator,
    },
    CurveMetric, Evaluator, EvaluatorConfig, MaskPair, ThresholdSweep,
};

pub type TestBackend = burn::backend::NdArray<f32>;

fn pair<const H: usize, const W: usize>(
    prediction: [[f32; W]; H],
    gt: [[f32; W]; H],
) -> MaskPair<TestBackend> {
    let device = Default::default();
    MaskPair::new(
        Tensor::from_floats(prediction, &device),
        Tensor::from_floats(gt, &device),
    )
    .unwrap()
}

const GT: [[f32; 5]; 5] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 1.0, 1.0, 0.0],
    [0.0, 1.0, 1.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0],
];

const PREDICTION: [[f32; 5]; 5] = [
    [0.0, 0.1, 0.0, 0.3, 0.0],
    [0.2, 0.9, 0.8, 0.6, 0.1],
    [0.0, 0.7, 0.95, 0.5, 0.4],
    [0.1, 0.2, 0.35, 0.0, 0.0],
    [0.0, 0.0, 0.15, 0.25, 0.05],
];

#[test]
fn test_recall_never_decreases_as_threshold_drops() {
    let pair = pair(PREDICTION, GT);
    let sweep = ThresholdSweep::new(256, 0.3).unwrap();

    let curves = sweep.run(pair.prediction(), pair.ground_truth());
    let recall = curves.get(CurveMetric::Recall);

    assert!(recall.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(recall[255], 1.0);
}

#[test]
fn test_identical_masks_score_perfectly() {
    let pair = pair(GT, GT);

    let metrics = calculate_confusion_metrics(&pair, 0.5, 0.3);
    assert_eq!(metrics.dice, 1.0);
    assert_eq!(metrics.iou, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.specificity, 1.0);
    assert_eq!(calculate_mae(pair.prediction().clone(), pair.ground_truth()), 0.0);
}

#[test]
fn test_empty_ground_truth_closed_forms() {
    let pair = pair(PREDICTION, [[0.0; 5]; 5]);
    let mean: f64 = PREDICTION.iter().flatten().map(|&v| f64::from(v)).sum::<f64>() / 25.0;

    let s_measure = calculate_s_measure(pair.prediction().clone(), pair.ground_truth(), 0.5);
    let weighted_f =
        calculate_weighted_f_measure(pair.prediction().clone(), pair.ground_truth(), 1.0);

    assert_relative_eq!(s_measure, 1.0 - mean, epsilon = 1e-6);
    assert_eq!(weighted_f, 0.0);
}

#[test]
fn test_full_ground_truth_closed_form() {
    let pair = pair(PREDICTION, [[1.0; 5]; 5]);
    let mean: f64 = PREDICTION.iter().flatten().map(|&v| f64::from(v)).sum::<f64>() / 25.0;

    let s_measure = calculate_s_measure(pair.prediction().clone(), pair.ground_truth(), 0.5);
    assert_relative_eq!(s_measure, mean, epsilon = 1e-6);
}

#[test]
fn test_single_image_summary_equals_image_scalars() {
    let evaluator = Evaluator::new(EvaluatorConfig::new()).unwrap();
    let image = evaluator.evaluate_pair(&pair(PREDICTION, GT));

    let summary = evaluator
        .evaluate_dataset(1, |_| Ok(pair(PREDICTION, GT)))
        .unwrap();

    assert_eq!(summary.s_measure, image.scalars.s_measure);
    assert_eq!(summary.weighted_f_measure, image.scalars.weighted_f_measure);
    assert_eq!(summary.mae, image.scalars.mae);
}

#[test]
fn test_full_ground_truth_with_full_prediction() {
    let pair = pair([[1.0; 4]; 4], [[1.0; 4]; 4]);

    let metrics = calculate_confusion_metrics(&pair, 0.5, 0.3);
    assert_eq!(metrics.iou, 1.0);
    assert_eq!(metrics.dice, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.specificity, 1.0);
    assert_eq!(calculate_mae(pair.prediction().clone(), pair.ground_truth()), 0.0);
}

#[test]
fn test_full_ground_truth_with_empty_prediction() {
    let pair = pair([[0.0; 4]; 4], [[1.0; 4]; 4]);

    let metrics = calculate_confusion_metrics(&pair, 0.5, 0.3);
    assert_eq!(metrics.iou, 0.0);
    assert_eq!(metrics.dice, 0.0);
    assert_eq!(metrics.recall, 0.0);
    assert_eq!(metrics.specificity, 1.0);
    assert_eq!(calculate_mae(pair.prediction().clone(), pair.ground_truth()), 1.0);
}

#[test]
fn test_summarize_is_idempotent() {
    let evaluator = Evaluator::new(EvaluatorConfig::new().with_num_thresholds(16)).unwrap();
    let results = [
        evaluator.evaluate_pair(&pair(PREDICTION, GT)),
        evaluator.evaluate_pair(&pair(GT, GT)),
    ];

    let mut aggregator = Aggregator::new(results.len(), 16).unwrap();
    for (index, result) in results.iter().enumerate() {
        aggregator.record(index, result).unwrap();
    }

    let first = aggregator.summarize().unwrap();
    let second = aggregator.summarize().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_perfect_prediction_summary() {
    let evaluator = Evaluator::new(EvaluatorConfig::new()).unwrap();
    let summary = evaluator
        .evaluate_dataset(2, |_| Ok(pair(GT, GT)))
        .unwrap();

    assert_relative_eq!(summary.dice.max, 1.0);
    assert_relative_eq!(summary.iou.max, 1.0);
    assert_relative_eq!(summary.mae, 0.0);
    assert_relative_eq!(summary.e_measure.max, 1.0, epsilon = 1e-9);
    assert!(summary.s_measure > 0.99);
    assert_relative_eq!(summary.weighted_f_measure, 1.0, epsilon = 1e-6);
}
