//! Evaluation run over the configured datasets.

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use segeval_burn::{
    dataset::{load_mask_pair, DatasetLayout},
    report::append_record,
    Evaluator, MetricRecord,
};

use crate::config::EvaluationSettings;

/// Evaluates every dataset of `settings`, appending one record per dataset to its result
/// file, and returns the records in dataset order.
///
/// # Errors
///
/// Returns an error on the first dataset that cannot be paired, decoded, evaluated or
/// written.
pub fn run_evaluation<B: Backend>(
    settings: &EvaluationSettings,
    device: &B::Device,
) -> Result<Vec<MetricRecord>> {
    let evaluator = Evaluator::new(settings.evaluator.clone())?;
    let layout = DatasetLayout::new(&settings.pred_root, &settings.gt_root);
    let method = settings.method_name();

    tracing::info!(
        method = %method,
        pred_root = %settings.pred_root.display(),
        gt_root = %settings.gt_root.display(),
        thresholds = settings.evaluator.num_thresholds,
        parallel = settings.evaluator.parallel,
        "starting evaluation",
    );

    let mut records = Vec::with_capacity(settings.datasets.len());
    for dataset in &settings.datasets {
        let samples = layout
            .collect_samples(dataset)
            .with_context(|| format!("Failed to pair samples of dataset {dataset}"))?;
        tracing::info!(dataset = %dataset, images = samples.len(), "evaluating dataset");

        let summary = evaluator
            .evaluate_dataset(samples.len(), |index| {
                load_mask_pair::<B>(&samples[index], device)
            })
            .with_context(|| format!("Failed to evaluate dataset {dataset}"))?;

        let record = MetricRecord::new(method.clone(), dataset.clone(), summary);
        let path = append_record(&settings.result_path, &record)?;

        tracing::info!(
            dataset = %dataset,
            mean_dice = summary.dice.mean,
            mean_iou = summary.iou.mean,
            s_measure = summary.s_measure,
            mae = summary.mae,
            path = %path.display(),
            "dataset evaluated",
        );
        records.push(record);
    }

    Ok(records)
}
