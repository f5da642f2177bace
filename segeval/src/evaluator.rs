//! Per-image and per-dataset evaluation.

use burn::tensor::backend::Backend;
use rayon::prelude::*;

use crate::{
    config::EvaluatorConfig,
    error::SegEvalResult,
    mask::MaskPair,
    metrics::{
        calculate_mae, calculate_s_measure, calculate_weighted_f_measure, Aggregator,
        DatasetSummary, ImageEvaluation, PerImageScalars,
    },
    sweep::ThresholdSweep,
};

/// Runs every metric on mask pairs and folds datasets into summaries.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvaluatorConfig,
    sweep: ThresholdSweep,
}

impl Evaluator {
    /// Validates `config` and precomputes the threshold sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::InvalidConfiguration`](crate::SegEvalError::InvalidConfiguration)
    /// if the configuration is rejected by [`EvaluatorConfig::validate`].
    pub fn new(config: EvaluatorConfig) -> SegEvalResult<Self> {
        config.validate()?;
        let sweep = ThresholdSweep::new(config.num_thresholds, config.f_beta_squared)?;
        Ok(Self { config, sweep })
    }

    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// The threshold sequence, descending from 1.0 to 0.0.
    pub fn thresholds(&self) -> &[f64] {
        self.sweep.thresholds()
    }

    /// Computes the scalar metrics and threshold curves of one image.
    pub fn evaluate_pair<B: Backend>(&self, pair: &MaskPair<B>) -> ImageEvaluation {
        let prediction = pair.prediction();
        let gt = pair.ground_truth();

        let scalars = PerImageScalars {
            s_measure: calculate_s_measure(prediction.clone(), gt, self.config.s_alpha),
            weighted_f_measure: calculate_weighted_f_measure(
                prediction.clone(),
                gt,
                self.config.weighted_f_beta_squared,
            ),
            mae: calculate_mae(prediction.clone(), gt),
        };
        let curves = self.sweep.run(prediction, gt);

        ImageEvaluation { scalars, curves }
    }

    /// Evaluates images `0..count`, each obtained from `loader`, and summarizes them.
    ///
    /// Images run on the rayon pool when `parallel` is set. Results are recorded into a
    /// fresh [`Aggregator`] only after every image has finished.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `loader`, or an aggregation error such as
    /// [`SegEvalError::EmptyDataset`](crate::SegEvalError::EmptyDataset) for `count == 0`.
    pub fn evaluate_dataset<B, F>(&self, count: usize, loader: F) -> SegEvalResult<DatasetSummary>
    where
        B: Backend,
        F: Fn(usize) -> SegEvalResult<MaskPair<B>> + Sync,
    {
        let evaluate = |index: usize| -> SegEvalResult<ImageEvaluation> {
            let pair = loader(index)?;
            let [height, width] = pair.dims();
            let result = self.evaluate_pair(&pair);
            tracing::debug!(
                index,
                height,
                width,
                s_measure = result.scalars.s_measure,
                mae = result.scalars.mae,
                "evaluated image"
            );
            Ok(result)
        };

        let results: Vec<ImageEvaluation> = if self.config.parallel {
            (0..count)
                .into_par_iter()
                .map(evaluate)
                .collect::<SegEvalResult<_>>()?
        } else {
            (0..count).map(evaluate).collect::<SegEvalResult<_>>()?
        };

        let mut aggregator = Aggregator::new(count, self.sweep.len())?;
        for (index, result) in results.iter().enumerate() {
            aggregator.record(index, result)?;
        }
        aggregator.summarize()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use burn::tensor::Tensor;

    use super::*;
    use crate::{error::SegEvalError, tests::TestBackend};

    fn pair(prediction: [[f32; 4]; 4], gt: [[f32; 4]; 4]) -> MaskPair<TestBackend> {
        let device = Default::default();
        MaskPair::new(
            Tensor::from_floats(prediction, &device),
            Tensor::from_floats(gt, &device),
        )
        .unwrap()
    }

    const GT: [[f32; 4]; 4] = [
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 1.0, 0.0],
        [0.0, 1.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
    ];

    const PREDICTION: [[f32; 4]; 4] = [
        [0.1, 0.0, 0.2, 0.0],
        [0.0, 0.9, 0.7, 0.3],
        [0.0, 0.8, 0.4, 0.0],
        [0.1, 0.0, 0.0, 0.6],
    ];

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = EvaluatorConfig::new().with_num_thresholds(1);
        assert!(matches!(
            Evaluator::new(config),
            Err(SegEvalError::InvalidConfiguration { .. })
        ));

        let config = EvaluatorConfig::new().with_s_alpha(1.5);
        assert!(matches!(
            Evaluator::new(config),
            Err(SegEvalError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let pairs = [(PREDICTION, GT), (GT, GT), ([[0.5; 4]; 4], GT)];
        let loader = |index: usize| -> SegEvalResult<MaskPair<TestBackend>> {
            let (prediction, gt) = pairs[index];
            Ok(pair(prediction, gt))
        };

        let parallel = Evaluator::new(EvaluatorConfig::new().with_num_thresholds(32))
            .unwrap()
            .evaluate_dataset(pairs.len(), loader)
            .unwrap();
        let sequential = Evaluator::new(
            EvaluatorConfig::new()
                .with_num_thresholds(32)
                .with_parallel(false),
        )
        .unwrap()
        .evaluate_dataset(pairs.len(), loader)
        .unwrap();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.num_images, 3);
    }

    #[test]
    fn loader_errors_abort_the_dataset() {
        let evaluator = Evaluator::new(EvaluatorConfig::new()).unwrap();
        let result = evaluator.evaluate_dataset(4, |index| {
            if index == 2 {
                Err(SegEvalError::FileNameMismatch {
                    prediction: "2.png".to_owned(),
                    ground_truth: "3.png".to_owned(),
                })
            } else {
                Ok(pair(PREDICTION, GT))
            }
        });

        assert!(matches!(result, Err(SegEvalError::FileNameMismatch { .. })));
    }

    #[test]
    fn evaluate_pair_produces_full_curves() {
        let evaluator = Evaluator::new(EvaluatorConfig::new()).unwrap();
        let result = evaluator.evaluate_pair(&pair(PREDICTION, GT));

        assert_eq!(result.curves.len(), 256);
        assert_relative_eq!(result.scalars.mae, 2.5 / 16.0, epsilon = 1e-6);
        assert!(result.scalars.s_measure > 0.5 && result.scalars.s_measure < 1.0);
        assert!(result.scalars.weighted_f_measure > 0.0 && result.scalars.weighted_f_measure < 1.0);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let evaluator = Evaluator::new(EvaluatorConfig::new()).unwrap();
        let result = evaluator.evaluate_dataset(0, |_| Ok(pair(GT, GT)));

        assert!(matches!(result, Err(SegEvalError::EmptyDataset)));
    }
}
