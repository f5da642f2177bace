//! Dataset-level aggregation of per-image results.
//!
//! The [`Aggregator`] owns one `num_images × num_thresholds` buffer per curve metric and
//! one vector per scalar metric. Every image writes its own row, so results can arrive in
//! any order. Summarizing averages each curve column-wise over images, then reports the
//! mean and the max of that averaged curve over thresholds.

use crate::{
    error::{SegEvalError, SegEvalResult},
    sweep::{CurveMetric, ThresholdCurves},
};

/// Threshold-independent metrics of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerImageScalars {
    pub s_measure: f64,
    pub weighted_f_measure: f64,
    pub mae: f64,
}

/// Everything the engine computes for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvaluation {
    pub scalars: PerImageScalars,
    pub curves: ThresholdCurves,
}

/// Mean and max of a dataset-averaged threshold curve.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurveStat {
    pub mean: f64,
    pub max: f64,
}

impl CurveStat {
    fn from_curve(curve: &[f64]) -> Self {
        let mean = curve.iter().sum::<f64>() / curve.len() as f64;
        let max = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self { mean, max }
    }
}

/// Summary statistics of one dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSummary {
    pub dice: CurveStat,
    pub iou: CurveStat,
    /// Recall curve statistics.
    pub sensitivity: CurveStat,
    pub specificity: CurveStat,
    pub e_measure: CurveStat,
    pub precision: CurveStat,
    pub f_measure: CurveStat,
    /// Mean S-measure over images.
    pub s_measure: f64,
    /// Mean weighted F-measure over images.
    pub weighted_f_measure: f64,
    /// Mean MAE over images.
    pub mae: f64,
    pub num_images: usize,
}

/// Accumulation buffers for one dataset.
#[derive(Debug, Clone)]
pub struct Aggregator {
    num_images: usize,
    num_thresholds: usize,
    curves: [Vec<f64>; 7],
    s_measure: Vec<f64>,
    weighted_f_measure: Vec<f64>,
    mae: Vec<f64>,
    recorded: Vec<bool>,
}

impl Aggregator {
    /// Allocates buffers for `num_images` images of `num_thresholds` thresholds each.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::InvalidConfiguration`] if `num_thresholds` is zero.
    pub fn new(num_images: usize, num_thresholds: usize) -> SegEvalResult<Self> {
        if num_thresholds == 0 {
            return Err(SegEvalError::InvalidConfiguration {
                reason: "An aggregator needs at least one threshold".to_owned(),
            });
        }

        Ok(Self {
            num_images,
            num_thresholds,
            curves: std::array::from_fn(|_| vec![0.0; num_images * num_thresholds]),
            s_measure: vec![0.0; num_images],
            weighted_f_measure: vec![0.0; num_images],
            mae: vec![0.0; num_images],
            recorded: vec![false; num_images],
        })
    }

    /// Number of images recorded so far.
    pub fn recorded_count(&self) -> usize {
        self.recorded.iter().filter(|&&done| done).count()
    }

    /// Stores the result of image `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::ImageIndexOutOfRange`] for an index outside the dataset,
    /// [`SegEvalError::CurveLengthMismatch`] if a curve does not have one value per
    /// threshold and [`SegEvalError::DuplicateImage`] if the index was already recorded.
    pub fn record(&mut self, index: usize, result: &ImageEvaluation) -> SegEvalResult<()> {
        if index >= self.num_images {
            return Err(SegEvalError::ImageIndexOutOfRange {
                index,
                count: self.num_images,
            });
        }
        for metric in CurveMetric::ALL {
            let actual = result.curves.get(metric).len();
            if actual != self.num_thresholds {
                return Err(SegEvalError::CurveLengthMismatch {
                    metric: metric.name(),
                    expected: self.num_thresholds,
                    actual,
                });
            }
        }
        if self.recorded[index] {
            return Err(SegEvalError::DuplicateImage { index });
        }

        let row = index * self.num_thresholds..(index + 1) * self.num_thresholds;
        for metric in CurveMetric::ALL {
            self.curves[metric.index()][row.clone()].copy_from_slice(result.curves.get(metric));
        }
        self.s_measure[index] = result.scalars.s_measure;
        self.weighted_f_measure[index] = result.scalars.weighted_f_measure;
        self.mae[index] = result.scalars.mae;
        self.recorded[index] = true;

        Ok(())
    }

    /// Reduces the buffers to a [`DatasetSummary`]. Does not modify the buffers.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::EmptyDataset`] for a dataset of zero images and
    /// [`SegEvalError::IncompleteDataset`] if an image was never recorded.
    pub fn summarize(&self) -> SegEvalResult<DatasetSummary> {
        if self.num_images == 0 {
            return Err(SegEvalError::EmptyDataset);
        }
        let missing = self.num_images - self.recorded_count();
        if missing > 0 {
            return Err(SegEvalError::IncompleteDataset {
                missing,
                count: self.num_images,
            });
        }

        let stat = |metric: CurveMetric| CurveStat::from_curve(&self.column_mean(metric));

        Ok(DatasetSummary {
            dice: stat(CurveMetric::Dice),
            iou: stat(CurveMetric::IoU),
            sensitivity: stat(CurveMetric::Recall),
            specificity: stat(CurveMetric::Specificity),
            e_measure: stat(CurveMetric::EMeasure),
            precision: stat(CurveMetric::Precision),
            f_measure: stat(CurveMetric::FMeasure),
            s_measure: mean(&self.s_measure),
            weighted_f_measure: mean(&self.weighted_f_measure),
            mae: mean(&self.mae),
            num_images: self.num_images,
        })
    }

    /// Averages the curve of `metric` over images, threshold by threshold.
    fn column_mean(&self, metric: CurveMetric) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_thresholds];
        for row in self.curves[metric.index()].chunks_exact(self.num_thresholds) {
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }
        let count = self.num_images as f64;
        sums.into_iter().map(|sum| sum / count).collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Column names of a persisted record, in order.
pub const RECORD_HEADERS: [&str; 14] = [
    "method", "meanDic", "meanIoU", "wFm", "Sm", "meanEm", "mae", "maxEm", "maxDic", "maxIoU",
    "meanSen", "maxSen", "meanSpe", "maxSpe",
];

/// One summarized (method, dataset) pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub method: String,
    pub dataset: String,
    pub summary: DatasetSummary,
}

impl MetricRecord {
    pub fn new(method: impl Into<String>, dataset: impl Into<String>, summary: DatasetSummary) -> Self {
        Self {
            method: method.into(),
            dataset: dataset.into(),
            summary,
        }
    }

    /// The numeric fields in [`RECORD_HEADERS`] order (after `method`).
    pub fn values(&self) -> [f64; 13] {
        let s = &self.summary;
        [
            s.dice.mean,
            s.iou.mean,
            s.weighted_f_measure,
            s.s_measure,
            s.e_measure.mean,
            s.mae,
            s.e_measure.max,
            s.dice.max,
            s.iou.max,
            s.sensitivity.mean,
            s.sensitivity.max,
            s.specificity.mean,
            s.specificity.max,
        ]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn evaluation(curve_value: f64, scalars: [f64; 3], num_thresholds: usize) -> ImageEvaluation {
        ImageEvaluation {
            scalars: PerImageScalars {
                s_measure: scalars[0],
                weighted_f_measure: scalars[1],
                mae: scalars[2],
            },
            curves: ThresholdCurves::from_values(std::array::from_fn(|_| {
                (0..num_thresholds)
                    .map(|j| curve_value * j as f64 / (num_thresholds - 1) as f64)
                    .collect()
            }))
            .unwrap(),
        }
    }

    #[test]
    fn summary_reduces_columns_then_thresholds() {
        let mut aggregator = Aggregator::new(2, 3).unwrap();
        aggregator
            .record(1, &evaluation(1.0, [0.8, 0.6, 0.1], 3))
            .unwrap();
        aggregator
            .record(0, &evaluation(0.5, [0.6, 0.4, 0.3], 3))
            .unwrap();

        let summary = aggregator.summarize().unwrap();

        // Averaged curve: [0, 0.375, 0.75].
        assert_relative_eq!(summary.dice.mean, 0.375, epsilon = 1e-12);
        assert_relative_eq!(summary.dice.max, 0.75, epsilon = 1e-12);
        assert_relative_eq!(summary.s_measure, 0.7, epsilon = 1e-12);
        assert_relative_eq!(summary.weighted_f_measure, 0.5, epsilon = 1e-12);
        assert_relative_eq!(summary.mae, 0.2, epsilon = 1e-12);
        assert_eq!(summary.num_images, 2);
    }

    #[test]
    fn record_rejects_bad_input() {
        let mut aggregator = Aggregator::new(1, 4).unwrap();

        assert!(matches!(
            aggregator.record(1, &evaluation(1.0, [0.0; 3], 4)),
            Err(SegEvalError::ImageIndexOutOfRange { index: 1, count: 1 })
        ));
        assert!(matches!(
            aggregator.record(0, &evaluation(1.0, [0.0; 3], 3)),
            Err(SegEvalError::CurveLengthMismatch { expected: 4, actual: 3, .. })
        ));

        aggregator.record(0, &evaluation(1.0, [0.0; 3], 4)).unwrap();
        assert!(matches!(
            aggregator.record(0, &evaluation(1.0, [0.0; 3], 4)),
            Err(SegEvalError::DuplicateImage { index: 0 })
        ));
    }

    #[test]
    fn summarize_requires_every_image() {
        let mut aggregator = Aggregator::new(3, 2).unwrap();
        aggregator.record(2, &evaluation(1.0, [0.0; 3], 2)).unwrap();

        assert!(matches!(
            aggregator.summarize(),
            Err(SegEvalError::IncompleteDataset { missing: 2, count: 3 })
        ));
        assert!(matches!(
            Aggregator::new(0, 2).unwrap().summarize(),
            Err(SegEvalError::EmptyDataset)
        ));
    }

    #[test]
    fn zero_thresholds_are_rejected() {
        assert!(matches!(
            Aggregator::new(3, 0),
            Err(SegEvalError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn record_values_follow_header_order() {
        let summary = DatasetSummary {
            dice: CurveStat { mean: 1.0, max: 8.0 },
            iou: CurveStat { mean: 2.0, max: 9.0 },
            sensitivity: CurveStat { mean: 10.0, max: 11.0 },
            specificity: CurveStat { mean: 12.0, max: 13.0 },
            e_measure: CurveStat { mean: 5.0, max: 7.0 },
            precision: CurveStat::default(),
            f_measure: CurveStat::default(),
            s_measure: 4.0,
            weighted_f_measure: 3.0,
            mae: 6.0,
            num_images: 1,
        };
        let record = MetricRecord::new("Net", "Kvasir", summary);

        assert_eq!(
            record.values(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0]
        );
        assert_eq!(RECORD_HEADERS.len(), record.values().len() + 1);
    }
}
