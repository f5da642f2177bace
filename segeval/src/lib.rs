//! # segeval-burn
//!
//! Binary-mask quality evaluation on the Burn tensor framework.
//!
//! Given a continuous prediction map and a binary ground-truth mask, the engine computes
//! region-aware, structure-aware and threshold-dependent similarity metrics and folds them
//! across a dataset into mean/max summaries:
//!
//! - Confusion ratios (Precision, Recall, Specificity, Dice, F-measure, IoU) at a threshold
//! - S-measure, weighted F-measure, E-measure and MAE
//! - A 256-step threshold sweep from 1.0 down to 0.0
//! - Dataset summaries (`meanDic`, `maxDic`, `meanEm`, ...) and per-method records
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::NdArray;
//! use segeval_burn::{Evaluator, EvaluatorConfig, MaskPair};
//!
//! let evaluator = Evaluator::new(EvaluatorConfig::new())?;
//! let pair = MaskPair::<NdArray>::new(prediction, ground_truth)?;
//! let result = evaluator.evaluate_pair(&pair);
//! println!("S-measure: {}", result.scalars.s_measure);
//! ```
//!
//! With the `dataset` feature (enabled by default) the crate also pairs and decodes image
//! directories and appends summary records to per-dataset CSV files.

mod config;
mod error;
mod evaluator;
mod mask;
pub mod metrics;
mod sweep;

#[cfg(feature = "dataset")]
pub mod dataset;
#[cfg(feature = "dataset")]
pub mod report;

pub use config::EvaluatorConfig;
pub use error::{SegEvalError, SegEvalResult};
pub use evaluator::Evaluator;
pub use mask::{GroundTruth, GroundTruthKind, MaskPair};
pub use metrics::{
    Aggregator, ConfusionCounts, ConfusionMetrics, CurveStat, DatasetSummary, ImageEvaluation,
    MetricRecord, PerImageScalars, RECORD_HEADERS,
};
pub use sweep::{CurveMetric, ThresholdCurves, ThresholdSweep, DEFAULT_NUM_THRESHOLDS};

#[cfg(test)]
mod tests;
