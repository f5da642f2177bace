//! Mask evaluation metrics.
//!
//! - [`calculate_confusion_metrics`]: Precision, Recall, Specificity, Dice, F-measure and IoU
//!   of a prediction binarized at one threshold
//! - [`calculate_s_measure`]: Structure measure
//! - [`calculate_weighted_f_measure`]: Distance-weighted F-measure
//! - [`calculate_e_measure`]: Enhanced-alignment measure
//! - [`calculate_mae`]: Mean Absolute Error
//! - [`Aggregator`]: dataset-level mean/max summaries

pub mod aggregator;
pub mod confusion;
pub mod e_measure;
pub mod mae;
pub mod s_measure;
pub mod weighted_f_measure;

pub use aggregator::{
    Aggregator, CurveStat, DatasetSummary, ImageEvaluation, MetricRecord, PerImageScalars,
    RECORD_HEADERS,
};
pub use confusion::{calculate_confusion_metrics, ConfusionCounts, ConfusionMetrics};
pub use e_measure::{calculate_e_measure, e_measure_from_counts};
pub use mae::calculate_mae;
pub use s_measure::calculate_s_measure;
pub use weighted_f_measure::calculate_weighted_f_measure;
