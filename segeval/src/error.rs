use std::path::PathBuf;

use thiserror::Error;

/// The error type for mask evaluation.
///
/// Shape and pairing errors are fatal by construction: they indicate a misconfigured
/// prediction/ground-truth pairing and are never skipped silently. Degenerate masks are
/// not errors; the metrics handle them in closed form.
#[derive(Error, Debug)]
pub enum SegEvalError {
    /// A prediction and its ground truth do not have the same `[height, width]`.
    #[error("Shape mismatch: prediction is {prediction:?}, ground truth is {ground_truth:?}")]
    ShapeMismatch {
        /// Shape of the prediction map.
        prediction: [usize; 2],
        /// Shape of the ground-truth mask.
        ground_truth: [usize; 2],
    },

    /// A mask with zero pixels was supplied.
    #[error("Mask has no pixels: shape {shape:?}")]
    EmptyMask {
        /// The offending shape.
        shape: [usize; 2],
    },

    /// Sorted prediction and ground-truth file names do not pair up.
    #[error("File name mismatch: prediction {prediction} does not match ground truth {ground_truth}")]
    FileNameMismatch {
        /// Prediction file name.
        prediction: String,
        /// Ground-truth file name.
        ground_truth: String,
    },

    /// The prediction and ground-truth directories hold different numbers of images.
    #[error("Dataset {dataset}: {predictions} predictions but {ground_truths} ground-truth masks")]
    PairCountMismatch {
        /// Dataset name.
        dataset: String,
        /// Number of prediction files.
        predictions: usize,
        /// Number of ground-truth files.
        ground_truths: usize,
    },

    /// An expected input directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// Reading a directory failed.
    #[error("Failed to read directory: {path}")]
    DirectoryReadFailed {
        /// The directory that failed to read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Opening or decoding an image failed.
    #[cfg(feature = "dataset")]
    #[error("Failed to open image: {path}")]
    ImageOpenFailed {
        /// The image file.
        path: PathBuf,
        /// The underlying decoding error.
        #[source]
        source: image::ImageError,
    },

    /// A dataset directory holds no images.
    #[error("No samples found for dataset {dataset}")]
    NoSamples {
        /// Dataset name.
        dataset: String,
    },

    /// Logically inconsistent evaluator settings.
    #[error("Invalid evaluator configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// A per-image result was recorded at an index outside the dataset.
    #[error("Image index {index} out of range for a dataset of {count} images")]
    ImageIndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of images in the dataset.
        count: usize,
    },

    /// A threshold curve does not have one value per threshold.
    #[error("Curve {metric} has {actual} values, expected {expected}")]
    CurveLengthMismatch {
        /// Curve metric name.
        metric: &'static str,
        /// Number of thresholds the aggregator was sized for.
        expected: usize,
        /// Number of values received.
        actual: usize,
    },

    /// The same image was recorded twice.
    #[error("Image {index} was already recorded")]
    DuplicateImage {
        /// The repeated index.
        index: usize,
    },

    /// Summarizing before every image was recorded.
    #[error("Dataset incomplete: {missing} of {count} images not recorded")]
    IncompleteDataset {
        /// Images never recorded.
        missing: usize,
        /// Images expected.
        count: usize,
    },

    /// Summarizing a dataset of zero images.
    #[error("Cannot summarize an empty dataset")]
    EmptyDataset,

    /// Persisting a metric record failed.
    #[error("Failed to write report: {path}")]
    ReportWriteFailed {
        /// The report file or directory.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized `Result` type for mask evaluation.
pub type SegEvalResult<T> = Result<T, SegEvalError>;
