//! Dataset adapter: pairs prediction files with ground-truth masks and decodes them.
//!
//! Layout:
//!
//! ```text
//! <pred_root>/<dataset>/<name>.<ext>
//! <gt_root>/<dataset>/mask/<name>.<ext>
//! ```
//!
//! Both directories are listed, sorted by file name and paired position by position. The
//! pairing must be exact: a count or name mismatch means the run is misconfigured and is
//! reported as an error instead of being skipped.

use std::path::{Path, PathBuf};

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::DynamicImage;
use walkdir::WalkDir;

use crate::{
    error::{SegEvalError, SegEvalResult},
    mask::MaskPair,
};

/// Image file extensions recognised in dataset directories (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Ground-truth values strictly above this level are foreground.
const GT_BINARIZATION_LEVEL: f32 = 0.5;

/// Root directories of predictions and ground truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub pred_root: PathBuf,
    pub gt_root: PathBuf,
}

/// File paths of one prediction/ground-truth pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    /// File stem shared by both files.
    pub name: String,
    pub prediction: PathBuf,
    pub ground_truth: PathBuf,
}

impl DatasetLayout {
    pub fn new(pred_root: impl Into<PathBuf>, gt_root: impl Into<PathBuf>) -> Self {
        Self {
            pred_root: pred_root.into(),
            gt_root: gt_root.into(),
        }
    }

    /// Directory holding the predictions of `dataset`.
    pub fn prediction_dir(&self, dataset: &str) -> PathBuf {
        self.pred_root.join(dataset)
    }

    /// Directory holding the ground-truth masks of `dataset`.
    pub fn ground_truth_dir(&self, dataset: &str) -> PathBuf {
        self.gt_root.join(dataset).join("mask")
    }

    /// Lists and pairs the samples of `dataset`.
    ///
    /// # Errors
    ///
    /// - [`SegEvalError::DirectoryNotFound`] / [`SegEvalError::DirectoryReadFailed`] if a
    ///   directory is missing or unreadable
    /// - [`SegEvalError::PairCountMismatch`] if the two directories hold different numbers
    ///   of images
    /// - [`SegEvalError::FileNameMismatch`] if sorted names do not pair up
    /// - [`SegEvalError::NoSamples`] if there are no images at all
    pub fn collect_samples(&self, dataset: &str) -> SegEvalResult<Vec<SamplePaths>> {
        let predictions = list_images(&self.prediction_dir(dataset))?;
        let ground_truths = list_images(&self.ground_truth_dir(dataset))?;

        if predictions.len() != ground_truths.len() {
            return Err(SegEvalError::PairCountMismatch {
                dataset: dataset.to_owned(),
                predictions: predictions.len(),
                ground_truths: ground_truths.len(),
            });
        }
        if predictions.is_empty() {
            return Err(SegEvalError::NoSamples {
                dataset: dataset.to_owned(),
            });
        }

        predictions
            .into_iter()
            .zip(ground_truths)
            .map(|(prediction, ground_truth)| {
                let name = file_stem(&prediction);
                if name != file_stem(&ground_truth) {
                    return Err(SegEvalError::FileNameMismatch {
                        prediction: file_name(&prediction),
                        ground_truth: file_name(&ground_truth),
                    });
                }
                Ok(SamplePaths {
                    name,
                    prediction,
                    ground_truth,
                })
            })
            .collect()
    }
}

/// Lists the image files directly inside `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`SegEvalError::DirectoryNotFound`] if `dir` is not a directory and
/// [`SegEvalError::DirectoryReadFailed`] if it cannot be read.
pub fn list_images(dir: &Path) -> SegEvalResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SegEvalError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SegEvalError::DirectoryReadFailed {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();

        if entry.file_type().is_file() && has_image_extension(path) {
            images.push(path.to_path_buf());
        } else {
            tracing::warn!(path = %path.display(), "skipping non-image entry");
        }
    }

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Loads one image as a single-channel `[height, width]` tensor with values in `[0, 1]`.
///
/// Multi-channel images are reduced to their first channel.
///
/// # Errors
///
/// Returns [`SegEvalError::ImageOpenFailed`] if the file cannot be opened or decoded.
pub fn load_mask<B: Backend>(path: &Path, device: &B::Device) -> SegEvalResult<Tensor<B, 2>> {
    let image = image::open(path).map_err(|source| SegEvalError::ImageOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(first_channel_to_tensor(&image, device))
}

fn first_channel_to_tensor<B: Backend>(image: &DynamicImage, device: &B::Device) -> Tensor<B, 2> {
    let (width, height) = (image.width() as usize, image.height() as usize);

    let values: Vec<f32> = match image {
        DynamicImage::ImageLuma8(buffer) => buffer
            .as_raw()
            .iter()
            .map(|&value| f32::from(value) / 255.0)
            .collect(),
        _ => image
            .to_rgb32f()
            .into_raw()
            .chunks_exact(3)
            .map(|pixel| pixel[0])
            .collect(),
    };

    Tensor::from_data(TensorData::new(values, [height, width]), device)
}

/// Loads and validates the prediction/ground-truth pair of `sample`.
///
/// The ground truth is binarized (`> 0.5`), the prediction is left continuous.
///
/// # Errors
///
/// Returns [`SegEvalError::ImageOpenFailed`] for unreadable files and
/// [`SegEvalError::ShapeMismatch`] if the two images differ in size.
pub fn load_mask_pair<B: Backend>(
    sample: &SamplePaths,
    device: &B::Device,
) -> SegEvalResult<MaskPair<B>> {
    let prediction = load_mask::<B>(&sample.prediction, device)?;
    let ground_truth = load_mask::<B>(&sample.ground_truth, device)?
        .greater_elem(GT_BINARIZATION_LEVEL)
        .float();

    MaskPair::new(prediction, ground_truth)
}

/// Method name of a prediction root: its last path component.
pub fn method_name(pred_root: &Path) -> String {
    pred_root
        .components()
        .next_back()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_else(|| "method".to_owned())
}
