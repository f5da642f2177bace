//! Prediction/ground-truth mask pairs.
//!
//! A [`MaskPair`] is the unit the engine evaluates: one continuous prediction map and one
//! binary ground-truth mask of identical `[height, width]`. The ground truth is classified
//! once on construction so that every structure-aware metric agrees on which degenerate
//! case applies.

use burn::tensor::{backend::Backend, Bool, ElementConversion, Tensor};

use crate::error::{SegEvalError, SegEvalResult};

/// Foreground composition of a ground-truth mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundTruthKind {
    /// No foreground pixel.
    AllBackground,
    /// Every pixel is foreground.
    AllForeground,
    /// Both foreground and background pixels are present.
    Mixed,
}

impl GroundTruthKind {
    /// Classifies a mask from its foreground and total pixel counts.
    pub const fn classify(foreground: usize, total: usize) -> Self {
        if foreground == 0 {
            Self::AllBackground
        } else if foreground == total {
            Self::AllForeground
        } else {
            Self::Mixed
        }
    }
}

/// A binary ground-truth mask with its cached statistics.
#[derive(Debug, Clone)]
pub struct GroundTruth<B: Backend> {
    mask: Tensor<B, 2>,
    foreground: Tensor<B, 2, Bool>,
    foreground_count: usize,
    kind: GroundTruthKind,
}

impl<B: Backend> GroundTruth<B> {
    /// Binarizes `mask` at 0.5 and classifies it.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::EmptyMask`] if the mask has no pixels.
    pub fn new(mask: Tensor<B, 2>) -> SegEvalResult<Self> {
        let [height, width] = mask.dims();
        if height * width == 0 {
            return Err(SegEvalError::EmptyMask {
                shape: [height, width],
            });
        }

        let foreground = mask.greater_equal_elem(0.5);
        let foreground_count = foreground
            .clone()
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;

        Ok(Self {
            mask: foreground.clone().float(),
            foreground,
            foreground_count,
            kind: GroundTruthKind::classify(foreground_count, height * width),
        })
    }

    /// The mask as a `{0, 1}` float tensor.
    pub const fn mask(&self) -> &Tensor<B, 2> {
        &self.mask
    }

    /// The mask as a boolean tensor, `true` on foreground.
    pub const fn foreground(&self) -> &Tensor<B, 2, Bool> {
        &self.foreground
    }

    /// Number of foreground pixels.
    pub const fn foreground_count(&self) -> usize {
        self.foreground_count
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        let [height, width] = self.dims();
        height * width
    }

    /// Fraction of foreground pixels, i.e. the mean of the mask.
    pub fn foreground_fraction(&self) -> f64 {
        self.foreground_count as f64 / self.pixel_count() as f64
    }

    /// Degenerate-case classification.
    pub const fn kind(&self) -> GroundTruthKind {
        self.kind
    }

    /// Mask shape `[height, width]`.
    pub fn dims(&self) -> [usize; 2] {
        self.mask.dims()
    }
}

/// One prediction map and its ground truth, validated to share a shape.
#[derive(Debug, Clone)]
pub struct MaskPair<B: Backend> {
    prediction: Tensor<B, 2>,
    ground_truth: GroundTruth<B>,
}

impl<B: Backend> MaskPair<B> {
    /// Creates a pair from a prediction in `[0, 1]` and a binary ground truth.
    ///
    /// Prediction values are clamped to `[0, 1]`; the ground truth is binarized at 0.5.
    ///
    /// # Errors
    ///
    /// Returns [`SegEvalError::ShapeMismatch`] if the shapes differ and
    /// [`SegEvalError::EmptyMask`] if the masks have no pixels.
    pub fn new(prediction: Tensor<B, 2>, ground_truth: Tensor<B, 2>) -> SegEvalResult<Self> {
        let prediction_dims = prediction.dims();
        let ground_truth_dims = ground_truth.dims();
        if prediction_dims != ground_truth_dims {
            return Err(SegEvalError::ShapeMismatch {
                prediction: prediction_dims,
                ground_truth: ground_truth_dims,
            });
        }

        Ok(Self {
            prediction: prediction.clamp(0.0, 1.0),
            ground_truth: GroundTruth::new(ground_truth)?,
        })
    }

    /// The continuous prediction map.
    pub const fn prediction(&self) -> &Tensor<B, 2> {
        &self.prediction
    }

    /// The binary ground truth.
    pub const fn ground_truth(&self) -> &GroundTruth<B> {
        &self.ground_truth
    }

    /// Shape `[height, width]` shared by both masks.
    pub fn dims(&self) -> [usize; 2] {
        self.ground_truth.dims()
    }
}
