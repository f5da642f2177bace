//! Additional operations for the Burn deep learning framework
//!
//! This crate provides image-space operations used by mask evaluation metrics that are
//! not available in the core Burn framework: an exact Euclidean distance transform that
//! also reports the nearest feature pixel, and 2D filtering with replicated borders.

mod distance;
mod filter;

// Convenient re-exports
pub use distance::{euclidean_distance_transform, DistanceTransform};
pub use filter::{filter2d_replicate, gaussian_kernel, replicate_pad};
