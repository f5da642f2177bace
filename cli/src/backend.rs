//! Compute backend chosen at build time through the `ndarray`, `wgpu` and `cuda` features.
//!
//! When several features are enabled the GPU backends win, CUDA first.

use burn::tensor::backend::Backend;
use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "cuda")] {
        pub type SelectedBackend = burn::backend::Cuda;
        pub const BACKEND_NAME: &str = "CUDA (NVIDIA GPU)";
    } else if #[cfg(feature = "wgpu")] {
        pub type SelectedBackend = burn::backend::Wgpu;
        pub const BACKEND_NAME: &str = "WGPU (GPU)";
    } else {
        pub type SelectedBackend = burn::backend::NdArray;
        pub const BACKEND_NAME: &str = "NdArray (CPU)";
    }
}

/// Device every evaluation runs on: the backend's default device.
pub fn evaluation_device() -> <SelectedBackend as Backend>::Device {
    Default::default()
}

#[cfg(all(test, not(any(feature = "cuda", feature = "wgpu"))))]
mod tests {
    use burn::tensor::Tensor;

    use super::*;

    #[test]
    fn cpu_build_evaluates_on_ndarray() {
        assert_eq!(BACKEND_NAME, "NdArray (CPU)");

        let device = evaluation_device();
        let ones = Tensor::<SelectedBackend, 2>::ones([2, 3], &device);
        assert_eq!(ones.sum().into_scalar(), 6.0);
    }
}
