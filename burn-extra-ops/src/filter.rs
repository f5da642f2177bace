//! Border-aware 2D filtering.
//!
//! Burn's `conv2d` only pads with zeros. Mask metrics smooth error maps with the border
//! pixels replicated outward (`mode='nearest'` in SciPy, `'replicate'` in MATLAB), so the
//! padding is built explicitly before a valid convolution.

use burn::tensor::{
    backend::Backend, module::conv2d, ops::ConvOptions, ElementConversion, Tensor,
};

/// MATLAB-style normalized 2D Gaussian kernel (`fspecial('gaussian', [size size], sigma)`).
///
/// Values below `eps * max` are zeroed before normalization, as MATLAB does.
///
/// # Panics
/// Panics if `size` is zero or even.
pub fn gaussian_kernel<B: Backend>(size: usize, sigma: f64, device: &B::Device) -> Tensor<B, 2> {
    assert!(size > 0 && size % 2 == 1, "Kernel size must be odd and > 0");

    let center = (size - 1) as f64 / 2.0;
    let two_sigma_squared = 2.0 * sigma * sigma;

    let mut kernel_data: Vec<f64> = (0..size * size)
        .map(|i| {
            let y = (i / size) as f64 - center;
            let x = (i % size) as f64 - center;
            (-x.mul_add(x, y * y) / two_sigma_squared).exp()
        })
        .collect();

    let max_val = kernel_data.iter().copied().fold(0.0, f64::max);
    let threshold = f64::EPSILON * max_val;
    for value in &mut kernel_data {
        if *value < threshold {
            *value = 0.0;
        }
    }

    let kernel = Tensor::<B, 1>::from_floats(kernel_data.as_slice(), device).reshape([size, size]);

    let sum_val = kernel.clone().sum().into_scalar().elem::<f64>();
    if sum_val > f64::EPSILON {
        kernel.div_scalar(sum_val)
    } else {
        kernel
    }
}

/// Pads a `[height, width]` tensor by repeating its edge rows and columns.
pub fn replicate_pad<B: Backend>(tensor: Tensor<B, 2>, pad_h: usize, pad_w: usize) -> Tensor<B, 2> {
    let [height, cols] = tensor.dims();
    let tensor = if pad_h > 0 {
        let top = tensor.clone().slice([0..1, 0..cols]).repeat_dim(0, pad_h);
        let bottom = tensor
            .clone()
            .slice([height - 1..height, 0..cols])
            .repeat_dim(0, pad_h);
        Tensor::cat(vec![top, tensor, bottom], 0)
    } else {
        tensor
    };

    let [rows, width] = tensor.dims();
    if pad_w > 0 {
        let left = tensor.clone().slice([0..rows, 0..1]).repeat_dim(1, pad_w);
        let right = tensor
            .clone()
            .slice([0..rows, width - 1..width])
            .repeat_dim(1, pad_w);
        Tensor::cat(vec![left, tensor, right], 1)
    } else {
        tensor
    }
}

/// Correlates `image` with `kernel`, treating out-of-bounds pixels as copies of the
/// nearest border pixel. The output has the same shape as `image`.
///
/// For symmetric kernels (such as [`gaussian_kernel`]) correlation and convolution agree.
pub fn filter2d_replicate<B: Backend>(image: Tensor<B, 2>, kernel: Tensor<B, 2>) -> Tensor<B, 2> {
    let [height, width] = image.dims();
    let [kernel_h, kernel_w] = kernel.dims();

    let padded = replicate_pad(image, kernel_h / 2, kernel_w / 2);
    let [padded_h, padded_w] = padded.dims();

    let options = ConvOptions::new([1, 1], [0, 0], [1, 1], 1);
    let filtered = conv2d(
        padded.reshape([1, 1, padded_h, padded_w]),
        kernel.reshape([1, 1, kernel_h, kernel_w]),
        None, // no bias
        options,
    );

    filtered.reshape([height, width])
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use burn::backend::ndarray::NdArray;

    use super::*;

    type TestBackend = NdArray<f32>;

    #[test]
    fn gaussian_kernel_is_normalized_and_symmetric() {
        let device = Default::default();
        let kernel = gaussian_kernel::<TestBackend>(7, 5.0, &device);
        assert_eq!(kernel.dims(), [7, 7]);

        let values: Vec<f32> = kernel.clone().into_data().iter::<f32>().collect();
        let sum: f32 = values.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(values[0], values[48], epsilon = 1e-7);
        assert_abs_diff_eq!(values[6], values[42], epsilon = 1e-7);
        assert!(values[24] > values[0]);
    }

    #[test]
    fn replicate_pad_repeats_edges() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0], [3.0, 4.0]], &device);

        let padded = replicate_pad(tensor, 1, 1);
        let values: Vec<f32> = padded.into_data().iter::<f32>().collect();

        #[rustfmt::skip]
        let expected: [f32; 16] = [
            1.0, 1.0, 2.0, 2.0,
            1.0, 1.0, 2.0, 2.0,
            3.0, 3.0, 4.0, 4.0,
            3.0, 3.0, 4.0, 4.0,
        ];
        assert_eq!(values, expected);
    }

    #[test]
    fn filtering_a_constant_image_preserves_it() {
        let device = Default::default();
        let image = Tensor::<TestBackend, 2>::ones([5, 4], &device).mul_scalar(0.25);
        let kernel = gaussian_kernel::<TestBackend>(7, 5.0, &device);

        let filtered = filter2d_replicate(image, kernel);
        assert_eq!(filtered.dims(), [5, 4]);
        for value in filtered.into_data().iter::<f32>() {
            assert_abs_diff_eq!(value, 0.25, epsilon = 1e-5);
        }
    }

    #[test]
    fn filtering_with_identity_kernel_is_a_no_op() {
        let device = Default::default();
        let image =
            Tensor::<TestBackend, 2>::from_floats([[0.0, 1.0, 0.5], [0.2, 0.4, 0.9]], &device);
        let kernel = Tensor::<TestBackend, 2>::from_floats(
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            &device,
        );

        let filtered = filter2d_replicate(image.clone(), kernel);
        let expected: Vec<f32> = image.into_data().iter::<f32>().collect();
        let actual: Vec<f32> = filtered.into_data().iter::<f32>().collect();
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-6);
        }
    }
}
