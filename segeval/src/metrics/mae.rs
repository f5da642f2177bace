//! Mean Absolute Error between a continuous prediction and a binary ground truth.

use burn::tensor::{backend::Backend, ElementConversion, Tensor};

use crate::mask::GroundTruth;

/// Calculates `mean(|GT - P|)` over all pixels.
pub fn calculate_mae<B: Backend>(prediction: Tensor<B, 2>, gt: &GroundTruth<B>) -> f64 {
    (gt.mask().clone() - prediction)
        .abs()
        .mean()
        .into_scalar()
        .elem::<f64>()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn mae_averages_absolute_differences() {
        let device = Default::default();
        let gt = GroundTruth::new(Tensor::<TestBackend, 2>::from_floats(
            [[1.0, 1.0], [0.0, 0.0]],
            &device,
        ))
        .unwrap();
        let prediction = Tensor::<TestBackend, 2>::from_floats([[0.5, 1.0], [0.25, 0.0]], &device);

        assert_abs_diff_eq!(calculate_mae(prediction, &gt), 0.1875, epsilon = 1e-7);
    }
}
