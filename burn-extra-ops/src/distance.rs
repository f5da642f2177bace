//! Exact Euclidean distance transform.
//!
//! For every pixel the transform reports the distance to the nearest *feature* pixel
//! (a `true` entry of the input mask) together with the flat index of that feature
//! pixel. This is the behaviour of `bwdist` / `distance_transform_edt(..., return_indices=True)`
//! and is computed with the separable lower-envelope algorithm of Felzenszwalb and
//! Huttenlocher, which is linear in the number of pixels.

use burn::tensor::{backend::Backend, Bool, Int, Tensor, TensorData};

/// Result of [`euclidean_distance_transform`].
#[derive(Debug, Clone)]
pub struct DistanceTransform<B: Backend> {
    /// Distance to the nearest feature pixel, shape `[height, width]`.
    pub distances: Tensor<B, 2>,
    /// Row-major flat index (`row * width + col`) of the nearest feature pixel,
    /// shape `[height, width]`.
    pub nearest: Tensor<B, 2, Int>,
}

/// Computes the exact Euclidean distance from every pixel to the nearest feature pixel.
///
/// # Arguments
/// * `features` - Mask of shape `[height, width]`; `true` marks feature pixels.
///
/// # Returns
/// Distances and nearest-feature indices. Feature pixels have distance 0 and point to
/// themselves. When the mask holds no feature at all, every distance is `+inf` and
/// every index points to the pixel itself.
pub fn euclidean_distance_transform<B: Backend>(
    features: Tensor<B, 2, Bool>,
) -> DistanceTransform<B> {
    let [height, width] = features.dims();
    let device = features.device();

    let mask: Vec<bool> = features
        .float()
        .into_data()
        .iter::<f32>()
        .map(|value| value > 0.5)
        .collect();

    let (squared, nearest) = edt_squared(&mask, height, width);

    let distances: Vec<f32> = squared.iter().map(|d| d.sqrt() as f32).collect();
    let nearest: Vec<i64> = nearest.into_iter().map(|idx| idx as i64).collect();

    DistanceTransform {
        distances: Tensor::<B, 1>::from_floats(distances.as_slice(), &device)
            .reshape([height, width]),
        nearest: Tensor::<B, 1, Int>::from_data(TensorData::new(nearest, [height * width]), &device)
            .reshape([height, width]),
    }
}

/// Squared distances and nearest feature indices for a row-major mask.
fn edt_squared(mask: &[bool], height: usize, width: usize) -> (Vec<f64>, Vec<usize>) {
    let len = height * width;
    let mut squared = vec![f64::INFINITY; len];
    let mut nearest: Vec<usize> = (0..len).collect();

    if !mask.iter().any(|&m| m) {
        return (squared, nearest);
    }

    // Column pass: nearest feature row within the same column.
    let mut column_dist = vec![f64::INFINITY; len];
    let mut column_row = vec![0usize; len];
    for col in 0..width {
        let mut last: Option<usize> = None;
        for row in 0..height {
            let idx = row * width + col;
            if mask[idx] {
                last = Some(row);
            }
            if let Some(r) = last {
                column_dist[idx] = ((row - r) * (row - r)) as f64;
                column_row[idx] = r;
            }
        }
        let mut last: Option<usize> = None;
        for row in (0..height).rev() {
            let idx = row * width + col;
            if mask[idx] {
                last = Some(row);
            }
            if let Some(r) = last {
                let d = ((r - row) * (r - row)) as f64;
                if d < column_dist[idx] {
                    column_dist[idx] = d;
                    column_row[idx] = r;
                }
            }
        }
    }

    // Row pass: lower envelope of the parabolas rooted at each finite column.
    let mut sites = Vec::with_capacity(width);
    let mut envelope = vec![0usize; width];
    let mut bounds = vec![0.0f64; width + 1];
    let mut f = vec![0.0f64; width];
    for row in 0..height {
        let offset = row * width;
        f.copy_from_slice(&column_dist[offset..offset + width]);

        sites.clear();
        sites.extend((0..width).filter(|&q| f[q].is_finite()));
        if sites.is_empty() {
            continue;
        }

        let intersect = |q: usize, p: usize| -> f64 {
            let (qf, pf) = (q as f64, p as f64);
            ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
        };

        let mut k = 0usize;
        envelope[0] = sites[0];
        bounds[0] = f64::NEG_INFINITY;
        bounds[1] = f64::INFINITY;
        for &q in &sites[1..] {
            let mut s = intersect(q, envelope[k]);
            while s <= bounds[k] {
                k -= 1;
                s = intersect(q, envelope[k]);
            }
            k += 1;
            envelope[k] = q;
            bounds[k] = s;
            bounds[k + 1] = f64::INFINITY;
        }

        k = 0;
        for x in 0..width {
            while bounds[k + 1] < x as f64 {
                k += 1;
            }
            let q = envelope[k];
            let dx = x as f64 - q as f64;
            squared[offset + x] = dx.mul_add(dx, f[q]);
            nearest[offset + x] = column_row[offset + q] * width + q;
        }
    }

    (squared, nearest)
}
