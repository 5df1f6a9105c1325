use ndarray::{Array2, ArrayView1};
use ndarray_linalg::{Cholesky, Eigh, UPLO};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::debug;

use crate::error::Result;

/// `k`×`k` matrix with 1 on the diagonal and `rho` elsewhere.
pub fn equicorrelation(k: usize, rho: f64) -> Array2<f64> {
    Array2::from_shape_fn((k, k), |(i, j)| if i == j { 1.0 } else { rho })
}

/// Returns `F` with `F Fᵀ = sigma`.
///
/// Cholesky is tried first; a singular or indefinite `sigma` falls back to an
/// eigendecomposition with non-positive eigenvalues clamped to zero.
pub fn mvn_factor(sigma: &Array2<f64>) -> Result<Array2<f64>> {
    match sigma.cholesky(UPLO::Lower) {
        Ok(chol) => Ok(chol),
        Err(err) => {
            debug!("cholesky failed ({err}); falling back to eigh");
            let (eigvals, eigvecs) = sigma.eigh(UPLO::Lower)?;
            let sqrt_vals = eigvals.mapv(|v| {
                if v.is_finite() && v > 0.0 {
                    v.sqrt()
                } else {
                    0.0
                }
            });
            let diag = Array2::from_diag(&sqrt_vals);
            Ok(eigvecs.dot(&diag))
        }
    }
}

/// Draws `n` rows from MVN(0, F Fᵀ).
pub fn sample_mvn_rows<R: Rng + ?Sized>(n: usize, factor: &Array2<f64>, rng: &mut R) -> Array2<f64> {
    let k = factor.nrows();
    let z = standard_normal_matrix(n, k, rng);
    z.dot(&factor.t())
}

pub fn standard_normal_matrix<R: Rng + ?Sized>(n: usize, k: usize, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_simple_fn((n, k), || {
        let v: f64 = StandardNormal.sample(&mut *rng);
        v
    })
}

/// Centered sum of squares and mean of a column.
pub fn center(x: ArrayView1<'_, f64>) -> (f64, f64) {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    let ss = x.iter().map(|v| (v - mean) * (v - mean)).sum();
    (mean, ss)
}
