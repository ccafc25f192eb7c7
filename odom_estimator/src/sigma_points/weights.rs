//! Unscented transform recombination weights.

use alloc::vec;
use alloc::vec::Vec;
use nalgebra::RealField;

/// Mean and covariance recombination weights for `2n + 1` sigma points.
#[derive(Clone, Debug, PartialEq)]
pub struct UTWeights<T: RealField + Copy> {
    /// Mean recombination weights.
    pub w_mean: Vec<T>,
    /// Covariance recombination weights.
    pub w_covar: Vec<T>,
}

impl<T: RealField + Copy> UTWeights<T> {
    /// Weights of the Merwe scaled sigma point set for a `dim`-dimensional input.
    ///
    /// When `dim + λ` vanishes the central point gets `1 / (2n + 1)` and the
    /// remaining mass is spread evenly over the other points.
    pub fn from_merwe(dim: usize, alpha: T, beta: T, kappa: T) -> Self {
        let n = T::from_subset(&(dim as f64));
        let two = T::one() + T::one();
        let count = 2 * dim + 1;

        let lambda = alpha * alpha * (n + kappa) - n;
        let n_lambda = n + lambda;

        let (wm0, inv) = if n_lambda.abs() < T::default_epsilon() {
            let wm0 = T::one() / T::from_subset(&(count as f64));
            let rest = if dim == 0 {
                T::zero()
            } else {
                (T::one() - wm0) / (two * n)
            };
            (wm0, rest)
        } else {
            (lambda / n_lambda, T::one() / (two * n_lambda))
        };
        let wc0 = wm0 + (T::one() - alpha * alpha + beta);

        let mut w_mean = vec![inv; count];
        let mut w_covar = vec![inv; count];
        w_mean[0] = wm0;
        w_covar[0] = wc0;

        Self { w_mean, w_covar }
    }

    /// Number of sigma points these weights recombine.
    pub fn len(&self) -> usize {
        self.w_mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.w_mean.is_empty()
    }
}
