use super::traits::{SigmaPoints, SigmaSet};
use super::weights::UTWeights;
use alloc::vec::Vec;
use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OMatrix, OVector, RealField};

/// Unscented transform parameters as described in \[1\] generic over scalar S.
///
/// 1. E.A. Wan; R. Van Der Merwe "The unscented Kalman filter for nonlinear estimation"
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MerweScaled<S: RealField> {
    /// Spread of the sigma points around the mean
    pub alpha: S,
    /// Prior knowledge of the distribution (2 is optimal for Gaussians)
    pub beta: S,
    /// Secondary scaling parameter (usually 0)
    pub kappa: S,
}

impl<S: RealField + Copy> MerweScaled<S> {
    pub fn new(alpha: S, beta: S, kappa: S) -> Self {
        Self { alpha, beta, kappa }
    }

    /// Weights for an `dim`-dimensional input.
    pub fn weights(&self, dim: usize) -> UTWeights<S> {
        UTWeights::from_merwe(dim, self.alpha, self.beta, self.kappa)
    }

    /// `sqrt(n + λ)`, the factor applied to each covariance column.
    fn spread(&self, dim: usize) -> S {
        let n = S::from_subset(&(dim as f64));
        let n_lambda = self.alpha * self.alpha * (n + self.kappa);
        if n_lambda.abs() < S::default_epsilon() {
            S::default_epsilon().sqrt()
        } else {
            n_lambda.sqrt()
        }
    }
}

impl<S: RealField + Copy> Default for MerweScaled<S> {
    fn default() -> Self {
        Self::new(
            S::from_subset(&0.5),
            S::from_subset(&2.0),
            S::zero(),
        )
    }
}

impl<S: RealField + Copy> SigmaPoints<S> for MerweScaled<S> {
    /// Point 0 is the mean, points `1..=n` step along `+col_i`, points
    /// `n+1..=2n` along `-col_i`.
    fn generate<L>(&self, mean: &OVector<S, L>, sqrt_cov: &OMatrix<S, L, L>) -> SigmaSet<S, L>
    where
        L: DimName,
        DefaultAllocator: Allocator<L> + Allocator<L, L>,
    {
        let dim = L::dim();
        let scaled_sqrt = sqrt_cov * self.spread(dim);

        let mut points = Vec::with_capacity(2 * dim + 1);
        points.push(mean.clone());
        for i in 0..dim {
            points.push(mean + scaled_sqrt.column(i));
        }
        for i in 0..dim {
            points.push(mean - scaled_sqrt.column(i));
        }

        SigmaSet {
            points,
            weights: self.weights(dim),
        }
    }
}
