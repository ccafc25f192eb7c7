use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OMatrix, RealField};

use crate::manifold::Manifold;

/// Gaussian belief over a manifold.
///
/// The covariance lives in the tangent space at `mean`, so a sample is
/// `mean.plus(d)` with `d ~ N(0, cov)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianDistribution<M, Dim, T>
where
    Dim: DimName,
    T: RealField + Copy,
    DefaultAllocator: Allocator<Dim, Dim>,
{
    mean: M,
    cov: OMatrix<T, Dim, Dim>,
}

impl<M, Dim, T> GaussianDistribution<M, Dim, T>
where
    M: Manifold<Dim, T>,
    Dim: DimName,
    T: RealField + Copy,
    DefaultAllocator: Allocator<Dim> + Allocator<Dim, Dim>,
{
    /// # Panics
    /// If `cov` contains a non-finite entry.
    pub fn new(mean: M, cov: OMatrix<T, Dim, Dim>) -> Self {
        assert!(
            cov.iter().all(|v| v.is_finite()),
            "covariance must be finite"
        );
        Self { mean, cov }
    }

    pub fn mean(&self) -> &M {
        &self.mean
    }

    pub fn cov(&self) -> &OMatrix<T, Dim, Dim> {
        &self.cov
    }

    /// Standard deviation along tangent axis `axis`.
    pub fn std_dev(&self, axis: usize) -> T {
        self.cov[(axis, axis)].max(T::zero()).sqrt()
    }

    pub fn into_parts(self) -> (M, OMatrix<T, Dim, Dim>) {
        (self.mean, self.cov)
    }
}
