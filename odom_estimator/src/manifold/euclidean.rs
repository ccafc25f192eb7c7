//! Euclidean space (R^n) as a manifold.
//!
//! Fixed-size nalgebra vectors are their own tangent space: `plus` is vector
//! addition and `minus` is vector subtraction. This lets plain measurement
//! vectors take part in manifold products next to orientation-carrying types.

use super::{Manifold, MeanError};
use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OVector, RealField};

impl<T, Dim> Manifold<Dim, T> for OVector<T, Dim>
where
    Dim: DimName,
    T: RealField + Copy,
    DefaultAllocator: Allocator<Dim>,
{
    fn plus(&self, delta: &OVector<T, Dim>) -> Self {
        self + delta
    }

    fn minus(&self, other: &Self) -> OVector<T, Dim> {
        self - other
    }

    /// Closed-form weighted average; `tolerance` and `max_iterations` are unused.
    fn weighted_mean(
        points: &[Self],
        weights: &[T],
        tolerance: T,
        _max_iterations: usize,
    ) -> Result<Self, MeanError> {
        if points.is_empty() {
            return Err(MeanError::EmptyInput);
        }
        if points.len() != weights.len() {
            return Err(MeanError::LengthMismatch);
        }
        if tolerance < T::zero() {
            return Err(MeanError::InvalidTolerance);
        }

        let mut weighted_sum = OVector::<T, Dim>::zeros();
        let mut total_weight = T::zero();
        for (point, &weight) in points.iter().zip(weights.iter()) {
            weighted_sum.axpy(weight, point, T::one());
            total_weight += weight;
        }

        if total_weight.abs() <= T::default_epsilon() {
            return Err(MeanError::DegenerateWeights);
        }

        Ok(weighted_sum / total_weight)
    }
}
