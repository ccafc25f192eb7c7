//! Manifold-valued state support
//!
//! A filter that only knows how to add and subtract flat vectors can still carry
//! non-Euclidean quantities (orientation) as long as the state type supplies a
//! pair of maps between itself and a local tangent space:
//! - `plus`: tangent vector -> manifold point (retraction)
//! - `minus`: manifold point pair -> tangent vector (local coordinates)

use log::debug;
use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OVector, RealField};
use thiserror::Error;

pub mod composite;
pub mod euclidean;
pub mod quaternion;

/// Failure modes of [`Manifold::weighted_mean`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeanError {
    #[error("no points to average")]
    EmptyInput,
    #[error("point and weight counts differ")]
    LengthMismatch,
    #[error("weights sum to zero")]
    DegenerateWeights,
    #[error("tolerance must be non-negative")]
    InvalidTolerance,
    #[error("weighted mean did not converge")]
    NotConverged,
}

/// A point on a manifold whose tangent space has dimension `TangentDim`.
///
/// # Properties
///
/// Implementations must satisfy, for every point `x`, `y` and small `delta`:
/// 1. `x.plus(&y.minus(&x)) ≈ y`
/// 2. `x.plus(delta).minus(&x) ≈ delta`
/// 3. `x.minus(&x) = 0`
/// 4. `x.plus(0) = x`
pub trait Manifold<TangentDim: DimName, T: RealField + Copy>: Clone + Sized
where
    DefaultAllocator: Allocator<TangentDim>,
{
    /// Number of degrees of freedom, i.e. the length of a tangent vector.
    fn dimension() -> usize {
        TangentDim::dim()
    }

    /// Move away from `self` along the tangent vector `delta`.
    fn plus(&self, delta: &OVector<T, TangentDim>) -> Self;

    /// Tangent vector `d` such that `other.plus(&d) ≈ self`.
    fn minus(&self, other: &Self) -> OVector<T, TangentDim>;

    /// Weighted mean of manifold points.
    ///
    /// Starts from the first point and repeatedly steps along the weighted
    /// average of the tangent vectors towards every point until the step is
    /// shorter than `tolerance`, or stops shrinking (rounding floor of `minus`
    /// for points far from the origin). Weights may be negative (the central
    /// weight of a scaled sigma point set usually is) but must not sum to zero.
    fn weighted_mean(
        points: &[Self],
        weights: &[T],
        tolerance: T,
        max_iterations: usize,
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

        let total_weight = weights.iter().fold(T::zero(), |acc, &w| acc + w);
        if total_weight.abs() <= T::default_epsilon() {
            return Err(MeanError::DegenerateWeights);
        }

        let tolerance_sq = tolerance * tolerance;
        let mut mean = points[0].clone();
        let mut last_step_sq: Option<T> = None;

        for iteration in 0..max_iterations {
            let mut step = OVector::<T, TangentDim>::zeros();
            for (point, &weight) in points.iter().zip(weights.iter()) {
                step.axpy(weight, &point.minus(&mean), T::one());
            }
            step /= total_weight;

            let step_sq = step.dot(&step);
            if step_sq <= tolerance_sq {
                return Ok(mean);
            }
            if last_step_sq.is_some_and(|last| step_sq >= last) {
                debug!(
                    "weighted mean stalled after {} iterations, step^2 {:?} above tolerance^2 {:?}",
                    iteration, step_sq, tolerance_sq
                );
                return Ok(mean);
            }
            last_step_sq = Some(step_sq);
            mean = mean.plus(&step);
        }

        Err(MeanError::NotConverged)
    }
}

#[cfg(test)]
mod tests {
    use super::quaternion::{quat_from_rotvec, rotvec_from_quat};
    use super::*;
    use nalgebra::{UnitQuaternion, Vector3, U3};

    /// Orientation-only manifold used to exercise the iterative mean.
    #[derive(Clone, Debug)]
    struct Attitude(UnitQuaternion<f64>);

    impl Manifold<U3, f64> for Attitude {
        fn plus(&self, delta: &Vector3<f64>) -> Self {
            Attitude(quat_from_rotvec(delta) * self.0)
        }

        fn minus(&self, other: &Self) -> Vector3<f64> {
            rotvec_from_quat(&(self.0 * other.0.inverse()))
        }
    }

    fn about_x(angle: f64) -> Attitude {
        Attitude(UnitQuaternion::from_scaled_axis(Vector3::new(angle, 0.0, 0.0)))
    }

    #[test]
    fn mean_of_rotations_about_one_axis() {
        let points = [about_x(0.1), about_x(0.2), about_x(0.3)];
        let mean =
            Attitude::weighted_mean(&points, &[0.25, 0.5, 0.25], 1e-12, 50).unwrap();
        let angle = mean.0.scaled_axis();
        assert!((angle - Vector3::new(0.2, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn negative_weights_are_accepted() {
        let points = [about_x(0.0), about_x(0.1), about_x(-0.1)];
        let mean = Attitude::weighted_mean(&points, &[-1.0, 1.0, 1.0], 1e-12, 50).unwrap();
        assert!(mean.0.angle() < 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        let points = [about_x(0.0), about_x(0.1)];
        assert_eq!(
            Attitude::weighted_mean(&[], &[], 1e-9, 10).unwrap_err(),
            MeanError::EmptyInput
        );
        assert_eq!(
            Attitude::weighted_mean(&points, &[1.0], 1e-9, 10).unwrap_err(),
            MeanError::LengthMismatch
        );
        assert_eq!(
            Attitude::weighted_mean(&points, &[0.5, 0.5], -1.0, 10).unwrap_err(),
            MeanError::InvalidTolerance
        );
        assert_eq!(
            Attitude::weighted_mean(&points, &[1.0, -1.0], 1e-9, 10).unwrap_err(),
            MeanError::DegenerateWeights
        );
        assert_eq!(
            Attitude::weighted_mean(&points, &[0.5, 0.5], 1e-9, 0).unwrap_err(),
            MeanError::NotConverged
        );
    }

    /// Points on a unit grid: `plus` snaps to the nearest integer.
    #[derive(Clone, Debug)]
    struct Grid(f64);

    impl Manifold<nalgebra::U1, f64> for Grid {
        fn plus(&self, delta: &nalgebra::Vector1<f64>) -> Self {
            Grid((self.0 + delta[0]).round())
        }

        fn minus(&self, other: &Self) -> nalgebra::Vector1<f64> {
            nalgebra::Vector1::new(self.0 - other.0)
        }
    }

    #[test]
    fn stalled_mean_stops_at_resolution_floor() {
        let points = [Grid(0.0), Grid(1.0), Grid(1.0)];
        let mean = Grid::weighted_mean(&points, &[1.0, 1.0, 1.0], 1e-12, 100).unwrap();
        assert_eq!(mean.0, 1.0);
    }

    #[test]
    fn dimension_matches_tangent_space() {
        assert_eq!(Attitude::dimension(), 3);
    }
}
