//! Error types for unscented transform operations.

use crate::manifold::MeanError;
use thiserror::Error;

/// Errors that can occur while propagating a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The augmented covariance was not positive definite, even after regularization.
    #[error("Cholesky decomposition of the augmented covariance failed")]
    CholeskyDecompositionFailed,
    /// The weighted mean of the propagated sigma points could not be formed.
    #[error("mean of propagated sigma points failed: {0}")]
    MeanComputationFailed(#[from] MeanError),
}
