use thiserror::Error;

use crate::unscented::TransformError;

/// Reasons an inertial sample is not folded into the belief.
///
/// In every case the belief is left as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EstimatorError {
    #[error("sample at {stamp} contains non-finite values")]
    NonFiniteSample { stamp: f64 },
    #[error("sample at {stamp} is not newer than the state at {state_stamp}")]
    OutOfOrderSample { stamp: f64, state_stamp: f64 },
    #[error(transparent)]
    Transform(#[from] TransformError),
}
