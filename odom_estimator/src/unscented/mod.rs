//! Unscented propagation of Gaussian beliefs over manifolds.

pub mod distribution;
pub mod error;
pub mod transform;

pub use distribution::GaussianDistribution;
pub use error::TransformError;
pub use transform::{DistributionFunction, UnscentedTransform};
