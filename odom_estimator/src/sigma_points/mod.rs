//! Sigma‐point generators for the unscented transform

pub use self::merwe_scaled::MerweScaled;
pub use self::traits::{SigmaPoints, SigmaSet};
pub use self::weights::UTWeights;

mod merwe_scaled;
mod traits;
mod weights;
