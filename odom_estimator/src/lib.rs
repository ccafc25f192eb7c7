//! Inertial odometry estimation in Rust
//!
//! A [`State`] lives on a manifold (position, orientation, velocity, gyro bias,
//! local gravity, reference air pressure). Its Gaussian belief is carried
//! across IMU samples by the [`StateUpdater`] process model through an
//! [`UnscentedTransform`], driven by the [`Estimator`] loop.

extern crate alloc;

pub mod config;
pub mod earth;
pub mod error;
pub mod estimator;
pub mod imu;
pub mod manifold;
pub mod odometry;
pub mod process;
pub mod sigma_points;
pub mod state;
pub mod unscented;

pub use config::{ConfigError, EstimatorConfig, TransformConfig};
pub use earth::{GravityModel, PointMassGravity, UniformGravity};
pub use error::EstimatorError;
pub use estimator::{Estimator, StateDistribution};
pub use imu::ImuSample;
pub use manifold::Manifold;
pub use odometry::{Odometry, OutputFrame, StampedTransform};
pub use process::{AccelFrame, StateUpdater};
pub use state::{State, StateDelta};
pub use unscented::{DistributionFunction, GaussianDistribution, TransformError, UnscentedTransform};
