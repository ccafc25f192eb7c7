//! Sample-driven dead reckoning loop.

use log::{debug, warn};
use nalgebra::{Vector3, U14};

use crate::config::{ConfigError, EstimatorConfig};
use crate::earth::GravityModel;
use crate::error::EstimatorError;
use crate::imu::ImuSample;
use crate::odometry::{Odometry, OutputFrame};
use crate::process::StateUpdater;
use crate::state::{State, GROUND_AIR_PRESSURE};
use crate::unscented::{GaussianDistribution, UnscentedTransform};

pub type StateDistribution = GaussianDistribution<State, U14, f64>;

/// Owns the belief and folds inertial samples into it, one at a time.
pub struct Estimator<G> {
    belief: StateDistribution,
    gravity: G,
    config: EstimatorConfig,
    transform: UnscentedTransform<f64>,
    last_angular_velocity: Option<Vector3<f64>>,
}

impl<G: GravityModel> Estimator<G> {
    pub fn new(initial: StateDistribution, gravity: G, config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transform = config.transform.build();
        Ok(Self {
            belief: initial,
            gravity,
            config,
            transform,
            last_angular_velocity: None,
        })
    }

    /// Propagate the belief to `sample.stamp`.
    ///
    /// A gap longer than `max_dt` is bridged in equal sub-steps of at most
    /// `max_dt`, each driven by this sample's readings. On error the belief
    /// is unchanged.
    pub fn handle_imu(&mut self, sample: &ImuSample) -> Result<&StateDistribution, EstimatorError> {
        if !sample.is_finite() {
            warn!("dropping non-finite IMU sample at {}", sample.stamp);
            return Err(EstimatorError::NonFiniteSample { stamp: sample.stamp });
        }

        let state_stamp = self.belief.mean().t();
        let dt = sample.stamp - state_stamp;
        if dt <= 0.0 {
            warn!(
                "dropping IMU sample at {} not newer than state at {}",
                sample.stamp, state_stamp
            );
            return Err(EstimatorError::OutOfOrderSample {
                stamp: sample.stamp,
                state_stamp,
            });
        }

        let steps = (dt / self.config.max_dt).ceil().max(1.0) as usize;
        if steps > 1 {
            warn!(
                "bridging a gap of {} s before the sample at {} in {} steps",
                dt, sample.stamp, steps
            );
        }

        let stamp_at = |k: usize| {
            if k == steps {
                sample.stamp
            } else {
                state_stamp + dt * k as f64 / steps as f64
            }
        };
        let mut belief = self.propagate(sample, stamp_at(1), &self.belief)?;
        for k in 2..=steps {
            belief = self.propagate(sample, stamp_at(k), &belief)?;
        }

        debug!(
            "t={:.6} dt={:.6} pos_std={:.4} pressure_std={:.3}",
            belief.mean().t(),
            dt,
            belief.std_dev(0).max(belief.std_dev(1)).max(belief.std_dev(2)),
            belief.std_dev(GROUND_AIR_PRESSURE),
        );

        self.belief = belief;
        self.last_angular_velocity = Some(sample.angular_velocity);
        Ok(&self.belief)
    }

    /// One transform step of `prior` to `stamp` with the readings of `sample`.
    fn propagate(
        &self,
        sample: &ImuSample,
        stamp: f64,
        prior: &StateDistribution,
    ) -> Result<StateDistribution, EstimatorError> {
        let held;
        let imu = if stamp == sample.stamp {
            sample
        } else {
            held = ImuSample { stamp, ..sample.clone() };
            &held
        };
        let updater = StateUpdater::new(imu, self.config.accel_frame, &self.gravity)
            .with_pressure_noise_std(self.config.pressure_noise_std);
        Ok(self.transform.propagate(&updater, prior)?)
    }

    /// Replace the belief, e.g. after re-initialising from an external fix.
    ///
    /// The next sample is integrated from `belief`'s timestamp.
    pub fn reset(&mut self, belief: StateDistribution) {
        debug!("belief reset to t={}", belief.mean().t());
        self.belief = belief;
        self.last_angular_velocity = None;
    }

    pub fn belief(&self) -> &StateDistribution {
        &self.belief
    }

    pub fn state(&self) -> &State {
        self.belief.mean()
    }

    /// Raw angular velocity of the last accepted sample.
    pub fn last_angular_velocity(&self) -> Option<&Vector3<f64>> {
        self.last_angular_velocity.as_ref()
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Odometry of `body_point` using the configured frame ids.
    ///
    /// # Panics
    /// If `body_point` is nonzero and no sample has been accepted yet.
    pub fn odometry(&self, frame: OutputFrame, body_point: &Vector3<f64>) -> Odometry {
        Odometry::from_state(
            self.state(),
            frame,
            body_point,
            self.last_angular_velocity.as_ref(),
            self.config.frame_id.as_str(),
            self.config.child_frame_id.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earth::UniformGravity;
    use crate::unscented::TransformError;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Quaternion, SMatrix, UnitQuaternion};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn estimator() -> Estimator<UniformGravity> {
        init_logger();
        let initial = GaussianDistribution::new(
            State::new(
                0.0,
                Vector3::zeros(),
                Quaternion::identity(),
                Vector3::zeros(),
                Vector3::zeros(),
                9.8,
                101_325.0,
            ),
            SMatrix::<f64, 14, 14>::identity() * 1e-10,
        );
        Estimator::new(initial, UniformGravity::down(9.8), EstimatorConfig::default()).unwrap()
    }

    fn sample(stamp: f64, gyro: Vector3<f64>) -> ImuSample {
        ImuSample::new(
            stamp,
            gyro,
            Matrix3::identity() * 1e-6,
            Vector3::new(0.0, 0.0, 9.8),
            Matrix3::identity() * 1e-4,
        )
    }

    #[test]
    fn stationary_body_stays_put() {
        let mut est = estimator();
        for k in 1..=100 {
            est.handle_imu(&sample(k as f64 * 0.01, Vector3::zeros())).unwrap();
        }
        let state = est.state();
        assert_relative_eq!(state.t(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(*state.pos_eci(), Vector3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(*state.vel(), Vector3::zeros(), epsilon = 1e-6);
        assert_relative_eq!(state.ground_air_pressure(), 101_325.0, epsilon = 1e-6);
        // pressure random walk over 1 s
        assert_relative_eq!(
            est.belief().cov()[(GROUND_AIR_PRESSURE, GROUND_AIR_PRESSURE)],
            25.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn spinning_body_integrates_yaw() {
        let mut est = estimator();
        let rate = Vector3::new(0.0, 0.0, core::f64::consts::FRAC_PI_2);
        for k in 1..=10 {
            est.handle_imu(&sample(k as f64 * 0.1, rate)).unwrap();
        }
        let expected = UnitQuaternion::from_scaled_axis(rate);
        assert!(est.state().orient().angle_to(&expected) < 1e-6);
        assert_eq!(est.last_angular_velocity(), Some(&rate));
    }

    #[test]
    fn rejected_samples_leave_belief_untouched() {
        let mut est = estimator();
        est.handle_imu(&sample(0.5, Vector3::zeros())).unwrap();
        let before = est.belief().clone();

        assert_eq!(
            est.handle_imu(&sample(0.5, Vector3::zeros())).unwrap_err(),
            EstimatorError::OutOfOrderSample {
                stamp: 0.5,
                state_stamp: 0.5
            }
        );
        assert!(matches!(
            est.handle_imu(&sample(0.2, Vector3::zeros())),
            Err(EstimatorError::OutOfOrderSample { .. })
        ));

        let mut bad = sample(0.6, Vector3::zeros());
        bad.angular_velocity.x = f64::NAN;
        assert_eq!(
            est.handle_imu(&bad).unwrap_err(),
            EstimatorError::NonFiniteSample { stamp: 0.6 }
        );

        let mut indefinite = sample(0.6, Vector3::zeros());
        indefinite.linear_acceleration_covariance = -Matrix3::identity();
        assert_eq!(
            est.handle_imu(&indefinite).unwrap_err(),
            EstimatorError::Transform(TransformError::CholeskyDecompositionFailed)
        );

        assert_eq!(*est.belief(), before);
    }

    #[test]
    fn stream_resumes_after_gap() {
        let mut est = estimator();
        est.handle_imu(&sample(0.01, Vector3::zeros())).unwrap();

        // 2 s dropout, then a regular 100 Hz stream
        let resumed = est.handle_imu(&sample(2.01, Vector3::zeros())).unwrap();
        assert_eq!(resumed.mean().t(), 2.01);
        assert_relative_eq!(
            resumed.cov()[(GROUND_AIR_PRESSURE, GROUND_AIR_PRESSURE)],
            25.0 * 2.01,
            epsilon = 1e-6
        );

        for k in 1..=50 {
            est.handle_imu(&sample(2.01 + k as f64 * 0.01, Vector3::zeros())).unwrap();
        }
        assert_relative_eq!(est.state().t(), 2.51, epsilon = 1e-12);
        assert_relative_eq!(*est.state().vel(), Vector3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn gap_is_bridged_with_held_readings() {
        let mut est = estimator();
        let rate = Vector3::new(0.0, 0.0, 0.5);
        // 3.5 s at max_dt = 1 s: four sub-steps ending at the sample stamp
        est.handle_imu(&sample(3.5, rate)).unwrap();
        assert_eq!(est.state().t(), 3.5);
        let expected = UnitQuaternion::from_scaled_axis(rate * 3.5);
        assert!(est.state().orient().angle_to(&expected) < 1e-4);
    }

    #[test]
    fn reset_replaces_belief() {
        let mut est = estimator();
        est.handle_imu(&sample(0.5, Vector3::new(0.0, 0.0, 0.1))).unwrap();
        let fresh = estimator().belief().clone();

        est.reset(fresh.clone());
        assert_eq!(*est.belief(), fresh);
        assert_eq!(est.last_angular_velocity(), None);
        est.handle_imu(&sample(0.01, Vector3::zeros())).unwrap();
        assert_eq!(est.state().t(), 0.01);
    }

    #[test]
    fn odometry_uses_configured_frames() {
        let mut est = estimator();
        let rate = Vector3::new(0.0, 0.0, 0.2);
        est.handle_imu(&sample(0.1, rate)).unwrap();

        let odom = est.odometry(OutputFrame::Inertial, &Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(odom.frame_id, "ecef");
        assert_eq!(odom.child_frame_id, "base_link");
        assert_relative_eq!(odom.angular_velocity, rate, epsilon = 1e-12);
        // lever arm sweeps along +y
        assert!(odom.linear_velocity.y > 0.19);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let initial = estimator().belief().clone();
        let config = EstimatorConfig {
            max_dt: 0.0,
            ..EstimatorConfig::default()
        };
        assert!(matches!(
            Estimator::new(initial, UniformGravity::down(9.8), config),
            Err(ConfigError::Invalid(_))
        ));
    }
}
