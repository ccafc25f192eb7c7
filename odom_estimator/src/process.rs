//! Inertial process model: propagates a [`State`] across one IMU sample.

use nalgebra::{Matrix1, Vector1, Vector3, U1, U14, U3, U6, U7};
use serde::{Deserialize, Serialize};

use crate::earth::GravityModel;
use crate::imu::ImuSample;
use crate::manifold::composite::ManifoldPair;
use crate::manifold::quaternion::quat_from_rotvec;
use crate::state::State;
use crate::unscented::{DistributionFunction, GaussianDistribution};

/// Measured angular velocity and specific force.
pub type ImuData = ManifoldPair<f64, Vector3<f64>, Vector3<f64>, U3, U3>;
/// Scalar driving term of the pressure random walk.
pub type ProcessNoise = Vector1<f64>;
/// Random input of [`StateUpdater`]; tangent dimension 7.
pub type UpdaterExtra = ManifoldPair<f64, ImuData, ProcessNoise, U6, U1>;

/// Default standard deviation of the pressure random walk, per sqrt(second).
pub const PRESSURE_NOISE_STD: f64 = 5.0;

/// Body frame in which the specific force of a sample is taken to be expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelFrame {
    /// Orientation at the start of the step.
    #[default]
    PreUpdate,
    /// Orientation after integrating the gyro over the step.
    PostUpdate,
}

/// Strapdown update driven by a single [`ImuSample`].
///
/// Holds no state between calls; one updater is built per sample.
#[derive(Debug)]
pub struct StateUpdater<'a, G> {
    imu: &'a ImuSample,
    accel_frame: AccelFrame,
    gravity: &'a G,
    pressure_noise_std: f64,
}

impl<'a, G: GravityModel> StateUpdater<'a, G> {
    pub fn new(imu: &'a ImuSample, accel_frame: AccelFrame, gravity: &'a G) -> Self {
        Self {
            imu,
            accel_frame,
            gravity,
            pressure_noise_std: PRESSURE_NOISE_STD,
        }
    }

    pub fn with_pressure_noise_std(mut self, std: f64) -> Self {
        self.pressure_noise_std = std;
        self
    }

    pub fn imu(&self) -> &ImuSample {
        self.imu
    }
}

impl<G: GravityModel> DistributionFunction<State, U14, State, U14, UpdaterExtra, U7, f64>
    for StateUpdater<'_, G>
{
    fn extra_distribution(&self) -> GaussianDistribution<UpdaterExtra, U7, f64> {
        let mean = UpdaterExtra::new(
            ImuData::new(self.imu.angular_velocity, self.imu.linear_acceleration),
            ProcessNoise::zeros(),
        );
        let cov = UpdaterExtra::build_cov(
            &ImuData::build_cov(
                &self.imu.angular_velocity_covariance,
                &self.imu.linear_acceleration_covariance,
            ),
            &Matrix1::new(self.pressure_noise_std * self.pressure_noise_std),
        );
        GaussianDistribution::new(mean, cov)
    }

    fn apply(&self, state: &State, extra: &UpdaterExtra) -> State {
        let gyro = &extra.first.first;
        let specific_force = &extra.first.second;
        let noise = extra.second[0];

        // Ordering is the caller's concern, dt may be anything here.
        let dt = self.imu.stamp - state.t();

        let angvel_body = gyro - state.gyro_bias();
        let old_from_new = quat_from_rotvec(&(angvel_body * dt));
        let new_orient = state.orient() * old_from_new;

        let accel_body_to_world = match self.accel_frame {
            AccelFrame::PreUpdate => *state.orient(),
            AccelFrame::PostUpdate => new_orient,
        };
        let accel = accel_body_to_world * specific_force + self.gravity.gravity(state.pos_eci());

        State::from_unit(
            self.imu.stamp,
            state.pos_eci() + state.vel() * dt + accel * (dt * dt / 2.0),
            new_orient,
            state.vel() + accel * dt,
            *state.gyro_bias(),
            state.local_g(),
            state.ground_air_pressure() + dt.sqrt() * noise,
        )
    }
}
