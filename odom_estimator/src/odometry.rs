//! Odometry and transform records built from a [`State`].

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::state::State;

/// Frame in which odometry is expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFrame {
    Inertial,
    #[default]
    EarthFixed,
}

/// Pose and twist of one body point.
///
/// `linear_velocity` is expressed in the output frame, `angular_velocity` in
/// the body frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    pub stamp: f64,
    pub frame_id: String,
    pub child_frame_id: String,
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub linear_velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
}

/// Parent -> child transform at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StampedTransform {
    pub stamp: f64,
    pub frame_id: String,
    pub child_frame_id: String,
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Odometry {
    /// `gyro` is the latest raw angular velocity; without it the angular rate
    /// is reported as zero.
    ///
    /// # Panics
    /// If `body_point` is nonzero and `gyro` is `None`.
    pub fn from_state(
        state: &State,
        frame: OutputFrame,
        body_point: &Vector3<f64>,
        gyro: Option<&Vector3<f64>>,
        frame_id: impl Into<String>,
        child_frame_id: impl Into<String>,
    ) -> Self {
        let (position, orientation, linear_velocity) = match frame {
            OutputFrame::Inertial => (
                state.position_eci(body_point),
                *state.orient(),
                state.velocity_eci(body_point, gyro),
            ),
            OutputFrame::EarthFixed => (
                state.position_ecef(body_point),
                state.orientation_ecef(),
                state.velocity_ecef(body_point, gyro),
            ),
        };
        let angular_velocity = gyro.map_or_else(Vector3::zeros, |g| g - state.gyro_bias());

        Self {
            stamp: state.t(),
            frame_id: frame_id.into(),
            child_frame_id: child_frame_id.into(),
            position,
            orientation,
            linear_velocity,
            angular_velocity,
        }
    }

    pub fn to_transform(&self) -> StampedTransform {
        StampedTransform {
            stamp: self.stamp,
            frame_id: self.frame_id.clone(),
            child_frame_id: self.child_frame_id.clone(),
            translation: self.position,
            rotation: self.orientation,
        }
    }
}
