//! Navigation state and its tangent-space layout.

use nalgebra::{Quaternion, SVector, UnitQuaternion, Vector3, U14};

use crate::earth::{ecef_from_inertial, ecef_orient_from_inertial_orient, ecef_vel_from_inertial_vel};
use crate::manifold::quaternion::{quat_from_rotvec, rotvec_from_quat};
use crate::manifold::Manifold;

pub const STATE_DIM: usize = 14;

// Offsets into `StateDelta`.
pub const POS_ECI: usize = 0;
pub const ORIENT: usize = 3;
pub const VEL: usize = 6;
pub const GYRO_BIAS: usize = 9;
pub const LOCAL_G: usize = 12;
pub const GROUND_AIR_PRESSURE: usize = 13;

/// Tangent vector of [`State`].
pub type StateDelta = SVector<f64, STATE_DIM>;

/// Vehicle state at time `t`.
///
/// `orient` rotates body-frame vectors into the inertial frame. Every field is
/// finite and `orient` has unit norm; constructors and `plus` panic otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    t: f64,
    pos_eci: Vector3<f64>,
    orient: UnitQuaternion<f64>,
    vel: Vector3<f64>,
    gyro_bias: Vector3<f64>,
    local_g: f64,
    ground_air_pressure: f64,
}

impl State {
    /// `orient` is normalized here.
    ///
    /// # Panics
    /// If any input is non-finite or `orient` is zero.
    pub fn new(
        t: f64,
        pos_eci: Vector3<f64>,
        orient: Quaternion<f64>,
        vel: Vector3<f64>,
        gyro_bias: Vector3<f64>,
        local_g: f64,
        ground_air_pressure: f64,
    ) -> Self {
        assert!(orient.norm() > 0.0, "orientation quaternion must be nonzero");
        Self::from_unit(
            t,
            pos_eci,
            UnitQuaternion::from_quaternion(orient),
            vel,
            gyro_bias,
            local_g,
            ground_air_pressure,
        )
    }

    pub(crate) fn from_unit(
        t: f64,
        pos_eci: Vector3<f64>,
        orient: UnitQuaternion<f64>,
        vel: Vector3<f64>,
        gyro_bias: Vector3<f64>,
        local_g: f64,
        ground_air_pressure: f64,
    ) -> Self {
        let state = Self {
            t,
            pos_eci,
            orient,
            vel,
            gyro_bias,
            local_g,
            ground_air_pressure,
        };
        assert!(state.is_finite(), "state must be finite: {:?}", state);
        state
    }

    fn is_finite(&self) -> bool {
        self.t.is_finite()
            && self.pos_eci.iter().all(|v| v.is_finite())
            && self.orient.coords.iter().all(|v| v.is_finite())
            && self.vel.iter().all(|v| v.is_finite())
            && self.gyro_bias.iter().all(|v| v.is_finite())
            && self.local_g.is_finite()
            && self.ground_air_pressure.is_finite()
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn pos_eci(&self) -> &Vector3<f64> {
        &self.pos_eci
    }

    pub fn orient(&self) -> &UnitQuaternion<f64> {
        &self.orient
    }

    pub fn vel(&self) -> &Vector3<f64> {
        &self.vel
    }

    pub fn gyro_bias(&self) -> &Vector3<f64> {
        &self.gyro_bias
    }

    pub fn local_g(&self) -> f64 {
        self.local_g
    }

    pub fn ground_air_pressure(&self) -> f64 {
        self.ground_air_pressure
    }

    /// Inertial position of a point fixed to the body at `body_point`.
    pub fn position_eci(&self, body_point: &Vector3<f64>) -> Vector3<f64> {
        self.pos_eci + self.orient * body_point
    }

    pub fn position_ecef(&self, body_point: &Vector3<f64>) -> Vector3<f64> {
        ecef_from_inertial(self.t, &self.position_eci(body_point))
    }

    /// Inertial velocity of a body-fixed point. `gyro` is the measured angular
    /// velocity, bias is removed here.
    ///
    /// # Panics
    /// If `body_point` is nonzero and `gyro` is `None`.
    pub fn velocity_eci(&self, body_point: &Vector3<f64>, gyro: Option<&Vector3<f64>>) -> Vector3<f64> {
        if body_point.iter().all(|v| *v == 0.0) {
            return self.vel;
        }
        let Some(gyro) = gyro else {
            panic!("angular velocity is required for a body point away from the origin");
        };
        self.vel + self.orient * (gyro - self.gyro_bias).cross(body_point)
    }

    /// Earth-fixed velocity of a body-fixed point. The transport term is
    /// taken at the body origin `pos_eci`.
    pub fn velocity_ecef(&self, body_point: &Vector3<f64>, gyro: Option<&Vector3<f64>>) -> Vector3<f64> {
        ecef_vel_from_inertial_vel(
            self.t,
            &self.velocity_eci(body_point, gyro),
            &self.pos_eci,
        )
    }

    /// Body -> Earth-fixed orientation.
    pub fn orientation_ecef(&self) -> UnitQuaternion<f64> {
        ecef_orient_from_inertial_orient(self.t, &self.orient)
    }
}

impl Manifold<U14, f64> for State {
    fn plus(&self, delta: &StateDelta) -> Self {
        let rotvec: Vector3<f64> = delta.fixed_rows::<3>(ORIENT).into_owned();
        let mut orient = quat_from_rotvec(&rotvec) * self.orient;
        orient.renormalize();
        Self::from_unit(
            self.t,
            self.pos_eci + delta.fixed_rows::<3>(POS_ECI),
            orient,
            self.vel + delta.fixed_rows::<3>(VEL),
            self.gyro_bias + delta.fixed_rows::<3>(GYRO_BIAS),
            self.local_g + delta[LOCAL_G],
            self.ground_air_pressure + delta[GROUND_AIR_PRESSURE],
        )
    }

    fn minus(&self, other: &Self) -> StateDelta {
        let mut delta = StateDelta::zeros();
        delta
            .fixed_rows_mut::<3>(POS_ECI)
            .copy_from(&(self.pos_eci - other.pos_eci));
        delta
            .fixed_rows_mut::<3>(ORIENT)
            .copy_from(&rotvec_from_quat(&(self.orient * other.orient.inverse())));
        delta
            .fixed_rows_mut::<3>(VEL)
            .copy_from(&(self.vel - other.vel));
        delta
            .fixed_rows_mut::<3>(GYRO_BIAS)
            .copy_from(&(self.gyro_bias - other.gyro_bias));
        delta[LOCAL_G] = self.local_g - other.local_g;
        delta[GROUND_AIR_PRESSURE] = self.ground_air_pressure - other.ground_air_pressure;
        delta
    }
}
