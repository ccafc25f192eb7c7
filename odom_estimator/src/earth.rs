//! Gravity models and conversions between the inertial (ECI) and
//! Earth-fixed (ECEF) frames.
//!
//! The Earth-fixed frame rotates about the inertial +z axis at
//! [`EARTH_ROTATION_RATE`]; both frames coincide at `t = 0`.

use nalgebra::{UnitQuaternion, Vector3};

/// Sidereal rotation rate of the Earth, rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292115e-5;

/// Geocentric gravitational constant, m^3/s^2.
pub const EARTH_GM: f64 = 3.986004418e14;

/// Gravitational acceleration as a function of inertial position.
pub trait GravityModel {
    fn gravity(&self, pos_eci: &Vector3<f64>) -> Vector3<f64>;
}

impl<G: GravityModel + ?Sized> GravityModel for &G {
    fn gravity(&self, pos_eci: &Vector3<f64>) -> Vector3<f64> {
        (**self).gravity(pos_eci)
    }
}

/// Same acceleration everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformGravity {
    pub acceleration: Vector3<f64>,
}

impl UniformGravity {
    pub fn new(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// `g` pointing along -z.
    pub fn down(g: f64) -> Self {
        Self::new(Vector3::new(0.0, 0.0, -g))
    }
}

impl GravityModel for UniformGravity {
    fn gravity(&self, _pos_eci: &Vector3<f64>) -> Vector3<f64> {
        self.acceleration
    }
}

/// Spherical Earth, `-GM r / |r|^3`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMassGravity {
    pub gm: f64,
}

impl Default for PointMassGravity {
    fn default() -> Self {
        Self { gm: EARTH_GM }
    }
}

impl GravityModel for PointMassGravity {
    fn gravity(&self, pos_eci: &Vector3<f64>) -> Vector3<f64> {
        let r2 = pos_eci.norm_squared();
        if r2 == 0.0 {
            return Vector3::zeros();
        }
        pos_eci * (-self.gm / (r2 * r2.sqrt()))
    }
}

/// Rotation taking inertial coordinates to Earth-fixed coordinates at time `t`.
fn inertial_to_fixed(t: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), -EARTH_ROTATION_RATE * t)
}

pub fn ecef_from_inertial(t: f64, pos_eci: &Vector3<f64>) -> Vector3<f64> {
    inertial_to_fixed(t) * pos_eci
}

/// Velocity relative to the rotating Earth, expressed in ECEF.
pub fn ecef_vel_from_inertial_vel(t: f64, vel_eci: &Vector3<f64>, pos_eci: &Vector3<f64>) -> Vector3<f64> {
    let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE);
    inertial_to_fixed(t) * (vel_eci - omega.cross(pos_eci))
}

/// Body -> ECEF orientation from body -> ECI orientation.
pub fn ecef_orient_from_inertial_orient(t: f64, orient_eci: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    inertial_to_fixed(t) * orient_eci
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frames_coincide_at_epoch() {
        let p = Vector3::new(6.4e6, -2.0e5, 1.0e3);
        assert_relative_eq!(ecef_from_inertial(0.0, &p), p, epsilon = 1e-9);

        let q = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        assert!(ecef_orient_from_inertial_orient(0.0, &q).angle_to(&q) < 1e-7);
    }

    #[test]
    fn fixed_point_appears_to_rotate_backwards() {
        let quarter_day = core::f64::consts::FRAC_PI_2 / EARTH_ROTATION_RATE;
        let p = Vector3::new(1.0, 0.0, 5.0);
        assert_relative_eq!(
            ecef_from_inertial(quarter_day, &p),
            Vector3::new(0.0, -1.0, 5.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn co_rotating_point_is_at_rest() {
        let t = 1234.5;
        let p = Vector3::new(4.0e6, 3.0e6, 2.0e6);
        let v = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE).cross(&p);
        assert_relative_eq!(ecef_vel_from_inertial_vel(t, &v, &p), Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn point_mass_gravity_at_surface() {
        let gravity = PointMassGravity::default();
        let g = gravity.gravity(&Vector3::new(0.0, 0.0, 6_371_000.0));
        assert_relative_eq!(g.z, -9.82, epsilon = 0.01);
        assert_eq!(g.x, 0.0);
        assert_eq!(gravity.gravity(&Vector3::zeros()), Vector3::zeros());
    }

    #[test]
    fn uniform_gravity_ignores_position() {
        let gravity = UniformGravity::down(9.8);
        assert_eq!(gravity.gravity(&Vector3::new(1.0, 2.0, 3.0)), Vector3::new(0.0, 0.0, -9.8));
        // by reference
        assert_eq!((&gravity).gravity(&Vector3::zeros()), Vector3::new(0.0, 0.0, -9.8));
    }
}
