//! Exponential and logarithm maps between rotation vectors and unit quaternions.
//!
//! A rotation vector `r` encodes a rotation of `|r|` radians about `r / |r|`.
//! Both maps switch to a Taylor expansion near the identity so that neither
//! divides by a vanishing angle.

use nalgebra::{Quaternion, RealField, UnitQuaternion, Vector3};

/// Exponential map: rotation vector -> unit quaternion.
///
/// Below `eps^(1/4)` radians the half-angle sine is replaced by its Taylor
/// expansion, `sin(θ/2)/θ ≈ 1/2 - θ²/48` and `cos(θ/2) ≈ 1 - θ²/8`, whose
/// truncation error is below machine precision in that range.
pub fn quat_from_rotvec<T: RealField + Copy>(rotvec: &Vector3<T>) -> UnitQuaternion<T> {
    let two = T::one() + T::one();
    let angle_sq = rotvec.norm_squared();
    let threshold = T::default_epsilon().sqrt().sqrt();

    let (w, scale) = if angle_sq < threshold * threshold {
        let eight = two * two * two;
        let forty_eight = eight * (two + two + two);
        (
            T::one() - angle_sq / eight,
            T::one() / two - angle_sq / forty_eight,
        )
    } else {
        let angle = angle_sq.sqrt();
        let half = angle / two;
        (half.cos(), half.sin() / angle)
    };

    let v = rotvec * scale;
    UnitQuaternion::new_normalize(Quaternion::new(w, v.x, v.y, v.z))
}

/// Logarithm map: unit quaternion -> rotation vector of angle in `[0, π]`.
///
/// `q` and `-q` describe the same rotation; the hemisphere with a
/// non-negative scalar part is used so the shortest rotation is returned.
/// Below `sqrt(eps)` the arctangent is expanded as
/// `2 atan(s/w)/s ≈ (2/w)(1 - s²/(3w²))`.
pub fn rotvec_from_quat<T: RealField + Copy>(quat: &UnitQuaternion<T>) -> Vector3<T> {
    let two = T::one() + T::one();
    let three = two + T::one();

    let q = quat.quaternion();
    let (w, v) = if q.w < T::zero() {
        (-q.w, -q.imag())
    } else {
        (q.w, q.imag())
    };

    let sin_half = v.norm();
    if sin_half < T::default_epsilon().sqrt() {
        v * (two / w * (T::one() - sin_half * sin_half / (three * w * w)))
    } else {
        v * (two * sin_half.atan2(w) / sin_half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::PI;

    #[test]
    fn identity_maps_to_zero() {
        let r = rotvec_from_quat(&UnitQuaternion::<f64>::identity());
        assert_eq!(r, Vector3::zeros());
        let q = quat_from_rotvec(&Vector3::<f64>::zeros());
        assert_eq!(q, UnitQuaternion::identity());
    }

    #[test]
    fn agrees_with_nalgebra_for_moderate_angles() {
        let r = Vector3::new(0.3, -0.7, 1.1);
        let ours = quat_from_rotvec(&r);
        let reference = UnitQuaternion::from_scaled_axis(r);
        assert!(ours.angle_to(&reference) < 1e-7);
        assert_relative_eq!(rotvec_from_quat(&reference), r, epsilon = 1e-12);
    }

    #[test]
    fn small_angles_stay_accurate() {
        for &scale in &[1e-3, 1e-5, 1e-7, 1e-9, 1e-12, 1e-15] {
            let r = Vector3::new(0.6, -0.8, 0.0) * scale;
            let q = quat_from_rotvec(&r);
            assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-15);
            let back = rotvec_from_quat(&q);
            assert_relative_eq!(back, r, max_relative = 1e-9);
        }
    }

    #[test]
    fn round_trip_up_to_pi() {
        let axis = Vector3::new(1.0, 2.0, -2.0).normalize();
        for &angle in &[0.5, 1.5, 2.5, PI - 1e-3] {
            let r = axis * angle;
            let back = rotvec_from_quat(&quat_from_rotvec(&r));
            assert_relative_eq!(back, r, epsilon = 1e-9);
        }
    }

    #[test]
    fn antipodal_quaternion_gives_shortest_rotation() {
        let q = quat_from_rotvec(&Vector3::new(0.0, 0.0, 0.4));
        let flipped = UnitQuaternion::new_unchecked(-q.into_inner());
        assert_relative_eq!(
            rotvec_from_quat(&flipped),
            Vector3::new(0.0, 0.0, 0.4),
            epsilon = 1e-12
        );
    }

    #[test]
    fn angles_beyond_pi_wrap_around() {
        let r = Vector3::new(PI + 0.5, 0.0, 0.0);
        let back = rotvec_from_quat(&quat_from_rotvec(&r));
        assert_relative_eq!(back, Vector3::new(-(PI - 0.5), 0.0, 0.0), epsilon = 1e-9);
    }
}
