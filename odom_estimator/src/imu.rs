use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// One inertial measurement with its noise covariances.
///
/// `angular_velocity` is in rad/s, `linear_acceleration` is specific force in
/// m/s^2, both in the body frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub stamp: f64,
    pub angular_velocity: Vector3<f64>,
    pub angular_velocity_covariance: Matrix3<f64>,
    pub linear_acceleration: Vector3<f64>,
    pub linear_acceleration_covariance: Matrix3<f64>,
}

impl ImuSample {
    pub fn new(
        stamp: f64,
        angular_velocity: Vector3<f64>,
        angular_velocity_covariance: Matrix3<f64>,
        linear_acceleration: Vector3<f64>,
        linear_acceleration_covariance: Matrix3<f64>,
    ) -> Self {
        Self {
            stamp,
            angular_velocity,
            angular_velocity_covariance,
            linear_acceleration,
            linear_acceleration_covariance,
        }
    }

    /// Covariances given as flat row-major arrays, the layout of
    /// `sensor_msgs/Imu`.
    pub fn from_row_major(
        stamp: f64,
        angular_velocity: [f64; 3],
        angular_velocity_covariance: [f64; 9],
        linear_acceleration: [f64; 3],
        linear_acceleration_covariance: [f64; 9],
    ) -> Self {
        Self::new(
            stamp,
            Vector3::from(angular_velocity),
            Matrix3::from_row_slice(&angular_velocity_covariance),
            Vector3::from(linear_acceleration),
            Matrix3::from_row_slice(&linear_acceleration_covariance),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.stamp.is_finite()
            && self.angular_velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity_covariance.iter().all(|v| v.is_finite())
            && self.linear_acceleration.iter().all(|v| v.is_finite())
            && self.linear_acceleration_covariance.iter().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_covariance() {
        let sample = ImuSample::from_row_major(
            1.5,
            [0.1, 0.2, 0.3],
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            [0.0, 0.0, 9.8],
            [0.01, 0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, 0.01],
        );
        assert_eq!(sample.angular_velocity_covariance[(0, 1)], 2.0);
        assert_eq!(sample.angular_velocity_covariance[(1, 0)], 4.0);
        assert_eq!(sample.linear_acceleration, Vector3::new(0.0, 0.0, 9.8));
        assert!(sample.is_finite());
    }

    #[test]
    fn nan_is_not_finite() {
        let mut sample = ImuSample::new(
            0.0,
            Vector3::zeros(),
            Matrix3::identity(),
            Vector3::zeros(),
            Matrix3::identity(),
        );
        sample.linear_acceleration.y = f64::NAN;
        assert!(!sample.is_finite());
    }

    #[test]
    fn json_round_trip() {
        let sample = ImuSample::new(
            2.0,
            Vector3::new(0.0, 0.0, 1.0),
            Matrix3::identity() * 1e-4,
            Vector3::new(0.0, 0.0, 9.8),
            Matrix3::identity() * 1e-2,
        );
        let json = serde_json::to_string(&sample).unwrap();
        let back: ImuSample = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample);
    }
}
