//! Dead reckoning from a simulated IMU: the body rests for two seconds, then
//! yaws at a constant rate while a noisy accelerometer keeps reading gravity.
//!
//! Run with `RUST_LOG=debug` to see every propagation step.
use core::f64::consts::FRAC_PI_4;

use nalgebra::{Matrix3, Quaternion, SMatrix, Vector3};
use odom_estimator::{
    Estimator, EstimatorConfig, GaussianDistribution, ImuSample, OutputFrame, State, UniformGravity,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const RATE_HZ: f64 = 100.0;
const GYRO_STD: f64 = 1e-3;
const ACCEL_STD: f64 = 2e-2;
const G: f64 = 9.8;

fn noisy(rng: &mut StdRng, noise: &Normal<f64>, v: Vector3<f64>) -> Vector3<f64> {
    v + Vector3::from_fn(|_, _| noise.sample(&mut *rng))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = EstimatorConfig::from_json_str(r#"{ "frame_id": "world", "max_dt": 0.1 }"#)?;

    let mut initial_cov = SMatrix::<f64, 14, 14>::identity() * 1e-6;
    // reference pressure is only loosely known
    initial_cov[(13, 13)] = 100.0;
    let initial = GaussianDistribution::new(
        State::new(
            0.0,
            Vector3::zeros(),
            Quaternion::identity(),
            Vector3::zeros(),
            Vector3::zeros(),
            G,
            101_325.0,
        ),
        initial_cov,
    );
    let mut estimator = Estimator::new(initial, UniformGravity::down(G), config)?;

    let mut rng = StdRng::seed_from_u64(42);
    let gyro_noise = Normal::new(0.0, GYRO_STD)?;
    let accel_noise = Normal::new(0.0, ACCEL_STD)?;

    let lever_arm = Vector3::new(0.5, 0.0, 0.0);
    let steps = (4.0 * RATE_HZ) as usize;
    for k in 1..=steps {
        let t = k as f64 / RATE_HZ;
        let yaw_rate = if t <= 2.0 { 0.0 } else { FRAC_PI_4 };

        let sample = ImuSample::new(
            t,
            noisy(&mut rng, &gyro_noise, Vector3::new(0.0, 0.0, yaw_rate)),
            Matrix3::identity() * GYRO_STD * GYRO_STD,
            noisy(&mut rng, &accel_noise, Vector3::new(0.0, 0.0, G)),
            Matrix3::identity() * ACCEL_STD * ACCEL_STD,
        );
        estimator.handle_imu(&sample)?;

        if k % (RATE_HZ as usize / 2) == 0 {
            let odom = estimator.odometry(OutputFrame::Inertial, &lever_arm);
            let belief = estimator.belief();
            println!(
                "t={:.2} pos={:?} yaw={:.3} vel={:?} pos_std={:.4} pressure={:.1}±{:.1}",
                odom.stamp,
                odom.position.as_slice(),
                odom.orientation.euler_angles().2,
                odom.linear_velocity.as_slice(),
                belief.std_dev(0),
                belief.mean().ground_air_pressure(),
                belief.std_dev(13),
            );
        }
    }

    let tf = estimator
        .odometry(OutputFrame::EarthFixed, &Vector3::zeros())
        .to_transform();
    println!(
        "{} -> {} at t={:.2}: translation={:?}",
        tf.frame_id,
        tf.child_frame_id,
        tf.stamp,
        tf.translation.as_slice()
    );

    Ok(())
}
