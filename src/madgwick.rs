//! Gradient descent complementary filter (Madgwick)

use crate::ahrs::Ahrs;
use crate::math::{Vector3Ext, inv_sqrt};
use crate::orientation::Orientation;
use crate::types::MadgwickSettings;
use nalgebra::{ComplexField, Matrix3x4, Quaternion, UnitQuaternion, Vector3, Vector4};

/// Squared gradient norms below this are treated as zero
const GRADIENT_NOISE_FLOOR: f64 = f64::EPSILON;

/// Madgwick orientation filter
///
/// Integrates the gyroscope-driven quaternion derivative minus a fixed-size
/// step along the normalised gradient of the vector-observation error. One
/// analytic gradient step is taken per sample.
///
/// # Example
/// ```
/// use complementary_ahrs::{Ahrs, Madgwick, QuaternionExt};
/// use nalgebra::Vector3;
///
/// let mut madgwick = Madgwick::new(0.1, 100.0);
///
/// let gyroscope = Vector3::new(0.0, 0.0, 0.5);     // rad/s
/// let accelerometer = Vector3::new(0.0, 0.0, 9.8); // m/s^2
///
/// for _ in 0..100 {
///     madgwick.update_6d(gyroscope, accelerometer);
/// }
///
/// // Half a radian of heading after one second at 0.5 rad/s
/// let yaw = madgwick.quaternion().to_euler().z;
/// assert!((yaw - 0.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Madgwick {
    /// Gradient step gain
    settings: MadgwickSettings,
    /// Quaternion estimate and sample rate
    orientation: Orientation,
}

impl Madgwick {
    /// Create a Madgwick filter
    ///
    /// # Arguments
    /// * `beta` - Gradient descent step size in rad/s
    /// * `sample_frequency` - Sensor sample rate in Hz
    pub fn new(beta: f64, sample_frequency: f64) -> Self {
        Self::with_settings(MadgwickSettings { beta }, sample_frequency)
    }

    /// Create a Madgwick filter from settings
    pub fn with_settings(settings: MadgwickSettings, sample_frequency: f64) -> Self {
        Self {
            settings,
            orientation: Orientation::new(sample_frequency),
        }
    }

    /// Return to the identity orientation
    pub fn reset(&mut self) {
        self.orientation.reset();
    }

    /// Gain the filter was constructed with
    pub fn settings(&self) -> MadgwickSettings {
        self.settings
    }

    /// Current orientation quaternion
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.orientation.quaternion()
    }

    /// Set orientation quaternion directly
    pub fn set_quaternion(&mut self, quaternion: UnitQuaternion<f64>) {
        self.orientation.set_quaternion(quaternion);
    }

    /// Sample frequency in Hz
    pub fn sample_frequency(&self) -> f64 {
        self.orientation.sample_frequency()
    }

    /// Time between samples in seconds
    pub fn sample_period(&self) -> f64 {
        self.orientation.sample_period()
    }

    /// Unit gravity direction in the sensor frame predicted by the estimate
    pub fn gravity(&self) -> Vector3<f64> {
        self.orientation.half_gravity() * 2.0
    }

    /// Gradient of the gravity objective `J_gᵀ f_g` for a unit accelerometer reading
    fn gravity_gradient(&self, accelerometer: Vector3<f64>) -> Vector4<f64> {
        let q = self.orientation.quaternion();
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);

        let f_g = Vector3::new(
            2.0 * (x * z - w * y) - accelerometer.x,
            2.0 * (w * x + y * z) - accelerometer.y,
            2.0 * (0.5 - x * x - y * y) - accelerometer.z,
        );

        #[rustfmt::skip]
        let j_g = Matrix3x4::new(
            -2.0 * y,  2.0 * z, -2.0 * w, 2.0 * x,
             2.0 * x,  2.0 * w,  2.0 * z, 2.0 * y,
             0.0,     -4.0 * x, -4.0 * y, 0.0,
        );

        j_g.transpose() * f_g
    }

    /// Gradient of the magnetic objective `J_bᵀ f_b` for a unit magnetometer reading
    ///
    /// The reference field `b` is the measurement rotated into the Earth
    /// frame with its horizontal part folded onto the x axis.
    fn magnetic_gradient(&self, magnetometer: Vector3<f64>) -> Vector4<f64> {
        let q = self.orientation.quaternion();
        let (w, x, y, z) = (q.w, q.i, q.j, q.k);

        let h = q * magnetometer;
        let bx = ComplexField::sqrt(h.x * h.x + h.y * h.y);
        let bz = h.z;

        let f_b = Vector3::new(
            2.0 * bx * (0.5 - y * y - z * z) + 2.0 * bz * (x * z - w * y) - magnetometer.x,
            2.0 * bx * (x * y - w * z) + 2.0 * bz * (w * x + y * z) - magnetometer.y,
            2.0 * bx * (w * y + x * z) + 2.0 * bz * (0.5 - x * x - y * y) - magnetometer.z,
        );

        #[rustfmt::skip]
        let j_b = Matrix3x4::new(
            -2.0 * bz * y,                2.0 * bz * z,                -4.0 * bx * y - 2.0 * bz * w, -4.0 * bx * z + 2.0 * bz * x,
            -2.0 * bx * z + 2.0 * bz * x, 2.0 * bx * y + 2.0 * bz * w,  2.0 * bx * x + 2.0 * bz * z, -2.0 * bx * w + 2.0 * bz * y,
             2.0 * bx * y,                2.0 * bx * z - 4.0 * bz * x,  2.0 * bx * w - 4.0 * bz * y,  2.0 * bx * x,
        );

        j_b.transpose() * f_b
    }

    /// Step the gyroscope derivative against the normalised gradient and integrate
    fn descend(
        &mut self,
        gyroscope: Vector3<f64>,
        gradient: Option<Vector4<f64>>,
    ) -> UnitQuaternion<f64> {
        let mut rate_of_change = self.orientation.rate_of_change(gyroscope);

        match gradient {
            // Rounding residue at the true attitude, the estimate already matches
            Some(gradient) if gradient.norm_squared() < GRADIENT_NOISE_FLOOR => {}
            Some(gradient) => {
                let step = gradient * (self.settings.beta * inv_sqrt(gradient.norm_squared()));
                rate_of_change -= Quaternion::new(step[0], step[1], step[2], step[3]);
            }
            None => {}
        }

        self.orientation.integrate(rate_of_change)
    }
}

impl Ahrs for Madgwick {
    fn update_6d(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
    ) -> UnitQuaternion<f64> {
        let gradient = (!accelerometer.is_zero())
            .then(|| self.gravity_gradient(accelerometer.direction()));

        self.descend(gyroscope, gradient)
    }

    fn update_9d(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
        magnetometer: Vector3<f64>,
    ) -> UnitQuaternion<f64> {
        if magnetometer.is_zero() {
            return self.update_6d(gyroscope, accelerometer);
        }

        let gradient = (!accelerometer.is_zero()).then(|| {
            self.gravity_gradient(accelerometer.direction())
                + self.magnetic_gradient(magnetometer.direction())
        });

        self.descend(gyroscope, gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::QuaternionExt;

    #[test]
    fn test_new_madgwick() {
        let madgwick = Madgwick::new(0.1, 256.0);
        assert_eq!(madgwick.quaternion(), UnitQuaternion::identity());
        assert_eq!(madgwick.settings().beta, 0.1);
        assert_eq!(madgwick.sample_frequency(), 256.0);
        assert_eq!(madgwick.sample_period(), 1.0 / 256.0);
    }

    #[test]
    fn test_fixed_point_6d() {
        let mut madgwick = Madgwick::new(0.1, 100.0);
        let q = madgwick.update_6d(Vector3::zeros(), Vector3::new(0.0, 0.0, 9.81));
        assert_eq!(q, UnitQuaternion::identity());
    }

    #[test]
    fn test_fixed_point_9d() {
        let mut madgwick = Madgwick::new(0.1, 100.0);
        let q = madgwick.update_9d(
            Vector3::zeros(),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.4, 0.0, -0.9),
        );
        assert_eq!(q.to_wxyz(), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_gradient_vanishes_at_true_attitude() {
        let attitude = UnitQuaternion::from_euler_angles(-0.5, 0.2, 2.0);
        let accel = attitude.inverse_transform_vector(&Vector3::z());
        let mag = attitude
            .inverse_transform_vector(&Vector3::new(0.35, 0.0, -0.8))
            .normalize();

        let mut madgwick = Madgwick::new(0.1, 100.0);
        madgwick.set_quaternion(attitude);

        assert!(madgwick.gravity_gradient(accel).norm() < 1e-12);
        assert!(madgwick.magnetic_gradient(mag).norm() < 1e-12);
    }

    #[test]
    fn test_fixed_point_rotated() {
        for (roll, pitch, yaw) in [(-0.5, 0.2, 2.0), (0.4, -0.3, 1.2)] {
            let attitude = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
            let accel = attitude.inverse_transform_vector(&Vector3::new(0.0, 0.0, 9.81));
            let mag = attitude.inverse_transform_vector(&Vector3::new(0.35, 0.0, -0.8));

            let mut madgwick = Madgwick::new(0.1, 100.0);
            madgwick.set_quaternion(attitude);
            let q = madgwick.update_6d(Vector3::zeros(), accel);
            assert!(q.distance(&attitude) < 1e-12, "6d moved {}", q.distance(&attitude));

            madgwick.set_quaternion(attitude);
            let q = madgwick.update_9d(Vector3::zeros(), accel, mag);
            assert!(q.distance(&attitude) < 1e-12, "9d moved {}", q.distance(&attitude));
        }
    }

    #[test]
    fn test_non_finite_gradient_propagates() {
        let mut madgwick = Madgwick::new(0.1, 100.0);
        let q = madgwick.update_6d(Vector3::zeros(), Vector3::new(f64::NAN, 0.0, 1.0));
        assert!(q.to_wxyz().iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_gravity_gradient_matches_expanded_form() {
        let attitude = UnitQuaternion::from_euler_angles(0.3, 0.1, -0.7);
        let (q0, q1, q2, q3) = (attitude.w, attitude.i, attitude.j, attitude.k);
        let a = Vector3::new(0.2, -0.4, 0.9).normalize();

        let mut madgwick = Madgwick::new(0.1, 100.0);
        madgwick.set_quaternion(attitude);
        let gradient = madgwick.gravity_gradient(a);

        // Closed-form IMU gradient with the products multiplied out
        let s0 = 4.0 * q0 * q2 * q2 + 2.0 * q2 * a.x + 4.0 * q0 * q1 * q1 - 2.0 * q1 * a.y;
        let s1 = 4.0 * q1 * q3 * q3 - 2.0 * q3 * a.x + 4.0 * q0 * q0 * q1 - 2.0 * q0 * a.y
            - 4.0 * q1
            + 8.0 * q1 * q1 * q1
            + 8.0 * q1 * q2 * q2
            + 4.0 * q1 * a.z;
        let s2 = 4.0 * q0 * q0 * q2 + 2.0 * q0 * a.x + 4.0 * q2 * q3 * q3 - 2.0 * q3 * a.y
            - 4.0 * q2
            + 8.0 * q2 * q1 * q1
            + 8.0 * q2 * q2 * q2
            + 4.0 * q2 * a.z;
        let s3 = 4.0 * q1 * q1 * q3 - 2.0 * q1 * a.x + 4.0 * q2 * q2 * q3 - 2.0 * q2 * a.y;

        let expanded = Vector4::new(s0, s1, s2, s3);
        assert!((gradient - expanded).norm() < 1e-12);
    }

    #[test]
    fn test_degenerate_accelerometer_is_pure_gyro() {
        let gyro = Vector3::new(-0.2, 0.4, 0.1);
        let mut madgwick = Madgwick::new(0.1, 100.0);
        let mut reference = Orientation::new(100.0);

        for _ in 0..50 {
            let q = madgwick.update_6d(gyro, Vector3::zeros());
            let expected = reference.integrate(reference.rate_of_change(gyro));
            assert_eq!(q, expected);
        }

        let q = madgwick.update_9d(gyro, Vector3::zeros(), Vector3::new(0.3, 0.1, -0.9));
        let expected = reference.integrate(reference.rate_of_change(gyro));
        assert_eq!(q, expected);
    }

    #[test]
    fn test_zero_magnetometer_falls_back_to_6d() {
        let gyro = Vector3::new(0.05, -0.02, 0.3);
        let accel = Vector3::new(0.5, -1.0, 9.6);

        let mut nine_axis = Madgwick::new(0.1, 100.0);
        let mut six_axis = Madgwick::new(0.1, 100.0);

        for _ in 0..200 {
            let q9 = nine_axis.update_9d(gyro, accel, Vector3::zeros());
            let q6 = six_axis.update_6d(gyro, accel);
            assert_eq!(q9, q6);
        }
        assert!(nine_axis.quaternion().to_wxyz().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_correction_step_size() {
        let mut madgwick = Madgwick::new(0.1, 100.0);
        let q = madgwick.update_6d(Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0));

        // One normalised step of beta rad/s over 10 ms towards positive roll
        let expected = UnitQuaternion::from_wxyz([1.0, 0.1 * 0.01, 0.0, 0.0]);
        assert!(q.distance(&expected) < 1e-12, "q = {:?}", q.to_wxyz());
    }

    #[test]
    fn test_tilt_convergence() {
        let mut madgwick = Madgwick::new(0.1, 100.0);
        let accel = Vector3::new(0.0, 3.0, 9.3);

        for _ in 0..10_000 {
            let q = madgwick.update_6d(Vector3::zeros(), accel);
            assert!((q.into_inner().norm_squared() - 1.0).abs() < 1e-9);
        }

        let roll = madgwick.quaternion().to_euler().x;
        assert!((roll - 3.0_f64.atan2(9.3)).abs() < 5e-3, "roll: {}", roll);
        assert!((madgwick.gravity() - accel.normalize()).norm() < 5e-3);
    }

    #[test]
    fn test_reset() {
        let mut madgwick = Madgwick::new(0.1, 100.0);
        madgwick.update_6d(Vector3::new(0.5, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert_ne!(madgwick.quaternion(), UnitQuaternion::identity());

        madgwick.reset();
        assert_eq!(madgwick.quaternion(), UnitQuaternion::identity());
    }
}
