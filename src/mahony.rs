//! Proportional-integral complementary filter (Mahony)

use crate::ahrs::Ahrs;
use crate::math::Vector3Ext;
use crate::orientation::Orientation;
use crate::types::MahonySettings;
use nalgebra::{ComplexField, UnitQuaternion, Vector3};

/// Mahony orientation filter
///
/// Integrates gyroscope rates into a quaternion, steering the rates with a
/// PI controller fed by the cross product between measured and predicted
/// reference directions (gravity, and for the 9-axis update the Earth's
/// magnetic field).
///
/// # Example
/// ```
/// use complementary_ahrs::{Ahrs, Mahony, QuaternionExt};
/// use nalgebra::Vector3;
///
/// let mut mahony = Mahony::new(0.2, 0.1, 100.0);
///
/// let gyroscope = Vector3::new(0.0, 0.0, 0.0);     // rad/s
/// let accelerometer = Vector3::new(0.0, 0.0, 9.8); // m/s^2
/// let magnetometer = Vector3::new(1.0, 0.0, 0.0);  // any unit
///
/// let q = mahony.update_9d(gyroscope, accelerometer, magnetometer);
/// assert_eq!(q.to_wxyz(), [1.0, 0.0, 0.0, 0.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mahony {
    /// Gains as supplied
    settings: MahonySettings,
    /// Proportional gain times two
    two_kp: f64,
    /// Integral gain times two
    two_ki: f64,
    /// Accumulated integral feedback in rad/s
    integral_feedback: Vector3<f64>,
    /// Quaternion estimate and sample rate
    orientation: Orientation,
}

impl Mahony {
    /// Create a Mahony filter with the given gains
    ///
    /// # Arguments
    /// * `kp` - Proportional gain
    /// * `ki` - Integral gain, 0 disables integral feedback
    /// * `sample_frequency` - Sensor sample rate in Hz
    pub fn new(kp: f64, ki: f64, sample_frequency: f64) -> Self {
        Self::with_settings(MahonySettings { kp, ki }, sample_frequency)
    }

    /// Create a Mahony filter with `kp = 0.2` and `ki = 0.1`
    pub fn with_default_gains(sample_frequency: f64) -> Self {
        Self::with_settings(MahonySettings::default(), sample_frequency)
    }

    /// Create a Mahony filter from settings
    pub fn with_settings(settings: MahonySettings, sample_frequency: f64) -> Self {
        Self {
            settings,
            two_kp: 2.0 * settings.kp,
            two_ki: 2.0 * settings.ki,
            integral_feedback: Vector3::zeros(),
            orientation: Orientation::new(sample_frequency),
        }
    }

    /// Return to the identity orientation and clear the integral feedback
    pub fn reset(&mut self) {
        self.orientation.reset();
        self.integral_feedback = Vector3::zeros();
    }

    /// Gains the filter was constructed with
    pub fn settings(&self) -> MahonySettings {
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

    /// Accumulated integral feedback in rad/s
    pub fn integral_feedback(&self) -> Vector3<f64> {
        self.integral_feedback
    }

    /// Unit gravity direction in the sensor frame predicted by the estimate
    pub fn gravity(&self) -> Vector3<f64> {
        self.orientation.half_gravity() * 2.0
    }

    /// Apply PI feedback for `half_error` to the gyroscope rate
    fn apply_feedback(
        &mut self,
        gyroscope: Vector3<f64>,
        half_error: Vector3<f64>,
    ) -> Vector3<f64> {
        let mut corrected = gyroscope;

        if self.two_ki > 0.0 {
            self.integral_feedback +=
                half_error * (self.two_ki * self.orientation.sample_period());
            corrected += self.integral_feedback;
        } else {
            // prevent integral windup
            self.integral_feedback = Vector3::zeros();
        }

        corrected + half_error * self.two_kp
    }

    /// Half of the Earth's magnetic field direction in the sensor frame
    ///
    /// The measured field is rotated into the Earth frame and flattened onto
    /// the north/vertical plane, then rotated back with the current estimate.
    fn half_magnetic(&self, magnetometer: Vector3<f64>) -> Vector3<f64> {
        let q = self.orientation.quaternion();
        let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
        let (mx, my, mz) = (magnetometer.x, magnetometer.y, magnetometer.z);

        let q0q1 = q0 * q1;
        let q0q2 = q0 * q2;
        let q0q3 = q0 * q3;
        let q1q1 = q1 * q1;
        let q1q2 = q1 * q2;
        let q1q3 = q1 * q3;
        let q2q2 = q2 * q2;
        let q2q3 = q2 * q3;
        let q3q3 = q3 * q3;

        let hx = 2.0 * (mx * (0.5 - q2q2 - q3q3) + my * (q1q2 - q0q3) + mz * (q1q3 + q0q2));
        let hy = 2.0 * (mx * (q1q2 + q0q3) + my * (0.5 - q1q1 - q3q3) + mz * (q2q3 - q0q1));
        let bx = ComplexField::sqrt(hx * hx + hy * hy);
        let bz = 2.0 * (mx * (q1q3 - q0q2) + my * (q2q3 + q0q1) + mz * (0.5 - q1q1 - q2q2));

        Vector3::new(
            bx * (0.5 - q2q2 - q3q3) + bz * (q1q3 - q0q2),
            bx * (q1q2 - q0q3) + bz * (q0q1 + q2q3),
            bx * (q0q2 + q1q3) + bz * (0.5 - q1q1 - q2q2),
        )
    }
}

impl Ahrs for Mahony {
    fn update_6d(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
    ) -> UnitQuaternion<f64> {
        let mut gyroscope = gyroscope;

        // Zero acceleration would turn the normalisation into NaN
        if !accelerometer.is_zero() {
            let accelerometer = accelerometer.direction();
            let half_error = accelerometer.cross(&self.orientation.half_gravity());
            gyroscope = self.apply_feedback(gyroscope, half_error);
        }

        let rate_of_change = self.orientation.rate_of_change(gyroscope);
        self.orientation.integrate(rate_of_change)
    }

    fn update_9d(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
        magnetometer: Vector3<f64>,
    ) -> UnitQuaternion<f64> {
        let mut gyroscope = gyroscope;

        // Only the accelerometer gates feedback; a zero field reading yields NaN
        if !accelerometer.is_zero() {
            let accelerometer = accelerometer.direction();
            let magnetometer = magnetometer.direction();

            let half_error = accelerometer.cross(&self.orientation.half_gravity())
                + magnetometer.cross(&self.half_magnetic(magnetometer));
            gyroscope = self.apply_feedback(gyroscope, half_error);
        }

        let rate_of_change = self.orientation.rate_of_change(gyroscope);
        self.orientation.integrate(rate_of_change)
    }
}
