//! Orientation state shared by the complementary filters

use crate::math::inv_sqrt;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Unit quaternion estimate together with the rate it is advanced at
///
/// Both filters own one of these. The quaternion starts at identity and is
/// re-normalised after every integration step; the sample frequency is fixed
/// at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Current orientation quaternion (WXYZ format)
    quaternion: UnitQuaternion<f64>,
    /// Sample frequency in Hz
    sample_frequency: f64,
}

impl Orientation {
    /// Create an identity orientation advanced at `sample_frequency` Hz
    ///
    /// The frequency is not validated; a zero, negative or non-finite value
    /// makes every subsequent update produce non-finite components.
    pub fn new(sample_frequency: f64) -> Self {
        if !(sample_frequency.is_finite() && sample_frequency > 0.0) {
            log::warn!(
                "sample frequency {} Hz is not a positive finite value, orientation will not be finite",
                sample_frequency
            );
        }

        Self {
            quaternion: UnitQuaternion::identity(),
            sample_frequency,
        }
    }

    /// Current orientation quaternion
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Overwrite the orientation quaternion
    pub fn set_quaternion(&mut self, quaternion: UnitQuaternion<f64>) {
        self.quaternion = quaternion;
    }

    /// Sample frequency in Hz
    pub fn sample_frequency(&self) -> f64 {
        self.sample_frequency
    }

    /// Time between samples in seconds
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_frequency
    }

    /// Return to the identity orientation
    pub fn reset(&mut self) {
        self.quaternion = UnitQuaternion::identity();
    }

    /// Half of the gravity direction in the sensor frame
    ///
    /// This is the third row of the rotation matrix scaled by 0.5, i.e. the
    /// Earth `+Z` axis seen from the body.
    pub fn half_gravity(&self) -> Vector3<f64> {
        let q = self.quaternion.as_ref();
        let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

        Vector3::new(
            q1 * q3 - q0 * q2,
            q0 * q1 + q2 * q3,
            q0 * q0 - 0.5 + q3 * q3,
        )
    }

    /// Quaternion derivative driven by an angular rate, `0.5 * q ⊗ (0, ω)`
    pub fn rate_of_change(&self, angular_rate: Vector3<f64>) -> Quaternion<f64> {
        self.quaternion.into_inner() * Quaternion::from_imag(angular_rate) * 0.5
    }

    /// First-order integration of a quaternion derivative over one sample period
    ///
    /// The result is normalised with [`inv_sqrt`] and stored.
    pub fn integrate(&mut self, rate_of_change: Quaternion<f64>) -> UnitQuaternion<f64> {
        let q = self.quaternion.into_inner() + rate_of_change * self.sample_period();
        self.quaternion = UnitQuaternion::new_unchecked(q * inv_sqrt(q.norm_squared()));
        self.quaternion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::QuaternionExt;

    #[test]
    fn test_new_orientation() {
        let orientation = Orientation::new(100.0);
        assert_eq!(orientation.quaternion(), UnitQuaternion::identity());
        assert_eq!(orientation.sample_frequency(), 100.0);
        assert_eq!(orientation.sample_period(), 0.01);
    }

    #[test]
    fn test_half_gravity_identity() {
        let orientation = Orientation::new(100.0);
        assert_eq!(orientation.half_gravity(), Vector3::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn test_half_gravity_matches_rotation() {
        let mut orientation = Orientation::new(100.0);
        let q = UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1);
        orientation.set_quaternion(q);

        let expected = q.inverse_transform_vector(&Vector3::z()) * 0.5;
        assert!((orientation.half_gravity() - expected).norm() < 1e-12);
    }

    #[test]
    fn test_rate_of_change_expansion() {
        let mut orientation = Orientation::new(100.0);
        orientation.set_quaternion(UnitQuaternion::from_wxyz([0.5, 0.5, 0.5, 0.5]));
        let (q0, q1, q2, q3) = (0.5, 0.5, 0.5, 0.5);
        let (gx, gy, gz) = (0.1, -0.4, 0.9);

        let q_dot = orientation.rate_of_change(Vector3::new(gx, gy, gz));

        assert!((q_dot.w - 0.5 * (-q1 * gx - q2 * gy - q3 * gz)).abs() < 1e-15);
        assert!((q_dot.i - 0.5 * (q0 * gx + q2 * gz - q3 * gy)).abs() < 1e-15);
        assert!((q_dot.j - 0.5 * (q0 * gy - q1 * gz + q3 * gx)).abs() < 1e-15);
        assert!((q_dot.k - 0.5 * (q0 * gz + q1 * gy - q2 * gx)).abs() < 1e-15);
    }

    #[test]
    fn test_integrate_normalises() {
        let mut orientation = Orientation::new(100.0);
        let q_dot = orientation.rate_of_change(Vector3::new(1.0, 2.0, 3.0));
        let q = orientation.integrate(q_dot);

        assert!((q.into_inner().norm_squared() - 1.0).abs() < 1e-12);
        assert_eq!(orientation.quaternion(), q);
    }

    #[test]
    fn test_integrate_zero_rate_is_fixed_point() {
        let mut orientation = Orientation::new(100.0);
        let q = orientation.integrate(Quaternion::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(q, UnitQuaternion::identity());
    }

    #[test]
    fn test_zero_sample_frequency_is_not_finite() {
        let mut orientation = Orientation::new(0.0);
        let q_dot = orientation.rate_of_change(Vector3::new(0.1, 0.0, 0.0));
        let q = orientation.integrate(q_dot);
        assert!(q.to_wxyz().iter().any(|c| !c.is_finite()));
    }

    #[test]
    fn test_reset() {
        let mut orientation = Orientation::new(50.0);
        orientation.set_quaternion(UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3));
        orientation.reset();
        assert_eq!(orientation.quaternion(), UnitQuaternion::identity());
    }
}
