//! Capability shared by the complementary orientation filters

use nalgebra::{UnitQuaternion, Vector3};

/// Orientation filter fed one sensor epoch at a time
///
/// [`Mahony`](crate::Mahony) and [`Madgwick`](crate::Madgwick) both implement
/// this trait, so calling code can swap one for the other. Each call consumes
/// raw readings, advances the internal estimate by one sample period and
/// returns the new orientation. Use
/// [`QuaternionExt::to_wxyz`](crate::QuaternionExt::to_wxyz) for the
/// scalar-first `[w, x, y, z]` array.
///
/// Updates must be applied in the order the samples were taken.
///
/// # Example
/// ```
/// use complementary_ahrs::{Ahrs, Madgwick, Mahony};
/// use nalgebra::Vector3;
///
/// let mut filters: Vec<Box<dyn Ahrs>> = vec![
///     Box::new(Mahony::with_default_gains(100.0)),
///     Box::new(Madgwick::new(0.1, 100.0)),
/// ];
///
/// for filter in filters.iter_mut() {
///     let q = filter.update_6d(Vector3::new(0.0, 0.0, 0.1), Vector3::new(0.0, 0.0, 9.81));
///     assert!((q.into_inner().norm() - 1.0).abs() < 1e-9);
/// }
/// ```
pub trait Ahrs {
    /// Update with gyroscope and accelerometer readings
    ///
    /// # Arguments
    /// * `gyroscope` - Angular rate in radians per second
    /// * `accelerometer` - Acceleration, any unit (only the direction is used)
    fn update_6d(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
    ) -> UnitQuaternion<f64>;

    /// Update with gyroscope, accelerometer and magnetometer readings
    ///
    /// # Arguments
    /// * `gyroscope` - Angular rate in radians per second
    /// * `accelerometer` - Acceleration, any unit (only the direction is used)
    /// * `magnetometer` - Magnetic field, any unit (only the direction is used)
    fn update_9d(
        &mut self,
        gyroscope: Vector3<f64>,
        accelerometer: Vector3<f64>,
        magnetometer: Vector3<f64>,
    ) -> UnitQuaternion<f64>;
}
