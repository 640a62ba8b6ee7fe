//! Filter settings for the complementary filters

/// Default proportional gain of the Mahony filter
pub const MAHONY_DEFAULT_KP: f64 = 0.2;

/// Default integral gain of the Mahony filter
pub const MAHONY_DEFAULT_KI: f64 = 0.1;

/// Default gradient step gain of the Madgwick filter
pub const MADGWICK_DEFAULT_BETA: f64 = 0.1;

/// Mahony filter gains
///
/// Gains are given as-is and doubled internally, matching the `2Kp`/`2Ki`
/// form used by the feedback loop.
///
/// # Example
/// ```
/// use complementary_ahrs::{Mahony, MahonySettings};
///
/// let settings = MahonySettings {
///     ki: 0.0, // proportional feedback only
///     ..Default::default()
/// };
/// let mahony = Mahony::with_settings(settings, 100.0);
/// assert_eq!(mahony.settings().kp, 0.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MahonySettings {
    /// Proportional gain (typically 0.2)
    ///
    /// Controls how strongly the vector-observation error pulls the estimate
    /// towards the accelerometer/magnetometer reference.
    pub kp: f64,
    /// Integral gain (typically 0.1)
    ///
    /// Accumulated error correcting steady-state gyroscope offset. Set to 0
    /// to disable integral feedback; the accumulator is then held at zero.
    pub ki: f64,
}

impl Default for MahonySettings {
    fn default() -> Self {
        Self {
            kp: MAHONY_DEFAULT_KP,
            ki: MAHONY_DEFAULT_KI,
        }
    }
}

/// Madgwick filter gain
///
/// # Example
/// ```
/// use complementary_ahrs::{Madgwick, MadgwickSettings};
///
/// let madgwick = Madgwick::with_settings(MadgwickSettings { beta: 0.04 }, 256.0);
/// assert_eq!(madgwick.settings().beta, 0.04);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MadgwickSettings {
    /// Gradient descent step size in rad/s
    ///
    /// Higher values converge faster but pass more accelerometer noise into
    /// the estimate.
    pub beta: f64,
}

impl Default for MadgwickSettings {
    fn default() -> Self {
        Self {
            beta: MADGWICK_DEFAULT_BETA,
        }
    }
}
