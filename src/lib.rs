#![cfg_attr(not(feature = "std"), no_std)]

//! Complementary AHRS - orientation filters for attitude and heading reference systems
//!
//! This library estimates the orientation of a rigid body as a unit quaternion
//! from gyroscope, accelerometer and (optionally) magnetometer readings using
//! two classic complementary filters:
//!
//! - [`Mahony`]: proportional-integral feedback on the cross product between
//!   measured and predicted reference directions
//! - [`Madgwick`]: a single analytic gradient descent step per sample on the
//!   same vector-observation error
//!
//! Both implement the [`Ahrs`] trait and are interchangeable.
//!
//! # Features
//!
//! - 6-axis (gyroscope + accelerometer) and 9-axis (+ magnetometer) updates
//! - Constant-time, allocation-free updates
//! - Integral windup prevention when the Mahony integral gain is zero
//! - `no_std` compatible when the default `std` feature is disabled
//! - Semicolon-delimited telemetry loader for replaying recordings (`std`)
//!
//! # Quick Start
//!
//! ```rust
//! use nalgebra::Vector3;
//! use complementary_ahrs::{Ahrs, Mahony, QuaternionExt};
//!
//! let mut mahony = Mahony::with_default_gains(100.0); // 100 Hz
//!
//! // Sensor readings
//! let gyroscope = Vector3::new(0.01, -0.02, 0.005);   // rad/s
//! let accelerometer = Vector3::new(0.0, 0.0, 9.81);   // m/s^2
//! let magnetometer = Vector3::new(0.38, 0.0, -0.92);  // any unit
//!
//! // Update filter
//! let quaternion = mahony.update_9d(gyroscope, accelerometer, magnetometer);
//!
//! // Scalar-first components
//! let [w, x, y, z] = quaternion.to_wxyz();
//! assert!((w * w + x * x + y * y + z * z - 1.0).abs() < 1e-9);
//!
//! // Convert to Euler angles (roll, pitch, yaw)
//! let (roll, pitch, yaw) = quaternion.euler_angles();
//! ```
//!
//! Inputs are not validated: a non-finite reading or a non-positive sample
//! frequency corrupts the estimate until the filter is reset.

mod ahrs;
mod madgwick;
mod mahony;
mod math;
mod orientation;
#[cfg(feature = "std")]
pub mod telemetry;
mod types;

// Re-export all public types and functions
pub use ahrs::Ahrs;
pub use madgwick::Madgwick;
pub use mahony::Mahony;
pub use math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG, Vector3Ext, inv_sqrt};
pub use orientation::Orientation;
pub use types::*;
