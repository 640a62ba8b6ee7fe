//! Mathematical utilities and nalgebra extensions for the complementary filters

use nalgebra::{ComplexField, Quaternion, UnitQuaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Reciprocal square root, `1 / sqrt(x)`
///
/// Computed exactly with a real square root and a division. Zero yields
/// positive infinity and negative input yields NaN; callers are expected to
/// gate the zero-vector case before normalising.
#[inline]
pub fn inv_sqrt(x: f64) -> f64 {
    1.0 / ComplexField::sqrt(x)
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Scale the vector to unit length using [`inv_sqrt`]
    ///
    /// A zero vector produces non-finite components.
    fn direction(&self) -> Vector3<f64>;

    /// Whether every component is exactly zero
    fn is_zero(&self) -> bool;

    /// Convert degrees to radians
    fn deg_to_rad(&self) -> Vector3<f64>;

    /// Convert radians to degrees
    fn rad_to_deg(&self) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn direction(&self) -> Vector3<f64> {
        *self * inv_sqrt(self.norm_squared())
    }

    fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    fn deg_to_rad(&self) -> Vector3<f64> {
        *self * DEG_TO_RAD
    }

    fn rad_to_deg(&self) -> Vector3<f64> {
        *self * RAD_TO_DEG
    }
}

/// Extension trait for UnitQuaternion operations
pub trait QuaternionExt {
    /// Components in scalar-first order `[w, x, y, z]`
    fn to_wxyz(&self) -> [f64; 4];

    /// Build a unit quaternion from scalar-first components, normalising them
    fn from_wxyz(wxyz: [f64; 4]) -> UnitQuaternion<f64>;

    /// Euclidean norm of the component-wise difference between two quaternions
    ///
    /// No sign folding is applied, so `q` and `-q` are far apart even though
    /// they describe the same rotation.
    fn distance(&self, other: &UnitQuaternion<f64>) -> f64;

    /// Convert quaternion to Euler angles (roll, pitch, yaw) in radians
    fn to_euler(&self) -> Vector3<f64>;

    /// Convert quaternion to Euler angles in degrees
    fn to_euler_degrees(&self) -> Vector3<f64>;

    /// Create quaternion from Euler angles in degrees
    fn from_euler_degrees(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64>;
}

impl QuaternionExt for UnitQuaternion<f64> {
    fn to_wxyz(&self) -> [f64; 4] {
        [self.w, self.i, self.j, self.k]
    }

    fn from_wxyz(wxyz: [f64; 4]) -> UnitQuaternion<f64> {
        let [w, x, y, z] = wxyz;
        let q = Quaternion::new(w, x, y, z);
        UnitQuaternion::new_unchecked(q * inv_sqrt(q.norm_squared()))
    }

    fn distance(&self, other: &UnitQuaternion<f64>) -> f64 {
        (self.into_inner() - other.into_inner()).norm()
    }

    fn to_euler(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.euler_angles();
        Vector3::new(roll, pitch, yaw)
    }

    fn to_euler_degrees(&self) -> Vector3<f64> {
        self.to_euler().rad_to_deg()
    }

    fn from_euler_degrees(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
        let euler_rad = Vector3::new(roll, pitch, yaw).deg_to_rad();
        UnitQuaternion::from_euler_angles(euler_rad.x, euler_rad.y, euler_rad.z)
    }
}
