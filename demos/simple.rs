use complementary_ahrs::{Ahrs, Madgwick, Mahony, QuaternionExt};
use nalgebra::Vector3;

const SAMPLE_RATE: f64 = 100.0; // 100 Hz

fn main() {
    let mut mahony = Mahony::with_default_gains(SAMPLE_RATE);
    let mut madgwick = Madgwick::new(0.1, SAMPLE_RATE);

    for _ in 0..10 {
        // this loop should repeat each time new sensor data is available
        let gyroscope = Vector3::new(0.0, 0.0, 0.0); // replace this with actual gyroscope data in rad/s
        let accelerometer = Vector3::new(0.0, 0.0, 9.81); // replace this with actual accelerometer data
        let magnetometer = Vector3::new(0.4, 0.0, -0.9); // replace this with actual magnetometer data

        let q_mahony = mahony.update_9d(gyroscope, accelerometer, magnetometer);
        let q_madgwick = madgwick.update_9d(gyroscope, accelerometer, magnetometer);

        for (name, quaternion) in [("Mahony", q_mahony), ("Madgwick", q_madgwick)] {
            let euler = quaternion.to_euler_degrees();
            println!(
                "{:<8} Roll: {:.2}, Pitch: {:.2}, Yaw: {:.2}",
                name, euler.x, euler.y, euler.z
            );
        }
    }
}
