//! Semicolon-delimited telemetry loader
//!
//! Reads recorded sensor traces with a header row and the columns
//! `time;ax;ay;az;gx;gy;gz;mx;my;mz`, one sample per row. Used to replay
//! recordings through the filters in tests and benchmarks.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use nalgebra::Vector3;
use serde::Deserialize;

/// Errors raised while loading telemetry
#[derive(Debug)]
pub enum TelemetryError {
    /// The file could not be opened
    Io(io::Error),
    /// A row could not be read or parsed
    Csv(csv::Error),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Io(err) => write!(f, "failed to open telemetry: {}", err),
            TelemetryError::Csv(err) => write!(f, "malformed telemetry: {}", err),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Io(err) => Some(err),
            TelemetryError::Csv(err) => Some(err),
        }
    }
}

impl From<io::Error> for TelemetryError {
    fn from(err: io::Error) -> Self {
        TelemetryError::Io(err)
    }
}

impl From<csv::Error> for TelemetryError {
    fn from(err: csv::Error) -> Self {
        TelemetryError::Csv(err)
    }
}

/// One row of the telemetry table, as laid out on disk
#[derive(Debug, Deserialize)]
struct Row {
    time: f64,
    ax: f64,
    ay: f64,
    az: f64,
    gx: f64,
    gy: f64,
    gz: f64,
    mx: f64,
    my: f64,
    mz: f64,
}

/// A single sensor epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    /// Timestamp in seconds
    pub time: f64,
    /// Acceleration, only the direction is used by the filters
    pub accelerometer: Vector3<f64>,
    /// Angular rate in radians per second
    pub gyroscope: Vector3<f64>,
    /// Magnetic field, only the direction is used by the filters
    pub magnetometer: Vector3<f64>,
}

impl From<Row> for TelemetryRecord {
    fn from(row: Row) -> Self {
        Self {
            time: row.time,
            accelerometer: Vector3::new(row.ax, row.ay, row.az),
            gyroscope: Vector3::new(row.gx, row.gy, row.gz),
            magnetometer: Vector3::new(row.mx, row.my, row.mz),
        }
    }
}

/// Load a telemetry table from a file
///
/// # Example
/// ```no_run
/// use complementary_ahrs::{Ahrs, Mahony};
/// use complementary_ahrs::telemetry::load_telemetry;
///
/// let records = load_telemetry("testdata/telemetry.csv")?;
/// let mut mahony = Mahony::with_default_gains(100.0);
///
/// for record in &records {
///     mahony.update_9d(record.gyroscope, record.accelerometer, record.magnetometer);
/// }
/// # Ok::<(), complementary_ahrs::telemetry::TelemetryError>(())
/// ```
pub fn load_telemetry<P: AsRef<Path>>(path: P) -> Result<Vec<TelemetryRecord>, TelemetryError> {
    let file = File::open(path.as_ref())?;
    let records = read_telemetry(file)?;

    log::debug!(
        "loaded {} telemetry records from {}",
        records.len(),
        path.as_ref().display()
    );

    Ok(records)
}

/// Parse a telemetry table from any reader
///
/// The first row is the header; columns are matched by name, surrounding
/// whitespace is ignored and blank lines are skipped.
pub fn read_telemetry<R: io::Read>(reader: R) -> Result<Vec<TelemetryRecord>, TelemetryError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let row: Row = result?;
        records.push(TelemetryRecord::from(row));
    }

    Ok(records)
}
