/// Floating point type used for all timeseries values.
///
/// `NaN` marks a missing observation.
pub type FloatValue = f64;

/// Reporting year of a timeseries value.
pub type Year = i32;
