//! Database crunchers for infilling emissions scenarios.
//!
//! A cruncher derives a relationship between variables from a reference
//! [`TimeseriesDatabase`](silicone_core::TimeseriesDatabase) and returns a
//! [`Filler`] which applies that relationship to new scenarios.
//!
//! # Module Organisation
//!
//! - `cruncher`: the [`DatabaseCruncher`] and [`Filler`] traits
//! - `ratio`: derivation of time-dependent ratios between follower and leaders
//! - `consistency`: reconstruction of aggregates from their components
//! - `filler`: application of a derived ratio to new data
//! - `time_dep_ratio`: the [`GasDecomposeTimeDepRatio`] cruncher

pub mod consistency;
pub mod cruncher;
pub mod filler;
pub mod ratio;
pub mod time_dep_ratio;

pub use cruncher::{infill, DatabaseCruncher, Filler};
pub use filler::TimeDepRatioFiller;
pub use ratio::RatioSeries;
pub use time_dep_ratio::GasDecomposeTimeDepRatio;
