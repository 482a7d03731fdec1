//! Core data structures for infilling emissions scenarios.
//!
//! - [`database`]: an in-memory, wide-format timeseries database keyed by
//!   model, scenario, region, variable and unit
//! - [`units`]: emissions unit parsing, CO2-equivalence tables and unit harmonisation
//! - [`errors`]: the error type shared by all infilling operations

pub mod database;
pub mod errors;
pub mod timeseries;
pub mod units;

pub use database::{DatabaseFilter, GroupKey, TimeseriesDatabase, TimeseriesKey};
pub use errors::{InfillError, InfillResult};
pub use timeseries::{FloatValue, Year};
