use crate::timeseries::Year;
use crate::units::UnitParseError;
use thiserror::Error;

/// Error type for invalid infilling operations.
#[derive(Error, Debug)]
pub enum InfillError {
    #[error("{0}")]
    Error(String),

    // Configuration errors
    #[error("``variable_leaders`` is empty. Exactly one lead variable is required")]
    NoLeaders,
    #[error("``variable_leaders`` contains more than one variable. Got {0:?}")]
    MultipleLeaders(Vec<String>),
    #[error("Aggregate variable {0} already exists in the database")]
    AggregateExists(String),

    // Data availability errors
    #[error("No data for `variable_leaders` ({0:?}) in database")]
    NoLeaderData(Vec<String>),
    #[error("No data for `variable_follower` ({0}) in database")]
    NoFollowerData(String),
    #[error("No data for the lead gas ({0}) in the data to infill")]
    NoTargetLeaderData(String),
    #[error("No data for the aggregate ({0}) in database")]
    NoAggregateData(String),
    #[error("Not all required timepoints are in the data for the lead gas ({variable})")]
    MissingTimepoints { variable: String, years: Vec<Year> },

    // Data consistency errors
    #[error("The follower and leader data have different sizes ({follower} follower rows, {leader} leader rows)")]
    MismatchedSizes { follower: usize, leader: usize },
    #[error("No leader data to pair with follower data for model={model}, scenario={scenario}, region={region}")]
    UnpairedTimeseries {
        model: String,
        scenario: String,
        region: String,
    },
    #[error("There are multiple units for the lead variable. Found {units:?} for {variable}")]
    MultipleLeaderUnits { variable: String, units: Vec<String> },
    #[error("There are multiple units for the follower variable. Found {units:?} for {variable}")]
    MultipleFollowerUnits { variable: String, units: Vec<String> },
    #[error("Not all units are found in the conversion table. We lack {0:?}")]
    MissingConversions(Vec<String>),
    #[error("Unknown unit magnitude '{magnitude}' in unit '{unit}'")]
    UnknownMagnitude { magnitude: String, unit: String },
    #[error("Invalid unit string: {0}")]
    UnitParse(#[from] UnitParseError),
    #[error("Duplicate timeseries for model={model}, scenario={scenario}, region={region}, variable={variable}")]
    DuplicateTimeseries {
        model: String,
        scenario: String,
        region: String,
        variable: String,
    },
    #[error("Years must be unique and strictly increasing. Got {0:?}")]
    InvalidYears(Vec<Year>),
    #[error("Row for {variable} has {got} values but the database has {expected} years")]
    RowLength {
        variable: String,
        got: usize,
        expected: usize,
    },
    #[error("Aggregate {variable} is not the sum of its components for model={model}, scenario={scenario}, region={region}, year={year}. Reported {reported}, expected {expected}")]
    InconsistentAggregate {
        variable: String,
        model: String,
        scenario: String,
        region: String,
        year: Year,
        reported: f64,
        expected: f64,
    },

    // Configuration loading
    #[error("Could not read conversion table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse conversion table: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, InfillError>`.
pub type InfillResult<T> = Result<T, InfillError>;
