//! Emissions unit string parser.
//!
//! # Grammar
//!
//! ```text
//! unit          = magnitude WS species_token
//! species_token = species ["-equiv"] "/yr"
//! magnitude     = [^ ]+
//! species       = [^ ]+
//! ```
//!
//! The species is the last whitespace-delimited token with the trailing `/yr`
//! and an optional `-equiv` suffix removed. The magnitude is resolved separately
//! by the [`registry`](super::registry) so that unknown species can be reported
//! before unknown magnitudes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const PER_YEAR_SUFFIX: &str = "/yr";
const EQUIV_SUFFIX: &str = "-equiv";

/// Error type for unit parsing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitParseError {
    #[error("empty unit string")]
    EmptyUnit,
    #[error("unit '{0}' is not a rate per year (expected a trailing '/yr')")]
    MissingRate(String),
    #[error("unit '{0}' has no species")]
    EmptySpecies(String),
    #[error("unit '{0}' has no magnitude (expected e.g. 'kt' or 'Mt')")]
    MissingMagnitude(String),
    #[error("unexpected token '{token}' in unit '{unit}'")]
    UnexpectedToken { token: String, unit: String },
}

/// A parsed emissions unit, e.g. `kt C2F6/yr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionsUnit {
    magnitude: String,
    species: String,
    equivalent: bool,
}

impl EmissionsUnit {
    /// Parses a unit string.
    ///
    /// # Examples
    ///
    /// ```
    /// use silicone_core::units::EmissionsUnit;
    ///
    /// let unit = EmissionsUnit::parse("Mt CO2-equiv/yr").unwrap();
    /// assert_eq!(unit.magnitude(), "Mt");
    /// assert_eq!(unit.species(), "CO2");
    /// assert!(unit.is_equivalent());
    ///
    /// assert!(EmissionsUnit::parse("kt C2F6").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, UnitParseError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let last = tokens.last().ok_or(UnitParseError::EmptyUnit)?;

        let species_token = last
            .strip_suffix(PER_YEAR_SUFFIX)
            .ok_or_else(|| UnitParseError::MissingRate(input.to_string()))?;
        let (species, equivalent) = match species_token.strip_suffix(EQUIV_SUFFIX) {
            Some(species) => (species, true),
            None => (species_token, false),
        };
        if species.is_empty() {
            return Err(UnitParseError::EmptySpecies(input.to_string()));
        }

        match tokens.as_slice() {
            [_] => Err(UnitParseError::MissingMagnitude(input.to_string())),
            [magnitude, _] => Ok(Self {
                magnitude: magnitude.to_string(),
                species: species.to_string(),
                equivalent,
            }),
            [_, unexpected, ..] => Err(UnitParseError::UnexpectedToken {
                token: unexpected.to_string(),
                unit: input.to_string(),
            }),
            [] => Err(UnitParseError::EmptyUnit),
        }
    }

    pub fn magnitude(&self) -> &str {
        &self.magnitude
    }

    /// The emitted species, without any `-equiv` suffix
    pub fn species(&self) -> &str {
        &self.species
    }

    /// Whether the unit is expressed as an equivalent of the species
    pub fn is_equivalent(&self) -> bool {
        self.equivalent
    }
}

impl fmt::Display for EmissionsUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.equivalent { EQUIV_SUFFIX } else { "" };
        write!(
            f,
            "{} {}{}{}",
            self.magnitude, self.species, suffix, PER_YEAR_SUFFIX
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_extraction() {
        let unit = EmissionsUnit::parse("kt C2F6/yr").unwrap();
        assert_eq!(unit.magnitude(), "kt");
        assert_eq!(unit.species(), "C2F6");
        assert!(!unit.is_equivalent());

        let unit = EmissionsUnit::parse("  Mt   CO2-equiv/yr ").unwrap();
        assert_eq!(unit.magnitude(), "Mt");
        assert_eq!(unit.species(), "CO2");
        assert!(unit.is_equivalent());
        assert_eq!(unit.to_string(), "Mt CO2-equiv/yr");
    }

    #[test]
    fn test_unknown_words_still_parse() {
        // Whether "bad" and "units" are known is decided by the registry and table
        let unit = EmissionsUnit::parse("bad units/yr").unwrap();
        assert_eq!(unit.magnitude(), "bad");
        assert_eq!(unit.species(), "units");
    }

    #[test]
    fn test_malformed() {
        assert_eq!(EmissionsUnit::parse(""), Err(UnitParseError::EmptyUnit));
        assert_eq!(EmissionsUnit::parse("   "), Err(UnitParseError::EmptyUnit));
        assert!(matches!(
            EmissionsUnit::parse("kt C2F6"),
            Err(UnitParseError::MissingRate(_))
        ));
        assert!(matches!(
            EmissionsUnit::parse("bad units"),
            Err(UnitParseError::MissingRate(_))
        ));
        assert!(matches!(
            EmissionsUnit::parse("kt /yr"),
            Err(UnitParseError::EmptySpecies(_))
        ));
        assert!(matches!(
            EmissionsUnit::parse("kt -equiv/yr"),
            Err(UnitParseError::EmptySpecies(_))
        ));
        assert!(matches!(
            EmissionsUnit::parse("C2F6/yr"),
            Err(UnitParseError::MissingMagnitude(_))
        ));
        assert_eq!(
            EmissionsUnit::parse("kt of C2F6/yr"),
            Err(UnitParseError::UnexpectedToken {
                token: "of".to_string(),
                unit: "kt of C2F6/yr".to_string()
            })
        );
    }
}
