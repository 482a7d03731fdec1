//! CO2-equivalence factors per emitted species.
//!
//! The default table holds the 100-year global warming potentials of the IPCC
//! Fourth Assessment Report (AR4 GWP100). A different metric can be loaded from
//! TOML:
//!
//! ```toml
//! [factors]
//! C2F6 = 12200.0
//! C5F12 = 9160.0
//! ```

use super::parser::EmissionsUnit;
use super::registry::magnitude_factor;
use crate::errors::{InfillError, InfillResult};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Molecular weight ratio CO2/C = 44/12.
pub const CO2_TO_C_RATIO: f64 = 44.0 / 12.0;

/// AR4 GWP100 values
/// unit: kg CO2 per kg of species
const AR4_GWP100: &[(&str, FloatValue)] = &[
    ("CO2", 1.0),
    ("C", CO2_TO_C_RATIO),
    ("CH4", 25.0),
    ("N2O", 298.0),
    // HFCs
    ("HFC23", 14800.0),
    ("HFC32", 675.0),
    ("HFC125", 3500.0),
    ("HFC134a", 1430.0),
    ("HFC143a", 4470.0),
    ("HFC152a", 124.0),
    ("HFC227ea", 3220.0),
    ("HFC236fa", 9810.0),
    ("HFC245fa", 1030.0),
    ("HFC365mfc", 794.0),
    ("HFC4310mee", 1640.0),
    // PFCs
    ("CF4", 7390.0),
    ("C2F6", 12200.0),
    ("C3F8", 8830.0),
    ("C4F10", 8860.0),
    ("C5F12", 9160.0),
    ("C6F14", 9300.0),
    ("cC4F8", 10300.0),
    // Others
    ("SF6", 22800.0),
    ("NF3", 17200.0),
];

/// Mapping from species to its CO2-equivalence factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionTable {
    /// Mass of CO2 equivalent to a unit mass of each species
    pub factors: BTreeMap<String, FloatValue>,
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::ar4_gwp100()
    }
}

impl ConversionTable {
    pub fn new(factors: BTreeMap<String, FloatValue>) -> Self {
        Self { factors }
    }

    /// The IPCC AR4 100-year global warming potentials
    pub fn ar4_gwp100() -> Self {
        Self::new(
            AR4_GWP100
                .iter()
                .map(|(species, gwp)| (species.to_string(), *gwp))
                .collect(),
        )
    }

    pub fn from_toml_str(contents: &str) -> InfillResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> InfillResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn get(&self, species: &str) -> Option<FloatValue> {
        self.factors.get(species).copied()
    }

    pub fn contains(&self, species: &str) -> bool {
        self.factors.contains_key(species)
    }

    /// Add or replace the factor for a species
    pub fn insert(&mut self, species: impl Into<String>, factor: FloatValue) {
        self.factors.insert(species.into(), factor);
    }

    /// Species without a factor, deduplicated, in order of first appearance
    pub fn missing_species<'a, I>(&self, species: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        species
            .into_iter()
            .filter(|s| !self.contains(s))
            .filter(|s| seen.insert(*s))
            .map(str::to_string)
            .collect()
    }

    /// Multiplier converting a value in `unit` to Mt CO2-equiv/yr
    pub fn factor_for(&self, unit: &EmissionsUnit) -> InfillResult<FloatValue> {
        let species_factor = self
            .get(unit.species())
            .ok_or_else(|| InfillError::MissingConversions(vec![unit.species().to_string()]))?;
        let magnitude = magnitude_factor(unit.magnitude()).ok_or_else(|| {
            InfillError::UnknownMagnitude {
                magnitude: unit.magnitude().to_string(),
                unit: unit.to_string(),
            }
        })?;
        Ok(magnitude * species_factor)
    }

    /// Parse `unit` and return the multiplier converting it to Mt CO2-equiv/yr
    pub fn factor_for_str(&self, unit: &str) -> InfillResult<FloatValue> {
        self.factor_for(&EmissionsUnit::parse(unit)?)
    }
}
