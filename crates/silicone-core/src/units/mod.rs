//! Emissions units and their conversion to a common CO2-equivalent basis.
//!
//! Emissions are reported with units of the form `"<magnitude> <species>/yr"`,
//! for example `"kt C2F6/yr"` or `"Mt CO2-equiv/yr"`. Converting between the
//! emissions of different species requires a CO2-equivalence factor (typically a
//! global warming potential) for each species, supplied by a [`ConversionTable`].
//!
//! # Quick Start
//!
//! ```
//! use silicone_core::units::{ConversionTable, EmissionsUnit};
//!
//! let unit = EmissionsUnit::parse("kt C2F6/yr").unwrap();
//! assert_eq!(unit.species(), "C2F6");
//!
//! // 1 kt C2F6/yr is 12.2 Mt CO2-equiv/yr using AR4 GWP100
//! let table = ConversionTable::default();
//! let factor = table.factor_for(&unit).unwrap();
//! assert!((factor - 12.2).abs() < 1e-9);
//! ```
//!
//! # Module Structure
//!
//! - [`parser`]: unit string grammar
//! - [`registry`]: mass magnitudes (`t`, `kt`, `Mt`, ...)
//! - [`conversion_table`]: species to CO2-equivalence factors
//! - [`harmonize`]: conversion of whole databases to Mt CO2-equiv/yr

pub mod conversion_table;
pub mod harmonize;
pub mod parser;
pub mod registry;

pub use conversion_table::ConversionTable;
pub use harmonize::{convert_units_to_mtco2_equiv, MT_CO2_EQUIV_UNIT};
pub use parser::{EmissionsUnit, UnitParseError};
pub use registry::magnitude_factor;
