//! Infilling of missing emissions timeseries.
//!
//! A scenario often reports only a subset of the emissions a climate model needs.
//! The crunchers in this crate derive a relationship between a *follower* variable
//! and one or more *leader* variables from a reference database of complete
//! scenarios, and use it to infill the follower wherever the leader is known.
//!
//! ```
//! use silicone::prelude::*;
//!
//! let reference = TimeseriesDatabase::from_rows(
//!     vec![2010, 2015],
//!     vec![
//!         (
//!             TimeseriesKey::new("model_a", "scen_a", "World", "Emissions|HFC|C5F12", "kt C5F12/yr"),
//!             vec![2.0, 3.0],
//!         ),
//!         (
//!             TimeseriesKey::new("model_a", "scen_a", "World", "Emissions|HFC|C2F6", "kt C2F6/yr"),
//!             vec![0.5, 1.5],
//!         ),
//!     ],
//! )?;
//! let cruncher = GasDecomposeTimeDepRatio::new(reference);
//! let filler = cruncher.derive_relationship("Emissions|HFC|C5F12", &["Emissions|HFC|C2F6"])?;
//!
//! let target = TimeseriesDatabase::from_rows(
//!     vec![2010, 2015],
//!     vec![(
//!         TimeseriesKey::new("model_b", "scen_b", "World", "Emissions|HFC|C2F6", "kt C2F6/yr"),
//!         vec![1.0, 1.0],
//!     )],
//! )?;
//! let infilled = infill(&target, &filler)?;
//! assert_eq!(infilled.len(), 2);
//! # Ok::<(), InfillError>(())
//! ```

pub use silicone_core;
pub use silicone_crunchers;

pub mod prelude {
    pub use silicone_core::units::{convert_units_to_mtco2_equiv, ConversionTable};
    pub use silicone_core::{InfillError, InfillResult, TimeseriesDatabase, TimeseriesKey};
    pub use silicone_crunchers::{infill, DatabaseCruncher, Filler, GasDecomposeTimeDepRatio};
}
