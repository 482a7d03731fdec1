//! Time-dependent ratio cruncher
//!
//! Infills a follower gas from a leader gas which it historically moves together with,
//! for example two HFCs that are co-emitted or regulated together. The relationship is
//! a ratio per year derived from all scenarios of the reference database.

use crate::consistency::{check_aggregate_consistency, sum_components};
use crate::cruncher::DatabaseCruncher;
use crate::filler::TimeDepRatioFiller;
use crate::ratio::derive_ratio_series;
use silicone_core::errors::{InfillError, InfillResult};
use silicone_core::units::{convert_units_to_mtco2_equiv, ConversionTable};
use silicone_core::{FloatValue, TimeseriesDatabase};
use tracing::debug;

/// Derives a time-dependent ratio between a follower and a single leader variable.
///
/// All values are harmonised to Mt CO2-equiv/yr before the ratio is derived, so the
/// leader may be reported in a different magnitude (e.g. `Mt` instead of `kt`)
/// in the data to infill than in the reference database.
///
/// When the reference database holds several scenarios the ratio for each year is
/// the mean of the per-scenario ratios.
#[derive(Debug, Clone)]
pub struct GasDecomposeTimeDepRatio {
    db: TimeseriesDatabase,
    conversions: ConversionTable,
}

impl GasDecomposeTimeDepRatio {
    /// Create a cruncher using AR4 GWP100 CO2-equivalence factors
    pub fn new(db: TimeseriesDatabase) -> Self {
        Self::with_conversion_table(db, ConversionTable::default())
    }

    pub fn with_conversion_table(db: TimeseriesDatabase, conversions: ConversionTable) -> Self {
        Self { db, conversions }
    }

    pub fn conversion_table(&self) -> &ConversionTable {
        &self.conversions
    }

    /// Build an aggregate as the sum of `components` in Mt CO2-equiv/yr.
    ///
    /// Returns a new database holding one `aggregate_name` timeseries per
    /// (model, scenario, region) reporting any of the components. The reference
    /// database is not modified.
    ///
    /// # Errors
    ///
    /// - [`InfillError::AggregateExists`] if `aggregate_name` is already a variable in the database
    /// - any error from converting the components to Mt CO2-equiv/yr
    pub fn construct_consistent_values(
        &self,
        aggregate_name: &str,
        components: &[&str],
    ) -> InfillResult<TimeseriesDatabase> {
        if self.db.variables().iter().any(|v| v == aggregate_name) {
            return Err(InfillError::AggregateExists(aggregate_name.to_string()));
        }
        let harmonised =
            convert_units_to_mtco2_equiv(&self.db.filter_variables(components), &self.conversions)?;
        sum_components(&harmonised, aggregate_name, components)
    }

    /// Check that `aggregate_name` equals the sum of `components` in every scenario.
    ///
    /// # Errors
    ///
    /// - [`InfillError::NoAggregateData`] if `aggregate_name` is not in the database
    /// - [`InfillError::InconsistentAggregate`] if a group differs from its components by more than `rel_tol`
    pub fn check_aggregate_consistency(
        &self,
        aggregate_name: &str,
        components: &[&str],
        rel_tol: FloatValue,
    ) -> InfillResult<()> {
        let mut variables = components.to_vec();
        variables.push(aggregate_name);
        let harmonised =
            convert_units_to_mtco2_equiv(&self.db.filter_variables(&variables), &self.conversions)?;
        check_aggregate_consistency(&harmonised, aggregate_name, components, rel_tol)
    }
}

impl DatabaseCruncher for GasDecomposeTimeDepRatio {
    type Filler = TimeDepRatioFiller;

    fn database(&self) -> &TimeseriesDatabase {
        &self.db
    }

    /// Derive the follower as a time-dependent multiple of the leader.
    ///
    /// # Errors
    ///
    /// - [`InfillError::NoLeaders`] or [`InfillError::MultipleLeaders`] unless exactly one leader is given
    /// - [`InfillError::NoLeaderData`] or [`InfillError::NoFollowerData`] if either is absent from the database
    /// - [`InfillError::MultipleFollowerUnits`] if the follower is reported in several units
    /// - [`InfillError::MissingConversions`] if a unit's species has no CO2-equivalence factor
    /// - [`InfillError::MismatchedSizes`] if the leader and follower are not reported by the same scenarios
    fn derive_relationship(
        &self,
        variable_follower: &str,
        variable_leaders: &[&str],
    ) -> InfillResult<TimeDepRatioFiller> {
        let variable_leader = match variable_leaders {
            [] => return Err(InfillError::NoLeaders),
            [leader] => *leader,
            _ => {
                return Err(InfillError::MultipleLeaders(
                    variable_leaders.iter().map(|v| v.to_string()).collect(),
                ))
            }
        };

        if self.db.filter_variables(&[variable_leader]).is_empty() {
            return Err(InfillError::NoLeaderData(vec![variable_leader.to_string()]));
        }
        let follower_units = self.db.filter_variables(&[variable_follower]).units();
        let follower_unit = match follower_units.as_slice() {
            [] => return Err(InfillError::NoFollowerData(variable_follower.to_string())),
            [unit] => unit.clone(),
            _ => {
                return Err(InfillError::MultipleFollowerUnits {
                    variable: variable_follower.to_string(),
                    units: follower_units.clone(),
                })
            }
        };

        let relevant = self
            .db
            .filter_variables(&[variable_leader, variable_follower])
            .drop_empty_years();
        let harmonised = convert_units_to_mtco2_equiv(&relevant, &self.conversions)?;

        let leader_aggregate = sum_components(&harmonised, variable_leader, variable_leaders)?;
        let follower = harmonised.filter_variables(&[variable_follower]);
        let ratios = derive_ratio_series(&follower, &leader_aggregate)?;

        let follower_factor = self.conversions.factor_for_str(&follower_unit)?;
        debug!(
            follower = %variable_follower,
            leader = %variable_leader,
            years = ?ratios.years(),
            "Derived relationship"
        );

        Ok(TimeDepRatioFiller::new(
            variable_follower,
            &follower_unit,
            follower_factor,
            variable_leader,
            ratios,
            self.conversions.clone(),
        ))
    }
}
