//! Reconstruction of aggregate variables from their components.
//!
//! Both functions expect a database that has already been harmonised to a
//! common unit, see [`convert_units_to_mtco2_equiv`](silicone_core::units::convert_units_to_mtco2_equiv).

use is_close::is_close;
use ndarray::{Array1, Array2};
use silicone_core::errors::{InfillError, InfillResult};
use silicone_core::units::MT_CO2_EQUIV_UNIT;
use silicone_core::{FloatValue, GroupKey, TimeseriesDatabase, TimeseriesKey};
use std::collections::HashMap;
use tracing::warn;

/// Sum `components` per (model, scenario, region) and year.
///
/// Every group with at least one component gets a row labelled `aggregate_name`.
/// Components missing from a group are left out of that group's sum, while a
/// `NaN` value of a present component makes the sum for that year `NaN`.
pub fn sum_components(
    harmonised: &TimeseriesDatabase,
    aggregate_name: &str,
    components: &[&str],
) -> InfillResult<TimeseriesDatabase> {
    let component_db = harmonised.filter_variables(components);
    let units = component_db.units();
    if units.len() > 1 {
        return Err(InfillError::Error(format!(
            "Components of {aggregate_name} must share a single unit, found {units:?}"
        )));
    }
    let unit = units
        .first()
        .map(String::as_str)
        .unwrap_or(MT_CO2_EQUIV_UNIT);

    let groups = component_db.groups();
    let group_index: HashMap<&GroupKey, usize> =
        groups.iter().enumerate().map(|(i, g)| (g, i)).collect();

    let mut values = Array2::zeros((groups.len(), component_db.years().len()));
    for (key, row) in component_db.rows() {
        let mut total = values.row_mut(group_index[&key.group()]);
        total += &row;
    }

    let keys = groups
        .iter()
        .map(|g| TimeseriesKey::new(&g.model, &g.scenario, &g.region, aggregate_name, unit))
        .collect();
    TimeseriesDatabase::from_parts(component_db.years().to_vec(), keys, values)
}

/// Check that a reported aggregate equals the sum of its components.
///
/// Values are compared with a relative tolerance of `rel_tol`. Years where either
/// the reported or the reconstructed value is missing are not compared. A group
/// reporting the aggregate but none of its components is compared against zero.
///
/// # Errors
///
/// - [`InfillError::NoAggregateData`] if `aggregate_name` is not reported at all
/// - [`InfillError::InconsistentAggregate`] naming the first group and year which
///   is outside of tolerance
pub fn check_aggregate_consistency(
    harmonised: &TimeseriesDatabase,
    aggregate_name: &str,
    components: &[&str],
    rel_tol: FloatValue,
) -> InfillResult<()> {
    let reported = harmonised.filter_variables(&[aggregate_name]).drop_empty_rows();
    if reported.is_empty() {
        return Err(InfillError::NoAggregateData(aggregate_name.to_string()));
    }
    let expected = sum_components(harmonised, aggregate_name, components)?;
    let no_components = Array1::zeros(reported.years().len());

    for (key, reported_row) in reported.rows() {
        let expected_row = match expected.rows().find(|(k, _)| k.group() == key.group()) {
            Some((_, row)) => row,
            None => {
                warn!(
                    variable = %aggregate_name,
                    group = %key.group(),
                    "No components reported for aggregate, comparing against zero"
                );
                no_components.view()
            }
        };

        let pairs = reported_row.iter().zip(expected_row.iter());
        for (year, (reported_value, expected_value)) in reported.years().iter().zip(pairs) {
            if reported_value.is_nan() || expected_value.is_nan() {
                continue;
            }
            if !is_close!(*reported_value, *expected_value, rel_tol = rel_tol) {
                return Err(InfillError::InconsistentAggregate {
                    variable: aggregate_name.to_string(),
                    model: key.model.clone(),
                    scenario: key.scenario.clone(),
                    region: key.region.clone(),
                    year: *year,
                    reported: *reported_value,
                    expected: *expected_value,
                });
            }
        }
    }
    Ok(())
}
