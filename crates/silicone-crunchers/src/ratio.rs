//! Time-dependent ratios between a follower and its leaders.
//!
//! For every (model, scenario, region) group present in the reference data the
//! ratio of the follower to the leader aggregate is computed per year:
//!
//! ```text
//! r[g, t] = F[g, t] / L[g, t]
//! ```
//!
//! The groups are then combined into a single ratio per year by taking the
//! arithmetic mean over the `N` groups:
//!
//! ```text
//! r[t] = (r[1, t] + ... + r[N, t]) / N
//! ```
//!
//! A group ratio which cannot be computed (a missing value or a zero leader)
//! leaves the ratio for that year undefined (`NaN`) instead of silently
//! averaging over the remaining groups.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use silicone_core::errors::{InfillError, InfillResult};
use silicone_core::{FloatValue, GroupKey, TimeseriesDatabase, Year};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ratio of follower to leader for each year of the reference data.
///
/// A `NaN` ratio marks a year that is present in the reference data but for
/// which no ratio could be derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSeries {
    years: Vec<Year>,
    ratios: Array1<FloatValue>,
}

impl RatioSeries {
    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn contains_year(&self, year: Year) -> bool {
        self.years.contains(&year)
    }

    /// The ratio for `year`, `None` if the year was not in the reference data
    pub fn get(&self, year: Year) -> Option<FloatValue> {
        self.years
            .iter()
            .position(|y| *y == year)
            .map(|i| self.ratios[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Year, FloatValue)> + '_ {
        self.years.iter().copied().zip(self.ratios.iter().copied())
    }

    /// Years for which the ratio is undefined
    pub fn undefined_years(&self) -> Vec<Year> {
        self.iter()
            .filter(|(_, ratio)| ratio.is_nan())
            .map(|(year, _)| year)
            .collect()
    }
}

/// Derive the ratio of `follower` to `leader_aggregate` for every year.
///
/// Both databases must share the same year columns and contain exactly one
/// timeseries per (model, scenario, region) group, in a common unit.
///
/// # Errors
///
/// - [`InfillError::MismatchedSizes`] if the number of follower and leader timeseries differ
/// - [`InfillError::UnpairedTimeseries`] if a follower group has no leader
pub fn derive_ratio_series(
    follower: &TimeseriesDatabase,
    leader_aggregate: &TimeseriesDatabase,
) -> InfillResult<RatioSeries> {
    if follower.len() != leader_aggregate.len() {
        return Err(InfillError::MismatchedSizes {
            follower: follower.len(),
            leader: leader_aggregate.len(),
        });
    }
    if follower.years() != leader_aggregate.years() {
        return Err(InfillError::Error(format!(
            "The follower and leader data have different timepoints: {:?} and {:?}",
            follower.years(),
            leader_aggregate.years()
        )));
    }

    let leader_rows: HashMap<GroupKey, usize> = leader_aggregate
        .keys()
        .iter()
        .enumerate()
        .map(|(i, key)| (key.group(), i))
        .collect();

    let leader_values = leader_aggregate.values();
    let mut group_ratios = Array2::from_elem(
        (follower.len(), follower.years().len()),
        FloatValue::NAN,
    );
    for ((key, follower_row), mut ratio_row) in follower.rows().zip(group_ratios.rows_mut()) {
        let group = key.group();
        let leader_row = leader_rows
            .get(&group)
            .map(|i| leader_values.row(*i))
            .ok_or_else(|| InfillError::UnpairedTimeseries {
                model: group.model.clone(),
                scenario: group.scenario.clone(),
                region: group.region.clone(),
            })?;

        let ratio = &follower_row / &leader_row;
        ratio_row.assign(&ratio.mapv(|r| if r.is_finite() { r } else { FloatValue::NAN }));
    }

    let ratios = group_ratios
        .mean_axis(Axis(0))
        .ok_or_else(|| InfillError::Error("No timeseries to derive a ratio from".to_string()))?;

    let series = RatioSeries {
        years: follower.years().to_vec(),
        ratios,
    };

    let undefined = series.undefined_years();
    if !undefined.is_empty() {
        warn!(
            years = ?undefined,
            "Ratio is undefined for some years, these will not be infilled"
        );
    }
    debug!(
        n_groups = follower.len(),
        n_years = series.years.len(),
        "Derived time-dependent ratio"
    );

    Ok(series)
}
