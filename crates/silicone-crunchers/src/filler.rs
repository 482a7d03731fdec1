use crate::cruncher::Filler;
use crate::ratio::RatioSeries;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use silicone_core::errors::{InfillError, InfillResult};
use silicone_core::units::ConversionTable;
use silicone_core::{FloatValue, TimeseriesDatabase, Year};
use tracing::debug;

/// Infills a follower variable as a time-dependent multiple of a leader variable.
///
/// Created by [`GasDecomposeTimeDepRatio`](crate::GasDecomposeTimeDepRatio). The ratio is
/// held in Mt CO2-equiv/yr, leader values are converted to that basis before the
/// ratio is applied and the result is converted back to the follower's unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeDepRatioFiller {
    variable_follower: String,
    follower_unit: String,
    /// Mt CO2-equiv/yr per unit of follower
    follower_factor: FloatValue,
    variable_leader: String,
    ratios: RatioSeries,
    conversions: ConversionTable,
}

impl TimeDepRatioFiller {
    pub(crate) fn new(
        variable_follower: &str,
        follower_unit: &str,
        follower_factor: FloatValue,
        variable_leader: &str,
        ratios: RatioSeries,
        conversions: ConversionTable,
    ) -> Self {
        Self {
            variable_follower: variable_follower.to_string(),
            follower_unit: follower_unit.to_string(),
            follower_factor,
            variable_leader: variable_leader.to_string(),
            ratios,
            conversions,
        }
    }

    pub fn variable_leader(&self) -> &str {
        &self.variable_leader
    }

    /// Unit of the infilled timeseries
    pub fn follower_unit(&self) -> &str {
        &self.follower_unit
    }

    /// The derived ratio of follower to leader, both in Mt CO2-equiv/yr.
    ///
    /// This is not the ratio in the native units of the two gases. For a follower
    /// reported in kt C5F12/yr and a leader in kt C2F6/yr, a native ratio of 4
    /// is held as `4 * 9160 / 12200` with the AR4 GWP100 factors.
    pub fn ratios(&self) -> &RatioSeries {
        &self.ratios
    }
}

impl Filler for TimeDepRatioFiller {
    fn variable(&self) -> &str {
        &self.variable_follower
    }

    /// Infill the follower for every timeseries of the leader in `target`.
    ///
    /// The result has one row per leader timeseries, labelled with the follower's
    /// variable and unit. Values which cannot be computed are dropped: years with
    /// an undefined ratio or a missing leader value are `NaN`, and rows or years
    /// with no value at all are removed.
    ///
    /// # Errors
    ///
    /// - [`InfillError::NoTargetLeaderData`] if `target` has no data for the leader
    /// - [`InfillError::MultipleLeaderUnits`] if the leader is reported in more than one unit
    /// - [`InfillError::MissingTimepoints`] if `target` has a year the ratio was not derived for
    fn fill(&self, target: &TimeseriesDatabase) -> InfillResult<TimeseriesDatabase> {
        let lead = target
            .filter_variables(&[&self.variable_leader])
            .drop_empty_years();
        if lead.is_empty() {
            return Err(InfillError::NoTargetLeaderData(self.variable_leader.clone()));
        }

        let units = lead.units();
        let [unit] = units.as_slice() else {
            return Err(InfillError::MultipleLeaderUnits {
                variable: self.variable_leader.clone(),
                units: units.clone(),
            });
        };

        let missing: Vec<Year> = lead
            .years()
            .iter()
            .filter(|year| !self.ratios.contains_year(**year))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(InfillError::MissingTimepoints {
                variable: self.variable_leader.clone(),
                years: missing,
            });
        }

        let scale = self.conversions.factor_for_str(unit)? / self.follower_factor;
        let ratios: Array1<FloatValue> = lead
            .years()
            .iter()
            .map(|year| self.ratios.get(*year).unwrap_or(FloatValue::NAN))
            .collect();

        let mut values = lead.values().to_owned();
        for mut row in values.rows_mut() {
            row.zip_mut_with(&ratios, |value, ratio| {
                let filled = *value * scale * ratio;
                *value = if filled.is_finite() {
                    filled
                } else {
                    FloatValue::NAN
                };
            });
        }
        let keys = lead
            .keys()
            .iter()
            .map(|key| key.relabel(&self.variable_follower, &self.follower_unit))
            .collect();

        let filled = TimeseriesDatabase::from_parts(lead.years().to_vec(), keys, values)?
            .drop_empty_rows()
            .drop_empty_years();
        debug!(
            follower = %self.variable_follower,
            leader = %self.variable_leader,
            n_timeseries = filled.len(),
            "Infilled follower from leader"
        );
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cruncher::DatabaseCruncher;
    use crate::GasDecomposeTimeDepRatio;
    use silicone_core::TimeseriesKey;

    const LEADER: &str = "Emissions|HFC|C2F6";
    const FOLLOWER: &str = "Emissions|HFC|C5F12";

    fn filler() -> TimeDepRatioFiller {
        let reference = TimeseriesDatabase::from_rows(
            vec![2010, 2015],
            vec![
                (
                    TimeseriesKey::new("model_a", "scen_a", "World", FOLLOWER, "kt C5F12/yr"),
                    vec![2.0, 3.0],
                ),
                (
                    TimeseriesKey::new("model_a", "scen_a", "World", LEADER, "kt C2F6/yr"),
                    vec![0.5, 1.5],
                ),
            ],
        )
        .unwrap();
        GasDecomposeTimeDepRatio::new(reference)
            .derive_relationship(FOLLOWER, &[LEADER])
            .unwrap()
    }

    #[test]
    fn serialise_filler() {
        let filler = filler();
        // Every year has a defined ratio, NaN is not representable in JSON
        assert!(filler.ratios().undefined_years().is_empty());

        let serialised = serde_json::to_string(&filler).unwrap();
        let deserialised: TimeDepRatioFiller = serde_json::from_str(&serialised).unwrap();

        assert_eq!(deserialised.variable(), FOLLOWER);
        assert_eq!(deserialised.variable_leader(), LEADER);
        assert_eq!(deserialised.follower_unit(), "kt C5F12/yr");
        assert_eq!(deserialised.ratios(), filler.ratios());

        let target = TimeseriesDatabase::from_rows(
            vec![2010, 2015],
            vec![(
                TimeseriesKey::new("model_b", "scen_b", "World", LEADER, "kt C2F6/yr"),
                vec![1.0, 2.0],
            )],
        )
        .unwrap();
        assert_eq!(
            deserialised.fill(&target).unwrap(),
            filler.fill(&target).unwrap()
        );
    }
}
