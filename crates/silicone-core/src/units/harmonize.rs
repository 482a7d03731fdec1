//! Conversion of whole databases to a common CO2-equivalent basis.

use super::conversion_table::ConversionTable;
use super::parser::EmissionsUnit;
use crate::database::TimeseriesDatabase;
use crate::errors::{InfillError, InfillResult};
use crate::timeseries::FloatValue;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Unit of every harmonised timeseries.
pub const MT_CO2_EQUIV_UNIT: &str = "Mt CO2-equiv/yr";

/// Rescale every timeseries in `db` to Mt CO2-equiv/yr.
///
/// Each unit is parsed into its magnitude and species, and values are multiplied by
/// the magnitude (relative to Mt) and the species' factor in `table`.
///
/// # Errors
///
/// - [`InfillError::UnitParse`] if a unit string does not follow the emissions unit grammar
/// - [`InfillError::MissingConversions`] listing every species absent from `table`
/// - [`InfillError::UnknownMagnitude`] if a magnitude is not a mass unit
pub fn convert_units_to_mtco2_equiv(
    db: &TimeseriesDatabase,
    table: &ConversionTable,
) -> InfillResult<TimeseriesDatabase> {
    let mut parsed: Vec<(&str, EmissionsUnit)> = Vec::new();
    for key in db.keys() {
        if parsed.iter().all(|(unit, _)| *unit != key.unit) {
            parsed.push((key.unit.as_str(), EmissionsUnit::parse(&key.unit)?));
        }
    }

    let missing = table.missing_species(parsed.iter().map(|(_, unit)| unit.species()));
    if !missing.is_empty() {
        warn!(missing = ?missing, "Species missing from the conversion table");
        return Err(InfillError::MissingConversions(missing));
    }

    let factors = parsed
        .iter()
        .map(|(unit, parsed_unit)| Ok((*unit, table.factor_for(parsed_unit)?)))
        .collect::<InfillResult<HashMap<&str, FloatValue>>>()?;

    let mut values = db.values().to_owned();
    for (mut row, key) in values.rows_mut().into_iter().zip(db.keys()) {
        let factor = factors[key.unit.as_str()];
        row.mapv_inplace(|v| v * factor);
    }
    let keys = db
        .keys()
        .iter()
        .map(|key| key.relabel(&key.variable, MT_CO2_EQUIV_UNIT))
        .collect();

    debug!(
        n_timeseries = db.len(),
        n_units = parsed.len(),
        "Converted timeseries to Mt CO2-equiv/yr"
    );
    TimeseriesDatabase::from_parts(db.years().to_vec(), keys, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::TimeseriesKey;
    use approx::assert_relative_eq;

    fn hfc_db(leader_unit: &str, follower_unit: &str) -> TimeseriesDatabase {
        TimeseriesDatabase::from_rows(
            vec![2010, 2015],
            vec![
                (
                    TimeseriesKey::new(
                        "model_a",
                        "scen_a",
                        "World",
                        "Emissions|HFC|C5F12",
                        follower_unit,
                    ),
                    vec![2.0, 3.0],
                ),
                (
                    TimeseriesKey::new(
                        "model_a",
                        "scen_a",
                        "World",
                        "Emissions|HFC|C2F6",
                        leader_unit,
                    ),
                    vec![0.5, 1.5],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_convert() {
        let db = hfc_db("kt C2F6/yr", "kt C5F12/yr");
        let converted = convert_units_to_mtco2_equiv(&db, &ConversionTable::default()).unwrap();

        assert_eq!(converted.units(), vec![MT_CO2_EQUIV_UNIT]);
        assert_eq!(converted.variables(), db.variables());
        let values = converted.values();
        assert_relative_eq!(values[[0, 0]], 2.0 * 9.16, max_relative = 1e-12);
        assert_relative_eq!(values[[0, 1]], 3.0 * 9.16, max_relative = 1e-12);
        assert_relative_eq!(values[[1, 0]], 0.5 * 12.2, max_relative = 1e-12);
        assert_relative_eq!(values[[1, 1]], 1.5 * 12.2, max_relative = 1e-12);
    }

    #[test]
    fn test_already_converted_is_unchanged() {
        let db = hfc_db(MT_CO2_EQUIV_UNIT, MT_CO2_EQUIV_UNIT);
        let converted = convert_units_to_mtco2_equiv(&db, &ConversionTable::default()).unwrap();
        assert_eq!(converted, db);
    }

    #[test]
    fn test_missing_species_are_all_reported() {
        let db = hfc_db("bad units/yr", "kt HFC999/yr");
        let res = convert_units_to_mtco2_equiv(&db, &ConversionTable::default());
        match res {
            Err(InfillError::MissingConversions(missing)) => {
                assert_eq!(missing, vec!["HFC999", "units"])
            }
            other => panic!("Unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_error_message() {
        let db = hfc_db("bad units/yr", "kt C5F12/yr");
        let err = convert_units_to_mtco2_equiv(&db, &ConversionTable::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Not all units are found in the conversion table. We lack [\"units\"]"
        );
    }

    #[test]
    fn test_unparseable_unit() {
        let db = hfc_db("bad units", "kt C5F12/yr");
        let res = convert_units_to_mtco2_equiv(&db, &ConversionTable::default());
        assert!(matches!(res, Err(InfillError::UnitParse(_))));
    }

    #[test]
    fn test_custom_table() {
        let mut table = ConversionTable::default();
        table.insert("units", 2.0);
        let db = hfc_db("Mt units/yr", "kt C5F12/yr");
        let converted = convert_units_to_mtco2_equiv(&db, &table).unwrap();
        assert_relative_eq!(converted.values()[[1, 1]], 3.0);
    }
}
