//! In-memory timeseries database.
//!
//! Data is stored in "wide" format: every row is identified by a [`TimeseriesKey`]
//! (model, scenario, region, variable and unit) and holds one value per year column.
//! Missing observations are stored as `NaN` and are skipped when iterating over
//! the data in "long" format via [`TimeseriesDatabase::long_data`].
//!
//! All filtering operations return a new database, the source is never mutated.
//!
//! # Invariants
//!
//! - year columns are unique and strictly increasing
//! - every row has exactly one value per year column
//! - a (model, scenario, region, variable) combination appears at most once,
//!   so each variable has exactly one unit within a scenario

use crate::errors::{InfillError, InfillResult};
use crate::timeseries::{FloatValue, Year};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Identifier of a single timeseries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeseriesKey {
    pub model: String,
    pub scenario: String,
    pub region: String,
    pub variable: String,
    pub unit: String,
}

impl TimeseriesKey {
    pub fn new(
        model: impl Into<String>,
        scenario: impl Into<String>,
        region: impl Into<String>,
        variable: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            scenario: scenario.into(),
            region: region.into(),
            variable: variable.into(),
            unit: unit.into(),
        }
    }

    /// The (model, scenario, region) group this timeseries belongs to
    pub fn group(&self) -> GroupKey {
        GroupKey {
            model: self.model.clone(),
            scenario: self.scenario.clone(),
            region: self.region.clone(),
        }
    }

    /// A copy of this key describing a different variable in the same group
    pub fn relabel(&self, variable: &str, unit: &str) -> Self {
        Self {
            variable: variable.to_string(),
            unit: unit.to_string(),
            ..self.clone()
        }
    }
}

/// A (model, scenario, region) combination.
///
/// Leader and follower timeseries are paired by group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey {
    pub model: String,
    pub scenario: String,
    pub region: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model={}, scenario={}, region={}",
            self.model, self.scenario, self.region
        )
    }
}

/// Typed row selection for a [`TimeseriesDatabase`].
///
/// Each field is optional; an unset field matches everything. When several
/// fields are set a row must match all of them. [`DatabaseFilter::exclude`]
/// inverts the selection, keeping every row that would otherwise be dropped.
///
/// ```
/// use silicone_core::DatabaseFilter;
///
/// let filter = DatabaseFilter::new()
///     .models(["model_a"])
///     .variables(["Emissions|HFC|C2F6"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatabaseFilter {
    models: Option<Vec<String>>,
    scenarios: Option<Vec<String>>,
    regions: Option<Vec<String>>,
    variables: Option<Vec<String>>,
    units: Option<Vec<String>>,
    exclude: bool,
}

fn collect_strings<I, S>(values: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(values.into_iter().map(Into::into).collect())
}

fn field_matches(allowed: &Option<Vec<String>>, value: &str) -> bool {
    allowed
        .as_ref()
        .map_or(true, |allowed| allowed.iter().any(|x| x == value))
}

impl DatabaseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn models<I: IntoIterator<Item = S>, S: Into<String>>(mut self, models: I) -> Self {
        self.models = collect_strings(models);
        self
    }

    pub fn scenarios<I: IntoIterator<Item = S>, S: Into<String>>(mut self, scenarios: I) -> Self {
        self.scenarios = collect_strings(scenarios);
        self
    }

    pub fn regions<I: IntoIterator<Item = S>, S: Into<String>>(mut self, regions: I) -> Self {
        self.regions = collect_strings(regions);
        self
    }

    pub fn variables<I: IntoIterator<Item = S>, S: Into<String>>(mut self, variables: I) -> Self {
        self.variables = collect_strings(variables);
        self
    }

    pub fn units<I: IntoIterator<Item = S>, S: Into<String>>(mut self, units: I) -> Self {
        self.units = collect_strings(units);
        self
    }

    /// Invert the selection
    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// Whether a row with the given key is kept by this filter
    pub fn matches(&self, key: &TimeseriesKey) -> bool {
        let selected = field_matches(&self.models, &key.model)
            && field_matches(&self.scenarios, &key.scenario)
            && field_matches(&self.regions, &key.region)
            && field_matches(&self.variables, &key.variable)
            && field_matches(&self.units, &key.unit);
        selected != self.exclude
    }
}

/// A collection of emissions timeseries sharing a common set of year columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesDatabase {
    years: Vec<Year>,
    keys: Vec<TimeseriesKey>,
    values: Array2<FloatValue>,
}

fn validate_years(years: &[Year]) -> InfillResult<()> {
    if years.windows(2).any(|w| w[0] >= w[1]) {
        return Err(InfillError::InvalidYears(years.to_vec()));
    }
    Ok(())
}

fn validate_unique(keys: &[TimeseriesKey]) -> InfillResult<()> {
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert((&key.model, &key.scenario, &key.region, &key.variable)) {
            return Err(InfillError::DuplicateTimeseries {
                model: key.model.clone(),
                scenario: key.scenario.clone(),
                region: key.region.clone(),
                variable: key.variable.clone(),
            });
        }
    }
    Ok(())
}

impl TimeseriesDatabase {
    /// Create an empty database with the given year columns
    pub fn new(years: Vec<Year>) -> InfillResult<Self> {
        validate_years(&years)?;
        let n_years = years.len();
        Ok(Self {
            years,
            keys: Vec::new(),
            values: Array2::from_elem((0, n_years), FloatValue::NAN),
        })
    }

    /// Create a database from its parts, checking all invariants
    pub fn from_parts(
        years: Vec<Year>,
        keys: Vec<TimeseriesKey>,
        values: Array2<FloatValue>,
    ) -> InfillResult<Self> {
        validate_years(&years)?;
        if values.nrows() != keys.len() || values.ncols() != years.len() {
            return Err(InfillError::Error(format!(
                "Values have shape {:?} but there are {} keys and {} years",
                values.shape(),
                keys.len(),
                years.len()
            )));
        }
        validate_unique(&keys)?;
        Ok(Self {
            years,
            keys,
            values,
        })
    }

    /// Create a database from wide-format rows.
    ///
    /// Every row must contain one value per year.
    pub fn from_rows<I>(years: Vec<Year>, rows: I) -> InfillResult<Self>
    where
        I: IntoIterator<Item = (TimeseriesKey, Vec<FloatValue>)>,
    {
        let mut keys = Vec::new();
        let mut flat = Vec::new();
        for (key, row) in rows {
            if row.len() != years.len() {
                return Err(InfillError::RowLength {
                    variable: key.variable,
                    got: row.len(),
                    expected: years.len(),
                });
            }
            keys.push(key);
            flat.extend(row);
        }
        let values = Array2::from_shape_vec((keys.len(), years.len()), flat)
            .map_err(|e| InfillError::Error(e.to_string()))?;
        Self::from_parts(years, keys, values)
    }

    /// Create a database from long-format `(key, year, value)` points.
    ///
    /// The year columns are the union of all years present. Rows keep the order
    /// in which their keys first appear and cells without a point are `NaN`.
    pub fn from_long<I>(points: I) -> InfillResult<Self>
    where
        I: IntoIterator<Item = (TimeseriesKey, Year, FloatValue)>,
    {
        let mut keys: Vec<TimeseriesKey> = Vec::new();
        let mut key_index: HashMap<TimeseriesKey, usize> = HashMap::new();
        let mut years = BTreeSet::new();
        let mut cells: HashMap<(usize, Year), FloatValue> = HashMap::new();

        for (key, year, value) in points {
            let row = *key_index.entry(key.clone()).or_insert_with(|| {
                keys.push(key.clone());
                keys.len() - 1
            });
            if cells.insert((row, year), value).is_some() {
                return Err(InfillError::DuplicateTimeseries {
                    model: key.model,
                    scenario: key.scenario,
                    region: key.region,
                    variable: key.variable,
                });
            }
            years.insert(year);
        }

        let years: Vec<Year> = years.into_iter().collect();
        let values = Array2::from_shape_fn((keys.len(), years.len()), |(i, j)| {
            cells
                .get(&(i, years[j]))
                .copied()
                .unwrap_or(FloatValue::NAN)
        });
        Self::from_parts(years, keys, values)
    }

    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn keys(&self) -> &[TimeseriesKey] {
        &self.keys
    }

    pub fn values(&self) -> ArrayView2<'_, FloatValue> {
        self.values.view()
    }

    /// Number of timeseries (rows)
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over the rows in wide format
    pub fn rows(&self) -> impl Iterator<Item = (&TimeseriesKey, ArrayView1<'_, FloatValue>)> {
        self.keys.iter().zip(self.values.rows())
    }

    /// All defined values in long format, row by row
    pub fn long_data(&self) -> Vec<(&TimeseriesKey, Year, FloatValue)> {
        self.rows()
            .flat_map(|(key, row)| {
                self.years
                    .iter()
                    .zip(row.iter())
                    .filter(|(_, value)| !value.is_nan())
                    .map(|(year, value)| (key, *year, *value))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Look up a single value, `None` if the row or year is absent or the value is `NaN`
    pub fn get(&self, key: &TimeseriesKey, year: Year) -> Option<FloatValue> {
        let row = self.keys.iter().position(|k| k == key)?;
        let col = self.years.iter().position(|y| *y == year)?;
        let value = self.values[[row, col]];
        (!value.is_nan()).then_some(value)
    }

    /// Sorted, unique variable names
    pub fn variables(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|k| k.variable.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, unique units
    pub fn units(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|k| k.unit.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted, unique units used by a variable
    pub fn units_for(&self, variable: &str) -> Vec<String> {
        self.keys
            .iter()
            .filter(|k| k.variable == variable)
            .map(|k| k.unit.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Unique (model, scenario, region) groups in order of first appearance
    pub fn groups(&self) -> Vec<GroupKey> {
        let mut seen = HashSet::new();
        self.keys
            .iter()
            .map(TimeseriesKey::group)
            .filter(|g| seen.insert(g.clone()))
            .collect()
    }

    fn select_rows(&self, rows: &[usize]) -> Self {
        Self {
            years: self.years.clone(),
            keys: rows.iter().map(|i| self.keys[*i].clone()).collect(),
            values: self.values.select(Axis(0), rows),
        }
    }

    fn select_years(&self, cols: &[usize]) -> Self {
        Self {
            years: cols.iter().map(|j| self.years[*j]).collect(),
            keys: self.keys.clone(),
            values: self.values.select(Axis(1), cols),
        }
    }

    /// Rows matching `filter`
    pub fn filter(&self, filter: &DatabaseFilter) -> Self {
        let rows: Vec<usize> = (0..self.len())
            .filter(|i| filter.matches(&self.keys[*i]))
            .collect();
        self.select_rows(&rows)
    }

    pub fn filter_variables<S: AsRef<str>>(&self, variables: &[S]) -> Self {
        self.filter(&DatabaseFilter::new().variables(variables.iter().map(|v| v.as_ref())))
    }

    pub fn exclude_variables<S: AsRef<str>>(&self, variables: &[S]) -> Self {
        self.filter(
            &DatabaseFilter::new()
                .variables(variables.iter().map(|v| v.as_ref()))
                .exclude(),
        )
    }

    pub fn filter_models<S: AsRef<str>>(&self, models: &[S]) -> Self {
        self.filter(&DatabaseFilter::new().models(models.iter().map(|m| m.as_ref())))
    }

    /// Keep only the given year columns
    pub fn filter_years(&self, years: &[Year]) -> Self {
        let cols: Vec<usize> = self
            .years
            .iter()
            .enumerate()
            .filter(|(_, y)| years.contains(y))
            .map(|(j, _)| j)
            .collect();
        self.select_years(&cols)
    }

    /// Drop year columns without any defined value
    pub fn drop_empty_years(&self) -> Self {
        let cols: Vec<usize> = self
            .values
            .columns()
            .into_iter()
            .enumerate()
            .filter(|(_, col)| col.iter().any(|v| !v.is_nan()))
            .map(|(j, _)| j)
            .collect();
        self.select_years(&cols)
    }

    /// Drop rows without any defined value
    pub fn drop_empty_rows(&self) -> Self {
        let rows: Vec<usize> = self
            .values
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|v| !v.is_nan()))
            .map(|(i, _)| i)
            .collect();
        self.select_rows(&rows)
    }

    /// Combine two databases.
    ///
    /// The result spans the union of both sets of years, cells absent from
    /// either input are `NaN`. Fails if a timeseries is present in both.
    pub fn append(&self, other: &Self) -> InfillResult<Self> {
        let years: Vec<Year> = self
            .years
            .iter()
            .chain(other.years.iter())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut values = Array2::from_elem((self.len() + other.len(), years.len()), FloatValue::NAN);
        for (offset, source) in [(0, self), (self.len(), other)] {
            for (j, year) in source.years.iter().enumerate() {
                let col = years
                    .binary_search(year)
                    .map_err(|_| InfillError::Error(format!("Year {year} lost on append")))?;
                for i in 0..source.len() {
                    values[[offset + i, col]] = source.values[[i, j]];
                }
            }
        }

        let keys = self.keys.iter().chain(other.keys.iter()).cloned().collect();
        Self::from_parts(years, keys, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn key(scenario: &str, variable: &str, unit: &str) -> TimeseriesKey {
        TimeseriesKey::new("model_a", scenario, "World", variable, unit)
    }

    fn example() -> TimeseriesDatabase {
        TimeseriesDatabase::from_rows(
            vec![2010, 2015, 2020],
            vec![
                (
                    key("scen_a", "Emissions|HFC|C5F12", "kt C5F12/yr"),
                    vec![2.0, 3.0, FloatValue::NAN],
                ),
                (
                    key("scen_a", "Emissions|HFC|C2F6", "kt C2F6/yr"),
                    vec![0.5, 1.5, FloatValue::NAN],
                ),
                (
                    key("scen_b", "Emissions|HFC|C2F6", "kt C2F6/yr"),
                    vec![1.0, FloatValue::NAN, FloatValue::NAN],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn from_rows() {
        let db = example();
        assert_eq!(db.len(), 3);
        assert_eq!(db.years(), &[2010, 2015, 2020]);
        assert_eq!(
            db.variables(),
            vec!["Emissions|HFC|C2F6", "Emissions|HFC|C5F12"]
        );
        assert_eq!(db.units_for("Emissions|HFC|C2F6"), vec!["kt C2F6/yr"]);
        assert!(is_close!(
            db.get(&key("scen_a", "Emissions|HFC|C2F6", "kt C2F6/yr"), 2015)
                .unwrap(),
            1.5
        ));
        assert!(db
            .get(&key("scen_b", "Emissions|HFC|C2F6", "kt C2F6/yr"), 2015)
            .is_none());
    }

    #[test]
    fn duplicate_variable_with_other_unit() {
        let res = TimeseriesDatabase::from_rows(
            vec![2010],
            vec![
                (key("scen_a", "Emissions|CO2", "Mt CO2/yr"), vec![1.0]),
                (key("scen_a", "Emissions|CO2", "Gt CO2/yr"), vec![1.0]),
            ],
        );
        assert!(matches!(
            res,
            Err(InfillError::DuplicateTimeseries { .. })
        ));
    }

    #[test]
    fn unsorted_years() {
        let res = TimeseriesDatabase::new(vec![2015, 2010]);
        assert!(matches!(res, Err(InfillError::InvalidYears(_))));
    }

    #[test]
    fn row_length() {
        let res = TimeseriesDatabase::from_rows(
            vec![2010, 2015],
            vec![(key("scen_a", "Emissions|CO2", "Mt CO2/yr"), vec![1.0])],
        );
        assert!(matches!(
            res,
            Err(InfillError::RowLength {
                got: 1,
                expected: 2,
                ..
            })
        ));
    }

    #[test]
    fn from_long_fills_missing() {
        let db = TimeseriesDatabase::from_long(vec![
            (key("scen_a", "Emissions|CO2", "Mt CO2/yr"), 2015, 2.0),
            (key("scen_b", "Emissions|CO2", "Mt CO2/yr"), 2010, 1.0),
        ])
        .unwrap();

        assert_eq!(db.years(), &[2010, 2015]);
        assert_eq!(db.keys()[0].scenario, "scen_a");
        assert!(db.values()[[0, 0]].is_nan());
        assert_eq!(db.long_data().len(), 2);
    }

    #[test]
    fn from_long_duplicate_point() {
        let res = TimeseriesDatabase::from_long(vec![
            (key("scen_a", "Emissions|CO2", "Mt CO2/yr"), 2015, 2.0),
            (key("scen_a", "Emissions|CO2", "Mt CO2/yr"), 2015, 3.0),
        ]);
        assert!(matches!(
            res,
            Err(InfillError::DuplicateTimeseries { .. })
        ));
    }

    #[test]
    fn filtering() {
        let db = example();

        let leaders = db.filter_variables(&["Emissions|HFC|C2F6"]);
        assert_eq!(leaders.len(), 2);

        let others = db.exclude_variables(&["Emissions|HFC|C2F6"]);
        assert_eq!(others.len(), 1);
        assert_eq!(others.keys()[0].variable, "Emissions|HFC|C5F12");

        let scen_b = db.filter(&DatabaseFilter::new().scenarios(["scen_b"]));
        assert_eq!(scen_b.len(), 1);

        let none = db.filter_models(&["model_b"]);
        assert!(none.is_empty());
        assert_eq!(none.years().len(), 3);

        // The source database is untouched
        assert_eq!(db.len(), 3);
    }

    #[test]
    fn dropping_empty() {
        let db = example();
        assert_eq!(db.drop_empty_years().years(), &[2010, 2015]);

        let db = db.filter_years(&[2015, 2020]);
        assert_eq!(db.years(), &[2015, 2020]);
        let db = db.drop_empty_rows();
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn groups_in_order() {
        let groups = example().groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].scenario, "scen_a");
        assert_eq!(groups[1].scenario, "scen_b");
    }

    #[test]
    fn appending() {
        let db = example();
        let extra = TimeseriesDatabase::from_rows(
            vec![2020, 2030],
            vec![(key("scen_b", "Emissions|HFC|C5F12", "kt C5F12/yr"), vec![4.0, 5.0])],
        )
        .unwrap();

        let combined = db.append(&extra).unwrap();
        assert_eq!(combined.years(), &[2010, 2015, 2020, 2030]);
        assert_eq!(combined.len(), 4);
        assert!(is_close!(
            combined
                .get(&key("scen_b", "Emissions|HFC|C5F12", "kt C5F12/yr"), 2030)
                .unwrap(),
            5.0
        ));
        assert!(combined
            .get(&key("scen_a", "Emissions|HFC|C2F6", "kt C2F6/yr"), 2030)
            .is_none());

        assert!(matches!(
            combined.append(&extra),
            Err(InfillError::DuplicateTimeseries { .. })
        ));
    }

    #[test]
    fn serialises() {
        // NaN is not representable in JSON
        let db = example().filter_years(&[2010]);
        let serialised = serde_json::to_string(&db).unwrap();
        let deserialised: TimeseriesDatabase = serde_json::from_str(&serialised).unwrap();
        assert_eq!(db, deserialised);
    }
}
