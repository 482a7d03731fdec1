use silicone_core::errors::InfillResult;
use silicone_core::TimeseriesDatabase;
use std::fmt::Debug;

/// A relationship derived by a cruncher, ready to be applied to new data.
///
/// Fillers are immutable and may be applied to any number of datasets.
pub trait Filler: Debug + Send + Sync {
    /// Name of the variable this filler produces
    fn variable(&self) -> &str;

    /// Infill `target`, returning only the newly created timeseries.
    ///
    /// `target` is not modified.
    fn fill(&self, target: &TimeseriesDatabase) -> InfillResult<TimeseriesDatabase>;
}

/// Derives relationships between variables from a reference database.
pub trait DatabaseCruncher {
    type Filler: Filler;

    /// The reference database relationships are derived from
    fn database(&self) -> &TimeseriesDatabase;

    /// Derive a filler producing `variable_follower` from `variable_leaders`
    fn derive_relationship(
        &self,
        variable_follower: &str,
        variable_leaders: &[&str],
    ) -> InfillResult<Self::Filler>;
}

/// Apply `filler` to `target` and append the result to a copy of `target`
pub fn infill<F: Filler + ?Sized>(
    target: &TimeseriesDatabase,
    filler: &F,
) -> InfillResult<TimeseriesDatabase> {
    let filled = filler.fill(target)?;
    target.append(&filled)
}
