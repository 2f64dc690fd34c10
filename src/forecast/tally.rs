use crate::forecast::aggregate::{AggregateConfig, aggregate};
use crate::forecast::unit::UnitResult;
use crate::forecast::weights::BiasWeightTable;
use crate::models::{CandidateAggregate, GeographicUnit, PollRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTally {
    pub totals: BTreeMap<String, u32>,
    pub units: Vec<UnitResult>,
}

impl ForecastTally {
    pub fn total_for(&self, candidate: &str) -> u32 {
        self.totals.get(candidate).copied().unwrap_or(0)
    }

    // Sum of every unit's allocation.
    pub fn allocated(&self) -> u32 {
        self.totals.values().sum()
    }

    pub fn leader(&self) -> Option<(&str, u32)> {
        self.totals
            .iter()
            .max_by_key(|(_, votes)| **votes)
            .map(|(name, votes)| (name.as_str(), *votes))
    }

    pub fn fallback_units(&self) -> impl Iterator<Item = &UnitResult> {
        self.units.iter().filter(|result| result.is_fallback())
    }
}

impl fmt::Display for ForecastTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let totals: Vec<String> = self
            .totals
            .iter()
            .map(|(candidate, votes)| format!("{}: {}", candidate, votes))
            .collect();
        write!(f, "Total Electoral Votes: {}", totals.join(", "))
    }
}

/// Resolves every unit and credits its allocation to the winner. Always
/// builds a fresh tally.
pub fn totalize<F>(units: &[GeographicUnit], mut resolver: F) -> ForecastTally
where
    F: FnMut(&GeographicUnit) -> UnitResult,
{
    let mut tally = ForecastTally::default();
    for unit in units {
        let result = resolver(unit);
        *tally.totals.entry(result.winner.clone()).or_insert(0) += unit.allocation;
        tally.units.push(result);
    }
    tally
}

/// Vote share from national-scope polls only; independent of the unit tally.
pub fn national_vote_share(
    records: &[PollRecord],
    table: &BiasWeightTable,
    config: &AggregateConfig,
) -> Vec<CandidateAggregate> {
    let national: Vec<PollRecord> = records
        .iter()
        .filter(|record| record.unit.is_national())
        .cloned()
        .collect();
    aggregate(&national, table, config)
}
