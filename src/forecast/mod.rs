pub mod aggregate;
pub mod filter;
pub mod probability;
pub mod tally;
pub mod unit;
pub mod weights;

use crate::models::{CandidateAggregate, GeographicUnit, PollRecord, ReferenceCandidates, Scope};
use aggregate::{AggregateConfig, Weighting};
use filter::FilterConfig;
use log::{debug, info};
use probability::NoiseSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tally::ForecastTally;
use unit::ManualAdjustment;
use weights::BiasWeightTable;

// Everything one forecast run depends on besides the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub filter: FilterConfig,
    // Used for vote share and win probabilities.
    pub aggregate: AggregateConfig,
    // Used when picking unit winners for the tally.
    pub unit_aggregate: AggregateConfig,
    pub adjustment: ManualAdjustment,
    pub candidates: ReferenceCandidates,
    pub iterations: u32,
    pub min_polls_shown: usize,
}

impl ForecastRequest {
    pub fn new(filter: FilterConfig) -> Self {
        Self {
            filter,
            aggregate: AggregateConfig::default(),
            unit_aggregate: AggregateConfig::default(),
            adjustment: ManualAdjustment::none(),
            candidates: ReferenceCandidates::default(),
            iterations: probability::DEFAULT_ITERATIONS,
            min_polls_shown: filter::DEFAULT_MIN_POLLS_SHOWN,
        }
    }

    /// Unit winners from raw mean support with no candidate exclusions,
    /// the way the electoral tally is often computed.
    pub fn with_raw_unit_tally(mut self) -> Self {
        self.unit_aggregate = AggregateConfig {
            weighting: Weighting::Uniform,
            excluded_candidates: Vec::new(),
            ..self.aggregate.clone()
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScopeForecast {
    NoData,
    Available {
        vote_share: Vec<CandidateAggregate>,
        win_probabilities: BTreeMap<String, f64>,
    },
}

impl ScopeForecast {
    pub fn is_available(&self) -> bool {
        matches!(self, ScopeForecast::Available { .. })
    }
}

impl fmt::Display for ScopeForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeForecast::NoData => write!(f, "No forecast available"),
            ScopeForecast::Available {
                vote_share,
                win_probabilities,
            } => {
                let shares: Vec<String> = vote_share
                    .iter()
                    .map(|c| format!("{}: {:.2}%", c.name, c.percentage))
                    .collect();
                writeln!(f, "Popular Vote Estimate: {}", shares.join(", "))?;

                let odds: Vec<String> =
                    probability::displayed_probabilities(win_probabilities, probability::DISPLAY_FLOOR_PCT)
                        .into_iter()
                        .map(|(name, pct)| format!("{}: {:.2}%", name, pct))
                        .collect();
                write!(f, "Win Probability: {}", odds.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub national: ScopeForecast,
    pub tally: ForecastTally,
    // Units with enough recent polls to be offered for drill-down.
    pub shown_units: Vec<String>,
}

impl fmt::Display for ForecastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.national)?;
        writeln!(f, "{}", self.tally)?;
        for result in &self.tally.units {
            writeln!(f, "  {}", result)?;
        }
        if !self.shown_units.is_empty() {
            write!(f, "Units with enough polling: {}", self.shown_units.join(", "))?;
        }
        Ok(())
    }
}

/// Vote share and win probabilities for a single scope.
pub fn forecast_scope<N>(
    records: &[PollRecord],
    scope: &Scope,
    table: &BiasWeightTable,
    request: &ForecastRequest,
    noise: &mut N,
) -> ScopeForecast
where
    N: NoiseSource + ?Sized,
{
    let recent = filter::filter(records, &request.filter);
    forecast_recent(&recent, scope, table, request, noise)
}

// `recent` has already been through the request's filter.
fn forecast_recent<N>(
    recent: &[PollRecord],
    scope: &Scope,
    table: &BiasWeightTable,
    request: &ForecastRequest,
    noise: &mut N,
) -> ScopeForecast
where
    N: NoiseSource + ?Sized,
{
    let in_scope: Vec<PollRecord> = recent
        .iter()
        .filter(|record| &record.unit == scope)
        .cloned()
        .collect();
    let vote_share = aggregate::aggregate(&in_scope, table, &request.aggregate);
    if vote_share.is_empty() {
        debug!("No qualifying polls for {}", scope);
        return ScopeForecast::NoData;
    }

    let win_probabilities =
        probability::estimate_win_probabilities(&vote_share, request.iterations, noise);
    ScopeForecast::Available {
        vote_share,
        win_probabilities,
    }
}

/// Resolves every unit, tallies allocations and forecasts the national scope.
pub fn run_forecast<N>(
    records: &[PollRecord],
    table: &BiasWeightTable,
    units: &[GeographicUnit],
    request: &ForecastRequest,
    noise: &mut N,
) -> ForecastReport
where
    N: NoiseSource + ?Sized,
{
    info!(
        "Running forecast over {} records, {} units, {}-day window ending {}",
        records.len(),
        units.len(),
        request.filter.window_days,
        request.filter.as_of
    );

    let recent = filter::filter(records, &request.filter);
    let national = forecast_recent(&recent, &Scope::National, table, request, noise);

    let tally = tally::totalize(units, |geo_unit| {
        let in_unit: Vec<PollRecord> = recent
            .iter()
            .filter(|record| record.unit.name() == geo_unit.name && !record.unit.is_national())
            .cloned()
            .collect();
        let aggregates = aggregate::aggregate(&in_unit, table, &request.unit_aggregate);
        unit::resolve_unit(geo_unit, &aggregates, &request.candidates, &request.adjustment)
    });

    let fallbacks = tally.fallback_units().count();
    if fallbacks > 0 {
        info!("{} of {} units fell back to historical lean", fallbacks, units.len());
    }

    let shown_units = filter::shown_units(&recent, &request.filter, request.min_polls_shown);

    ForecastReport {
        national,
        tally,
        shown_units,
    }
}
