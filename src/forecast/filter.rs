use crate::models::{PollRecord, Scope};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashSet};

pub const DEFAULT_WINDOW_DAYS: u32 = 45;
pub const DEFAULT_MIN_POLLS_SHOWN: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub window_days: u32,
    pub excluded_ids: HashSet<String>,
    pub as_of: NaiveDate,
}

impl FilterConfig {
    pub fn new(as_of: NaiveDate) -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            excluded_ids: HashSet::new(),
            as_of,
        }
    }

    pub fn with_window(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn excluding<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Earliest end date still inside the window. Windows reaching past the
    /// calendar's range start at `NaiveDate::MIN`.
    pub fn window_start(&self) -> NaiveDate {
        self.as_of
            .checked_sub_signed(Duration::days(i64::from(self.window_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn retains(&self, record: &PollRecord) -> bool {
        self.retainer()(record)
    }

    // Predicate with the window start resolved once, for whole-slice passes.
    fn retainer(&self) -> impl Fn(&PollRecord) -> bool + '_ {
        let start = self.window_start();
        move |record: &PollRecord| {
            !self.excluded_ids.contains(&record.id)
                && record
                    .end_date
                    .is_some_and(|date| date >= start && date <= self.as_of)
        }
    }
}

pub fn filter(records: &[PollRecord], config: &FilterConfig) -> Vec<PollRecord> {
    let keep = config.retainer();
    records.iter().filter(|&record| keep(record)).cloned().collect()
}

pub fn count_qualifying_polls(records: &[PollRecord], scope: &Scope, config: &FilterConfig) -> usize {
    let keep = config.retainer();
    records
        .iter()
        .filter(|&record| &record.unit == scope && keep(record))
        .count()
}

/// Unit names with at least `min_polls` qualifying polls, sorted by name.
pub fn shown_units(records: &[PollRecord], config: &FilterConfig, min_polls: usize) -> Vec<String> {
    let keep = config.retainer();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records.iter().filter(|&record| keep(record)) {
        if let Scope::Unit(name) = &record.unit {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count >= min_polls)
        .map(|(name, _)| name.to_string())
        .collect()
}
