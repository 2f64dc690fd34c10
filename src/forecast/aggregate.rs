use crate::forecast::weights::{BiasWeightTable, poll_weight};
use crate::models::{CandidateAggregate, PollRecord};
use log::debug;
use std::collections::HashMap;

/// Candidates below this mean (in percentage points) are treated as noise.
pub const VIABILITY_THRESHOLD: f64 = 0.15;

pub const WITHDRAWN_CANDIDATES: [&str; 2] = ["Joe Biden", "Robert F. Kennedy"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    // Scale each poll by its pollster/sponsor credibility multiplier.
    #[default]
    Credibility,
    // Take reported support at face value.
    Uniform,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateConfig {
    pub viability_threshold: f64,
    pub excluded_candidates: Vec<String>,
    pub weighting: Weighting,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            viability_threshold: VIABILITY_THRESHOLD,
            excluded_candidates: WITHDRAWN_CANDIDATES.iter().map(|name| name.to_string()).collect(),
            weighting: Weighting::Credibility,
        }
    }
}

impl AggregateConfig {
    pub fn is_excluded(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        self.excluded_candidates
            .iter()
            .any(|excluded| excluded.trim().eq_ignore_ascii_case(candidate))
    }

    fn weighted_pct(&self, record: &PollRecord, table: &BiasWeightTable) -> f64 {
        match self.weighting {
            Weighting::Credibility => record.estimated_pct * poll_weight(record, table),
            Weighting::Uniform => record.estimated_pct,
        }
    }
}

/// Per-candidate weighted mean support, normalized to sum to 100.
///
/// The records are expected to belong to one scope and to be filtered
/// already. An empty result means there is no forecast for the scope.
pub fn aggregate(
    records: &[PollRecord],
    table: &BiasWeightTable,
    config: &AggregateConfig,
) -> Vec<CandidateAggregate> {
    // Insertion order keeps the output stable for tie-breaking downstream.
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

    for record in records {
        if config.is_excluded(&record.candidate_name) {
            continue;
        }
        let weighted = config.weighted_pct(record, table);
        let entry = sums.entry(record.candidate_name.clone()).or_insert_with(|| {
            order.push(record.candidate_name.clone());
            (0.0, 0)
        });
        entry.0 += weighted;
        entry.1 += 1;
    }

    let mut candidates: Vec<CandidateAggregate> = order
        .into_iter()
        .filter_map(|name| {
            let (sum, polls) = sums.get(&name).copied()?;
            let mean = sum / polls as f64;
            if mean >= config.viability_threshold {
                Some(CandidateAggregate {
                    name,
                    percentage: mean,
                    polls,
                })
            } else {
                debug!("Dropping {} below viability threshold ({:.3})", name, mean);
                None
            }
        })
        .collect();

    if !normalize(&mut candidates) {
        return Vec::new();
    }
    candidates
}

/// Rescales percentages to shares of 100. Returns false when the total is
/// not a positive finite number.
pub fn normalize(candidates: &mut [CandidateAggregate]) -> bool {
    let total: f64 = candidates.iter().map(|c| c.percentage).sum();
    if !total.is_finite() || total <= 0.0 {
        return false;
    }
    for candidate in candidates.iter_mut() {
        candidate.percentage = candidate.percentage / total * 100.0;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::weights::ReliabilityCategory;
    use crate::models::Scope;

    fn poll(id: &str, candidate: &str, pct: f64) -> PollRecord {
        PollRecord::new(id, Scope::National, candidate, pct, None)
    }

    fn share(result: &[CandidateAggregate], name: &str) -> f64 {
        result
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.percentage)
            .unwrap()
    }

    #[test]
    fn normalizes_after_dropping_non_viable_candidates() {
        let records = vec![poll("1", "A", 48.0), poll("2", "B", 44.0), poll("3", "C", 0.1)];
        let result = aggregate(&records, &BiasWeightTable::default(), &AggregateConfig::default());

        assert_eq!(result.len(), 2);
        assert!((share(&result, "A") - 52.1739).abs() < 1e-3);
        assert!((share(&result, "B") - 47.8261).abs() < 1e-3);
        let total: f64 = result.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn excluded_candidates_carry_no_mass() {
        let records = vec![
            poll("1", "A", 48.0),
            poll("2", "B", 44.0),
            poll("3", "C", 3.0),
            poll("4", "joe biden", 40.0),
        ];
        let config = AggregateConfig {
            excluded_candidates: vec!["C".to_string(), "Joe Biden".to_string()],
            ..AggregateConfig::default()
        };
        let result = aggregate(&records, &BiasWeightTable::default(), &config);

        let names: Vec<_> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!((share(&result, "A") - 52.17).abs() < 0.01);
        assert!((share(&result, "B") - 47.83).abs() < 0.01);
    }

    #[test]
    fn averages_weighted_polls_per_candidate() {
        let mut table = BiasWeightTable::default();
        table.insert(ReliabilityCategory::Unreliable, "Junk");
        let records = vec![
            poll("1", "A", 50.0),
            poll("2", "A", 50.0).with_pollster("Junk"),
            poll("3", "B", 50.0),
        ];
        let result = aggregate(&records, &table, &AggregateConfig::default());

        // A: mean(50, 5) = 27.5, B: 50
        assert_eq!(result[0].polls, 2);
        assert!((share(&result, "A") - 27.5 / 77.5 * 100.0).abs() < 1e-9);

        let uniform = AggregateConfig {
            weighting: Weighting::Uniform,
            ..AggregateConfig::default()
        };
        let result = aggregate(&records, &table, &uniform);
        assert!((share(&result, "A") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_or_all_noise_yields_no_data() {
        let table = BiasWeightTable::default();
        assert!(aggregate(&[], &table, &AggregateConfig::default()).is_empty());

        let noise = vec![poll("1", "A", 0.1), poll("2", "B", 0.0)];
        assert!(aggregate(&noise, &table, &AggregateConfig::default()).is_empty());

        let zero_threshold = AggregateConfig {
            viability_threshold: 0.0,
            ..AggregateConfig::default()
        };
        let zeros = vec![poll("1", "A", 0.0), poll("2", "B", 0.0)];
        assert!(aggregate(&zeros, &table, &zero_threshold).is_empty());
    }
}
