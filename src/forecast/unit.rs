use crate::models::{CandidateAggregate, GeographicUnit, ReferenceCandidates};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Analyst override: a flat swing added to one candidate before the
/// winner is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAdjustment {
    pub candidate: String,
    pub swing: f64,
}

impl ManualAdjustment {
    pub fn new(candidate: impl Into<String>, swing: f64) -> Self {
        Self {
            candidate: candidate.into(),
            swing,
        }
    }

    pub fn none() -> Self {
        Self::new(String::new(), 0.0)
    }

    fn applied_to(&self, candidate: &CandidateAggregate) -> f64 {
        if candidate.name == self.candidate {
            candidate.percentage + self.swing
        } else {
            candidate.percentage
        }
    }
}

impl Default for ManualAdjustment {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultSource {
    Polled,
    Fallback,
}

/// Categorical reading of a signed margin (positive = toward candidate A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    SolidA,
    LikelyA,
    LeanA,
    TiltA,
    Tossup,
    TiltB,
    LeanB,
    LikelyB,
    SolidB,
}

// Ordered from the most extreme margin inward; the first bound the margin
// passes decides the bucket. A margin sitting exactly on a breakpoint goes
// to the inner bucket on either side.
const A_BUCKETS: [(f64, Rating); 4] = [
    (8.0, Rating::SolidA),
    (5.0, Rating::LikelyA),
    (2.0, Rating::LeanA),
    (0.0, Rating::TiltA),
];

const B_BUCKETS: [(f64, Rating); 4] = [
    (-8.0, Rating::SolidB),
    (-5.0, Rating::LikelyB),
    (-2.0, Rating::LeanB),
    (0.0, Rating::TiltB),
];

impl Rating {
    pub fn from_margin(margin: f64) -> Self {
        if margin > 0.0 {
            A_BUCKETS
                .iter()
                .find(|(bound, _)| margin > *bound)
                .map_or(Rating::Tossup, |(_, rating)| *rating)
        } else if margin < 0.0 {
            B_BUCKETS
                .iter()
                .find(|(bound, _)| margin < *bound)
                .map_or(Rating::Tossup, |(_, rating)| *rating)
        } else {
            // zero or NaN
            Rating::Tossup
        }
    }

    pub fn label(self, refs: &ReferenceCandidates) -> String {
        match self {
            Rating::SolidA => format!("Solid {}", refs.a),
            Rating::LikelyA => format!("Likely {}", refs.a),
            Rating::LeanA => format!("Lean {}", refs.a),
            Rating::TiltA => format!("Tilt {}", refs.a),
            Rating::Tossup => "Tossup".to_string(),
            Rating::TiltB => format!("Tilt {}", refs.b),
            Rating::LeanB => format!("Lean {}", refs.b),
            Rating::LikelyB => format!("Likely {}", refs.b),
            Rating::SolidB => format!("Solid {}", refs.b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitResult {
    pub unit: String,
    pub allocation: u32,
    pub winner: String,
    pub runner_up: Option<String>,
    // Winner's percentage minus the runner-up's; never negative.
    pub margin: Option<f64>,
    // Candidate A's percentage minus candidate B's.
    pub lean_margin: Option<f64>,
    pub rating: Option<Rating>,
    pub source: ResultSource,
}

impl UnitResult {
    pub fn is_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }
}

impl fmt::Display for UnitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.unit, self.allocation, self.winner)?;
        if let (Some(runner_up), Some(margin)) = (&self.runner_up, self.margin) {
            write!(f, " +{:.2} over {}", margin, runner_up)?;
        }
        if self.is_fallback() {
            write!(f, " [no recent polls]")?;
        }
        Ok(())
    }
}

/// Picks the winner of one unit from its aggregated candidates, falling
/// back to the unit's historical lean when nothing qualified.
pub fn resolve_unit(
    unit: &GeographicUnit,
    aggregates: &[CandidateAggregate],
    refs: &ReferenceCandidates,
    adjustment: &ManualAdjustment,
) -> UnitResult {
    let adjusted: Vec<(&str, f64)> = aggregates
        .iter()
        .map(|candidate| (candidate.name.as_str(), adjustment.applied_to(candidate)))
        .collect();

    let mut leader: Option<(&str, f64)> = None;
    let mut second: Option<(&str, f64)> = None;
    for &(name, pct) in &adjusted {
        match leader {
            Some((_, best)) if pct <= best => {
                if second.is_none_or(|(_, runner)| pct > runner) {
                    second = Some((name, pct));
                }
            }
            _ => {
                second = leader;
                leader = Some((name, pct));
            }
        }
    }

    let Some((winner, winner_pct)) = leader else {
        return UnitResult {
            unit: unit.name.clone(),
            allocation: unit.allocation,
            winner: refs.favored(unit.lean).to_string(),
            runner_up: None,
            margin: None,
            lean_margin: None,
            rating: None,
            source: ResultSource::Fallback,
        };
    };

    let margin = second.map(|(_, pct)| winner_pct - pct);
    let lean_margin = lean_margin(&adjusted, refs, winner, margin);

    UnitResult {
        unit: unit.name.clone(),
        allocation: unit.allocation,
        winner: winner.to_string(),
        runner_up: second.map(|(name, _)| name.to_string()),
        margin,
        lean_margin,
        rating: lean_margin.map(Rating::from_margin),
        source: ResultSource::Polled,
    }
}

fn lean_margin(
    adjusted: &[(&str, f64)],
    refs: &ReferenceCandidates,
    winner: &str,
    margin: Option<f64>,
) -> Option<f64> {
    let pct_of = |name: &str| adjusted.iter().find(|(n, _)| *n == name).map(|(_, pct)| *pct);
    match (pct_of(&refs.a), pct_of(&refs.b)) {
        (Some(a), Some(b)) => Some(a - b),
        _ if winner == refs.a => margin,
        _ if winner == refs.b => margin.map(|m| -m),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lean;

    fn refs() -> ReferenceCandidates {
        ReferenceCandidates::new("A", "B")
    }

    fn agg(name: &str, pct: f64) -> CandidateAggregate {
        CandidateAggregate::new(name, pct)
    }

    #[test]
    fn picks_leader_and_runner_up() {
        let unit = GeographicUnit::new("Ohio", 17, Lean::FavorsA);
        let aggregates = vec![agg("C", 4.0), agg("B", 47.0), agg("A", 49.0)];
        let result = resolve_unit(&unit, &aggregates, &refs(), &ManualAdjustment::none());

        assert_eq!(result.winner, "A");
        assert_eq!(result.runner_up.as_deref(), Some("B"));
        assert!((result.margin.unwrap() - 2.0).abs() < 1e-9);
        assert!((result.lean_margin.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(result.rating, Some(Rating::TiltA));
        assert_eq!(result.source, ResultSource::Polled);
    }

    #[test]
    fn manual_swing_can_flip_a_unit() {
        let unit = GeographicUnit::new("Ohio", 17, Lean::FavorsA);
        let aggregates = vec![agg("A", 51.0), agg("B", 49.0)];
        let result = resolve_unit(&unit, &aggregates, &refs(), &ManualAdjustment::new("B", 3.0));

        assert_eq!(result.winner, "B");
        assert_eq!(result.runner_up.as_deref(), Some("A"));
        assert!((result.margin.unwrap() - 1.0).abs() < 1e-9);
        assert!((result.lean_margin.unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(result.rating, Some(Rating::TiltB));
    }

    #[test]
    fn ties_go_to_the_first_candidate() {
        let unit = GeographicUnit::new("Ohio", 17, Lean::FavorsB);
        let aggregates = vec![agg("A", 50.0), agg("B", 50.0)];
        let result = resolve_unit(&unit, &aggregates, &refs(), &ManualAdjustment::none());

        assert_eq!(result.winner, "A");
        assert_eq!(result.margin, Some(0.0));
        assert_eq!(result.rating, Some(Rating::Tossup));
    }

    #[test]
    fn empty_unit_falls_back_to_lean() {
        let unit = GeographicUnit::new("Georgia", 16, Lean::FavorsB);
        let result = resolve_unit(&unit, &[], &refs(), &ManualAdjustment::new("A", 50.0));

        assert_eq!(result.winner, "B");
        assert_eq!(result.source, ResultSource::Fallback);
        assert!(result.runner_up.is_none());
        assert!(result.margin.is_none());
        assert!(result.rating.is_none());
    }

    #[test]
    fn single_candidate_has_no_runner_up() {
        let unit = GeographicUnit::new("Utah", 6, Lean::FavorsA);
        let result = resolve_unit(&unit, &[agg("B", 100.0)], &refs(), &ManualAdjustment::none());

        assert_eq!(result.winner, "B");
        assert!(result.runner_up.is_none());
        assert!(result.margin.is_none());
        assert!(result.lean_margin.is_none());
    }

    #[test]
    fn rating_buckets_are_mutually_exclusive() {
        let cases = [
            (12.0, Rating::SolidA),
            (8.5, Rating::SolidA),
            (8.0, Rating::LikelyA),
            (6.0, Rating::LikelyA),
            (3.0, Rating::LeanA),
            (1.0, Rating::TiltA),
            (0.0, Rating::Tossup),
            (-1.0, Rating::TiltB),
            (-3.0, Rating::LeanB),
            (-6.0, Rating::LikelyB),
            (-8.0, Rating::LikelyB),
            (-8.5, Rating::SolidB),
            (-30.0, Rating::SolidB),
            (f64::NAN, Rating::Tossup),
        ];
        for (margin, expected) in cases {
            assert_eq!(Rating::from_margin(margin), expected, "margin {margin}");
        }
    }

    #[test]
    fn breakpoints_fall_inward_on_both_sides() {
        let pairs = [
            (2.0, Rating::TiltA, Rating::TiltB),
            (5.0, Rating::LeanA, Rating::LeanB),
            (8.0, Rating::LikelyA, Rating::LikelyB),
        ];
        for (margin, a_side, b_side) in pairs {
            assert_eq!(Rating::from_margin(margin), a_side, "margin {margin}");
            assert_eq!(Rating::from_margin(-margin), b_side, "margin -{margin}");
        }
        assert_eq!(Rating::from_margin(f64::INFINITY), Rating::SolidA);
        assert_eq!(Rating::from_margin(f64::NEG_INFINITY), Rating::SolidB);
    }

    #[test]
    fn rating_labels_name_the_candidates() {
        assert_eq!(Rating::LeanB.label(&refs()), "Lean B");
        assert_eq!(Rating::Tossup.label(&refs()), "Tossup");
    }
}
