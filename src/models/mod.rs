use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NATIONAL_SCOPE: &str = "National";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    National,
    Unit(String),
}

impl Scope {
    pub fn unit(name: impl Into<String>) -> Self {
        Scope::from(name.into())
    }

    pub fn is_national(&self) -> bool {
        matches!(self, Scope::National)
    }

    pub fn name(&self) -> &str {
        match self {
            Scope::National => NATIONAL_SCOPE,
            Scope::Unit(name) => name,
        }
    }
}

impl From<String> for Scope {
    fn from(name: String) -> Self {
        if name.trim().eq_ignore_ascii_case(NATIONAL_SCOPE) {
            Scope::National
        } else {
            Scope::Unit(name)
        }
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::National => NATIONAL_SCOPE.to_string(),
            Scope::Unit(name) => name,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollRecord {
    pub id: String,
    pub unit: Scope,
    pub candidate_name: String,
    pub party: Option<String>,
    pub pollster: Option<String>,
    pub sponsor: Option<String>,
    pub estimated_pct: f64,
    // `None` when the source date could not be parsed.
    pub end_date: Option<NaiveDate>,
}

impl PollRecord {
    pub fn new(
        id: impl Into<String>,
        unit: Scope,
        candidate_name: impl Into<String>,
        estimated_pct: f64,
        end_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            unit,
            candidate_name: candidate_name.into(),
            party: None,
            pollster: None,
            sponsor: None,
            estimated_pct,
            end_date,
        }
    }

    pub fn with_pollster(mut self, pollster: impl Into<String>) -> Self {
        self.pollster = Some(pollster.into());
        self
    }

    pub fn with_sponsor(mut self, sponsor: impl Into<String>) -> Self {
        self.sponsor = Some(sponsor.into());
        self
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lean {
    FavorsA,
    FavorsB,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicUnit {
    pub name: String,
    // Contribution to the overall tally (electoral votes).
    pub allocation: u32,
    pub lean: Lean,
}

impl GeographicUnit {
    pub fn new(name: impl Into<String>, allocation: u32, lean: Lean) -> Self {
        Self {
            name: name.into(),
            allocation,
            lean,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::unit(self.name.clone())
    }
}

/// The two candidates that the lean table, the margin sign and the
/// reliability categories are expressed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCandidates {
    pub a: String,
    pub b: String,
}

impl ReferenceCandidates {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn favored(&self, lean: Lean) -> &str {
        match lean {
            Lean::FavorsA => &self.a,
            Lean::FavorsB => &self.b,
        }
    }
}

impl Default for ReferenceCandidates {
    fn default() -> Self {
        Self::new("Donald Trump", "Kamala Harris")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAggregate {
    pub name: String,
    // Weighted mean support; normalized to a share of 100 once every
    // viable candidate in the scope is known.
    pub percentage: f64,
    // Number of poll records behind this estimate.
    pub polls: usize,
}

impl CandidateAggregate {
    pub fn new(name: impl Into<String>, percentage: f64) -> Self {
        Self {
            name: name.into(),
            percentage,
            polls: 0,
        }
    }
}
