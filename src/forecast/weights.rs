use crate::models::PollRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Multiplier for organizations that appear in no category.
pub const NEUTRAL_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReliabilityCategory {
    StronglyFavorsA,
    LeansA,
    LeansB,
    StronglyFavorsB,
    Unreliable,
    MissingReliabilityData,
}

impl ReliabilityCategory {
    /// Resolution order: the first category containing a name governs.
    pub const ORDER: [ReliabilityCategory; 6] = [
        ReliabilityCategory::StronglyFavorsA,
        ReliabilityCategory::LeansA,
        ReliabilityCategory::LeansB,
        ReliabilityCategory::StronglyFavorsB,
        ReliabilityCategory::Unreliable,
        ReliabilityCategory::MissingReliabilityData,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ReliabilityCategory::StronglyFavorsA | ReliabilityCategory::StronglyFavorsB => 0.3,
            ReliabilityCategory::LeansA | ReliabilityCategory::LeansB => 0.75,
            ReliabilityCategory::Unreliable => 0.1,
            ReliabilityCategory::MissingReliabilityData => 1.2,
        }
    }
}

/// Organization names grouped by reliability category. Field names follow
/// the published bias list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasWeightTable {
    #[serde(default, rename = "red")]
    pub strongly_favors_a: HashSet<String>,
    #[serde(default, rename = "leanred")]
    pub leans_a: HashSet<String>,
    #[serde(default, rename = "leanblue")]
    pub leans_b: HashSet<String>,
    #[serde(default, rename = "blue")]
    pub strongly_favors_b: HashSet<String>,
    #[serde(default)]
    pub unreliable: HashSet<String>,
    #[serde(default, rename = "relmissing")]
    pub missing_reliability_data: HashSet<String>,
}

// The published list is a one-element array wrapping the table.
#[derive(Deserialize)]
#[serde(untagged)]
enum WeightTableDocument {
    Wrapped(Vec<BiasWeightTable>),
    Bare(BiasWeightTable),
}

impl BiasWeightTable {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let table = match serde_json::from_str::<WeightTableDocument>(json)? {
            WeightTableDocument::Bare(table) => table,
            WeightTableDocument::Wrapped(tables) => tables.into_iter().next().unwrap_or_default(),
        };
        Ok(table)
    }

    pub fn members(&self, category: ReliabilityCategory) -> &HashSet<String> {
        match category {
            ReliabilityCategory::StronglyFavorsA => &self.strongly_favors_a,
            ReliabilityCategory::LeansA => &self.leans_a,
            ReliabilityCategory::LeansB => &self.leans_b,
            ReliabilityCategory::StronglyFavorsB => &self.strongly_favors_b,
            ReliabilityCategory::Unreliable => &self.unreliable,
            ReliabilityCategory::MissingReliabilityData => &self.missing_reliability_data,
        }
    }

    pub fn members_mut(&mut self, category: ReliabilityCategory) -> &mut HashSet<String> {
        match category {
            ReliabilityCategory::StronglyFavorsA => &mut self.strongly_favors_a,
            ReliabilityCategory::LeansA => &mut self.leans_a,
            ReliabilityCategory::LeansB => &mut self.leans_b,
            ReliabilityCategory::StronglyFavorsB => &mut self.strongly_favors_b,
            ReliabilityCategory::Unreliable => &mut self.unreliable,
            ReliabilityCategory::MissingReliabilityData => &mut self.missing_reliability_data,
        }
    }

    pub fn insert(&mut self, category: ReliabilityCategory, organization: impl Into<String>) {
        self.members_mut(category).insert(organization.into());
    }

    /// First category (in resolution order) listing `organization`.
    pub fn category_of(&self, organization: &str) -> Option<ReliabilityCategory> {
        let organization = organization.trim();
        ReliabilityCategory::ORDER
            .into_iter()
            .find(|category| self.members(*category).contains(organization))
    }
}

pub fn resolve(organization: Option<&str>, table: &BiasWeightTable) -> f64 {
    match organization.map(str::trim) {
        None | Some("") => NEUTRAL_WEIGHT,
        Some(name) => table
            .category_of(name)
            .map_or(NEUTRAL_WEIGHT, ReliabilityCategory::multiplier),
    }
}

/// A poll is only as credible as the least credible party attributed to it.
pub fn poll_weight(record: &PollRecord, table: &BiasWeightTable) -> f64 {
    let pollster = resolve(record.pollster.as_deref(), table);
    let sponsor = resolve(record.sponsor.as_deref(), table);
    pollster.min(sponsor)
}
