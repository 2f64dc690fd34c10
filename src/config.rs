use crate::error::ConfigError;
use crate::forecast::ForecastRequest;
use crate::forecast::aggregate::WITHDRAWN_CANDIDATES;
use crate::forecast::filter::{DEFAULT_MIN_POLLS_SHOWN, DEFAULT_WINDOW_DAYS, FilterConfig};
use crate::forecast::probability::DEFAULT_ITERATIONS;
use crate::forecast::unit::ManualAdjustment;
use crate::models::ReferenceCandidates;
use chrono::{NaiveDate, Utc};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub polls_path: PathBuf,
    pub weights_path: PathBuf,
    pub window_days: u32,
    pub as_of: NaiveDate,
    pub excluded_polls: Vec<String>,
    pub excluded_candidates: Vec<String>,
    pub swing: f64,
    pub swing_candidate: String,
    pub iterations: u32,
    pub seed: Option<u64>,
    pub min_polls: usize,
}

impl ForecastConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let candidates = ReferenceCandidates::default();

        let as_of = match get("FORECAST_AS_OF") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ConfigError::Invalid {
                    key: "FORECAST_AS_OF",
                    value: raw.clone(),
                }
            })?,
            None => Utc::now().date_naive(),
        };

        let window_days = parse_or("FORECAST_WINDOW_DAYS", get("FORECAST_WINDOW_DAYS"), DEFAULT_WINDOW_DAYS)?;
        if window_days == 0 {
            return Err(ConfigError::Invalid {
                key: "FORECAST_WINDOW_DAYS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            polls_path: get("POLLS_PATH")
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing("POLLS_PATH"))?,
            weights_path: get("WEIGHTS_PATH")
                .map(PathBuf::from)
                .ok_or(ConfigError::Missing("WEIGHTS_PATH"))?,
            window_days,
            as_of,
            excluded_polls: get("FORECAST_EXCLUDED_POLLS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            // set but empty clears the withdrawn-candidate list
            excluded_candidates: lookup("FORECAST_EXCLUDED_CANDIDATES")
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|| WITHDRAWN_CANDIDATES.iter().map(|c| c.to_string()).collect()),
            swing: parse_or("FORECAST_SWING", get("FORECAST_SWING"), 0.0)?,
            swing_candidate: get("FORECAST_SWING_CANDIDATE").unwrap_or(candidates.a),
            iterations: parse_or("FORECAST_ITERATIONS", get("FORECAST_ITERATIONS"), DEFAULT_ITERATIONS)?,
            seed: get("FORECAST_SEED")
                .map(|raw| parse("FORECAST_SEED", &raw))
                .transpose()?,
            min_polls: parse_or("FORECAST_MIN_POLLS", get("FORECAST_MIN_POLLS"), DEFAULT_MIN_POLLS_SHOWN)?,
        })
    }

    pub fn request(&self) -> ForecastRequest {
        let filter = FilterConfig::new(self.as_of)
            .with_window(self.window_days)
            .excluding(self.excluded_polls.iter().cloned());
        let mut request = ForecastRequest::new(filter);
        request.aggregate.excluded_candidates = self.excluded_candidates.clone();
        request.unit_aggregate.excluded_candidates = self.excluded_candidates.clone();
        request.adjustment = ManualAdjustment::new(self.swing_candidate.clone(), self.swing);
        request.iterations = self.iterations;
        request.min_polls_shown = self.min_polls;
        request
    }
}

fn parse<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ForecastConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ForecastConfig::from_vars(|key| vars.get(key).cloned())
    }

    const PATHS: [(&str, &str); 2] = [("POLLS_PATH", "polls.json"), ("WEIGHTS_PATH", "list.json")];

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&PATHS).unwrap();
        assert_eq!(config.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.min_polls, DEFAULT_MIN_POLLS_SHOWN);
        assert_eq!(config.swing, 0.0);
        assert_eq!(config.seed, None);
        assert_eq!(config.excluded_candidates.len(), WITHDRAWN_CANDIDATES.len());
        assert!(config.excluded_polls.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let mut pairs = PATHS.to_vec();
        pairs.extend([
            ("FORECAST_WINDOW_DAYS", "30"),
            ("FORECAST_AS_OF", "2024-11-01"),
            ("FORECAST_EXCLUDED_POLLS", "88123, 88124,,"),
            ("FORECAST_SWING", "-1.5"),
            ("FORECAST_SWING_CANDIDATE", "Kamala Harris"),
            ("FORECAST_SEED", "42"),
        ]);
        let config = config(&pairs).unwrap();

        assert_eq!(config.window_days, 30);
        assert_eq!(config.as_of, NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
        assert_eq!(config.excluded_polls, vec!["88123", "88124"]);
        assert_eq!(config.seed, Some(42));

        let request = config.request();
        assert_eq!(request.filter.window_days, 30);
        assert!(request.filter.excluded_ids.contains("88124"));
        assert_eq!(request.adjustment, ManualAdjustment::new("Kamala Harris", -1.5));
    }

    #[test]
    fn rejects_bad_values() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("FORECAST_WINDOW_DAYS", "soon"));
        assert_eq!(
            config(&pairs),
            Err(ConfigError::Invalid {
                key: "FORECAST_WINDOW_DAYS",
                value: "soon".to_string()
            })
        );

        let mut pairs = PATHS.to_vec();
        pairs.push(("FORECAST_WINDOW_DAYS", "0"));
        assert!(config(&pairs).is_err());

        assert_eq!(config(&[]), Err(ConfigError::Missing("POLLS_PATH")));
    }

    #[test]
    fn empty_candidate_exclusions_clear_the_defaults() {
        let mut pairs = PATHS.to_vec();
        pairs.push(("FORECAST_EXCLUDED_CANDIDATES", ""));
        let cleared = config(&pairs).unwrap();
        assert!(cleared.excluded_candidates.is_empty());
        assert!(cleared.request().aggregate.excluded_candidates.is_empty());

        let mut pairs = PATHS.to_vec();
        pairs.push(("FORECAST_EXCLUDED_CANDIDATES", "Jill Stein"));
        assert_eq!(config(&pairs).unwrap().excluded_candidates, vec!["Jill Stein"]);
    }
}
