//! Election forecasting from public opinion polls.
//!
//! Polls are weighted by the credibility of their pollster and sponsor,
//! limited to a recent window, averaged per candidate and scope, and rolled
//! up into unit winners, an allocation tally and simulated win odds.

pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod source;
pub mod units;

pub use config::ForecastConfig;
pub use error::{ConfigError, Error, SourceError};
pub use forecast::{ForecastReport, ForecastRequest, ScopeForecast, forecast_scope, run_forecast};
pub use models::{CandidateAggregate, GeographicUnit, Lean, PollRecord, ReferenceCandidates, Scope};
