//! Visit statistics returned by the Backend API

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use crate::models::profile::{Handle, ModelError, Period};

/// Cache key for one statistics query
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct StatsKey {
    pub handle: Handle,
    pub period: Period,
}

impl StatsKey {
    pub fn new(handle: &Handle, period: Period) -> Self {
        Self {
            handle: handle.clone(),
            period,
        }
    }
}

/// Visits counted for one calendar date
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyStat {
    #[serde(deserialize_with = "deserialize_iso_date")]
    pub date: NaiveDate,
    pub visits: u64,
}

/// Pre-aggregated statistics for a (handle, period) pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsResult {
    /// Total visits reported by the backend (may exceed the series sum)
    pub total_visits: u64,

    /// Chronological buckets as returned by the backend
    pub daily_stats: Vec<DailyStat>,
}

impl StatsResult {
    pub fn sum_visits(&self) -> u64 {
        self.daily_stats.iter().map(|s| s.visits).sum()
    }
}

/// Wire shape; both fields may be missing or null
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsPayload {
    #[serde(default)]
    total_visits: Option<u64>,
    #[serde(default)]
    daily_stats: Option<Vec<DailyStat>>,
}

impl<'de> Deserialize<'de> for StatsResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let payload = StatsPayload::deserialize(deserializer)?;
        Ok(Self {
            total_visits: payload.total_visits.unwrap_or(0),
            daily_stats: payload.daily_stats.unwrap_or_default(),
        })
    }
}

/// Parse either a plain `YYYY-MM-DD` date or an RFC 3339 timestamp (UTC date)
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, ModelError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_utc().date())
        .map_err(|_| ModelError::InvalidDate(raw.to_string()))
}

fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_iso_date(&raw).map_err(serde::de::Error::custom)
}
