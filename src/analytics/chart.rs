//! Bar-chart series derived from daily visit counts

use chrono::{Datelike, NaiveDate};

use crate::models::StatsResult;

pub const CHART_TITLE: &str = "Visitas por día";

const BAR_WIDTH: u64 = 40;

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBucket {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartSeries {
    pub buckets: Vec<ChartBucket>,
}

/// Abbreviated month and day in `es-ES` order, e.g. `1 ene`
pub fn bucket_label(date: NaiveDate) -> String {
    let month = MONTHS_ES[date.month0() as usize];
    format!("{} {}", date.day(), month)
}

/// Bar length in cells; widened so counts near `u64::MAX` cannot overflow
fn bar_len(value: u64, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let len = (u128::from(value) * u128::from(BAR_WIDTH)).div_ceil(u128::from(max));
    u64::try_from(len).unwrap_or(BAR_WIDTH)
}

impl ChartSeries {
    /// One bucket per daily entry, in the order the backend returned them
    pub fn from_stats(stats: &StatsResult) -> Self {
        let buckets = stats
            .daily_stats
            .iter()
            .map(|stat| ChartBucket {
                label: bucket_label(stat.date),
                value: stat.visits,
            })
            .collect();

        Self { buckets }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.value).collect()
    }

    /// Horizontal text bars scaled to the largest bucket
    pub fn render(&self) -> String {
        let max = self.buckets.iter().map(|b| b.value).max().unwrap_or(0);
        let label_width = self
            .buckets
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for bucket in &self.buckets {
            let len = bar_len(bucket.value, max);
            out.push_str(&format!(
                "{:<width$}  {} {}\n",
                bucket.label,
                "█".repeat(len as usize),
                bucket.value,
                width = label_width
            ));
        }
        out
    }
}
