//! Historical price series models

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single `[timestamp_millis, price]` sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Timestamp as a UTC datetime, `None` if out of range
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

impl From<(i64, f64)> for PricePoint {
    fn from((timestamp, price): (i64, f64)) -> Self {
        Self { timestamp, price }
    }
}

impl From<PricePoint> for (i64, f64) {
    fn from(point: PricePoint) -> Self {
        (point.timestamp, point.price)
    }
}

/// Chronological price samples for one asset.
///
/// Upstream order is trusted as-is; duplicate timestamps are not rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalSeries {
    #[serde(default)]
    pub prices: Vec<PricePoint>,
}

impl HistoricalSeries {
    pub fn new(prices: Vec<PricePoint>) -> Self {
        Self { prices }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().map(|p| p.price)
    }

    /// (min, max) price over the series
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.prices.is_empty() {
            return None;
        }
        let min = self.prices.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max = self.prices.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}
