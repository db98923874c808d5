//! Price prediction models

use std::fmt;

/// Fixed prediction horizons offered to users, in daily steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Week,
    Month,
    Quarter,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Week, Timeframe::Month, Timeframe::Quarter];

    pub fn days(&self) -> u32 {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Quarter => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Week => "7 Days",
            Timeframe::Month => "30 Days",
            Timeframe::Quarter => "3 Months",
        }
    }

    /// Parse a user argument such as `7d`, `30d`, `3m` or `90d`
    pub fn parse(arg: &str) -> Result<Self, String> {
        match arg.trim().to_lowercase().as_str() {
            "7d" | "7" | "1w" => Ok(Timeframe::Week),
            "30d" | "30" | "1m" => Ok(Timeframe::Month),
            "90d" | "90" | "3m" => Ok(Timeframe::Quarter),
            other => Err(format!("❌ Unknown timeframe: '{}'. Supported: 7d, 30d, 3m", other)),
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Week
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Projection for one coin over one timeframe
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub coin: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub percentage_change: f64,
    pub timeframe: Timeframe,
}

impl PredictionResult {
    pub fn is_gain(&self) -> bool {
        self.percentage_change >= 0.0
    }
}
