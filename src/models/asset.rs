//! Market asset models

use serde::{Deserialize, Deserializer, Serialize};

/// Thinly traded coins come back with a null price; read that as 0
fn price_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// A ranked asset as returned by the markets endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default, deserialize_with = "price_or_zero")]
    pub current_price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl Asset {
    /// 24h change, treating a missing upstream value as flat
    pub fn day_change_percent(&self) -> f64 {
        self.price_change_percentage_24h.unwrap_or(0.0)
    }

    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// True when `query` names this asset by id, symbol or name (case-insensitive)
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.id.to_lowercase() == query
            || self.symbol.to_lowercase() == query
            || self.name.to_lowercase() == query
    }
}
