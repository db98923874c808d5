//! Data models for CryptoCast commands and services
//!
//! This module organizes the market data, prediction and identity types
//! shared across commands, services and API clients.

pub mod asset;
pub mod chart;
pub mod fetch;
pub mod ping;
pub mod prediction;
pub mod user;

// Re-export commonly used types for convenience
pub use asset::Asset;
pub use chart::{HistoricalSeries, PricePoint};
pub use fetch::Fetch;
pub use ping::PingMetrics;
pub use prediction::{PredictionResult, Timeframe};
pub use user::{AuthSnapshot, Session, User, UserProfile};
