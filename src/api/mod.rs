pub mod coingecko;
pub mod firebase;
