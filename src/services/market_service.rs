use tracing::{info, warn};

use crate::api::coingecko::CoinGeckoClient;
use crate::models::{Asset, Fetch, HistoricalSeries};

/// Ranked assets, falling back to an empty list on any upstream failure
pub async fn list_top_assets(client: &CoinGeckoClient, limit: u32) -> Fetch<Vec<Asset>> {
    match client.get_markets(limit, 1).await {
        Ok(assets) => {
            info!("Fetched {} ranked assets", assets.len());
            Fetch::Fresh(assets)
        }
        Err(e) => {
            warn!("Error fetching cryptocurrencies: {}", e);
            Fetch::fallback(e.to_string())
        }
    }
}

/// Price history for one asset, falling back to an empty series on any upstream failure
pub async fn fetch_history(client: &CoinGeckoClient, asset_id: &str, days: u32) -> Fetch<HistoricalSeries> {
    match client.get_market_chart(asset_id, days).await {
        Ok(series) => {
            info!("Fetched {} price points for {} over {} days", series.len(), asset_id, days);
            Fetch::Fresh(series)
        }
        Err(e) => {
            warn!("Error fetching historical data for {}: {}", asset_id, e);
            Fetch::fallback(e.to_string())
        }
    }
}

/// Case-insensitive substring match on name or symbol; an empty term keeps everything
pub fn search_assets<'a>(assets: &'a [Asset], term: &str) -> Vec<&'a Asset> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return assets.iter().collect();
    }

    assets
        .iter()
        .filter(|asset| {
            asset.name.to_lowercase().contains(&term) || asset.symbol.to_lowercase().contains(&term)
        })
        .collect()
}

/// Resolve a coin by id, symbol or name among the ranked assets
pub fn find_asset<'a>(assets: &'a [Asset], query: &str) -> Option<&'a Asset> {
    assets.iter().find(|asset| asset.matches(query))
}

/// Look up a coin among the top `limit` assets.
///
/// Distinguishes an unreachable market API from a coin that is simply not ranked.
pub async fn resolve_asset(client: &CoinGeckoClient, limit: u32, query: &str) -> Result<Asset, String> {
    let fetched = list_top_assets(client, limit).await;
    if let Fetch::Fallback { reason, .. } = &fetched {
        return Err(format!("⚠️ Market data is unavailable right now ({}). Please try again later.", reason));
    }

    find_asset(fetched.value(), query)
        .cloned()
        .ok_or_else(|| format!("❌ '{}' is not in the top {} cryptocurrencies. Try `$coins` to see them.", query, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn asset(id: &str, name: &str, symbol: &str) -> Asset {
        Asset {
            id: id.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            current_price: 1.0,
            image: String::new(),
            price_change_percentage_24h: None,
            market_cap: None,
        }
    }

    fn sample() -> Vec<Asset> {
        vec![
            asset("bitcoin", "Bitcoin", "btc"),
            asset("ethereum", "Ethereum", "eth"),
            asset("wrapped-bitcoin", "Wrapped Bitcoin", "wbtc"),
        ]
    }

    #[test]
    fn test_search_by_name_or_symbol() {
        let assets = sample();

        let hits: Vec<&str> = search_assets(&assets, "BTC").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(hits, vec!["bitcoin", "wrapped-bitcoin"]);

        let hits: Vec<&str> = search_assets(&assets, "ether").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(hits, vec!["ethereum"]);

        assert_eq!(search_assets(&assets, "  ").len(), 3);
        assert!(search_assets(&assets, "doge").is_empty());
    }

    #[test]
    fn test_find_asset_exact_match() {
        let assets = sample();
        assert_eq!(find_asset(&assets, "ETH").map(|a| a.id.as_str()), Some("ethereum"));
        assert_eq!(find_asset(&assets, "wrapped bitcoin").map(|a| a.id.as_str()), Some("wrapped-bitcoin"));
        assert_eq!(find_asset(&assets, "bitcoin").map(|a| a.id.as_str()), Some("bitcoin"));
        assert!(find_asset(&assets, "bit").is_none());
    }

    #[tokio::test]
    async fn test_list_falls_back_to_empty_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());
        let fetched = list_top_assets(&client, 20).await;

        assert!(fetched.is_fallback());
        assert!(fetched.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_history_falls_back_to_empty_series() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{\"prices\": \"garbage\"}")
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());
        let fetched = fetch_history(&client, "bitcoin", 30).await;

        assert!(fetched.is_fallback());
        assert!(fetched.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_genuinely_empty_list_is_not_a_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());
        let fetched = list_top_assets(&client, 20).await;

        assert_eq!(fetched, Fetch::Fresh(Vec::new()));
    }

    #[tokio::test]
    async fn test_resolve_asset_unreachable_api() {
        let client = CoinGeckoClient::with_base_url(None, "http://127.0.0.1:9".to_string());
        let err = resolve_asset(&client, 20, "btc").await.unwrap_err();
        assert!(err.contains("unavailable"));
    }
}
