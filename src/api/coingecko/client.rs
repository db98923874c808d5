use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER, USER_AGENT};
use serde::de::DeserializeOwned;
use super::models::{ApiError, ErrorResponse};
use crate::models::{Asset, HistoricalSeries};
use crate::utils::cg_ratelimit::rate_limit_cg_api;
use tracing::{debug, warn};

/// Market data API client for the ranked asset list and price history
#[derive(Clone)]
pub struct CoinGeckoClient {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl CoinGeckoClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";
    const VS_CURRENCY: &'static str = "usd";

    /// Create a new client against the public API
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(api_key: Option<String>, base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Default headers, including the demo API key when configured
    fn create_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("cryptocast/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(key) = &self.api_key {
            let key_value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::RequestError(format!("Failed to create API key header: {}", e)))?;
            headers.insert("x-cg-demo-api-key", key_value);
        }

        Ok(headers)
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<i64>().ok());
        let body_text = response.text().await.unwrap_or_default();
        let message = ErrorResponse::message_from(&body_text);

        match status_code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                let retry_after = retry_after_secs.map(|s| s * 1000).unwrap_or(60_000);
                warn!("Market API rate limited, retry after {} ms", retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Market API server error {}: {}", status_code, message);
                ApiError::ServerError(status_code as i32, message)
            }
            _ => ApiError::HttpError(status_code as i32, message),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.create_headers()?;

        rate_limit_cg_api().await;
        debug!("GET {} {:?}", url, query);

        let response = self.http_client
            .get(&url)
            .headers(headers)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /coins/markets
    ///
    /// Ranked assets in USD, ordered by market cap descending, without sparklines.
    ///
    /// # Arguments
    /// * `limit` - Page size
    /// * `page` - 1-based page number
    pub async fn get_markets(&self, limit: u32, page: u32) -> Result<Vec<Asset>, ApiError> {
        if limit == 0 || page == 0 {
            return Err(ApiError::BadRequest("limit and page must be positive".to_string()));
        }

        self.get_json(
            "/coins/markets",
            &[
                ("vs_currency", Self::VS_CURRENCY.to_string()),
                ("order", "market_cap_desc".to_string()),
                ("per_page", limit.to_string()),
                ("page", page.to_string()),
                ("sparkline", "false".to_string()),
            ],
        )
        .await
    }

    /// GET /coins/{id}/market_chart
    ///
    /// USD price history for the last `days` days. Only the `prices` field is kept.
    pub async fn get_market_chart(&self, coin_id: &str, days: u32) -> Result<HistoricalSeries, ApiError> {
        let coin_id = coin_id.trim();
        if coin_id.is_empty() || coin_id.contains(&['/', '?', '#'][..]) {
            return Err(ApiError::BadRequest(format!("Invalid coin id: '{}'", coin_id)));
        }
        if days == 0 {
            return Err(ApiError::BadRequest("days must be positive".to_string()));
        }

        self.get_json(
            &format!("/coins/{}/market_chart", coin_id),
            &[
                ("vs_currency", Self::VS_CURRENCY.to_string()),
                ("days", days.to_string()),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const MARKETS_BODY: &str = r#"[
        {"id":"bitcoin","symbol":"btc","name":"Bitcoin","image":"https://img/btc.png",
         "current_price":64000.5,"market_cap":1260000000000,"price_change_percentage_24h":-1.25},
        {"id":"ethereum","symbol":"eth","name":"Ethereum","image":"https://img/eth.png",
         "current_price":3100.0,"market_cap":372000000000,"price_change_percentage_24h":null}
    ]"#;

    #[tokio::test]
    async fn test_get_markets_sends_ranking_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
                Matcher::UrlEncoded("order".into(), "market_cap_desc".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("sparkline".into(), "false".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(MARKETS_BODY)
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());
        let assets = client.get_markets(2, 1).await.unwrap();

        mock.assert_async().await;
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].id, "bitcoin");
        assert_eq!(assets[0].market_cap, Some(1_260_000_000_000.0));
        assert_eq!(assets[1].price_change_percentage_24h, None);
        assert_eq!(assets[1].day_change_percent(), 0.0);
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .match_header("x-cg-demo-api-key", "demo-key")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(Some("demo-key".to_string()), server.url());
        let assets = client.get_markets(10, 1).await.unwrap();

        mock.assert_async().await;
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_get_market_chart_decodes_prices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/bitcoin/market_chart")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("vs_currency".into(), "usd".into()),
                Matcher::UrlEncoded("days".into(), "30".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"prices":[[1700000000000,100.0],[1700086400000,110.0]],"market_caps":[[1700000000000,1.0]]}"#)
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());
        let series = client.get_market_chart("bitcoin", 30).await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.last_price(), Some(110.0));
    }

    #[tokio::test]
    async fn test_status_codes_map_to_errors() {
        let mut server = mockito::Server::new_async().await;
        let _not_found = server
            .mock("GET", "/coins/nope/market_chart")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"coin not found"}"#)
            .create_async()
            .await;
        let _limited = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "5")
            .with_body(r#"{"status":{"error_code":429,"error_message":"slow down"}}"#)
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());

        assert_eq!(
            client.get_market_chart("nope", 30).await.unwrap_err(),
            ApiError::NotFound("coin not found".to_string())
        );
        assert_eq!(
            client.get_markets(10, 1).await.unwrap_err(),
            ApiError::RateLimited { retry_after: 5000 }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/coins/markets")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = CoinGeckoClient::with_base_url(None, server.url());
        let err = client.get_markets(10, 1).await.unwrap_err();

        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[tokio::test]
    async fn test_invalid_arguments_rejected_without_request() {
        let client = CoinGeckoClient::with_base_url(None, "http://127.0.0.1:9".to_string());

        assert!(matches!(client.get_market_chart("a/b", 30).await, Err(ApiError::BadRequest(_))));
        assert!(matches!(client.get_market_chart("bitcoin", 0).await, Err(ApiError::BadRequest(_))));
        assert!(matches!(client.get_markets(0, 1).await, Err(ApiError::BadRequest(_))));
    }
}
