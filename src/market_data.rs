//! Stock time series retrieval from Alpha Vantage.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Granularity of a requested time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    #[serde(rename = "TIME_SERIES_INTRADAY")]
    Intraday,
    #[serde(rename = "TIME_SERIES_DAILY")]
    Daily,
    #[serde(rename = "TIME_SERIES_WEEKLY")]
    Weekly,
    #[serde(rename = "TIME_SERIES_MONTHLY")]
    Monthly,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 4] = [
        SeriesKind::Intraday,
        SeriesKind::Daily,
        SeriesKind::Weekly,
        SeriesKind::Monthly,
    ];

    /// The provider's `function` parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Intraday => "TIME_SERIES_INTRADAY",
            SeriesKind::Daily => "TIME_SERIES_DAILY",
            SeriesKind::Weekly => "TIME_SERIES_WEEKLY",
            SeriesKind::Monthly => "TIME_SERIES_MONTHLY",
        }
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One market-data request as the assistant phrased it.
///
/// `function` is forwarded verbatim; the tool schema is the only place the
/// allowed series kinds are enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuery {
    pub function: String,
    pub symbol: String,
}

impl StockQuery {
    pub fn new(kind: SeriesKind, symbol: impl Into<String>) -> Self {
        Self {
            function: kind.as_str().to_string(),
            symbol: symbol.into(),
        }
    }
}

#[async_trait]
pub trait StockDataSource: Send + Sync {
    async fn fetch(&self, query: &StockQuery) -> Result<Value>;
}

#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AlphaVantageClient({})", self.base_url)
    }
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Configuration {
                name: "ALPHA_VANTAGE_API_KEY",
            });
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: ALPHA_VANTAGE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl StockDataSource for AlphaVantageClient {
    /// Issues a single GET; no retries and no caching.
    async fn fetch(&self, query: &StockQuery) -> Result<Value> {
        log::debug!(
            "Alpha Vantage Request {} {}",
            query.function,
            query.symbol
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", query.function.as_str()),
                ("symbol", query.symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        log::debug!("Alpha Vantage Response {}", status.as_str());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AlphaVantageClient {
        AlphaVantageClient::new("demo-key")
            .unwrap()
            .with_base_url(format!("{}/query", server.uri()))
    }

    #[tokio::test]
    async fn each_series_kind_is_one_get() {
        for kind in SeriesKind::ALL {
            let server = MockServer::start().await;
            let body = json!({ "Meta Data": { "1. Information": kind.as_str() } });
            Mock::given(method("GET"))
                .and(path("/query"))
                .and(query_param("function", kind.as_str()))
                .and(query_param("symbol", "IBM"))
                .and(query_param("apikey", "demo-key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
                .expect(1)
                .mount(&server)
                .await;

            let value = client_for(&server)
                .fetch(&StockQuery::new(kind, "IBM"))
                .await
                .unwrap();
            assert_eq!(value, body);
        }
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let error = client_for(&server)
            .fetch(&StockQuery::new(SeriesKind::Daily, "AAPL"))
            .await
            .unwrap_err();
        match error {
            Error::Transport { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn function_is_forwarded_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("function", "TIME_SERIES_DAILY_ADJUSTED"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let query = StockQuery {
            function: "TIME_SERIES_DAILY_ADJUSTED".to_string(),
            symbol: "AAPL".to_string(),
        };
        client_for(&server).fetch(&query).await.unwrap();
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let error = AlphaVantageClient::new("  ").unwrap_err();
        assert!(matches!(
            error,
            Error::Configuration {
                name: "ALPHA_VANTAGE_API_KEY"
            }
        ));
    }

    #[test]
    fn series_kind_wire_names() {
        assert_eq!(
            serde_json::to_value(SeriesKind::Monthly).unwrap(),
            json!("TIME_SERIES_MONTHLY")
        );
        assert_eq!(SeriesKind::Intraday.to_string(), "TIME_SERIES_INTRADAY");
    }
}
