//! News source: recent articles per symbol.

use crate::error::ScannerError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The source caps results; we never ask for more than this.
pub const MAX_ARTICLES_PER_PULL: usize = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "published_utc")]
    pub published_at: DateTime<Utc>,
    #[serde(default, rename = "article_url")]
    pub url: Option<String>,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Up to [`MAX_ARTICLES_PER_PULL`] recent articles for a symbol.
    async fn recent_articles(&self, symbol: &str) -> Result<Vec<NewsArticle>, ScannerError>;
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsArticle>,
}

pub struct HttpNewsClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpNewsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("news http client");
        Self::with_client(base_url, api_key, client)
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }
}

#[async_trait]
impl NewsProvider for HttpNewsClient {
    async fn recent_articles(&self, symbol: &str) -> Result<Vec<NewsArticle>, ScannerError> {
        let url = format!("{}/v2/reference/news", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ticker", symbol),
                ("limit", &MAX_ARTICLES_PER_PULL.to_string()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ScannerError::upstream("news", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::upstream(
                "news",
                format!("HTTP {} for {}", status, symbol),
            ));
        }

        let body: NewsResponse = response
            .json()
            .await
            .map_err(|e| ScannerError::upstream("news", e.to_string()))?;

        debug!(symbol = %symbol, count = body.results.len(), "fetched news articles");
        Ok(body.results)
    }
}
