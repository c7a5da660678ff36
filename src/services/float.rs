//! Float source: batched symbol -> float-shares-in-millions lookups.

use crate::error::ScannerError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait FloatProvider: Send + Sync {
    /// Batched pull. Symbols the source does not know are simply absent
    /// from the returned map.
    async fn float_shares(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, ScannerError>;
}

pub struct HttpFloatClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpFloatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("float http client");
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl FloatProvider for HttpFloatClient {
    async fn float_shares(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, f64>, ScannerError> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/float", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.join(","))])
            .send()
            .await
            .map_err(|e| ScannerError::upstream("float", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::upstream(
                "float",
                format!("HTTP {} for {} symbols", status, symbols.len()),
            ));
        }

        let floats: HashMap<String, f64> = response
            .json()
            .await
            .map_err(|e| ScannerError::upstream("float", e.to_string()))?;

        debug!(
            requested = symbols.len(),
            resolved = floats.len(),
            "fetched float batch"
        );
        Ok(floats)
    }
}
