//! Error taxonomy for the scanner pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScannerError {
    /// Snapshot/news/float source unreachable, rate-limited, or
    /// returning garbage. Soft: logged, affected symbols keep their
    /// last-known state, the tick continues.
    #[error("upstream {provider} unavailable: {detail}")]
    Upstream {
        provider: &'static str,
        detail: String,
    },

    /// A raw snapshot record missing required numeric fields. The record
    /// is dropped; the rest of the batch continues.
    #[error("malformed snapshot record for '{symbol}': {reason}")]
    MalformedRecord {
        symbol: String,
        reason: &'static str,
    },

    /// Missing or invalid credentials/endpoints. Fatal at startup, never
    /// raised from the running pipeline.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ScannerError {
    pub fn upstream(provider: &'static str, detail: impl Into<String>) -> Self {
        Self::Upstream {
            provider,
            detail: detail.into(),
        }
    }
}
