//! Environment-based configuration.
//!
//! Everything the pipeline treats as tunable lives here. Missing
//! credentials or unparseable endpoints are a startup failure
//! (`ScannerError::Configuration`), never a runtime concern.

use crate::error::ScannerError;
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::env;
use std::time::Duration;
use url::Url;

/// Deployment environment, used by the logging setup.
pub fn get_environment() -> String {
    env::var("GAPSCAN_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the market-snapshot source (gainers/losers, bars).
    pub snapshot_base_url: String,
    pub snapshot_api_key: String,
    /// Base URL of the news source.
    pub news_base_url: String,
    pub news_api_key: String,
    /// Base URL of the float source (batched symbol -> float-in-millions).
    pub float_base_url: String,
    /// Scheduler tick interval while the session is active.
    pub tick_interval: Duration,
    /// Per-call budget for enrichment lookups. Short relative to the
    /// tick interval so one slow symbol never stalls the pass.
    pub enrichment_timeout: Duration,
    /// Chance per tick that the batched float refresh fires. The float
    /// source is rate-sensitive, so refreshes are probabilistic rather
    /// than every cycle.
    pub float_refresh_probability: f64,
    pub exchange_timezone: Tz,
    pub session_open: NaiveTime,
    pub session_close: NaiveTime,
    pub http_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_base_url: "https://api.polygon.io".to_string(),
            snapshot_api_key: String::new(),
            news_base_url: "https://api.polygon.io".to_string(),
            news_api_key: String::new(),
            float_base_url: "http://localhost:5090".to_string(),
            tick_interval: Duration::from_secs(10),
            enrichment_timeout: Duration::from_millis(1500),
            float_refresh_probability: 0.25,
            exchange_timezone: chrono_tz::America::New_York,
            session_open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            session_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            http_port: 8080,
        }
    }
}

impl Config {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> Result<Self, ScannerError> {
        let defaults = Self::default();

        let snapshot_api_key = require_env("GAPSCAN_SNAPSHOT_API_KEY")?;
        let news_api_key =
            env::var("GAPSCAN_NEWS_API_KEY").unwrap_or_else(|_| snapshot_api_key.clone());

        let snapshot_base_url = env_or("GAPSCAN_SNAPSHOT_BASE_URL", &defaults.snapshot_base_url);
        let news_base_url = env_or("GAPSCAN_NEWS_BASE_URL", &defaults.news_base_url);
        let float_base_url = env_or("GAPSCAN_FLOAT_BASE_URL", &defaults.float_base_url);
        for (name, value) in [
            ("GAPSCAN_SNAPSHOT_BASE_URL", &snapshot_base_url),
            ("GAPSCAN_NEWS_BASE_URL", &news_base_url),
            ("GAPSCAN_FLOAT_BASE_URL", &float_base_url),
        ] {
            Url::parse(value).map_err(|e| {
                ScannerError::Configuration(format!("{} is not a valid URL: {}", name, e))
            })?;
        }

        let tick_interval = Duration::from_secs(parse_env("GAPSCAN_TICK_INTERVAL_SECS", 10)?);
        let enrichment_timeout =
            Duration::from_millis(parse_env("GAPSCAN_ENRICHMENT_TIMEOUT_MS", 1500)?);
        let float_refresh_probability =
            parse_env("GAPSCAN_FLOAT_REFRESH_PROBABILITY", defaults.float_refresh_probability)?;
        if !(0.0..=1.0).contains(&float_refresh_probability) {
            return Err(ScannerError::Configuration(
                "GAPSCAN_FLOAT_REFRESH_PROBABILITY must be within [0, 1]".to_string(),
            ));
        }

        let exchange_timezone: Tz = match env::var("GAPSCAN_EXCHANGE_TIMEZONE") {
            Ok(raw) => raw.parse().map_err(|_| {
                ScannerError::Configuration(format!("unknown timezone '{}'", raw))
            })?,
            Err(_) => defaults.exchange_timezone,
        };

        let http_port = parse_env("PORT", defaults.http_port)?;

        Ok(Self {
            snapshot_base_url,
            snapshot_api_key,
            news_base_url,
            news_api_key,
            float_base_url,
            tick_interval,
            enrichment_timeout,
            float_refresh_probability,
            exchange_timezone,
            session_open: defaults.session_open,
            session_close: defaults.session_close,
            http_port,
        })
    }
}

fn require_env(name: &str) -> Result<String, ScannerError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScannerError::Configuration(format!("{} is required", name)))
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ScannerError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ScannerError::Configuration(format!("{} is not a valid value", name))),
        Err(_) => Ok(default),
    }
}
