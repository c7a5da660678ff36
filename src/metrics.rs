//! Prometheus metrics for the HTTP surface and the refresh pipeline.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
    pub refresh_passes_total: IntCounter,
    pub refresh_duration_seconds: Histogram,
    pub records_dropped_total: IntCounter,
    pub symbols_admitted_total: IntCounter,
    pub enrichment_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let refresh_passes_total = IntCounter::new(
            "refresh_passes_total",
            "Completed pipeline refresh passes",
        )?;
        let refresh_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "refresh_duration_seconds",
            "Duration of one full pipeline pass in seconds",
        ))?;
        let records_dropped_total = IntCounter::new(
            "records_dropped_total",
            "Raw snapshot records dropped by admission filters or as malformed",
        )?;
        let symbols_admitted_total = IntCounter::new(
            "symbols_admitted_total",
            "Snapshot records admitted into the pipeline",
        )?;
        let enrichment_failures_total = IntCounter::new(
            "enrichment_failures_total",
            "Enrichment lookups that failed or timed out (soft failures)",
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(refresh_passes_total.clone()))?;
        registry.register(Box::new(refresh_duration_seconds.clone()))?;
        registry.register(Box::new(records_dropped_total.clone()))?;
        registry.register(Box::new(symbols_admitted_total.clone()))?;
        registry.register(Box::new(enrichment_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
            refresh_passes_total,
            refresh_duration_seconds,
            records_dropped_total,
            symbols_admitted_total,
            enrichment_failures_total,
        })
    }

    /// Export all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics are not valid UTF-8: {}", e)))
    }
}
