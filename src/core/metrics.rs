use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

/// Prometheus metrics for the relay, owned per process and injected where needed
pub struct RelayMetrics {
    registry: Registry,

    // Gauges
    pub active_monitors: IntGauge,

    // Counters
    pub polls_total: IntCounter,
    pub fetch_failures_total: IntCounter,
    pub notifications_total: IntCounter,
    pub delivery_failures_total: IntCounter,
}

impl RelayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let active_monitors = IntGauge::with_opts(Opts::new(
            "boardrelay_active_monitors",
            "Number of boards currently being monitored",
        ))?;

        let polls_total = IntCounter::with_opts(Opts::new(
            "boardrelay_polls_total",
            "Total number of board snapshot polls",
        ))?;

        let fetch_failures_total = IntCounter::with_opts(Opts::new(
            "boardrelay_fetch_failures_total",
            "Total number of failed snapshot fetches",
        ))?;

        let notifications_total = IntCounter::with_opts(Opts::new(
            "boardrelay_notifications_total",
            "Total number of settled-change notifications delivered",
        ))?;

        let delivery_failures_total = IntCounter::with_opts(Opts::new(
            "boardrelay_delivery_failures_total",
            "Total number of notifications that could not be delivered",
        ))?;

        registry.register(Box::new(active_monitors.clone()))?;
        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(fetch_failures_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(delivery_failures_total.clone()))?;

        Ok(Self {
            registry,
            active_monitors,
            polls_total,
            fetch_failures_total,
            notifications_total,
            delivery_failures_total,
        })
    }

    /// Prometheus text exposition of every metric
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
