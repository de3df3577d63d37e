use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::error::AppError;

pub const OUTCOME_OK: &str = "ok";

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub operations_total: IntCounterVec,
    pub operation_latency_seconds: HistogramVec,
    pub available_drivers: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new(
                "coordinator_operations_total",
                "Coordinator operations by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .expect("valid coordinator_operations_total metric");

        let operation_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "coordinator_operation_latency_seconds",
                "Latency of coordinator operations in seconds",
            ),
            &["operation"],
        )
        .expect("valid coordinator_operation_latency_seconds metric");

        let available_drivers =
            IntGauge::new("available_drivers", "Drivers currently available for rides")
                .expect("valid available_drivers metric");

        registry
            .register(Box::new(operations_total.clone()))
            .expect("register coordinator_operations_total");
        registry
            .register(Box::new(operation_latency_seconds.clone()))
            .expect("register coordinator_operation_latency_seconds");
        registry
            .register(Box::new(available_drivers.clone()))
            .expect("register available_drivers");

        Self {
            registry,
            operations_total,
            operation_latency_seconds,
            available_drivers,
        }
    }

    /// Records one finished operation. `outcome` is [`OUTCOME_OK`] or an
    /// error kind.
    pub fn observe(&self, operation: &str, outcome: &str, elapsed_seconds: f64) {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.operation_latency_seconds
            .with_label_values(&[operation])
            .observe(elapsed_seconds);
    }

    pub fn encode(&self) -> Result<String, AppError> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| AppError::Internal(format!("failed to encode metrics: {err}")))?;

        String::from_utf8(buffer)
            .map_err(|err| AppError::Internal(format!("metrics are not valid utf8: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{Metrics, OUTCOME_OK};

    #[test]
    fn observed_operations_show_up_in_the_export() {
        let metrics = Metrics::new();
        metrics.observe("accept_ride", OUTCOME_OK, 0.001);
        metrics.observe("accept_ride", "unavailable", 0.002);
        metrics.available_drivers.set(3);

        let text = metrics.encode().unwrap();
        assert!(text.contains(
            "coordinator_operations_total{operation=\"accept_ride\",outcome=\"ok\"} 1"
        ));
        assert!(text.contains("outcome=\"unavailable\""));
        assert!(text.contains("available_drivers 3"));
    }
}
