use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct ServiceMetrics {
    pub devices_registered: IntGauge,
    pub devices_rejected: IntGauge,
    pub cycles: IntCounter,
    pub rows_processed: IntCounter,
    pub rows_skipped: IntCounter,
    pub decode_failures: IntCounter,
    pub publish_writes: IntCounter,
    pub publish_failures: IntCounter,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub svc: ServiceMetrics,
}

fn counter(name: &str, help: &str) -> Result<IntCounter, String> {
    IntCounter::new(name, help).map_err(|e| format!("metrics init error: {e}"))
}

fn gauge(name: &str, help: &str) -> Result<IntGauge, String> {
    IntGauge::new(name, help).map_err(|e| format!("metrics init error: {e}"))
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let svc = ServiceMetrics {
            devices_registered: gauge(
                "profmon_devices_registered",
                "Devices with a registered profile",
            )?,
            devices_rejected: gauge(
                "profmon_devices_rejected",
                "Devices skipped because of an invalid configuration",
            )?,
            cycles: counter("profmon_cycles_total", "Ingestion cycles completed")?,
            rows_processed: counter(
                "profmon_rows_processed_total",
                "Rows that updated a device profile",
            )?,
            rows_skipped: counter(
                "profmon_rows_skipped_total",
                "Rows skipped as malformed or unknown",
            )?,
            decode_failures: counter(
                "profmon_decode_failures_total",
                "Cycles abandoned because metadata or payload could not be decoded",
            )?,
            publish_writes: counter(
                "profmon_publish_writes_total",
                "Profile images written to the variable server",
            )?,
            publish_failures: counter(
                "profmon_publish_failures_total",
                "Profile image writes that failed",
            )?,
        };
        let _ = registry.register(Box::new(svc.devices_registered.clone()));
        let _ = registry.register(Box::new(svc.devices_rejected.clone()));
        let _ = registry.register(Box::new(svc.cycles.clone()));
        let _ = registry.register(Box::new(svc.rows_processed.clone()));
        let _ = registry.register(Box::new(svc.rows_skipped.clone()));
        let _ = registry.register(Box::new(svc.decode_failures.clone()));
        let _ = registry.register(Box::new(svc.publish_writes.clone()));
        let _ = registry.register(Box::new(svc.publish_failures.clone()));
        Ok(Self { registry, svc })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
