use device_registry::DeviceRegistry;
use tracing::{debug, warn};
use variable_server::{Value, VariableServer};

/// Outcome of one publication pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub written: usize,
    pub failed: usize,
    /// Image variable not exposed by the server.
    pub skipped: usize,
}

/// Write every device image in registry order. A failed write is logged and
/// counted; the pass always continues with the next device.
pub async fn publish_profiles<S: VariableServer + ?Sized>(
    server: &mut S,
    registry: &DeviceRegistry,
) -> PublishReport {
    let mut report = PublishReport::default();
    for profile in registry.iter() {
        let pv = profile.schema.image_pv();
        if !server.contains(&pv) {
            report.skipped += 1;
            continue;
        }
        match server.write(&pv, Value::Array(profile.image.clone())).await {
            Ok(()) => {
                debug!(device = %profile.device_name, pv = %pv, "published profile");
                report.written += 1;
            }
            Err(e) => {
                warn!(device = %profile.device_name, pv = %pv, error = %e, "profile publish failed");
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::two_screens;
    use crate::register_profiles;
    use async_trait::async_trait;
    use device_registry::build_registry;
    use variable_server::{MemoryServer, Result, ServerError, VariableSpec};

    /// Memory server that refuses writes to one variable.
    struct RefusingServer {
        inner: MemoryServer,
        refuse: String,
    }

    #[async_trait]
    impl VariableServer for RefusingServer {
        fn register(&mut self, spec: VariableSpec) -> Result<()> {
            self.inner.register(spec)
        }

        fn contains(&self, name: &str) -> bool {
            self.inner.contains(name)
        }

        async fn write(&mut self, name: &str, value: Value) -> Result<()> {
            if name == self.refuse {
                return Err(ServerError::Backend("write refused".into()));
            }
            self.inner.write(name, value).await
        }
    }

    #[tokio::test]
    async fn test_publish_writes_every_image() {
        let mut registry = build_registry(&two_screens()).registry;
        let mut srv = MemoryServer::new();
        register_profiles(&mut srv, &registry).unwrap();
        if let Some(p) = registry.get_mut("DEV2") {
            p.fill_image(1.5);
        }

        let report = publish_profiles(&mut srv, &registry).await;
        assert_eq!(
            report,
            PublishReport {
                written: 2,
                failed: 0,
                skipped: 0
            }
        );
        assert_eq!(srv.get("DEV2:IMAGE"), Some(&Value::Array(vec![1.5; 4])));
        assert_eq!(srv.write_count("DEV1:IMAGE"), 1);
    }

    #[tokio::test]
    async fn test_failure_on_one_device_does_not_stop_others() {
        let mut registry = build_registry(&two_screens()).registry;
        let mut srv = RefusingServer {
            inner: MemoryServer::new(),
            refuse: "DEV1:IMAGE".into(),
        };
        register_profiles(&mut srv, &registry).unwrap();
        for dev in ["DEV1", "DEV2"] {
            if let Some(p) = registry.get_mut(dev) {
                p.fill_image(7.0);
            }
        }

        let report = publish_profiles(&mut srv, &registry).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.written, 1);
        assert_eq!(
            srv.inner.get("DEV2:IMAGE"),
            Some(&Value::Array(vec![7.0; 4]))
        );
        assert_eq!(
            srv.inner.get("DEV1:IMAGE"),
            Some(&Value::Array(vec![0.0; 6]))
        );
    }

    #[tokio::test]
    async fn test_unexposed_image_is_skipped() {
        let registry = build_registry(&two_screens()).registry;
        let mut srv = MemoryServer::new();
        let report = publish_profiles(&mut srv, &registry).await;
        assert_eq!(report.skipped, 2);
        assert_eq!(report.written, 0);
    }
}
