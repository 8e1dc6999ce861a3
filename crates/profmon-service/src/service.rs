use crate::ingest::{apply_rows, IngestState, RowStats};
use crate::publish::{publish_profiles, PublishReport};
use crate::{register_profiles, ServiceError};
use device_registry::{
    build_registry, BuildOutcome, DeviceRegistry, MetricsHub, NameTranslator, ScreenRecord,
};
use profile_transport::{
    data_rows, decode_rows, ProfileSubscriber, Timestamp, TransportError,
};
use std::time::Duration;
use tracing::{debug, info, warn};
use variable_server::VariableServer;

// Pause before receiving again after a channel (not content) error.
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Summary of one completed ingestion cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub received_at: Option<Timestamp>,
    /// Rows in the buffer, boundary rows included.
    pub total_rows: usize,
    pub rows: RowStats,
    pub published: PublishReport,
}

/// Owns the device state and the variable server for the process lifetime.
/// Profiles are only mutated from `run`/`run_cycle`, one cycle at a time.
pub struct ProfMonService<S: VariableServer> {
    names: NameTranslator,
    registry: DeviceRegistry,
    server: S,
    metrics: MetricsHub,
    state: IngestState,
}

impl<S: VariableServer> ProfMonService<S> {
    /// Build schemas and profiles from the screen records and register their
    /// variables with `server`.
    pub fn new(records: &[ScreenRecord], mut server: S) -> Result<Self, ServiceError> {
        let metrics = MetricsHub::new().map_err(ServiceError::Metrics)?;
        let names = NameTranslator::from_records(records);
        let BuildOutcome { registry, rejected } = build_registry(records);
        register_profiles(&mut server, &registry)?;

        metrics.svc.devices_registered.set(registry.len() as i64);
        metrics.svc.devices_rejected.set(rejected.len() as i64);
        info!(
            devices = registry.len(),
            rejected = rejected.len(),
            "profile monitor service initialized"
        );
        Ok(Self {
            names,
            registry,
            server,
            metrics,
            state: IngestState::Idle,
        })
    }

    pub fn names(&self) -> &NameTranslator {
        &self.names
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn metrics(&self) -> &MetricsHub {
        &self.metrics
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    /// Receive, decode, apply and publish one metadata+payload pair.
    pub async fn run_cycle<P: ProfileSubscriber + ?Sized>(
        &mut self,
        sub: &mut P,
    ) -> Result<CycleReport, TransportError> {
        self.state = IngestState::AwaitingMetadata;
        debug!("waiting for profile data");
        let md = sub.recv_metadata().await?;
        debug!(dtype = %md.dtype, shape = ?md.shape, "profile data incoming");

        self.state = IngestState::AwaitingPayload;
        let payload = sub.recv_payload().await?;

        self.state = IngestState::Computing;
        let rows = decode_rows(&md, &payload)?;
        let stats = apply_rows(&self.names, &mut self.registry, data_rows(&rows));

        self.state = IngestState::Publishing;
        let published = publish_profiles(&mut self.server, &self.registry).await;

        let m = &self.metrics.svc;
        m.cycles.inc();
        m.rows_processed.inc_by(stats.applied as u64);
        m.rows_skipped.inc_by(stats.skipped() as u64);
        m.publish_writes.inc_by(published.written as u64);
        m.publish_failures.inc_by(published.failed as u64);

        self.state = IngestState::AwaitingMetadata;
        Ok(CycleReport {
            received_at: md.received_at,
            total_rows: rows.len(),
            rows: stats,
            published,
        })
    }

    /// Run cycles until the data channel closes. Undecodable messages and
    /// receive errors abandon the current cycle only. Returns the number of
    /// completed cycles.
    pub async fn run<P: ProfileSubscriber + ?Sized>(&mut self, sub: &mut P) -> u64 {
        let mut completed = 0u64;
        loop {
            match self.run_cycle(sub).await {
                Ok(report) => {
                    completed += 1;
                    info!(
                        received_at = ?report.received_at.map(|t| t.to_string()),
                        rows = report.total_rows,
                        applied = report.rows.applied,
                        skipped = report.rows.skipped(),
                        written = report.published.written,
                        failed = report.published.failed,
                        "profile cycle complete"
                    );
                }
                Err(TransportError::Closed) => {
                    info!(cycles = completed, "profile channel closed");
                    self.state = IngestState::Idle;
                    return completed;
                }
                Err(e) if e.is_decode() => {
                    self.metrics.svc.decode_failures.inc();
                    warn!(error = %e, "dropping undecodable profile message");
                    sub.discard_pending();
                }
                Err(e) => {
                    warn!(error = %e, "profile receive failed");
                    sub.discard_pending();
                    tokio::time::sleep(RECV_RETRY_DELAY).await;
                }
            }
        }
    }
}
