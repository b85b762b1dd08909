//! Sink interface and source trait for live telemetry ingestion.

mod sink;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

pub use gt7_model::{SessionSnapshot, TelemetryRecord};
pub use sink::*;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Datagram counters kept by an ingestion loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub received: u64,
    pub published: u64,
    pub rejected: u64,
}

/// Trait for any live source connector.
///
/// `run` owns the transport until `shutdown` is cancelled, publishing every
/// decoded record to `sinks` in arrival order.
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn run(
        &self,
        sinks: Sinks,
        shutdown: CancellationToken,
    ) -> Result<IngestStats, IngestError>;
}
