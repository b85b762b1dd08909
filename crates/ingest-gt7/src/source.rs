use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::Context;
use gt7_ingest_core::{IngestError, IngestStats, Sinks, TelemetrySource};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Gt7Config, RECV_BUFFER_LEN};
use crate::heartbeat::KeepAlive;
use crate::pipeline::Pipeline;
use crate::session::SessionTracker;

pub struct Gt7Source {
    cfg: Gt7Config,
}

impl Gt7Source {
    pub fn new(cfg: Gt7Config) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &Gt7Config {
        &self.cfg
    }

    /// Validate the config and bind the receive socket. Bind failures are
    /// fatal; everything after this point is retried.
    pub async fn bind(&self) -> Result<Gt7Receiver, IngestError> {
        self.cfg.validate()?;
        let addr = self.cfg.bind_addr()?;
        let target = self.cfg.heartbeat_target()?;
        let socket = UdpSocket::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        Ok(Gt7Receiver {
            socket,
            keepalive: KeepAlive::new(target, self.cfg.heartbeat_every),
            recv_timeout: self.cfg.recv_timeout,
            sample_interval: self.cfg.sample_interval,
        })
    }
}

#[async_trait::async_trait]
impl TelemetrySource for Gt7Source {
    async fn run(
        &self,
        sinks: Sinks,
        shutdown: CancellationToken,
    ) -> Result<IngestStats, IngestError> {
        self.bind().await?.run(sinks, shutdown).await
    }
}

/// A bound ingestion loop, ready to run.
pub struct Gt7Receiver {
    socket: UdpSocket,
    keepalive: KeepAlive,
    recv_timeout: Duration,
    sample_interval: Duration,
}

impl Gt7Receiver {
    pub fn local_addr(&self) -> Result<SocketAddr, IngestError> {
        Ok(self.socket.local_addr().context("local_addr")?)
    }

    pub fn spawn(
        self,
        sinks: Sinks,
        shutdown: CancellationToken,
    ) -> JoinHandle<Result<IngestStats, IngestError>> {
        tokio::spawn(self.run(sinks, shutdown))
    }

    /// Receive until `shutdown` is cancelled. Per-datagram and socket
    /// errors are logged and recovered from, never returned.
    pub async fn run(
        mut self,
        sinks: Sinks,
        shutdown: CancellationToken,
    ) -> Result<IngestStats, IngestError> {
        let mut pipeline = Pipeline::new(SessionTracker::new(self.sample_interval), sinks);
        let mut buf = vec![0u8; RECV_BUFFER_LEN];

        info!(
            local = ?self.socket.local_addr().ok(),
            console = %self.keepalive.target(),
            "gt7 ingest started"
        );
        self.keepalive.send(&self.socket).await;

        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                r = time::timeout(self.recv_timeout, self.socket.recv_from(&mut buf)) => match r {
                    Ok(Ok((len, _from))) => Received::Datagram(len),
                    Ok(Err(e)) => Received::Failed(e),
                    Err(_) => Received::TimedOut,
                },
            };
            self.handle(received, &mut pipeline, &buf).await;
        }

        let stats = pipeline.stats();
        info!(
            received = stats.received,
            published = stats.published,
            rejected = stats.rejected,
            "gt7 ingest stopped"
        );
        Ok(stats)
    }

    async fn handle(&mut self, received: Received, pipeline: &mut Pipeline, buf: &[u8]) {
        match received {
            Received::Datagram(len) => {
                // failures are already counted and logged by the pipeline
                let _ = pipeline.process(&buf[..len], Instant::now());
                if self.keepalive.on_datagram() {
                    self.keepalive.send(&self.socket).await;
                }
            }
            Received::Failed(e) => {
                warn!(error = %e, "receive failed, resending heartbeat");
                self.keepalive.resync(&self.socket).await;
            }
            Received::TimedOut => {
                debug!(timeout = ?self.recv_timeout, "no telemetry, resending heartbeat");
                self.keepalive.resync(&self.socket).await;
            }
        }
    }
}

/// Outcome of one bounded receive.
#[derive(Debug)]
enum Received {
    Datagram(usize),
    Failed(std::io::Error),
    TimedOut,
}
