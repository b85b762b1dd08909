//! Keep-alive datagrams that make the console keep streaming to us.
//!
//! The console only sends telemetry to hosts that pinged it recently, and it
//! never answers the ping, so every send here is best effort.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{debug, trace};

/// Requests the extended packet variant.
pub const HEARTBEAT: &[u8] = b"B";

pub const DEFAULT_HEARTBEAT_EVERY: u32 = 100;

pub struct KeepAlive {
    target: SocketAddr,
    every: u32,
    since_last: u32,
}

impl KeepAlive {
    pub fn new(target: SocketAddr, every: u32) -> Self {
        Self {
            target,
            every: every.max(1),
            since_last: 0,
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Count one received datagram, valid or not. Returns true when a
    /// liveness heartbeat is due, and starts counting again.
    pub fn on_datagram(&mut self) -> bool {
        self.since_last += 1;
        if self.since_last >= self.every {
            self.since_last = 0;
            true
        } else {
            false
        }
    }

    pub async fn send(&self, socket: &UdpSocket) {
        match socket.send_to(HEARTBEAT, self.target).await {
            Ok(_) => trace!(target_addr = %self.target, "heartbeat sent"),
            Err(e) => debug!(target_addr = %self.target, error = %e, "heartbeat send failed"),
        }
    }

    /// Heartbeat after a receive failure or timeout.
    pub async fn resync(&mut self, socket: &UdpSocket) {
        self.since_last = 0;
        self.send(socket).await;
    }
}
