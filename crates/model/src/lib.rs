//! Plain telemetry data shared by the GT7 ingest crates and whatever consumes them.

mod gear;
mod lap_time;
mod record;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use gear::Gear;
pub use lap_time::LapTime;
pub use record::*;

/// A point on the track map, in the simulator's ground plane.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

/// Read-only view of the session state, published alongside every record.
///
/// The position trail is shared with the tracker; sinks that hold on to a
/// snapshot keep that version of the trail alive and never see later samples.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Changes every time the session restarts.
    #[serde(with = "uuid::serde::simple")]
    pub session_id: Uuid,
    pub current_lap: i16,
    /// Elapsed time on the current lap, zero while not racing.
    pub lap_time: LapTime,
    #[serde(default)]
    pub position_history: Arc<Vec<Point2>>,
    /// Datagrams received per second, valid or not.
    #[serde(default)]
    pub rx_rate_hz: f64,
}

impl SessionSnapshot {
    pub fn is_racing(&self) -> bool {
        self.current_lap > 0
    }
}
