use std::sync::Arc;

use gt7_model::{SessionSnapshot, TelemetryRecord};
use parking_lot::Mutex;
use tracing::debug;

/// A consumer of decoded telemetry, such as a terminal view or a web push channel.
///
/// Called on the ingestion thread once per record; implementations must not block.
pub trait TelemetrySink: Send {
    fn on_record(&mut self, record: &TelemetryRecord, session: &SessionSnapshot);
}

impl<F> TelemetrySink for F
where
    F: FnMut(&TelemetryRecord, &SessionSnapshot) + Send,
{
    fn on_record(&mut self, record: &TelemetryRecord, session: &SessionSnapshot) {
        self(record, session)
    }
}

/// The set of sinks a source publishes to, in registration order.
#[derive(Default)]
pub struct Sinks {
    inner: Vec<Box<dyn TelemetrySink>>,
}

impl Sinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.register(sink);
        self
    }

    pub fn register(&mut self, sink: impl TelemetrySink + 'static) {
        self.inner.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn publish(&mut self, record: &TelemetryRecord, session: &SessionSnapshot) {
        for sink in &mut self.inner {
            sink.on_record(record, session);
        }
    }
}

/// Owned copy of one publication, as handed to channel and slot consumers.
#[derive(Debug, Clone)]
pub struct TelemetryUpdate {
    pub record: Arc<TelemetryRecord>,
    pub session: SessionSnapshot,
}

impl TelemetryUpdate {
    fn new(record: &TelemetryRecord, session: &SessionSnapshot) -> Self {
        Self {
            record: Arc::new(record.clone()),
            session: session.clone(),
        }
    }
}

pub type TelemetryTx = crossbeam_channel::Sender<TelemetryUpdate>;
pub type TelemetryRx = crossbeam_channel::Receiver<TelemetryUpdate>;

pub fn channel() -> (TelemetryTx, TelemetryRx) {
    crossbeam_channel::unbounded()
}

/// Forwards every update over a crossbeam channel to another thread.
pub struct ChannelSink {
    tx: TelemetryTx,
    disconnected: bool,
}

impl ChannelSink {
    pub fn new(tx: TelemetryTx) -> Self {
        Self { tx, disconnected: false }
    }
}

impl TelemetrySink for ChannelSink {
    fn on_record(&mut self, record: &TelemetryRecord, session: &SessionSnapshot) {
        if self.tx.send(TelemetryUpdate::new(record, session)).is_err() && !self.disconnected {
            debug!("telemetry channel receiver dropped, discarding further updates");
            self.disconnected = true;
        }
    }
}

/// Shared slot holding the most recent update, for consumers that poll.
#[derive(Clone, Default)]
pub struct Latest {
    slot: Arc<Mutex<Option<TelemetryUpdate>>>,
}

impl Latest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<TelemetryUpdate> {
        self.slot.lock().clone()
    }

    pub fn sink(&self) -> LatestSink {
        LatestSink { slot: self.slot.clone() }
    }
}

pub struct LatestSink {
    slot: Arc<Mutex<Option<TelemetryUpdate>>>,
}

impl TelemetrySink for LatestSink {
    fn on_record(&mut self, record: &TelemetryRecord, session: &SessionSnapshot) {
        let update = TelemetryUpdate::new(record, session);
        *self.slot.lock() = Some(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt7_model::{Gear, LapTime, Rotation, SimulatorFlags, Vec3, Wheels};
    use uuid::Uuid;

    fn record(packet_id: i32) -> TelemetryRecord {
        TelemetryRecord {
            packet_len: 316,
            packet_id,
            position: Vec3::default(),
            velocity: Vec3::default(),
            rotation: Rotation::default(),
            rotation_unknown: 0.0,
            angular_velocity: Vec3::default(),
            ride_height: 0.0,
            rpm: 4000.0,
            rev_warning_rpm: 7000,
            rev_limiter_rpm: 7500,
            speed_mps: 30.0,
            estimated_top_speed_kph: 280,
            throttle: 100.0,
            brake: 0.0,
            gear: Gear::Forward(3),
            suggested_gear: None,
            clutch: 0.0,
            clutch_engagement: 1.0,
            rpm_after_clutch: 4000.0,
            boost_raw: 1.0,
            fuel_remaining: 50.0,
            fuel_capacity: 100.0,
            oil_pressure: 4.0,
            water_temp_c: 85.0,
            oil_temp_c: 100.0,
            tyre_temp_c: Wheels::default(),
            wheel_angular_speed: Wheels::default(),
            tyre_diameter: Wheels::default(),
            current_lap: 1,
            total_laps: 3,
            best_lap: None,
            last_lap: None,
            time_of_day_ms: 0,
            race_position: 1,
            total_positions: 16,
            reverse_gear_ratio: 3.0,
            gear_ratios: [0.0; 8],
            car_id: 1234,
            flags: SimulatorFlags::default(),
            wheel_rotation_rad: None,
            acceleration: None,
        }
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            session_id: Uuid::new_v4(),
            current_lap: 1,
            lap_time: LapTime::from_millis(1500),
            position_history: Arc::default(),
            rx_rate_hz: 60.0,
        }
    }

    #[test]
    fn publishes_to_every_sink_in_order() {
        let (tx, rx) = channel();
        let latest = Latest::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_closure = seen.clone();

        let mut sinks = Sinks::new()
            .with(ChannelSink::new(tx))
            .with(latest.sink())
            .with(move |r: &TelemetryRecord, _: &SessionSnapshot| {
                seen_by_closure.lock().push(r.packet_id)
            });
        assert_eq!(sinks.len(), 3);

        let snap = snapshot();
        sinks.publish(&record(7), &snap);
        sinks.publish(&record(8), &snap);

        let ids: Vec<i32> = rx.try_iter().map(|u| u.record.packet_id).collect();
        assert_eq!(ids, vec![7, 8]);
        assert_eq!(*seen.lock(), vec![7, 8]);
        let last = latest.get().unwrap();
        assert_eq!(last.record.packet_id, 8);
        assert_eq!(last.session, snap);
    }

    #[test]
    fn dropped_receiver_does_not_stop_publishing() {
        let (tx, rx) = channel();
        drop(rx);
        let latest = Latest::new();
        let mut sinks = Sinks::new().with(ChannelSink::new(tx)).with(latest.sink());

        sinks.publish(&record(1), &snapshot());
        sinks.publish(&record(2), &snapshot());
        assert_eq!(latest.get().map(|u| u.record.packet_id), Some(2));
    }

    #[test]
    fn latest_is_empty_until_first_record() {
        let latest = Latest::new();
        assert!(latest.get().is_none());
        assert!(Sinks::new().is_empty());
    }
}
