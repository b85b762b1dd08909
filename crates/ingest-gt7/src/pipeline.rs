//! Per-datagram processing: decrypt, decode, track, publish.

use std::time::Instant;

use gt7_ingest_core::{IngestStats, Sinks};
use gt7_model::TelemetryRecord;
use tracing::{debug, trace, warn};

use crate::cipher;
use crate::decoder;
use crate::error::PacketError;
use crate::rate::RateMeter;
use crate::session::{SessionState, SessionTracker};

/// Synchronous half of the ingestion loop. Owns the session state; a record
/// reaches the sinks only after it has been fully decoded and tracked.
pub struct Pipeline {
    tracker: SessionTracker,
    sinks: Sinks,
    stats: IngestStats,
    rate: RateMeter,
    framing_reported: bool,
}

impl Pipeline {
    pub fn new(tracker: SessionTracker, sinks: Sinks) -> Self {
        Self {
            tracker,
            sinks,
            stats: IngestStats::default(),
            rate: RateMeter::default(),
            framing_reported: false,
        }
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn rx_rate_hz(&self) -> f64 {
        self.rate.hz()
    }

    pub fn session(&self) -> &SessionState {
        self.tracker.state()
    }

    /// Handle one raw datagram received at `now`. Rejected datagrams leave
    /// the session state untouched.
    pub fn process(&mut self, raw: &[u8], now: Instant) -> Result<(), PacketError> {
        self.stats.received += 1;
        self.rate.tick(now);
        let record = match parse(raw) {
            Ok(record) => record,
            Err(e) => {
                self.stats.rejected += 1;
                self.report(&e);
                return Err(e);
            }
        };

        let mut snapshot = self.tracker.update(&record, now).snapshot(now);
        snapshot.rx_rate_hz = self.rate.hz();
        self.sinks.publish(&record, &snapshot);
        self.stats.published += 1;
        trace!(packet_id = record.packet_id, lap = record.current_lap, "record published");
        Ok(())
    }

    fn report(&mut self, e: &PacketError) {
        match e {
            PacketError::Framing { len } if !self.framing_reported => {
                self.framing_reported = true;
                warn!(
                    len,
                    "discarding datagrams that fail decryption; \
                     further failures are logged at debug level"
                );
            }
            _ => debug!(error = %e, "datagram discarded"),
        }
    }
}

fn parse(raw: &[u8]) -> Result<TelemetryRecord, PacketError> {
    let packet = cipher::decrypt(raw).ok_or(PacketError::Framing { len: raw.len() })?;
    Ok(decoder::decode(&packet)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::fixture::PacketBuilder;
    use crate::decoder::DecodeError;
    use crate::layout::*;
    use gt7_ingest_core::{channel, ChannelSink};
    use gt7_model::{Acceleration, Gear, LapTime, Vec3};
    use std::time::Duration;

    fn pipeline() -> (Pipeline, gt7_ingest_core::TelemetryRx) {
        let (tx, rx) = channel();
        let sinks = Sinks::new().with(ChannelSink::new(tx));
        (Pipeline::new(SessionTracker::default(), sinks), rx)
    }

    #[test]
    fn encrypted_datagram_decodes_to_the_encoded_values() {
        let plain = PacketBuilder::new(EXTENDED_PACKET_LEN)
            .f32(OFF_POSITION, 101.5)
            .f32(OFF_POSITION + 4, 2.25)
            .f32(OFF_POSITION + 8, -40.0)
            .f32(OFF_VELOCITY + 4, -0.5)
            .f32(OFF_RPM, 7250.0)
            .f32(OFF_SPEED, 61.0)
            .f32(OFF_FUEL_REMAINING, 33.0)
            .f32(OFF_FUEL_CAPACITY, 80.0)
            .i32(OFF_PACKET_ID, 9001)
            .lap(1)
            .i16(OFF_TOTAL_LAPS, 3)
            .i32(OFF_BEST_LAP, 92_123)
            .i32(OFF_LAST_LAP, -1)
            .u8(OFF_GEAR, 0x54)
            .u8(OFF_THROTTLE, 255)
            .u8(OFF_BRAKE, 0)
            .i32(OFF_CAR_ID, 2150)
            .f32(OFF_SWAY, 0.5)
            .f32(OFF_HEAVE, -0.125)
            .f32(OFF_SURGE, 2.0)
            .build();
        let raw = cipher::encrypt(&plain, 0x1234_5678);

        let (mut p, rx) = pipeline();
        let t0 = Instant::now();
        p.process(&raw, t0).unwrap();

        let update = rx.try_recv().unwrap();
        let r = &update.record;
        assert_eq!(r.packet_len, EXTENDED_PACKET_LEN);
        assert_eq!(r.position, Vec3 { x: 101.5, y: 2.25, z: -40.0 });
        assert_eq!(r.velocity.y, -0.5);
        assert_eq!(r.rpm, 7250.0);
        assert_eq!(r.speed_mps, 61.0);
        assert_eq!((r.fuel_remaining, r.fuel_capacity), (33.0, 80.0));
        assert_eq!(r.packet_id, 9001);
        assert_eq!((r.current_lap, r.total_laps), (1, 3));
        assert_eq!(r.best_lap, Some(LapTime::from_millis(92_123)));
        assert_eq!(r.last_lap, None);
        assert_eq!((r.gear, r.suggested_gear), (Gear::Forward(4), Some(5)));
        assert_eq!((r.throttle, r.brake), (100.0, 0.0));
        assert_eq!(r.car_id, 2150);
        assert_eq!(r.acceleration, Some(Acceleration { sway: 0.5, heave: -0.125, surge: 2.0 }));

        assert_eq!(update.session.current_lap, 1);
        assert_eq!(update.session.lap_time, LapTime::ZERO);
        assert_eq!(update.session.position_history.len(), 1);
        assert_eq!(update.session.position_history[0].y, 40.0);
        assert_eq!(p.stats(), IngestStats { received: 1, published: 1, rejected: 0 });
    }

    #[test]
    fn rejected_datagrams_do_not_touch_session_state() {
        let (mut p, rx) = pipeline();
        let t0 = Instant::now();
        let lap2 = cipher::encrypt(&PacketBuilder::new(BASE_PACKET_LEN).lap(2).build(), 1);
        p.process(&lap2, t0).unwrap();
        let lap_start = p.session().lap_start();
        let history = p.session().position_history().len();

        // garbage, a bad magic and a too-short but valid frame
        let mut bad_magic = PacketBuilder::new(BASE_PACKET_LEN).lap(1).build();
        bad_magic[0] = 0;
        let short = cipher::encrypt(&PacketBuilder::new(200).lap(1).build(), 2);

        let later = t0 + Duration::from_secs(1);
        assert_eq!(p.process(&[0u8; 10], later), Err(PacketError::Framing { len: 10 }));
        assert_eq!(
            p.process(&cipher::encrypt(&bad_magic, 3), later),
            Err(PacketError::Framing { len: BASE_PACKET_LEN })
        );
        assert_eq!(
            p.process(&short, later),
            Err(PacketError::Decode(DecodeError::TooShort { len: 200, min: BASE_PACKET_LEN }))
        );

        assert_eq!(p.session().current_lap(), 2);
        assert_eq!(p.session().lap_start(), lap_start);
        assert_eq!(p.session().position_history().len(), history);
        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(p.stats(), IngestStats { received: 4, published: 1, rejected: 3 });
    }

    #[test]
    fn records_are_published_in_arrival_order() {
        let (mut p, rx) = pipeline();
        let t0 = Instant::now();
        // out-of-order ids from the network are passed through as-is
        for (i, id) in [5, 3, 4].into_iter().enumerate() {
            let plain = PacketBuilder::new(BASE_PACKET_LEN).i32(OFF_PACKET_ID, id).build();
            let raw = cipher::encrypt(&plain, i as u32);
            p.process(&raw, t0 + Duration::from_millis(16 * i as u64)).unwrap();
        }
        let ids: Vec<i32> = rx.try_iter().map(|u| u.record.packet_id).collect();
        assert_eq!(ids, vec![5, 3, 4]);
    }

    #[test]
    fn snapshot_carries_receive_rate_including_rejects() {
        let (mut p, rx) = pipeline();
        let t0 = Instant::now();
        let step = Duration::from_millis(50);
        // alternate valid and garbage datagrams, 20 per second overall
        for i in 0..=10u32 {
            let now = t0 + step * i;
            if i % 2 == 0 {
                let raw = cipher::encrypt(&PacketBuilder::new(BASE_PACKET_LEN).build(), i);
                p.process(&raw, now).unwrap();
            } else {
                let _ = p.process(&[0u8; 8], now);
            }
        }
        assert!((p.rx_rate_hz() - 20.0).abs() < 1e-9);
        let rates: Vec<f64> = rx.try_iter().map(|u| u.session.rx_rate_hz).collect();
        assert_eq!(rates.first(), Some(&0.0));
        assert_eq!(rates.last(), Some(&p.rx_rate_hz()));
    }
}
