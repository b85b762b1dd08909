//! Lap and session state derived from the stream of decoded records.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gt7_model::{LapTime, Point2, SessionSnapshot, TelemetryRecord};
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

/// State carried across packets. Only the tracker mutates it.
#[derive(Debug, Clone)]
pub struct SessionState {
    session_id: Uuid,
    current_lap: i16,
    /// Lap of the previous record, `None` before the first one.
    last_lap: Option<i16>,
    lap_start: Instant,
    positions: Arc<Vec<Point2>>,
    last_sample: Option<Instant>,
}

impl SessionState {
    fn new(now: Instant) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            current_lap: 0,
            last_lap: None,
            lap_start: now,
            positions: Arc::default(),
            last_sample: None,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn current_lap(&self) -> i16 {
        self.current_lap
    }

    pub fn is_racing(&self) -> bool {
        self.current_lap > 0
    }

    pub fn lap_start(&self) -> Instant {
        self.lap_start
    }

    pub fn last_sample(&self) -> Option<Instant> {
        self.last_sample
    }

    pub fn position_history(&self) -> &[Point2] {
        &self.positions
    }

    /// Time on the current lap at `now`; zero while not racing.
    pub fn lap_time(&self, now: Instant) -> LapTime {
        if self.is_racing() {
            LapTime::from(now.saturating_duration_since(self.lap_start))
        } else {
            LapTime::ZERO
        }
    }

    /// Snapshot at `now`. The receive rate is not known here and is left at zero.
    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            current_lap: self.current_lap,
            lap_time: self.lap_time(now),
            position_history: self.positions.clone(),
            rx_rate_hz: 0.0,
        }
    }
}

/// Lap state machine over `current_lap`:
///
/// - Idle (lap <= 0): no timing, no sampling.
/// - Entering lap 1 from Idle is a (re)start: the position trail is cleared,
///   a new session id is issued and the lap clock starts.
/// - Entering any other lap from Idle resumes: the lap clock starts, the trail
///   is kept.
/// - A lap change while racing restarts the lap clock only.
///
/// While racing, `(x, -z)` is appended to the trail at most once per
/// `sample_interval`.
pub struct SessionTracker {
    state: SessionState,
    sample_interval: Duration,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl SessionTracker {
    pub fn new(sample_interval: Duration) -> Self {
        Self {
            state: SessionState::new(Instant::now()),
            sample_interval,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn update(&mut self, record: &TelemetryRecord, now: Instant) -> &SessionState {
        let lap = record.current_lap;
        let st = &mut self.state;
        let was_racing = st.last_lap.is_some_and(|prev| prev > 0);

        if lap > 0 {
            if !was_racing {
                if lap == 1 {
                    st.positions = Arc::default();
                    st.session_id = Uuid::new_v4();
                    debug!(session_id = %st.session_id, "session started");
                } else {
                    debug!(lap, "session resumed");
                }
                st.lap_start = now;
            } else if st.last_lap != Some(lap) {
                debug!(from = ?st.last_lap, to = lap, "lap transition");
                st.lap_start = now;
            }
        }
        st.current_lap = lap;
        st.last_lap = Some(lap);

        if lap > 0 && self.sample_due(now) {
            let st = &mut self.state;
            Arc::make_mut(&mut st.positions).push(Point2 {
                x: record.position.x,
                y: -record.position.z,
            });
            st.last_sample = Some(now);
        }

        &self.state
    }

    fn sample_due(&self, now: Instant) -> bool {
        match self.state.last_sample {
            Some(last) => now.saturating_duration_since(last) >= self.sample_interval,
            None => true,
        }
    }
}
