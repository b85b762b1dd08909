use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A lap duration, displayed as `M:SS.mmm` (minutes are not padded or capped).
///
/// Display rounds to the nearest millisecond.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LapTime(Duration);

impl LapTime {
    pub const ZERO: LapTime = LapTime(Duration::ZERO);

    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    /// Lap times on the wire are signed milliseconds with a negative sentinel
    /// for "no time recorded".
    pub fn from_wire_millis(ms: i32) -> Option<Self> {
        u64::try_from(ms).ok().map(Self::from_millis)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn total_millis(&self) -> u128 {
        (self.0.as_nanos() + 500_000) / 1_000_000
    }
}

impl From<Duration> for LapTime {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl fmt::Display for LapTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.total_millis();
        write!(f, "{}:{:02}.{:03}", ms / 60_000, (ms / 1000) % 60, ms % 1000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLapTimeError(String);

impl fmt::Display for ParseLapTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid lap time {:?}, expected M:SS.mmm", self.0)
    }
}

impl std::error::Error for ParseLapTimeError {}

impl FromStr for LapTime {
    type Err = ParseLapTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLapTimeError(s.to_owned());
        let (minutes, rest) = s.split_once(':').ok_or_else(err)?;
        let (secs, millis) = rest.split_once('.').ok_or_else(err)?;
        if secs.len() != 2 || millis.len() != 3 {
            return Err(err());
        }
        let minutes: u64 = minutes.parse().map_err(|_| err())?;
        let secs: u64 = secs.parse().map_err(|_| err())?;
        let millis: u64 = millis.parse().map_err(|_| err())?;
        if secs >= 60 {
            return Err(err());
        }
        Ok(Self::from_millis(minutes * 60_000 + secs * 1000 + millis))
    }
}

impl Serialize for LapTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LapTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
