use std::fmt;

use serde::{Deserialize, Serialize};

/// Engaged gear as reported in the low nibble of the gear byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gear {
    Reverse,
    Neutral,
    Forward(u8),
}

impl Gear {
    /// Interpret the low nibble of the gear byte. The nibble is signed on the
    /// wire, so 0xF (-1) is reverse.
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0 => Gear::Neutral,
            0x0F => Gear::Reverse,
            n => Gear::Forward(n),
        }
    }

    /// Signed form used by most sim-racing tooling: -1 reverse, 0 neutral.
    pub fn as_i8(self) -> i8 {
        match self {
            Gear::Reverse => -1,
            Gear::Neutral => 0,
            Gear::Forward(n) => n as i8,
        }
    }
}

impl fmt::Display for Gear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gear::Reverse => f.write_str("R"),
            Gear::Neutral => f.write_str("N"),
            Gear::Forward(n) => write!(f, "{n}"),
        }
    }
}
