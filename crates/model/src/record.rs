use serde::{Deserialize, Serialize};

use crate::{Gear, LapTime};

const MPS_TO_KPH: f32 = 3.6;
const MPS_TO_MPH: f32 = 2.236_94;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

/// Body accelerations, only carried by the extended packet.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Acceleration {
    /// lateral
    pub sway: f32,
    /// vertical
    pub heave: f32,
    /// longitudinal
    pub surge: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wheel {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

/// One value per wheel.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Wheels {
    pub front_left: f32,
    pub front_right: f32,
    pub rear_left: f32,
    pub rear_right: f32,
}

impl Wheels {
    pub fn get(&self, wheel: Wheel) -> f32 {
        match wheel {
            Wheel::FrontLeft => self.front_left,
            Wheel::FrontRight => self.front_right,
            Wheel::RearLeft => self.rear_left,
            Wheel::RearRight => self.rear_right,
        }
    }
}

/// Bits of the simulator flags word.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct SimulatorFlags(pub u16);

impl SimulatorFlags {
    pub const CAR_ON_TRACK: u16 = 1 << 0;
    pub const PAUSED: u16 = 1 << 1;
    pub const REV_LIMITER: u16 = 1 << 5;
    pub const ASM_ACTIVE: u16 = 1 << 10;
    pub const TCS_ACTIVE: u16 = 1 << 11;

    pub fn contains(self, bit: u16) -> bool {
        self.0 & bit != 0
    }
    pub fn car_on_track(self) -> bool {
        self.contains(Self::CAR_ON_TRACK)
    }
    pub fn paused(self) -> bool {
        self.contains(Self::PAUSED)
    }
    pub fn rev_limiter(self) -> bool {
        self.contains(Self::REV_LIMITER)
    }
    pub fn asm_active(self) -> bool {
        self.contains(Self::ASM_ACTIVE)
    }
    pub fn tcs_active(self) -> bool {
        self.contains(Self::TCS_ACTIVE)
    }
}

/// One decoded telemetry packet. Units are the simulator's own (metres,
/// metres per second, radians); conversions for display are left to consumers.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TelemetryRecord {
    /// Length of the decrypted packet this record came from.
    pub packet_len: usize,
    pub packet_id: i32,

    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Rotation,
    /// Unlabelled rotation-related value following roll.
    pub rotation_unknown: f32,
    pub angular_velocity: Vec3,
    /// metres
    pub ride_height: f32,

    pub rpm: f32,
    pub rev_warning_rpm: u16,
    pub rev_limiter_rpm: u16,
    pub speed_mps: f32,
    pub estimated_top_speed_kph: i16,
    /// 0..=100
    pub throttle: f32,
    /// 0..=100
    pub brake: f32,
    pub gear: Gear,
    pub suggested_gear: Option<u8>,
    pub clutch: f32,
    pub clutch_engagement: f32,
    pub rpm_after_clutch: f32,
    /// Turbo boost plus one, as sent.
    pub boost_raw: f32,

    /// litres, or kWh for electric cars
    pub fuel_remaining: f32,
    pub fuel_capacity: f32,
    pub oil_pressure: f32,
    pub water_temp_c: f32,
    pub oil_temp_c: f32,
    pub tyre_temp_c: Wheels,
    /// rad/s
    pub wheel_angular_speed: Wheels,
    pub tyre_diameter: Wheels,

    pub current_lap: i16,
    pub total_laps: i16,
    pub best_lap: Option<LapTime>,
    pub last_lap: Option<LapTime>,
    pub time_of_day_ms: i32,
    pub race_position: i16,
    pub total_positions: i16,

    pub reverse_gear_ratio: f32,
    pub gear_ratios: [f32; 8],
    pub car_id: i32,
    pub flags: SimulatorFlags,

    /// Extended packets only.
    pub wheel_rotation_rad: Option<f32>,
    /// Extended packets only.
    pub acceleration: Option<Acceleration>,
}

impl TelemetryRecord {
    pub fn speed_kph(&self) -> f32 {
        self.speed_mps * MPS_TO_KPH
    }

    pub fn speed_mph(&self) -> f32 {
        self.speed_mps * MPS_TO_MPH
    }

    /// A zero tank capacity is how the simulator marks an electric car.
    pub fn is_electric(&self) -> bool {
        self.fuel_capacity <= 0.0
    }

    /// Boost pressure in bar, `None` when the car does not look turbocharged.
    ///
    /// Presence is inferred from the live value, so a turbo car sitting at
    /// exactly -1 bar would read as naturally aspirated.
    pub fn turbo_boost(&self) -> Option<f32> {
        let boost = self.boost_raw - 1.0;
        (boost > -1.0).then_some(boost)
    }

    pub fn is_racing(&self) -> bool {
        self.current_lap > 0
    }

    /// Surface speed of the tyre in m/s.
    pub fn tyre_speed(&self, wheel: Wheel) -> f32 {
        (self.tyre_diameter.get(wheel) * self.wheel_angular_speed.get(wheel)).abs()
    }

    /// Tyre surface speed over car speed; `None` while stationary.
    pub fn tyre_slip_ratio(&self, wheel: Wheel) -> Option<f32> {
        (self.speed_mps > 0.0).then(|| self.tyre_speed(wheel) / self.speed_mps)
    }
}
