//! Byte offsets into a decrypted GT7 packet. All values are little-endian.

pub const MAGIC: u32 = 0x4737_5330;

/// Shortest packet that carries every base field (ends with the car id).
pub const BASE_PACKET_LEN: usize = 0x128; // 296
/// Packets at least this long also carry wheel rotation and accelerations.
pub const EXTENDED_PACKET_LEN: usize = 0x13C; // 316

pub const OFF_MAGIC: usize = 0x00;
pub const OFF_POSITION: usize = 0x04; // 3 x f32
pub const OFF_VELOCITY: usize = 0x10; // 3 x f32
pub const OFF_ROTATION: usize = 0x1C; // pitch, yaw, roll
pub const OFF_ROTATION_UNKNOWN: usize = 0x28;
pub const OFF_ANGULAR_VELOCITY: usize = 0x2C; // 3 x f32
pub const OFF_RIDE_HEIGHT: usize = 0x38;
pub const OFF_RPM: usize = 0x3C;
/// Cipher seed in the raw datagram; garbage once decrypted.
pub const OFF_IV_SEED: usize = 0x40;
pub const OFF_FUEL_REMAINING: usize = 0x44;
pub const OFF_FUEL_CAPACITY: usize = 0x48;
pub const OFF_SPEED: usize = 0x4C;
pub const OFF_BOOST: usize = 0x50;
pub const OFF_OIL_PRESSURE: usize = 0x54;
pub const OFF_WATER_TEMP: usize = 0x58;
pub const OFF_OIL_TEMP: usize = 0x5C;
pub const OFF_TYRE_TEMP: usize = 0x60; // FL, FR, RL, RR
pub const OFF_PACKET_ID: usize = 0x70;
pub const OFF_CURRENT_LAP: usize = 0x74;
pub const OFF_TOTAL_LAPS: usize = 0x76;
pub const OFF_BEST_LAP: usize = 0x78;
pub const OFF_LAST_LAP: usize = 0x7C;
pub const OFF_TIME_OF_DAY: usize = 0x80;
pub const OFF_RACE_POSITION: usize = 0x84;
pub const OFF_TOTAL_POSITIONS: usize = 0x86;
pub const OFF_REV_WARNING: usize = 0x88;
pub const OFF_REV_LIMITER: usize = 0x8A;
pub const OFF_EST_TOP_SPEED: usize = 0x8C;
pub const OFF_FLAGS: usize = 0x8E;
pub const OFF_GEAR: usize = 0x90;
pub const OFF_THROTTLE: usize = 0x91;
pub const OFF_BRAKE: usize = 0x92;
pub const OFF_WHEEL_ANGULAR_SPEED: usize = 0xA4; // FL, FR, RL, RR
pub const OFF_TYRE_DIAMETER: usize = 0xB4; // FL, FR, RL, RR
pub const OFF_CLUTCH: usize = 0xF4;
pub const OFF_CLUTCH_ENGAGEMENT: usize = 0xF8;
pub const OFF_RPM_AFTER_CLUTCH: usize = 0xFC;
pub const OFF_REVERSE_GEAR_RATIO: usize = 0x100;
pub const OFF_GEAR_RATIOS: usize = 0x104; // gears 1-8
pub const OFF_CAR_ID: usize = 0x124;

// extended variant
pub const OFF_WHEEL_ROTATION: usize = 0x128;
pub const OFF_SWAY: usize = 0x130;
pub const OFF_HEAVE: usize = 0x134;
pub const OFF_SURGE: usize = 0x138;
