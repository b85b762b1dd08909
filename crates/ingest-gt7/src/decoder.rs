//! Fixed-offset field decoding of a decrypted packet.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use gt7_model::{
    Acceleration, Gear, LapTime, Rotation, SimulatorFlags, TelemetryRecord, Vec3, Wheels,
};

use crate::cipher::DecryptedPacket;
use crate::layout::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("packet too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
}

/// Decode a packet that passed the magic check.
pub fn decode(packet: &DecryptedPacket) -> Result<TelemetryRecord, DecodeError> {
    decode_bytes(packet.as_bytes())
}

/// Decode a decrypted buffer. Buffers shorter than [`BASE_PACKET_LEN`] are
/// rejected; acceleration and wheel rotation are only read from buffers of at
/// least [`EXTENDED_PACKET_LEN`].
pub fn decode_bytes(buf: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    let too_short = DecodeError::TooShort {
        len: buf.len(),
        min: BASE_PACKET_LEN,
    };
    if buf.len() < BASE_PACKET_LEN {
        return Err(too_short);
    }
    read_record(&Fields(buf)).ok_or(too_short)
}

fn read_record(f: &Fields<'_>) -> Option<TelemetryRecord> {
    let gear_byte = f.u8(OFF_GEAR)?;
    let suggested = gear_byte >> 4;

    let extended = f.len() >= EXTENDED_PACKET_LEN;
    let acceleration = if extended {
        Some(Acceleration {
            sway: f.f32(OFF_SWAY)?,
            heave: f.f32(OFF_HEAVE)?,
            surge: f.f32(OFF_SURGE)?,
        })
    } else {
        None
    };
    let wheel_rotation_rad = if extended {
        Some(f.f32(OFF_WHEEL_ROTATION)?)
    } else {
        None
    };

    let mut gear_ratios = [0f32; 8];
    let mut c = f.at(OFF_GEAR_RATIOS);
    for ratio in gear_ratios.iter_mut() {
        *ratio = c.read_f32::<LittleEndian>().ok()?;
    }

    let mut rot = f.at(OFF_ROTATION);
    let rotation = Rotation {
        pitch: rot.read_f32::<LittleEndian>().ok()?,
        yaw: rot.read_f32::<LittleEndian>().ok()?,
        roll: rot.read_f32::<LittleEndian>().ok()?,
    };

    Some(TelemetryRecord {
        packet_len: f.len(),
        packet_id: f.i32(OFF_PACKET_ID)?,

        position: f.vec3(OFF_POSITION)?,
        velocity: f.vec3(OFF_VELOCITY)?,
        rotation,
        rotation_unknown: f.f32(OFF_ROTATION_UNKNOWN)?,
        angular_velocity: f.vec3(OFF_ANGULAR_VELOCITY)?,
        ride_height: f.f32(OFF_RIDE_HEIGHT)?,

        rpm: f.f32(OFF_RPM)?,
        rev_warning_rpm: f.u16(OFF_REV_WARNING)?,
        rev_limiter_rpm: f.u16(OFF_REV_LIMITER)?,
        speed_mps: f.f32(OFF_SPEED)?,
        estimated_top_speed_kph: f.i16(OFF_EST_TOP_SPEED)?,
        throttle: pedal(f.u8(OFF_THROTTLE)?),
        brake: pedal(f.u8(OFF_BRAKE)?),
        gear: Gear::from_nibble(gear_byte),
        suggested_gear: (suggested <= 14).then_some(suggested),
        clutch: f.f32(OFF_CLUTCH)?,
        clutch_engagement: f.f32(OFF_CLUTCH_ENGAGEMENT)?,
        rpm_after_clutch: f.f32(OFF_RPM_AFTER_CLUTCH)?,
        boost_raw: f.f32(OFF_BOOST)?,

        fuel_remaining: f.f32(OFF_FUEL_REMAINING)?,
        fuel_capacity: f.f32(OFF_FUEL_CAPACITY)?,
        oil_pressure: f.f32(OFF_OIL_PRESSURE)?,
        water_temp_c: f.f32(OFF_WATER_TEMP)?,
        oil_temp_c: f.f32(OFF_OIL_TEMP)?,
        tyre_temp_c: f.wheels(OFF_TYRE_TEMP)?,
        wheel_angular_speed: f.wheels(OFF_WHEEL_ANGULAR_SPEED)?,
        tyre_diameter: f.wheels(OFF_TYRE_DIAMETER)?,

        current_lap: f.i16(OFF_CURRENT_LAP)?,
        total_laps: f.i16(OFF_TOTAL_LAPS)?,
        best_lap: LapTime::from_wire_millis(f.i32(OFF_BEST_LAP)?),
        last_lap: LapTime::from_wire_millis(f.i32(OFF_LAST_LAP)?),
        time_of_day_ms: f.i32(OFF_TIME_OF_DAY)?,
        race_position: f.i16(OFF_RACE_POSITION)?,
        total_positions: f.i16(OFF_TOTAL_POSITIONS)?,

        reverse_gear_ratio: f.f32(OFF_REVERSE_GEAR_RATIO)?,
        gear_ratios,
        car_id: f.i32(OFF_CAR_ID)?,
        flags: SimulatorFlags(f.u16(OFF_FLAGS)?),

        wheel_rotation_rad,
        acceleration,
    })
}

// pedals are 0..=255 on the wire
fn pedal(raw: u8) -> f32 {
    f32::from(raw) * 100.0 / 255.0
}

struct Fields<'a>(&'a [u8]);

impl<'a> Fields<'a> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn at(&self, off: usize) -> Cursor<&'a [u8]> {
        let mut c = Cursor::new(self.0);
        c.set_position(off as u64);
        c
    }

    fn u8(&self, off: usize) -> Option<u8> {
        self.0.get(off).copied()
    }
    fn u16(&self, off: usize) -> Option<u16> {
        self.at(off).read_u16::<LittleEndian>().ok()
    }
    fn i16(&self, off: usize) -> Option<i16> {
        self.at(off).read_i16::<LittleEndian>().ok()
    }
    fn i32(&self, off: usize) -> Option<i32> {
        self.at(off).read_i32::<LittleEndian>().ok()
    }
    fn f32(&self, off: usize) -> Option<f32> {
        self.at(off).read_f32::<LittleEndian>().ok()
    }

    fn vec3(&self, off: usize) -> Option<Vec3> {
        let mut c = self.at(off);
        Some(Vec3 {
            x: c.read_f32::<LittleEndian>().ok()?,
            y: c.read_f32::<LittleEndian>().ok()?,
            z: c.read_f32::<LittleEndian>().ok()?,
        })
    }

    fn wheels(&self, off: usize) -> Option<Wheels> {
        let mut c = self.at(off);
        Some(Wheels {
            front_left: c.read_f32::<LittleEndian>().ok()?,
            front_right: c.read_f32::<LittleEndian>().ok()?,
            rear_left: c.read_f32::<LittleEndian>().ok()?,
            rear_right: c.read_f32::<LittleEndian>().ok()?,
        })
    }
}
