//! Per-packet Salsa20 framing.
//!
//! Every datagram is encrypted with a fixed key and a nonce derived from a
//! 32-bit seed stored in cleartext at [`OFF_IV_SEED`] of the same datagram:
//! `iv_lo = seed`, `iv_hi = seed ^ 0xDEADBEEF`, nonce = `iv_hi_le ++ iv_lo_le`.
//! The whole datagram is run through the keystream, then the magic word at
//! offset 0 tells us whether the result can be trusted.

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::Salsa20;

use crate::layout::{MAGIC, OFF_IV_SEED, OFF_MAGIC};

/// First 32 bytes of `"Simulator Interface Packet GT7 ver 0.0"`.
const KEY: &[u8; 32] = b"Simulator Interface Packet GT7 v";
const IV_XOR: u32 = 0xDEAD_BEEF;

/// Anything shorter cannot hold the seed plus the field after it.
pub const MIN_DATAGRAM_LEN: usize = OFF_IV_SEED + 8;

/// A decrypted buffer whose magic word has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedPacket(Vec<u8>);

impl DecryptedPacket {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for DecryptedPacket {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn nonce_for(seed: u32) -> [u8; 8] {
    let mut nonce = [0u8; 8];
    nonce[..4].copy_from_slice(&(seed ^ IV_XOR).to_le_bytes());
    nonce[4..].copy_from_slice(&seed.to_le_bytes());
    nonce
}

fn apply_keystream(buf: &mut [u8], seed: u32) {
    let nonce = nonce_for(seed);
    let mut cipher = Salsa20::new(KEY.into(), (&nonce).into());
    cipher.apply_keystream(buf);
}

fn read_seed(raw: &[u8]) -> Option<u32> {
    let bytes = raw.get(OFF_IV_SEED..OFF_IV_SEED + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Decrypt a raw datagram. Returns `None` when it is too short or the magic
/// word does not match; a rejected datagram is never partially returned.
pub fn decrypt(raw: &[u8]) -> Option<DecryptedPacket> {
    if raw.len() < MIN_DATAGRAM_LEN {
        return None;
    }
    let seed = read_seed(raw)?;

    let mut buf = raw.to_vec();
    apply_keystream(&mut buf, seed);

    let magic = buf
        .get(OFF_MAGIC..OFF_MAGIC + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)?;
    (magic == MAGIC).then_some(DecryptedPacket(buf))
}

/// Produce a datagram that [`decrypt`] turns back into `plaintext`.
///
/// The seed overwrites bytes `[0x40, 0x44)` of the output, so those four
/// plaintext bytes do not survive the trip.
pub fn encrypt(plaintext: &[u8], seed: u32) -> Vec<u8> {
    let mut buf = plaintext.to_vec();
    apply_keystream(&mut buf, seed);
    if let Some(slot) = buf.get_mut(OFF_IV_SEED..OFF_IV_SEED + 4) {
        slot.copy_from_slice(&seed.to_le_bytes());
    }
    buf
}
