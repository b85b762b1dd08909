use gt7_ingest_core::IngestError;

use crate::decoder::DecodeError;

/// Why a single datagram was discarded. Never fatal to the loop.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("{len}-byte datagram failed decryption or magic check")]
    Framing { len: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: invalid address {value:?}")]
    Address {
        field: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{var}: invalid number {value:?}")]
    Number {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl From<ConfigError> for IngestError {
    fn from(e: ConfigError) -> Self {
        IngestError::Config(e.to_string())
    }
}
