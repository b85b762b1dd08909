use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::heartbeat::DEFAULT_HEARTBEAT_EVERY;
use crate::session::DEFAULT_SAMPLE_INTERVAL;

/// UDP port the console streams telemetry to.
pub const RECV_PORT: u16 = 33740;
/// UDP port the console listens on for heartbeats.
pub const HEARTBEAT_PORT: u16 = 33739;
/// Largest datagram we read; anything longer is truncated by the socket.
pub const RECV_BUFFER_LEN: usize = 4096;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gt7Config {
    /// Local bind address for receiving packets from the console (default port 33740)
    pub bind_addr: String,
    /// Console IP address to send heartbeat packets to
    pub console_ip: String,
    pub heartbeat_port: u16,
    /// How long to wait for a datagram before sending a resync heartbeat
    pub recv_timeout: Duration,
    /// Datagrams between liveness heartbeats
    pub heartbeat_every: u32,
    /// Minimum spacing of position samples
    pub sample_interval: Duration,
}

impl Default for Gt7Config {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{RECV_PORT}"),
            console_ip: "192.168.1.100".into(),
            heartbeat_port: HEARTBEAT_PORT,
            recv_timeout: Duration::from_secs(10),
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}

impl Gt7Config {
    /// Defaults overridden by `GT7_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(v) = lookup("GT7_BIND_ADDR") {
            cfg.bind_addr = v;
        }
        if let Some(v) = lookup("GT7_CONSOLE_IP") {
            cfg.console_ip = v;
        }
        if let Some(v) = lookup("GT7_HEARTBEAT_PORT") {
            cfg.heartbeat_port = number("GT7_HEARTBEAT_PORT", v)?;
        }
        if let Some(v) = lookup("GT7_RECV_TIMEOUT_MS") {
            cfg.recv_timeout = Duration::from_millis(number("GT7_RECV_TIMEOUT_MS", v)?);
        }
        if let Some(v) = lookup("GT7_HEARTBEAT_EVERY") {
            cfg.heartbeat_every = number("GT7_HEARTBEAT_EVERY", v)?;
        }
        if let Some(v) = lookup("GT7_SAMPLE_INTERVAL_MS") {
            cfg.sample_interval = Duration::from_millis(number("GT7_SAMPLE_INTERVAL_MS", v)?);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        self.heartbeat_target()?;
        if self.heartbeat_every == 0 {
            return Err(ConfigError::Zero("heartbeat_every"));
        }
        if self.recv_timeout.is_zero() {
            return Err(ConfigError::Zero("recv_timeout"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.parse().map_err(|source| ConfigError::Address {
            field: "bind_addr",
            value: self.bind_addr.clone(),
            source,
        })
    }

    pub fn heartbeat_target(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.console_ip.parse().map_err(|source| ConfigError::Address {
            field: "console_ip",
            value: self.console_ip.clone(),
            source,
        })?;
        Ok(SocketAddr::new(ip, self.heartbeat_port))
    }
}

fn number<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::Number { var, value, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_console_protocol() {
        let cfg = Gt7Config::default();
        assert_eq!(cfg.bind_addr().unwrap().port(), 33740);
        assert_eq!(cfg.heartbeat_target().unwrap().port(), 33739);
        assert_eq!(cfg.recv_timeout, Duration::from_secs(10));
        assert_eq!(cfg.heartbeat_every, 100);
        assert_eq!(cfg.sample_interval, Duration::from_millis(250));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_overrides() {
        let cfg = Gt7Config::from_lookup(lookup(&[
            ("GT7_CONSOLE_IP", "10.0.0.7"),
            ("GT7_BIND_ADDR", "127.0.0.1:0"),
            ("GT7_RECV_TIMEOUT_MS", " 1500 "),
            ("GT7_HEARTBEAT_EVERY", "50"),
        ]))
        .unwrap();
        assert_eq!(cfg.heartbeat_target().unwrap(), "10.0.0.7:33739".parse().unwrap());
        assert_eq!(cfg.bind_addr, "127.0.0.1:0");
        assert_eq!(cfg.recv_timeout, Duration::from_millis(1500));
        assert_eq!(cfg.heartbeat_every, 50);
        assert_eq!(cfg.sample_interval, DEFAULT_SAMPLE_INTERVAL);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Gt7Config::from_lookup(lookup(&[("GT7_CONSOLE_IP", "playstation")])),
            Err(ConfigError::Address { field: "console_ip", .. })
        ));
        assert!(matches!(
            Gt7Config::from_lookup(lookup(&[("GT7_HEARTBEAT_PORT", "70000")])),
            Err(ConfigError::Number { var: "GT7_HEARTBEAT_PORT", .. })
        ));
        assert!(matches!(
            Gt7Config::from_lookup(lookup(&[("GT7_HEARTBEAT_EVERY", "0")])),
            Err(ConfigError::Zero("heartbeat_every"))
        ));
    }

    #[test]
    fn deserializes_partial_config() {
        let cfg: Gt7Config = serde_json::from_str(r#"{ "console_ip": "192.168.0.20" }"#).unwrap();
        assert_eq!(cfg.console_ip, "192.168.0.20");
        assert_eq!(cfg.heartbeat_port, HEARTBEAT_PORT);
    }
}
