//! Configuration for the SetuIO bridge daemon
//!
//! Loads configuration from a TOML file. All values are fixed for the
//! lifetime of the process; reconnections reuse the same configuration.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub serial: SerialConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// UDP destinations receiving every forwarded OSC datagram
    #[serde(default, rename = "destination")]
    pub destinations: Vec<DestinationConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial link configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    /// Serial device path (e.g. "/dev/ttyUSB0")
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Bounded-read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Inbound read size per cycle, in bytes
    ///
    /// Deliberately small: it bounds how long the inbound step can occupy
    /// the shared link before the outbound step gets its turn.
    #[serde(default = "default_read_chunk")]
    pub read_chunk: usize,
}

/// Bridge timing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Settle delay after opening the port, before the handshake
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Fixed backoff between reconnection attempts
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

/// One UDP destination
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_baud_rate() -> u32 {
    115200
}

fn default_timeout_ms() -> u64 {
    100
}

fn default_read_chunk() -> usize {
    16
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SerialConfig {
    /// Bounded-read timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl BridgeConfig {
    /// Handshake settle delay as a Duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Reconnect backoff as a Duration
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            settle_delay_ms: default_settle_delay_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Development defaults: local USB adapter, one localhost destination
    pub fn defaults() -> Self {
        AppConfig {
            serial: SerialConfig {
                port: "/dev/ttyUSB0".to_string(),
                baud_rate: default_baud_rate(),
                timeout_ms: default_timeout_ms(),
                read_chunk: default_read_chunk(),
            },
            bridge: BridgeConfig::default(),
            destinations: vec![DestinationConfig {
                host: "127.0.0.1".to_string(),
                port: 9000,
            }],
            logging: LoggingConfig::default(),
        }
    }

    /// Resolve the configured destinations to socket addresses
    ///
    /// The resolved list keeps configuration order; an unresolvable
    /// destination is a configuration fault.
    pub fn resolve_destinations(&self) -> Result<Vec<SocketAddr>> {
        let mut resolved = Vec::with_capacity(self.destinations.len());
        for dest in &self.destinations {
            let addr = (dest.host.as_str(), dest.port)
                .to_socket_addrs()?
                .next()
                .ok_or_else(|| {
                    Error::InvalidParameter(format!(
                        "destination {}:{} does not resolve",
                        dest.host, dest.port
                    ))
                })?;
            resolved.push(addr);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::defaults();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.read_chunk, 16);
        assert_eq!(config.bridge.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(config.destinations.len(), 1);
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[serial]
port = "/dev/ttyACM1"
baud_rate = 57600
timeout_ms = 250
read_chunk = 64

[bridge]
settle_delay_ms = 500
reconnect_delay_ms = 2000

[[destination]]
host = "127.0.0.1"
port = 9000

[[destination]]
host = "127.0.0.1"
port = 9001

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert_eq!(config.serial.baud_rate, 57600);
        assert_eq!(config.serial.timeout(), Duration::from_millis(250));
        assert_eq!(config.serial.read_chunk, 64);
        assert_eq!(config.bridge.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(config.destinations[1].port, 9001);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[serial]
port = "/dev/ttyS3"
"#,
        )
        .unwrap();

        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.serial.timeout_ms, 100);
        assert_eq!(config.serial.read_chunk, 16);
        assert!(config.destinations.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_resolve_destinations_keeps_order() {
        let mut config = AppConfig::defaults();
        config.destinations = vec![
            DestinationConfig {
                host: "127.0.0.1".to_string(),
                port: 9000,
            },
            DestinationConfig {
                host: "127.0.0.1".to_string(),
                port: 9001,
            },
        ];

        let resolved = config.resolve_destinations().unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].port(), 9000);
        assert_eq!(resolved[1].port(), 9001);
    }
}
