//! Network and uploader configuration

use crate::error::{Result, UploadError};
use crate::types::TxId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Log level for the uploader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Transport protocol of the network endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Https
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// Configuration for talking to the Arweave network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host of the network API (default: arweave.net)
    pub host: String,

    /// Port of the network API (default: 443)
    pub port: u16,

    /// Protocol of the network API (default: https)
    pub protocol: Protocol,

    /// Host serving uploaded content; falls back to `host`
    #[serde(rename = "gateway-host", skip_serializing_if = "Option::is_none")]
    pub gateway_host: Option<String>,

    /// Timeout for price and anchor reads, in seconds (default: 30)
    #[serde(rename = "read-timeout")]
    pub read_timeout_secs: u64,

    /// Timeout for transaction submission, in seconds (default: 30)
    #[serde(rename = "broadcast-timeout")]
    pub broadcast_timeout_secs: u64,

    /// Timeout for wallet connection, in seconds (default: none)
    #[serde(rename = "connect-timeout", skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    /// Largest file accepted for upload, in bytes (default: 100 MiB)
    #[serde(rename = "max-payload")]
    pub max_payload_bytes: u64,

    /// Chain enabled on Keplr when connecting (default: cosmoshub-4)
    #[serde(rename = "keplr-chain-id")]
    pub keplr_chain_id: String,

    /// Log level (default: info)
    #[serde(rename = "log-level")]
    pub log_level: LogLevel,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "arweave.net".to_string(),
            port: 443,
            protocol: Protocol::Https,
            gateway_host: None,
            read_timeout_secs: 30,
            broadcast_timeout_secs: 30,
            connect_timeout_secs: None,
            max_payload_bytes: 100 * 1024 * 1024,
            keplr_chain_id: "cosmoshub-4".to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    /// Set the API port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the API protocol
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the gateway host used for content links
    pub fn gateway_host<S: Into<String>>(mut self, host: S) -> Self {
        self.gateway_host = Some(host.into());
        self
    }

    pub fn read_timeout_secs(mut self, secs: u64) -> Self {
        self.read_timeout_secs = secs;
        self
    }

    pub fn broadcast_timeout_secs(mut self, secs: u64) -> Self {
        self.broadcast_timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self
    }

    /// Set the payload limit in bytes
    pub fn max_payload_bytes(mut self, bytes: u64) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    pub fn keplr_chain_id<S: Into<String>>(mut self, chain_id: S) -> Self {
        self.keplr_chain_id = chain_id.into();
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Base URL of the network API, without a trailing slash
    pub fn base_url(&self) -> String {
        match (self.protocol, self.port) {
            (Protocol::Https, 443) | (Protocol::Http, 80) => {
                format!("{}://{}", self.protocol, self.host)
            }
            _ => format!("{}://{}:{}", self.protocol, self.host, self.port),
        }
    }

    /// Permanent link to uploaded content
    pub fn gateway_url(&self, tx_id: &TxId) -> String {
        let host = self.gateway_host.as_deref().unwrap_or(&self.host);
        format!("https://{}/{}", host, tx_id)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_secs(self.broadcast_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(UploadError::invalid_parameter(
                "host",
                "Host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(UploadError::invalid_parameter(
                "port",
                "Port must be greater than 0",
            ));
        }

        if self.read_timeout_secs == 0 {
            return Err(UploadError::invalid_parameter(
                "read-timeout",
                "Timeout must be greater than 0",
            ));
        }

        if self.broadcast_timeout_secs == 0 {
            return Err(UploadError::invalid_parameter(
                "broadcast-timeout",
                "Timeout must be greater than 0",
            ));
        }

        if self.connect_timeout_secs == Some(0) {
            return Err(UploadError::invalid_parameter(
                "connect-timeout",
                "Timeout must be greater than 0",
            ));
        }

        if self.max_payload_bytes == 0 {
            return Err(UploadError::invalid_parameter(
                "max-payload",
                "Payload limit must be greater than 0",
            ));
        }

        if self.keplr_chain_id.trim().is_empty() {
            return Err(UploadError::invalid_parameter(
                "keplr-chain-id",
                "Chain id cannot be empty",
            ));
        }

        Ok(())
    }

    /// Convert the configuration to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(UploadError::from)
    }

    /// Create a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            UploadError::config_error(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.host, "arweave.net");
        assert_eq!(config.port, 443);
        assert_eq!(config.protocol, Protocol::Https);
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_payload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.connect_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = NetworkConfig::new()
            .host("localhost")
            .port(1984)
            .protocol(Protocol::Http)
            .gateway_host("gateway.example")
            .broadcast_timeout_secs(5)
            .max_payload_bytes(1024)
            .log_level(LogLevel::Debug);

        assert_eq!(config.base_url(), "http://localhost:1984");
        assert_eq!(config.broadcast_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_payload_bytes, 1024);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_base_url_omits_default_port() {
        assert_eq!(NetworkConfig::default().base_url(), "https://arweave.net");
        let config = NetworkConfig::new().protocol(Protocol::Http).port(80);
        assert_eq!(config.base_url(), "http://arweave.net");
    }

    #[test]
    fn test_gateway_url() {
        let id = TxId::from_signature(b"sig");
        let config = NetworkConfig::default();
        assert_eq!(config.gateway_url(&id), format!("https://arweave.net/{}", id));

        let config = config.gateway_host("ar-io.dev");
        assert_eq!(config.gateway_url(&id), format!("https://ar-io.dev/{}", id));
        assert!(TxId::from_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = NetworkConfig::new();
        config.read_timeout_secs = 0;
        assert!(config.validate().is_err());

        let config = NetworkConfig::new().max_payload_bytes(0);
        match config.validate().unwrap_err() {
            UploadError::InvalidParameter { parameter, .. } => {
                assert_eq!(parameter, "max-payload");
            }
            _ => panic!("Expected InvalidParameter error"),
        }
    }

    #[test]
    fn test_config_json() {
        let config = NetworkConfig::new().host("localhost").connect_timeout_secs(10);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"connect-timeout\": 10"));

        let parsed = NetworkConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);

        let partial = NetworkConfig::from_json(r#"{"host": "testnet.local"}"#).unwrap();
        assert_eq!(partial.host, "testnet.local");
        assert_eq!(partial.port, 443);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uploader.json");
        std::fs::write(&path, r#"{"max-payload": 2048, "log-level": "warn"}"#).unwrap();

        let config = NetworkConfig::from_file(&path).unwrap();
        assert_eq!(config.max_payload_bytes, 2048);
        assert_eq!(config.log_level, LogLevel::Warn);

        let missing = NetworkConfig::from_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(UploadError::ConfigError { .. })));
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    }
}
