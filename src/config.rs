//! Configuration for the tello-io client
//!
//! Loads configuration from a TOML file with the few parameters the client
//! needs: where the device lives, which local ports to bind, and how long to
//! wait for a command reply.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub logging: LoggingConfig,
}

/// Device addressing and timing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device IP address
    pub address: String,
    /// Destination port for commands and their replies
    pub command_port: u16,
    /// Local port the device pushes state telemetry to
    pub state_port: u16,
    /// Local port the device pushes the video stream to (reserved, not read)
    pub video_port: u16,
    /// Seconds to wait for a reply to a value/ack command
    pub response_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

impl DeviceConfig {
    /// Destination address for the command channel
    pub fn command_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.address, self.command_port);
        addr.parse()
            .map_err(|e| crate::error::Error::InvalidParameter(format!("device address {addr}: {e}")))
    }

    /// Configured response timeout as a `Duration`
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Example
    /// ```no_run
    /// use tello_io::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("telloio.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for the Tello quadcopter
    ///
    /// The factory firmware always lives at 192.168.10.1 and uses fixed
    /// ports, so these defaults work for any un-reconfigured drone.
    pub fn tello_defaults() -> Self {
        Self {
            device: DeviceConfig {
                address: "192.168.10.1".to_string(),
                command_port: 8889,
                state_port: 8890,
                video_port: 11111,
                response_timeout_secs: 7,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
        }
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::tello_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::tello_defaults();
        assert_eq!(config.device.address, "192.168.10.1");
        assert_eq!(config.device.command_port, 8889);
        assert_eq!(config.device.state_port, 8890);
        assert_eq!(config.device.video_port, 11111);
        assert_eq!(config.device.response_timeout_secs, 7);
        assert_eq!(
            config.device.command_addr().unwrap().to_string(),
            "192.168.10.1:8889"
        );
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::tello_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[device]"));
        assert!(toml_string.contains("[logging]"));

        // Should contain key values
        assert!(toml_string.contains("address = \"192.168.10.1\""));
        assert!(toml_string.contains("command_port = 8889"));
        assert!(toml_string.contains("response_timeout_secs = 7"));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[device]
address = "10.0.0.42"
command_port = 9889
state_port = 9890
video_port = 12111
response_timeout_secs = 3

[logging]
level = "debug"
output = "stdout"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.address, "10.0.0.42");
        assert_eq!(config.device.command_port, 9889);
        assert_eq!(config.device.response_timeout(), Duration::from_secs(3));
        assert_eq!(config.logging.level, "debug");
    }
}
