//! Configuration for the aqlink runner
//!
//! Loads settings from a TOML file: which board profile to drive, where its
//! serial device lives, and the link timing knobs.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub logging: LoggingConfig,
}

/// Device and link timing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Board profile name (only "micro" is recognized)
    pub board: String,
    /// Serial device path
    pub port: String,
    /// Per-line read budget in seconds; omit to block until a terminator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout_secs: Option<f64>,
    /// Pause in seconds after every write, giving the device time to settle
    pub write_delay_secs: f64,
    /// Reserved verbose flag, currently drives no output
    #[serde(default)]
    pub debug: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Returns
    /// Parsed configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration for a Micro on the usual CDC-ACM port
    ///
    /// Matches the bench setup: blocking reads, one second of settle time
    /// after each command.
    pub fn micro_defaults() -> Self {
        Self {
            device: DeviceConfig {
                board: "micro".to_string(),
                port: "/dev/ttyACM1".to_string(),
                read_timeout_secs: None,
                write_delay_secs: 1.0,
                debug: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::micro_defaults()
    }
}

impl DeviceConfig {
    /// Logical read timeout; `None` blocks until a terminator arrives
    pub fn read_timeout(&self) -> Result<Option<Duration>> {
        match self.read_timeout_secs {
            None => Ok(None),
            Some(secs) => Ok(Some(duration_secs(secs, "device.read_timeout_secs")?)),
        }
    }

    /// Settle delay after each write
    pub fn write_delay(&self) -> Result<Duration> {
        duration_secs(self.write_delay_secs, "device.write_delay_secs")
    }
}

/// Convert a seconds value from the config, rejecting negatives, NaN and
/// anything a `Duration` cannot hold
fn duration_secs(secs: f64, field: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| Error::InvalidParameter(format!("{}: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::micro_defaults();
        assert_eq!(config.device.board, "micro");
        assert_eq!(config.device.port, "/dev/ttyACM1");
        assert_eq!(config.device.read_timeout_secs, None);
        assert_eq!(config.device.write_delay_secs, 1.0);
        assert!(!config.device.debug);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::micro_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        // Should contain all sections
        assert!(toml_string.contains("[device]"));
        assert!(toml_string.contains("[logging]"));

        // Should contain key values; the unset read timeout is omitted
        assert!(toml_string.contains("board = \"micro\""));
        assert!(toml_string.contains("write_delay_secs = 1.0"));
        assert!(!toml_string.contains("read_timeout_secs"));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[device]
board = "micro"
port = "/dev/ttyUSB0"
read_timeout_secs = 0.5
write_delay_secs = 0.25
debug = true

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.port, "/dev/ttyUSB0");
        assert_eq!(config.device.read_timeout_secs, Some(0.5));
        assert_eq!(config.device.write_delay_secs, 0.25);
        assert!(config.device.debug);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_timeout_means_blocking() {
        let toml_content = r#"
[device]
board = "micro"
port = "/dev/ttyACM1"
write_delay_secs = 1.0

[logging]
level = "info"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.read_timeout_secs, None);
        assert_eq!(config.device.read_timeout().unwrap(), None);
    }

    #[test]
    fn test_duration_conversion() {
        let mut config = AppConfig::micro_defaults();
        config.device.read_timeout_secs = Some(1.5);
        assert_eq!(
            config.device.read_timeout().unwrap(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.device.write_delay().unwrap(), Duration::from_secs(1));
    }

    #[test]
    fn test_rejects_negative_durations() {
        let mut config = AppConfig::micro_defaults();
        config.device.write_delay_secs = -1.0;
        assert!(matches!(
            config.device.write_delay(),
            Err(Error::InvalidParameter(_))
        ));

        config.device.read_timeout_secs = Some(f64::NAN);
        assert!(matches!(
            config.device.read_timeout(),
            Err(Error::InvalidParameter(_))
        ));
    }
}
