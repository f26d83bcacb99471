use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    #[default]
    None,
    /// XON/XOFF.
    Software,
    /// RTS/CTS.
    Hardware,
}

/// Scanner reader settings. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Device node the scanner is attached to.
    pub device: PathBuf,
    pub baud_rate: u32,
    /// 5 to 8.
    pub data_bits: u8,
    pub parity: Parity,
    /// 1 or 2.
    pub stop_bits: u8,
    pub flow_control: FlowControl,
    /// Silence on the line for this long completes a pending frame.
    pub idle_flush_ms: u64,
    pub max_frame_bytes: usize,
    /// Identical frames closer together than this are reported once. 0 disables.
    pub dedup_window_ms: u64,
    pub channel_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyUSB0"),
            baud_rate: 115_200,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: FlowControl::None,
            idle_flush_ms: 150,
            max_frame_bytes: 1024,
            dedup_window_ms: 2000,
            channel_capacity: 64,
        }
    }
}

impl ReaderConfig {
    pub const DEVICE_ENV: &'static str = "DOORSCAN_DEVICE";
    pub const BAUD_RATE_ENV: &'static str = "DOORSCAN_BAUDRATE";

    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(device) = lookup(Self::DEVICE_ENV).filter(|d| !d.trim().is_empty()) {
            tracing::info!("{} set, using device {device}", Self::DEVICE_ENV);
            self.device = PathBuf::from(device.trim());
        }
        if let Some(raw) = lookup(Self::BAUD_RATE_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(baud) if baud > 0 => {
                    tracing::info!("{} set, using {baud} baud", Self::BAUD_RATE_ENV);
                    self.baud_rate = baud;
                }
                _ => tracing::warn!(
                    "{} has invalid value {raw:?}, keeping {} baud",
                    Self::BAUD_RATE_ENV,
                    self.baud_rate
                ),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be greater than 0".into()));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(ConfigError::Invalid(format!(
                "data_bits must be between 5 and 8, got {}",
                self.data_bits
            )));
        }
        if !matches!(self.stop_bits, 1 | 2) {
            return Err(ConfigError::Invalid(format!(
                "stop_bits must be 1 or 2, got {}",
                self.stop_bits
            )));
        }
        if self.idle_flush_ms == 0 {
            return Err(ConfigError::Invalid("idle_flush_ms must be greater than 0".into()));
        }
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::Invalid("max_frame_bytes must be greater than 0".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn idle_flush(&self) -> Duration {
        Duration::from_millis(self.idle_flush_ms)
    }
}
