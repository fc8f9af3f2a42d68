//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::{Gradient, parse_color};
use crate::render::RenderConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path or name of the `earbuds` control utility. Default: "earbuds".
    #[serde(default = "default_earbuds_binary")]
    pub earbuds_binary: String,

    /// Label the status line starts with. Default: "Buds2".
    #[serde(default = "default_device_label")]
    pub device_label: String,

    /// Highest battery reading (full charge). Default: 100.
    #[serde(default = "default_battery_limit")]
    pub battery_limit: u8,

    /// Left/right readings at most this far apart are shown as one level. Default: 3.
    #[serde(default = "default_battery_drift_threshold")]
    pub battery_drift_threshold: u8,

    /// Color at full battery (hex or name). Default: "#00FF00".
    #[serde(default = "default_start_color")]
    pub start_color: String,

    /// Color at empty battery (hex or name). Default: "#FF0000".
    #[serde(default = "default_end_color")]
    pub end_color: String,

    /// Color used while disconnected. Default: "#FFFFFF".
    #[serde(default = "default_disconnected_color")]
    pub disconnected_color: String,

    /// Kill `earbuds` commands that run longer than this. Default: 5000.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// Poll interval for `watch`. Default: 5.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_earbuds_binary() -> String {
    "earbuds".into()
}
fn default_device_label() -> String {
    "Buds2".into()
}
fn default_battery_limit() -> u8 {
    100
}
fn default_battery_drift_threshold() -> u8 {
    3
}
fn default_start_color() -> String {
    "#00FF00".into()
}
fn default_end_color() -> String {
    "#FF0000".into()
}
fn default_disconnected_color() -> String {
    "#FFFFFF".into()
}
fn default_command_timeout_ms() -> u64 {
    5000
}
fn default_interval_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            earbuds_binary: default_earbuds_binary(),
            device_label: default_device_label(),
            battery_limit: default_battery_limit(),
            battery_drift_threshold: default_battery_drift_threshold(),
            start_color: default_start_color(),
            end_color: default_end_color(),
            disconnected_color: default_disconnected_color(),
            command_timeout_ms: default_command_timeout_ms(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A color field could not be parsed.
    InvalidColor { field: &'static str, reason: String },
    /// `earbuds_binary` is empty or whitespace-only.
    EmptyBinary,
    /// `battery_limit` is zero.
    ZeroBatteryLimit,
    /// `battery_drift_threshold` exceeds `battery_limit`.
    ThresholdAboveLimit { threshold: u8, limit: u8 },
    /// `command_timeout_ms` is zero.
    ZeroTimeout,
    /// `interval_secs` is zero.
    ZeroInterval,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidColor { field, reason } => {
                write!(f, "Invalid {field}: {reason}")
            }
            ValidationError::EmptyBinary => write!(f, "earbuds_binary cannot be empty"),
            ValidationError::ZeroBatteryLimit => write!(f, "battery_limit must be at least 1"),
            ValidationError::ThresholdAboveLimit { threshold, limit } => write!(
                f,
                "battery_drift_threshold ({threshold}) exceeds battery_limit ({limit})"
            ),
            ValidationError::ZeroTimeout => write!(f, "command_timeout_ms must be at least 1"),
            ValidationError::ZeroInterval => write!(f, "interval_secs must be at least 1"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("budsline"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("start_color", &self.start_color),
            ("end_color", &self.end_color),
            ("disconnected_color", &self.disconnected_color),
        ] {
            if let Err(e) = parse_color(value) {
                errors.push(ValidationError::InvalidColor {
                    field,
                    reason: e.to_string(),
                });
            }
        }

        if self.earbuds_binary.trim().is_empty() {
            errors.push(ValidationError::EmptyBinary);
        }
        if self.battery_limit == 0 {
            errors.push(ValidationError::ZeroBatteryLimit);
        } else if self.battery_drift_threshold > self.battery_limit {
            errors.push(ValidationError::ThresholdAboveLimit {
                threshold: self.battery_drift_threshold,
                limit: self.battery_limit,
            });
        }
        if self.command_timeout_ms == 0 {
            errors.push(ValidationError::ZeroTimeout);
        }
        if self.interval_secs == 0 {
            errors.push(ValidationError::ZeroInterval);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Build the renderer settings. Fails with every validation problem joined.
    pub fn render_config(&self) -> crate::error::Result<RenderConfig> {
        if let Err(errors) = self.validate() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(crate::BudslineError::Config(joined));
        }
        let start = parse_color(&self.start_color)?;
        let end = parse_color(&self.end_color)?;
        Ok(RenderConfig {
            device_label: self.device_label.clone(),
            battery_limit: self.battery_limit,
            battery_drift_threshold: self.battery_drift_threshold,
            gradient: Gradient::new(end, start, self.battery_limit as usize),
            disconnected_color: parse_color(&self.disconnected_color)?,
        })
    }
}
