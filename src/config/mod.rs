use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Complete bridge configuration
///
/// Passed explicitly into the registry and the accessory layer at startup.
/// Every field has a default so an empty file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Vendor device `Type` values that should never become accessories
    #[serde(default)]
    pub ignore_device_types: Vec<String>,

    /// Session renewal period; snapshot polling runs at 1/20th of it
    #[serde(default = "default_api_login_refresh_secs")]
    pub api_login_refresh_secs: u64,

    /// Battery percentage at or below which a device reports low battery,
    /// in addition to the vendor's own low-battery flag
    #[serde(default)]
    pub low_battery_threshold: Option<u8>,

    /// Display units for thermostats ("c" or "f")
    #[serde(default = "default_temperature_units")]
    pub temperature_units: String,

    /// Minutes a motion sensor stays occupied after its last detected motion;
    /// 0 disables occupancy
    #[serde(default)]
    pub motion_occupancy_mins: u64,

    /// Log camera stream configuration on bootstrap
    #[serde(default)]
    pub show_camera_config: bool,

    /// Capacity of the inbound and update channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_api_login_refresh_secs() -> u64 {
    1200
}

fn default_temperature_units() -> String {
    "f".to_string()
}

fn default_channel_capacity() -> usize {
    1000
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ignore_device_types: Vec::new(),
            api_login_refresh_secs: default_api_login_refresh_secs(),
            low_battery_threshold: None,
            temperature_units: default_temperature_units(),
            motion_occupancy_mins: 0,
            show_camera_config: false,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl BridgeConfig {
    /// True when the vendor device type is listed in `ignore_device_types`
    pub fn ignores_type(&self, device_type: &str) -> bool {
        self.ignore_device_types.iter().any(|t| t == device_type)
    }

    /// How often the transport should pull a fresh system snapshot
    pub fn snapshot_refresh_interval(&self) -> Duration {
        Duration::from_secs((self.api_login_refresh_secs / 20).max(1))
    }

    /// Occupancy window for motion sensors, if enabled
    pub fn motion_occupancy_window(&self) -> Option<Duration> {
        match self.motion_occupancy_mins {
            0 => None,
            mins => Some(Duration::from_secs(mins * 60)),
        }
    }

    fn validate(&self) -> Result<()> {
        match self.temperature_units.to_ascii_lowercase().as_str() {
            "c" | "f" => Ok(()),
            other => anyhow::bail!("temperature_units must be 'c' or 'f', got '{}'", other),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: BridgeConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.ignore_device_types.is_empty());
        assert_eq!(config.api_login_refresh_secs, 1200);
        assert_eq!(config.snapshot_refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.low_battery_threshold, None);
        assert_eq!(config.temperature_units, "f");
        assert_eq!(config.channel_capacity, 1000);
        assert_eq!(config.motion_occupancy_window(), None);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            ignore_device_types = ["camera_device", "thermostat_device"]
            api_login_refresh_secs = 600
            low_battery_threshold = 15
            temperature_units = "c"
            show_camera_config = true
            channel_capacity = 64
            motion_occupancy_mins = 5
        "#;

        let config: BridgeConfig = toml::from_str(toml).unwrap();
        assert!(config.ignores_type("camera_device"));
        assert!(!config.ignores_type("door_lock_device"));
        assert_eq!(config.snapshot_refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.low_battery_threshold, Some(15));
        assert!(config.show_camera_config);
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.motion_occupancy_window(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_partial_config() {
        let config: BridgeConfig = toml::from_str("show_camera_config = true").unwrap();
        assert!(config.show_camera_config);
        assert_eq!(config.api_login_refresh_secs, 1200); // Default
    }

    #[test]
    fn test_tiny_refresh_period_never_yields_zero_interval() {
        let config = BridgeConfig {
            api_login_refresh_secs: 5,
            ..BridgeConfig::default()
        };
        assert_eq!(config.snapshot_refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ignore_device_types = [\"binary_switch\"]").unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.ignores_type("binary_switch"));
    }

    #[test]
    fn test_load_config_rejects_unknown_units() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "temperature_units = \"k\"").unwrap();

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/panel-bridge.toml").is_err());
    }
}
