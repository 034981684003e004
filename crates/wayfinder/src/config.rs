//! Configuration management for wayfinder.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::engine::EngineSettings;
use crate::error::{Error, Result};
use crate::logging::Verbosity;
use crate::venue::LevelOverride;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "wayfinder";

/// Default preference database file name.
const DATABASE_FILE_NAME: &str = "preferences.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `WAYFINDER_`)
/// 2. TOML config file at `~/.config/wayfinder/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Venue configuration.
    pub venue: VenueConfig,
    /// Routing and guidance tuning.
    pub routing: RoutingConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Venue-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    /// Token presented to the positioning engine during authorization.
    pub auth_token: String,
    /// Identifier of the geofence that marks the covered area of the venue.
    pub covered_geofence_id: String,
    /// Physical level shown before the first floor change event arrives.
    pub default_level: i32,
    /// Venue-specific display names for physical levels.
    pub level_overrides: Vec<LevelOverride>,
}

/// Routing-related configuration.
///
/// Threshold distances are in meters. The defaults match the tuning the
/// guidance engine ships with; most deployments never override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Dead-reckoning correction threshold.
    pub pdr_correction_threshold_m: f64,
    /// Snap-to-route threshold while navigating.
    pub snap_to_route_threshold_m: f64,
    /// Location snapping threshold while browsing.
    pub location_snapping_threshold_m: f64,
    /// Distance off the route that triggers a recalculation.
    pub reroute_threshold_m: f64,
    /// Distance to the destination that finishes the route.
    pub route_finish_threshold_m: f64,
    /// Distance at which the next step instruction becomes immediate.
    pub step_immediate_threshold_m: f64,
    /// Distance at which the next step instruction is announced early.
    pub step_preparation_threshold_m: f64,
    /// Distance walked before a heading correction is considered.
    pub heading_correction_threshold_m: f64,
    /// Heading deviation in degrees that triggers a correction prompt.
    pub heading_correction_threshold_degrees: f64,
    /// Distance from the path start below which the route begins at the
    /// user's position.
    pub path_fix_distance_m: f64,
    /// Delay before retrying a failed initial venue sync, in seconds.
    pub sync_retry_delay_secs: u64,
    /// Window after a new direction during which plain direction updates
    /// are dropped, in milliseconds.
    pub suppression_window_ms: u64,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the preference database file.
    /// Defaults to `~/.local/share/wayfinder/preferences.db`
    pub database_path: Option<PathBuf>,
}

/// Logging-related configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default verbosity when no command-line flag overrides it.
    pub verbosity: Verbosity,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            auth_token: "local-demo".to_string(),
            covered_geofence_id: "covered-area".to_string(),
            default_level: 0,
            level_overrides: Vec::new(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        let settings = EngineSettings::default();
        Self {
            pdr_correction_threshold_m: settings.pdr_correction_threshold_m,
            snap_to_route_threshold_m: settings.snap_to_route_threshold_m,
            location_snapping_threshold_m: settings.location_snapping_threshold_m,
            reroute_threshold_m: settings.reroute_threshold_m,
            route_finish_threshold_m: settings.route_finish_threshold_m,
            step_immediate_threshold_m: settings.step_immediate_threshold_m,
            step_preparation_threshold_m: settings.step_preparation_threshold_m,
            heading_correction_threshold_m: settings.heading_correction_threshold_m,
            heading_correction_threshold_degrees: settings.heading_correction_threshold_degrees,
            path_fix_distance_m: crate::route::DEFAULT_PATH_FIX_DISTANCE_M,
            sync_retry_delay_secs: 5,
            suppression_window_ms: 4000,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `WAYFINDER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("WAYFINDER_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.venue.auth_token.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "venue.auth_token must not be empty".to_string(),
            });
        }

        let thresholds = [
            ("pdr_correction_threshold_m", self.routing.pdr_correction_threshold_m),
            ("snap_to_route_threshold_m", self.routing.snap_to_route_threshold_m),
            (
                "location_snapping_threshold_m",
                self.routing.location_snapping_threshold_m,
            ),
            ("reroute_threshold_m", self.routing.reroute_threshold_m),
            ("route_finish_threshold_m", self.routing.route_finish_threshold_m),
            ("step_immediate_threshold_m", self.routing.step_immediate_threshold_m),
            (
                "step_preparation_threshold_m",
                self.routing.step_preparation_threshold_m,
            ),
            (
                "heading_correction_threshold_m",
                self.routing.heading_correction_threshold_m,
            ),
            (
                "heading_correction_threshold_degrees",
                self.routing.heading_correction_threshold_degrees,
            ),
            ("path_fix_distance_m", self.routing.path_fix_distance_m),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigValidation {
                    message: format!("routing.{name} must be a positive number, got {value}"),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for over in &self.venue.level_overrides {
            if !seen.insert(over.physical) {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "venue.level_overrides lists physical level {} more than once",
                        over.physical
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the preference database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Build the engine settings described by this configuration.
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            pdr_correction_threshold_m: self.routing.pdr_correction_threshold_m,
            snap_to_route_threshold_m: self.routing.snap_to_route_threshold_m,
            location_snapping_threshold_m: self.routing.location_snapping_threshold_m,
            reroute_threshold_m: self.routing.reroute_threshold_m,
            route_finish_threshold_m: self.routing.route_finish_threshold_m,
            step_immediate_threshold_m: self.routing.step_immediate_threshold_m,
            step_preparation_threshold_m: self.routing.step_preparation_threshold_m,
            heading_correction_threshold_m: self.routing.heading_correction_threshold_m,
            heading_correction_threshold_degrees: self.routing.heading_correction_threshold_degrees,
            level_overrides: self.venue.level_overrides.clone(),
            ..EngineSettings::default()
        }
    }

    /// Get the direction suppression window as a Duration.
    #[must_use]
    pub fn suppression_window(&self) -> Duration {
        Duration::from_millis(self.routing.suppression_window_ms)
    }

    /// Get the sync retry delay as a Duration.
    #[must_use]
    pub fn sync_retry_delay(&self) -> Duration {
        Duration::from_secs(self.routing.sync_retry_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.venue.auth_token, "local-demo");
        assert_eq!(config.venue.covered_geofence_id, "covered-area");
        assert_eq!(config.venue.default_level, 0);
        assert!(config.venue.level_overrides.is_empty());
        assert_eq!(config.logging.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_default_routing_config() {
        let routing = RoutingConfig::default();

        assert!((routing.pdr_correction_threshold_m - 4.0).abs() < f64::EPSILON);
        assert!((routing.snap_to_route_threshold_m - 20.0).abs() < f64::EPSILON);
        assert!((routing.location_snapping_threshold_m - 6.0).abs() < f64::EPSILON);
        assert!((routing.reroute_threshold_m - 3.0).abs() < f64::EPSILON);
        assert!((routing.route_finish_threshold_m - 2.5).abs() < f64::EPSILON);
        assert!((routing.path_fix_distance_m - 2.0).abs() < f64::EPSILON);
        assert_eq!(routing.sync_retry_delay_secs, 5);
        assert_eq!(routing.suppression_window_ms, 4000);
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();
        assert!(storage.database_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_auth_token() {
        let mut config = Config::default();
        config.venue.auth_token = "  ".to_string();

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("auth_token"));
    }

    #[test]
    fn test_validate_nonpositive_threshold() {
        let mut config = Config::default();
        config.routing.reroute_threshold_m = 0.0;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("reroute_threshold_m"));
    }

    #[test]
    fn test_validate_nan_threshold() {
        let mut config = Config::default();
        config.routing.route_finish_threshold_m = f64::NAN;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_level_override() {
        let mut config = Config::default();
        config.venue.level_overrides = vec![
            LevelOverride {
                physical: 3,
                display: 4,
            },
            LevelOverride {
                physical: 3,
                display: 5,
            },
        ];

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("level_overrides"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("preferences.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/prefs.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/prefs.sqlite")
        );
    }

    #[test]
    fn test_engine_settings_carry_thresholds_and_overrides() {
        let mut config = Config::default();
        config.routing.reroute_threshold_m = 7.5;
        config.venue.level_overrides = vec![LevelOverride {
            physical: 2,
            display: 9,
        }];

        let settings = config.engine_settings();
        assert!((settings.reroute_threshold_m - 7.5).abs() < f64::EPSILON);
        assert_eq!(settings.level_overrides.len(), 1);
        assert!(settings.pdr_enabled);
        assert!(settings.snap_to_route);
    }

    #[test]
    fn test_suppression_window() {
        let config = Config::default();
        assert_eq!(config.suppression_window(), Duration::from_millis(4000));
    }

    #[test]
    fn test_sync_retry_delay() {
        let config = Config::default();
        assert_eq!(config.sync_retry_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("wayfinder"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("wayfinder"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config.venue, VenueConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "wayfinder-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"
[venue]
auth_token = "museum-east-wing"
default_level = -1

[[venue.level_overrides]]
physical = 3
display = 4

[routing]
suppression_window_ms = 2500
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.venue.auth_token, "museum-east-wing");
        assert_eq!(config.venue.default_level, -1);
        assert_eq!(
            config.venue.level_overrides,
            vec![LevelOverride {
                physical: 3,
                display: 4,
            }]
        );
        assert_eq!(config.routing.suppression_window_ms, 2500);
        // Untouched sections keep their defaults.
        assert_eq!(config.routing.sync_retry_delay_secs, 5);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "wayfinder-config-invalid-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[venue]\nauth_token = \"\"\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }

    #[test]
    fn test_logging_config_deserialize() {
        let json = r#"{"verbosity": "verbose"}"#;
        let logging: LoggingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(logging.verbosity, Verbosity::Verbose);
    }

    #[test]
    fn test_routing_config_serialize() {
        let routing = RoutingConfig::default();
        let json = serde_json::to_string(&routing).unwrap();
        assert!(json.contains("suppression_window_ms"));
    }
}
