//! Layered application configuration
//!
//! Sources, lowest priority first:
//! - Built-in defaults
//! - `config/arcam.{toml,yaml,json}` (optional)
//! - `ARCAM_*` environment variables, nested keys split on `__`
//!   (e.g. `ARCAM_SESSION__MIN_DURATION_MS=3000`)

use capture_session::SessionConfig;
use config::{Config, ConfigError, Environment, File};
use face_pose::PoseConfig;
use serde::{Deserialize, Serialize};
use storage::StorageConfig;

/// Default config file stem
pub const CONFIG_FILE: &str = "config/arcam";

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub pose: PoseConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Synthetic device pacing for the demo run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Camera and render frame interval
    pub frame_interval_ms: u64,
    /// Tracker callback interval
    pub tracking_interval_ms: u64,
    /// How long the capture control is held for the demo recording
    pub record_hold_ms: u64,
    /// Every n-th tracking sample has no face (0 disables)
    pub empty_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 33,
            tracking_interval_ms: 66,
            record_hold_ms: 3000,
            empty_every: 10,
        }
    }
}

/// Load configuration from the default file location and the environment
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(CONFIG_FILE)
}

/// Load configuration using `file_stem` for the optional config file
pub fn load_config_from(file_stem: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .set_default("logging.level", "info")?
        .set_default("logging.json", false)?
        .add_source(File::with_name(file_stem).required(false))
        // e.g. ARCAM_LOGGING__LEVEL=debug
        .add_source(
            Environment::with_prefix("ARCAM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
