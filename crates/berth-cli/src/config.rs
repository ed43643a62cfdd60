//! Configuration for the berth CLI

use berth_profiles::MatcherConfig;
use berth_wait::WaitConfig;
use serde::{Deserialize, Serialize};

/// Main CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BerthConfig {
    /// Profile matcher settings
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Poller settings
    #[serde(default)]
    pub wait: WaitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl BerthConfig {
    /// Load configuration: defaults, then the file, then `BERTH_*` variables.
    ///
    /// Nested keys are separated by a double underscore, as in
    /// `BERTH_WAIT__PROVISION__MAX_LOOPS=20`.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&BerthConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BERTH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
