//! Shared configuration for the noiselab workspace.

pub mod config;

pub use config::{
  AugmentConfig, Config, ConfigError, DEFAULT_ALGORITHMS, DEFAULT_NOISE_RATIOS, DatasetConfig, LoggingConfig,
  NoiseRule, NoiseSelection, PROJECT_CONFIG_FILE, ReportConfig, USER_CONFIG_FILE,
};
