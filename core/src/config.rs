//! Runtime settings read from the environment (and an optional `.env`).

use std::env;
use std::path::PathBuf;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

const LOG_LEVEL_VAR: &str = "MAPTILE_LOG_LEVEL";
const LOG_FILE_VAR: &str = "MAPTILE_LOG_FILE";
const COMPRESSION_VAR: &str = "MAPTILE_SAVE_COMPRESSION";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
const MAX_COMPRESSION_LEVEL: u32 = 9;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// zlib level used for map saves, 0 to 9.
    pub compression_level: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

impl EngineConfig {
    /// Loads `.env` when present, then reads the `MAPTILE_*` variables.
    pub fn from_env() -> Self {
        // A missing .env file is the normal case.
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Values that do not parse
    /// fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = EngineConfig::default();

        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            if parse_log_level(&level).is_some() {
                config.log_level = level.trim().to_lowercase();
            } else {
                log::warn!(
                    "{} has unknown level '{}', using '{}'",
                    LOG_LEVEL_VAR,
                    level,
                    DEFAULT_LOG_LEVEL
                );
            }
        }

        config.log_file = lookup(LOG_FILE_VAR).and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(PathBuf::from(trimmed))
            }
        });

        if let Some(value) = lookup(COMPRESSION_VAR) {
            match value.trim().parse::<u32>() {
                Ok(level) if level <= MAX_COMPRESSION_LEVEL => config.compression_level = level,
                _ => log::warn!(
                    "{} must be 0 to {}, got '{}'",
                    COMPRESSION_VAR,
                    MAX_COMPRESSION_LEVEL,
                    value
                ),
            }
        }

        config
    }

    pub fn level_filter(&self) -> LevelFilter {
        parse_log_level(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    /// Starts the global logger with these settings.
    pub fn init_logging(&self) -> anyhow::Result<()> {
        let file_path = self.log_file.as_ref().and_then(|path| path.to_str());
        crate::initialize_logger(self.level_filter(), file_path)
    }
}
