use std::path::PathBuf;

use thiserror::Error;

/// Maximum edit distance for an approximate match unless configured otherwise.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("max edit distance must be non-negative, got {0}")]
    NegativeDistance(i64),
    #[error("max edit distance {0} is out of range")]
    DistanceOutOfRange(i64),
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Matching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Inclusive upper bound for an approximate match.
    pub max_edit_distance: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: DEFAULT_MAX_EDIT_DISTANCE,
        }
    }
}

impl MatchConfig {
    /// Build a config from a signed distance. Negative values are rejected.
    pub fn new(max_edit_distance: i64) -> Result<Self, ConfigError> {
        if max_edit_distance < 0 {
            return Err(ConfigError::NegativeDistance(max_edit_distance));
        }
        let max_edit_distance = usize::try_from(max_edit_distance)
            .map_err(|_| ConfigError::DistanceOutOfRange(max_edit_distance))?;
        Ok(Self { max_edit_distance })
    }

    /// Parse a distance from an environment variable or CLI string.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let parsed: i64 = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "max_edit_distance",
                value: value.to_string(),
            })?;
        Self::new(parsed)
    }
}
