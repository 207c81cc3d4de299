use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, MatchConfig};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub matching: Option<MatchingConfig>,
    pub abbreviations: Option<AbbreviationsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Signed so that a negative value surfaces as a config error rather than a parse error.
    pub max_edit_distance: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbbreviationsConfig {
    pub enabled: Option<bool>,
    /// Partition page URL with a `{page}` placeholder.
    pub url_template: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Validated matching config, falling back to defaults for missing values.
    pub fn match_config(&self) -> Result<MatchConfig, ConfigError> {
        match self.matching.as_ref().and_then(|m| m.max_edit_distance) {
            Some(distance) => MatchConfig::new(distance),
            None => Ok(MatchConfig::default()),
        }
    }

    pub fn abbreviations_enabled(&self) -> bool {
        self.abbreviations
            .as_ref()
            .and_then(|a| a.enabled)
            .unwrap_or(true)
    }
}

/// Platform config directory path: `<config_dir>/recite/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("recite").join("config.toml"))
}

/// Load config by cascading CWD `.recite.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> Result<ConfigFile, ConfigError> {
    let platform = match config_path() {
        Some(p) => load_from_path(&p)?,
        None => None,
    };
    let cwd = load_from_path(Path::new(".recite.toml"))?;

    Ok(match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    })
}

/// Load a config from a specific path. Returns `Ok(None)` if the file
/// doesn't exist; unreadable or malformed files are errors.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(Some(config))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        matching: Some(MatchingConfig {
            max_edit_distance: overlay
                .matching
                .as_ref()
                .and_then(|m| m.max_edit_distance)
                .or_else(|| base.matching.as_ref().and_then(|m| m.max_edit_distance)),
        }),
        abbreviations: Some(AbbreviationsConfig {
            enabled: overlay
                .abbreviations
                .as_ref()
                .and_then(|a| a.enabled)
                .or_else(|| base.abbreviations.as_ref().and_then(|a| a.enabled)),
            url_template: overlay
                .abbreviations
                .as_ref()
                .and_then(|a| a.url_template.clone())
                .or_else(|| {
                    base.abbreviations
                        .as_ref()
                        .and_then(|a| a.url_template.clone())
                }),
            timeout_secs: overlay
                .abbreviations
                .as_ref()
                .and_then(|a| a.timeout_secs)
                .or_else(|| base.abbreviations.as_ref().and_then(|a| a.timeout_secs)),
        }),
    }
}
