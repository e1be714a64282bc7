//! Configuration loading for Tarea.
//!
//! Configuration lives at `~/.tarea/config.toml`:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:4000/api"
//!
//! [app]
//! ascii_only = false
//! high_contrast = false
//! ```
//!
//! A missing file means defaults; a malformed file is an error the binary
//! reports and then ignores.

use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use tarea_client::DEFAULT_BASE_URL;

#[derive(Debug, Default, Deserialize)]
pub struct TareaConfig {
    pub api: Option<ApiConfig>,
    pub app: Option<AppConfig>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read config at {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config at {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Remote API settings.
#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:4000/api`.
    pub base_url: Option<String>,
}

/// UI settings.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and markers.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

/// Resolved UI options handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}

impl TareaConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// The configured API root, falling back to the default on absence,
    /// parse failure, or a non-HTTP scheme.
    #[must_use]
    pub fn base_url(&self) -> Url {
        let fallback = || Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid");
        let Some(raw) = self.api.as_ref().and_then(|api| api.base_url.as_deref()) else {
            return fallback();
        };
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            Ok(url) => {
                tracing::warn!(scheme = url.scheme(), "ignoring non-HTTP base_url in config");
                fallback()
            }
            Err(err) => {
                tracing::warn!(%err, raw, "ignoring unparseable base_url in config");
                fallback()
            }
        }
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        let app = self.app.as_ref();
        UiOptions {
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tarea").join("config.toml"))
}

/// Directory holding the persisted session token.
pub fn session_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tarea").join("session"))
}

#[cfg(test)]
mod tests {
    use super::TareaConfig;

    #[test]
    fn empty_config_uses_defaults() {
        let config: TareaConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:4000/api");
        assert!(!config.ui_options().ascii_only);
        assert!(!config.ui_options().high_contrast);
    }

    #[test]
    fn base_url_is_read_from_api_section() {
        let config: TareaConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://tareas.example.com/api"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url().as_str(), "https://tareas.example.com/api");
    }

    #[test]
    fn bad_base_url_falls_back_to_default() {
        let config: TareaConfig = toml::from_str(
            r#"
            [api]
            base_url = "mailto:root@localhost"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:4000/api");
    }

    #[test]
    fn app_section_controls_ui_options() {
        let config: TareaConfig = toml::from_str(
            r#"
            [app]
            ascii_only = true
            high_contrast = true
            "#,
        )
        .unwrap();
        assert!(config.ui_options().ascii_only);
        assert!(config.ui_options().high_contrast);
    }
}
