use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Error, anyhow};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::utils::expand_tilde;

const APP_DIR: &str = "webapp-creator";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paths {
    /// Where launcher files are written. Defaults to `$XDG_DATA_HOME/applications`.
    #[serde(default)]
    pub applications_dir: Option<PathBuf>,
    /// Where downloaded icons are stored. Defaults to `$XDG_DATA_HOME/icons`.
    #[serde(default)]
    pub icons_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconSettings {
    pub user_agent: String,
    /// Favicon lookup URL; `{domain}` is replaced by the app's host.
    pub favicon_service: String,
    pub timeout_secs: u64,
    /// `Icon=` value used when no icon could be installed.
    pub fallback_icon: String,
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const DEFAULT_FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons?domain={domain}&sz=128";

impl Default for IconSettings {
    fn default() -> Self {
        IconSettings {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            favicon_service: DEFAULT_FAVICON_SERVICE.to_string(),
            timeout_secs: 15,
            fallback_icon: "web-browser".to_string(),
        }
    }
}

impl IconSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub icon: IconSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: 1,
            paths: Paths::default(),
            icon: IconSettings::default(),
        }
    }
}

/// Concrete directories every stage works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub applications_dir: PathBuf,
    pub icons_dir: PathBuf,
}

impl Config {
    pub fn layout(&self) -> Result<Layout, Error> {
        let data_dir = dirs::data_dir();

        let resolve = |configured: &Option<PathBuf>, leaf: &str| -> Result<PathBuf, Error> {
            match (configured, &data_dir) {
                (Some(path), _) => Ok(expand_tilde(path)),
                (None, Some(data)) => Ok(data.join(leaf)),
                (None, None) => Err(anyhow!(
                    "Could not determine the user data directory; \
                     set paths.{}_dir in the configuration",
                    leaf
                )),
            }
        };

        Ok(Layout {
            applications_dir: resolve(&self.paths.applications_dir, "applications")?,
            icons_dir: resolve(&self.paths.icons_dir, "icons")?,
        })
    }
}

const CONFIG_FILE: &str = "webapp-creator.json";

/// `$XDG_CONFIG_HOME/webapp-creator/webapp-creator.json`, or the working
/// directory when no config home is known.
pub fn get_config_path() -> Option<PathBuf> {
    match dirs::config_dir() {
        Some(config_home) => Some(config_home.join(APP_DIR).join(CONFIG_FILE)),
        None => env::current_dir().ok().map(|cwd| cwd.join(CONFIG_FILE)),
    }
}

pub fn get_log_dir() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::data_dir)
        .map(|dir| dir.join(APP_DIR).join("logs"))
}

pub fn create_default_config(path: &Path) -> Result<Config, Error> {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    info!(path = %path.display(), "wrote default configuration");
    Ok(config)
}

/// Loads the config at `path`, writing defaults first when it is missing or
/// `reset` is set.
pub fn initialize_configuration(path: &Path, reset: bool) -> Result<Config, Error> {
    if reset || !path.exists() {
        return create_default_config(path);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/webapp-creator.json");

        let config = initialize_configuration(&path, false).unwrap();

        assert!(path.exists());
        assert_eq!(config.version, 1);
        assert_eq!(config.icon.fallback_icon, "web-browser");
        assert!(config.icon.favicon_service.contains("{domain}"));
    }

    #[test]
    fn reset_replaces_existing_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("webapp-creator.json");
        let custom = r#"{"version":1,"icon":{"user_agent":"x","favicon_service":"y",
            "timeout_secs":1,"fallback_icon":"z"}}"#;
        fs::write(&path, custom).unwrap();

        let kept = initialize_configuration(&path, false).unwrap();
        assert_eq!(kept.icon.fallback_icon, "z");

        let reset = initialize_configuration(&path, true).unwrap();
        assert_eq!(reset.icon.fallback_icon, "web-browser");
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("webapp-creator.json");
        fs::write(&path, r#"{"version":1,"paths":{"applications_dir":"/tmp/apps"}}"#).unwrap();

        let config = initialize_configuration(&path, false).unwrap();

        assert_eq!(config.icon.timeout_secs, 15);
        assert_eq!(config.paths.applications_dir, Some(PathBuf::from("/tmp/apps")));
        assert_eq!(config.paths.icons_dir, None);
    }

    #[test]
    fn invalid_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("webapp-creator.json");
        fs::write(&path, "not json").unwrap();

        let err = initialize_configuration(&path, false).unwrap_err();

        assert!(err.to_string().contains(&path.display().to_string()));
        assert!(err.chain().any(|cause| cause.is::<serde_json::Error>()));
    }

    #[test]
    fn unwritable_config_location_names_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("webapp-creator.json");

        let err = initialize_configuration(&path, false).unwrap_err();

        assert!(err.to_string().contains("Failed to create config directory"));
    }

    #[test]
    fn explicit_paths_win_over_data_dir() {
        let config = Config {
            paths: Paths {
                applications_dir: Some(PathBuf::from("/srv/apps")),
                icons_dir: Some(PathBuf::from("/srv/icons")),
            },
            ..Config::default()
        };

        let layout = config.layout().unwrap();

        assert_eq!(layout.applications_dir, PathBuf::from("/srv/apps"));
        assert_eq!(layout.icons_dir, PathBuf::from("/srv/icons"));
    }
}
