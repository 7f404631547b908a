//! Configuration manager - main API for config operations

use crate::persistence::{ensure_directory_exists, ConfigPersistence};
use crate::{Config, ConfigError, ConfigResult, LogLevel};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "STORYSPARK";

/// Main configuration manager
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager using the platform config directory
    ///
    /// - Linux: `~/.config/storyspark/`
    /// - macOS: `~/Library/Application Support/storyspark/`
    /// - Windows: `%APPDATA%\storyspark\`
    pub fn new() -> ConfigResult<Self> {
        let dirs = project_dirs()?;
        Self::with_directory(dirs.config_dir().to_path_buf())
    }

    /// Creates a config manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        let persistence = ConfigPersistence::new(config_dir.join("config.toml"));

        Ok(Self {
            persistence,
            config_dir,
        })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Loads the configuration from file
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the configuration, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and atomically saves the configuration
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, applies `update_fn` and saves
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if none exists
    ///
    /// Returns Ok(true) if a new file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        log::info!("Generated default config at {}", self.config_path().display());
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Loads the file and applies `STORYSPARK_<SECTION>_<FIELD>` variables
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok());

        config.check()?;

        Ok(config)
    }

    /// Directory for the cache and blob store, created if missing
    ///
    /// `app.cache_dir` wins; otherwise the platform cache directory.
    pub fn resolve_cache_dir(config: &Config) -> ConfigResult<PathBuf> {
        let dir = if config.app.cache_dir.as_os_str().is_empty() {
            project_dirs()?.cache_dir().to_path_buf()
        } else {
            config.app.cache_dir.clone()
        };
        ensure_directory_exists(&dir)?;
        Ok(dir)
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("", "", "storyspark")
        .ok_or(ConfigError::PathResolutionError { what: "user" })
}

/// Applies overrides found through `lookup`; unparsable values are ignored
/// with a warning
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |section: &str, field: &str| {
        let name = format!("{}_{}_{}", ENV_PREFIX, section, field);
        lookup(&name).map(|value| (name, value))
    };

    fn parsed<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
        let parsed = value.trim().parse().ok();
        if parsed.is_none() {
            log::warn!("Ignoring {}={:?}: not a valid value", name, value);
        }
        parsed
    }

    if let Some((name, v)) = var("APP", "LOG_LEVEL") {
        if let Some(level) = parsed::<LogLevel>(&name, &v) {
            config.app.log_level = level;
        }
    }
    if let Some((_, v)) = var("APP", "CACHE_DIR") {
        config.app.cache_dir = PathBuf::from(v);
    }
    if let Some((name, v)) = var("APP", "DEBUG_MODE") {
        if let Some(flag) = parsed(&name, &v) {
            config.app.debug_mode = flag;
        }
    }
    if let Some((_, v)) = var("NETWORK", "API_BASE_URL") {
        config.network.api_base_url = v;
    }
    if let Some((name, v)) = var("NETWORK", "REQUEST_TIMEOUT_SECS") {
        if let Some(secs) = parsed(&name, &v) {
            config.network.request_timeout_secs = secs;
        }
    }
    if let Some((name, v)) = var("PLAYER", "DEFAULT_VOLUME") {
        if let Some(volume) = parsed(&name, &v) {
            config.player.default_volume = volume;
        }
    }
}
