//! Locating, loading and creating the config file

use crate::persistence::ConfigFile;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";

/// Owns the config file inside one directory
pub struct ConfigManager {
    file: ConfigFile,
}

impl ConfigManager {
    /// Uses the platform config directory
    ///
    /// - Linux: `~/.config/bodystream/`
    /// - macOS: `~/Library/Application Support/bodystream/`
    /// - Windows: `%APPDATA%\bodystream\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = ProjectDirs::from("", "", "bodystream")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })?;
        Self::with_directory(config_dir)
    }

    /// Uses `config_dir` instead, as `--config-dir` does
    pub fn with_directory(config_dir: PathBuf) -> ConfigResult<Self> {
        Ok(Self {
            file: ConfigFile::new(config_dir.join(CONFIG_FILE)),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    /// Missing file gives the defaults, an unreadable one an error
    pub fn load(&self) -> ConfigResult<Config> {
        self.file.load()
    }

    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.save(config)
    }

    /// Writes the commented default file unless one exists
    ///
    /// Returns whether a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.file.exists() {
            return Ok(false);
        }

        self.file.save_annotated(&Config::default())?;
        Ok(true)
    }

    /// Loads the config and applies environment overrides
    ///
    /// Variables follow the pattern `BODYSTREAM_SECTION_FIELD`, for example
    /// `BODYSTREAM_TRANSFER_BANDWIDTH_LIMIT=65536`. Unparsable values are
    /// ignored with a warning.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    fn parse<T: std::str::FromStr>(key: &str, value: String) -> Option<T> {
        match value.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("Ignoring {}={:?}: not a valid value", key, value);
                None
            }
        }
    }

    let var = |key: &str| lookup(key).map(|value| (key.to_string(), value));

    if let Some(v) = var("BODYSTREAM_TRANSFER_BANDWIDTH_LIMIT").and_then(|(k, v)| parse(&k, v)) {
        config.transfer.bandwidth_limit = v;
    }
    if let Some(v) = var("BODYSTREAM_TRANSFER_SIZE_HINT").and_then(|(k, v)| parse(&k, v)) {
        config.transfer.size_hint = v;
    }
    if let Some(v) = var("BODYSTREAM_TRANSFER_SHOW_PROGRESS").and_then(|(k, v)| parse(&k, v)) {
        config.transfer.show_progress = v;
    }
    if let Some(v) = var("BODYSTREAM_NETWORK_CONNECT_TIMEOUT_SECS").and_then(|(k, v)| parse(&k, v)) {
        config.network.connect_timeout_secs = v;
    }
    if let Some(v) = var("BODYSTREAM_NETWORK_TIMEOUT_SECS").and_then(|(k, v)| parse(&k, v)) {
        config.network.timeout_secs = v;
    }
    if let Some((_, v)) = var("BODYSTREAM_NETWORK_USER_AGENT") {
        config.network.user_agent = v;
    }
    if let Some(v) = var("BODYSTREAM_NETWORK_DEBUG_STREAMING").and_then(|(k, v)| parse(&k, v)) {
        config.network.debug_streaming = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn setup_test_manager() -> (TempDir, ConfigManager) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())
            .expect("Failed to create manager");
        (temp_dir, manager)
    }

    #[test]
    fn test_initialize_creates_file_once() {
        let (_temp_dir, manager) = setup_test_manager();

        assert!(manager.initialize().expect("Should initialize"));
        assert!(manager.config_path().exists());

        let mut edited = Config::default();
        edited.transfer.bandwidth_limit = 1000;
        manager.save(&edited).expect("Should save");

        assert!(!manager.initialize().expect("Should initialize"));
        assert_eq!(manager.load().expect("Should load"), edited);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_temp_dir, manager) = setup_test_manager();
        std::fs::write(manager.config_path(), "[transfer\n").expect("Should write");

        assert!(manager.load().is_err());
        assert!(manager.load_with_env_overrides().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BODYSTREAM_TRANSFER_BANDWIDTH_LIMIT", "65536"),
            ("BODYSTREAM_TRANSFER_SHOW_PROGRESS", "false"),
            ("BODYSTREAM_NETWORK_DEBUG_STREAMING", "true"),
            ("BODYSTREAM_NETWORK_TIMEOUT_SECS", "soon"),
            ("BODYSTREAM_NETWORK_CONNECT_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.transfer.bandwidth_limit, 65536);
        assert!(!config.transfer.show_progress);
        assert!(config.network.debug_streaming);
        assert_eq!(config.network.timeout_secs, 0);
        assert_eq!(config.network.connect_timeout_secs, 5);
    }

    #[test]
    fn test_config_file_path() {
        let (_temp_dir, manager) = setup_test_manager();
        assert!(manager.config_path().ends_with("config.toml"));
    }
}
