//! Reading and writing `config.toml`
//!
//! Saves replace the file through a temporary sibling and a rename. Whatever
//! was there before is copied to `config.toml.backup` first.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The config file at a fixed path
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the file, or the defaults when there is none
    ///
    /// Out-of-range values are kept and only logged, so the transfer commands
    /// still run while the user fixes the file.
    pub fn load(&self) -> ConfigResult<Config> {
        if !self.exists() {
            log::debug!("No config at {}, using defaults", self.path.display());
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| ConfigError::ReadError {
            path: self.path.clone(),
            source,
        })?;
        let config = self.parse(&contents)?;

        if let Err(errors) = config.validate() {
            log::warn!("{}: {}", self.path.display(), join(&errors));
        }
        Ok(config)
    }

    fn parse(&self, contents: &str) -> ConfigResult<Config> {
        if contents.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "config file is empty"),
            });
        }

        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::ParseError {
            path: self.path.clone(),
            source,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "{} has version {}, this build understands {}; unknown keys are ignored",
                self.path.display(),
                config.version,
                CONFIG_VERSION
            );
        }
        Ok(config)
    }

    /// Validates `config` and writes it as plain TOML
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        config
            .validate()
            .map_err(|errors| ConfigError::ValidationError(join(&errors)))?;

        let contents = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
        self.replace_with(&contents)
    }

    /// Writes `config` with a comment above every setting
    pub fn save_annotated(&self, config: &Config) -> ConfigResult<()> {
        config
            .validate()
            .map_err(|errors| ConfigError::ValidationError(join(&errors)))?;

        self.replace_with(&annotated(config))
    }

    fn replace_with(&self, contents: &str) -> ConfigResult<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: format!("{} has no parent directory", self.path.display()),
            })?;
        fs::create_dir_all(dir).map_err(|source| ConfigError::DirectoryCreationError {
            path: dir.to_path_buf(),
            source,
        })?;

        if self.exists() {
            let backup = self.path.with_extension("toml.backup");
            fs::copy(&self.path, &backup).map_err(|source| ConfigError::BackupError { source })?;
            log::debug!("Previous config kept at {}", backup.display());
        }

        let mut temp = NamedTempFile::new_in(dir).map_err(ConfigError::IoError)?;
        temp.write_all(contents.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(ConfigError::IoError)?;
        temp.persist(&self.path).map_err(|e| ConfigError::WriteError {
            path: self.path.clone(),
            source: e.error,
        })?;

        log::info!("Config written to {}", self.path.display());
        Ok(())
    }
}

fn join(errors: &[crate::ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Renders `config` as TOML with each setting explained
fn annotated(config: &Config) -> String {
    let transfer = &config.transfer;
    let network = &config.network;
    let user_agent = toml::Value::String(network.user_agent.clone());

    format!(
        r#"# bodystream configuration
version = {version}

[transfer]
# Target rate in bytes per second for uploads and downloads. 0 = unlimited.
# A limit also enables the progress line. Overridden by --limit.
bandwidth_limit = {bandwidth_limit}

# Expected body size in bytes, used for the progress percentage.
# 0 = unknown, the percentage is left out. Overridden by --size.
size_hint = {size_hint}

# Render "Progress: <bytes>b <rate>b/s <percent>" at most once a second.
show_progress = {show_progress}

[network]
# Seconds allowed to establish a connection.
connect_timeout_secs = {connect_timeout_secs}

# Deadline in seconds for a whole exchange, body included. 0 = none.
# A throttled transfer takes size / bandwidth_limit seconds, keep room for it.
timeout_secs = {timeout_secs}

user_agent = {user_agent}
max_redirects = {max_redirects}

# Size in bytes of the pieces a response body is written to its sink in.
chunk_size = {chunk_size}

# Log "request/response using streaming" whenever a body is streamed.
debug_streaming = {debug_streaming}
"#,
        version = config.version,
        bandwidth_limit = transfer.bandwidth_limit,
        size_hint = transfer.size_hint,
        show_progress = transfer.show_progress,
        connect_timeout_secs = network.connect_timeout_secs,
        timeout_secs = network.timeout_secs,
        user_agent = user_agent,
        max_redirects = network.max_redirects,
        chunk_size = network.chunk_size,
        debug_streaming = network.debug_streaming,
    )
}
