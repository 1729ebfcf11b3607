//! Loading of the `vetting.toml` configuration file.
//!
//! The file deserialises straight into [`SuiteConfig`]: top-level keys
//! select the checkers and run mode, and one table per checker carries its
//! settings. Omitted keys fall back to their defaults and unknown keys are
//! rejected, so a typo never silently disables a check.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;
use std::io;
use thiserror::Error;
use vetting_suite::SuiteConfig;

/// Conventional name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "vetting.toml";

/// Failures while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Read {
        /// File that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid configuration.
    #[error("invalid configuration in {path}")]
    Parse {
        /// File that was parsed.
        path: Utf8PathBuf,
        /// Deserialisation failure, including the offending key.
        #[source]
        source: toml::de::Error,
    },
}

/// Loads the configuration at `path` from disk.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file cannot be read and
/// [`ConfigError::Parse`] when its contents do not deserialise.
pub fn load_config(path: &Utf8Path) -> Result<SuiteConfig, ConfigError> {
    load_config_with(path, |path| fs::read_to_string(path))
}

/// Loads the configuration at `path` through `reader`.
///
/// Tests inject a reader so configuration handling can be exercised without
/// touching the filesystem.
///
/// # Errors
///
/// As for [`load_config`].
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use vetting::config::load_config_with;
///
/// let config = load_config_with(Utf8Path::new("vetting.toml"), |_| {
///     Ok("fail_fast = true\n".to_owned())
/// })
/// .expect("valid configuration");
/// assert!(config.fail_fast);
/// ```
pub fn load_config_with<F>(path: &Utf8Path, reader: F) -> Result<SuiteConfig, ConfigError>
where
    F: FnOnce(&Utf8Path) -> io::Result<String>,
{
    let source = reader(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    let config = toml::from_str(&source).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;
    debug!(target: "vetting::config", "loaded configuration from {path}");
    Ok(config)
}
