//! Credentials file loading
//!
//! Credentials live in `~/.skewer.toml` as a flat table whose keys are passed
//! to the warehouse driver unchanged:
//!
//! ```toml
//! host = "td.example.com"
//! user = "dbc"
//! password = "dbc"
//! logmech = "TD2"
//! ```
//!
//! [`load_config`] never fails. A missing or unreadable file yields empty
//! credentials, and the first connection attempt then reports a
//! configuration error.

use crate::credentials::Credentials;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the credentials file in the user's home directory
pub const CONFIG_FILE_NAME: &str = ".skewer.toml";

/// Error reading a credentials file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `~/.skewer.toml`, if a home directory can be resolved
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Read credentials from `path`, reporting every failure
pub fn read_credentials(path: &Path) -> Result<Credentials, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load credentials from `path`, falling back to empty credentials
pub fn load_config_from(path: &Path) -> Credentials {
    match read_credentials(path) {
        Ok(credentials) => {
            tracing::debug!(path = %path.display(), fields = credentials.len(), "loaded credentials");
            credentials
        }
        Err(ConfigError::NotFound(path)) => {
            tracing::warn!(path = %path.display(), "config file not found");
            Credentials::default()
        }
        Err(error) => {
            tracing::warn!(%error, "error loading config");
            Credentials::default()
        }
    }
}

/// Load credentials from `~/.skewer.toml`
pub fn load_config() -> Credentials {
    match default_config_path() {
        Some(path) => load_config_from(&path),
        None => {
            tracing::warn!("could not resolve home directory, no credentials loaded");
            Credentials::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_success() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "host = \"localhost\"\nuser = \"test\"\npassword = \"pwd\"").unwrap();

        let credentials = load_config_from(file.path());
        assert_eq!(credentials.text("host").as_deref(), Some("localhost"));
        assert_eq!(credentials.text("user").as_deref(), Some("test"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join(CONFIG_FILE_NAME);

        assert!(load_config_from(&path).is_empty());
        assert!(matches!(read_credentials(&path), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "host = ").unwrap();

        assert!(load_config_from(file.path()).is_empty());
        assert!(matches!(read_credentials(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_nested_tables_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server]\nhost = \"localhost\"").unwrap();

        assert!(read_credentials(file.path()).is_err());
    }

    #[test]
    fn test_default_config_path_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }
}
