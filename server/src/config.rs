use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

const PORT: u16 = 5000;
const UPLOAD_DIR: &str = "./files";
const MAX_UPLOAD_SIZE: usize = 2 * 1024 * 1024 * 1024; /* 2GB */

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Service settings. Read once at startup and never changed afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory uploaded files are written into
    pub upload_root: PathBuf,
    /// Directory files are looked up in for download. May be the same as `upload_root`
    pub download_root: PathBuf,
    /// Request body limit in bytes
    pub max_upload_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("FSTORE_PORT") {
            Some(v) => parse_number("FSTORE_PORT", v)?,
            None => PORT,
        };
        let max_upload_size = match lookup("FSTORE_MAX_UPLOAD") {
            Some(v) => parse_number("FSTORE_MAX_UPLOAD", v)?,
            None => MAX_UPLOAD_SIZE,
        };
        let upload_root =
            PathBuf::from(lookup("FSTORE_UPLOAD_DIR").unwrap_or_else(|| String::from(UPLOAD_DIR)));
        let download_root = lookup("FSTORE_DOWNLOAD_DIR")
            .map_or_else(|| upload_root.clone(), PathBuf::from);

        Ok(Self {
            port,
            upload_root,
            download_root,
            max_upload_size,
        })
    }

    /// Same directory for both uploads and downloads, default everything else.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            port: PORT,
            upload_root: root.clone(),
            download_root: root,
            max_upload_size: MAX_UPLOAD_SIZE,
        }
    }
}

fn parse_number<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidNumber {
            name,
            value,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        // Arrange
        let lookup = lookup_in(&[]);

        // Act
        let config = Config::from_lookup(lookup).unwrap();

        // Assert
        assert_eq!(config.port, 5000);
        assert_eq!(config.upload_root, PathBuf::from("./files"));
        assert_eq!(config.download_root, config.upload_root);
        assert_eq!(config.max_upload_size, MAX_UPLOAD_SIZE);
    }

    #[test]
    fn separate_download_root() {
        // Arrange
        let lookup = lookup_in(&[
            ("FSTORE_UPLOAD_DIR", "/srv/in"),
            ("FSTORE_DOWNLOAD_DIR", "/srv/out"),
            ("FSTORE_PORT", "8080"),
        ]);

        // Act
        let config = Config::from_lookup(lookup).unwrap();

        // Assert
        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_root, PathBuf::from("/srv/in"));
        assert_eq!(config.download_root, PathBuf::from("/srv/out"));
    }

    #[rstest]
    #[case("FSTORE_PORT", "http")]
    #[case("FSTORE_PORT", "70000")]
    #[case("FSTORE_MAX_UPLOAD", "-1")]
    #[trace]
    fn invalid_numbers_rejected(#[case] name: &str, #[case] value: &str) {
        // Arrange
        let lookup = lookup_in(&[(name, value)]);

        // Act
        let result = Config::from_lookup(lookup);

        // Assert
        assert!(matches!(result, Err(ConfigError::InvalidNumber { .. })));
    }
}
