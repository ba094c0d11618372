//! # Config Loader
//!
//! Locates configuration files and decodes them into typed structs.
//!
//! ```no_run
//! use config_loader::{find_config_file, load_json_file};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Settings {
//!     log_level: String,
//! }
//!
//! let path = find_config_file("loopback.json")?;
//! let settings: Settings = load_json_file(&path)?;
//! # Ok::<(), config_loader::ConfigError>(())
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that may point straight at a configuration file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Reads a configuration file into a string without interpreting it.
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))
}

/// Reads and decodes a JSON configuration file.
pub fn load_json_file<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = load_config_file(path)?;
    parse_json(&path.display().to_string(), &content)
}

/// Decodes JSON text, naming `source_name` in the error on failure.
pub fn parse_json<T: DeserializeOwned>(source_name: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| ConfigError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Looks for `filename` in the usual places.
///
/// Search order:
/// 1. the path in `CONFIG_PATH`, if it exists
/// 2. `./config/{filename}`
/// 3. `./{filename}`
pub fn find_config_file(filename: &str) -> Result<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(Path::new("./config").join(filename));
    candidates.push(Path::new(".").join(filename));

    find_in(&candidates).ok_or_else(|| {
        ConfigError::FileNotFound(format!(
            "'{}' (searched {} env var, ./config/{}, ./{})",
            filename, CONFIG_PATH_ENV, filename, filename
        ))
    })
}

fn find_in(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.is_file()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default)]
        retries: u32,
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_find_nonexistent_file() {
        assert!(find_config_file("file_that_definitely_does_not_exist_12345.json").is_err());
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.json");
        fs::write(&path, r#"{ "name": "loopback" }"#).unwrap();

        let sample: Sample = load_json_file(&path).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "loopback".to_string(),
                retries: 0
            }
        );
    }

    #[test]
    fn test_parse_json_reports_source() {
        let err = parse_json::<Sample>("CONFIG env", "{ not json").unwrap_err();
        match err {
            ConfigError::Parse { source_name, .. } => assert_eq!(source_name, "CONFIG env"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_in_prefers_first_existing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let present = dir.path().join("present.json");
        fs::write(&present, "{}").unwrap();

        let found = find_in(&[missing, present.clone()]);
        assert_eq!(found, Some(present));
    }
}
