//! Reading the requested SDK version from project files.
//!
//! Supported sources:
//! - FVM: `.fvm/flutter_config.json` (`flutterSdkVersion`), which may name a channel
//! - pubspec: `pubspec.yaml` (`environment.flutter`)

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::channel::{ANY_CHANNEL, is_channel_name};

/// Location of the FVM config relative to the project root.
pub const FVM_CONFIG: &str = ".fvm/flutter_config.json";

/// Location of the pubspec relative to the project root.
pub const PUBSPEC: &str = "pubspec.yaml";

#[derive(Error, Debug)]
pub enum VersionFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{path} does not declare `{key}`")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("`{key}` in {path} must be a quoted string (for example `flutter: '{value}'`)")]
    NotAString {
        path: PathBuf,
        key: &'static str,
        value: String,
    },
}

/// A version/channel pair read from a project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequest {
    pub version: String,
    pub channel: String,
}

fn read(path: &Path) -> Result<String, VersionFileError> {
    std::fs::read_to_string(path).map_err(|source| VersionFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the FVM config under `project_dir`.
///
/// A channel name (`stable`, `beta`, `dev`, `master`) selects the latest
/// release of that channel; anything else is a version on any channel.
///
/// # Errors
///
/// Returns an error if the file is missing, unparsable, or lacks the key.
pub fn read_fvm(project_dir: &Path) -> Result<VersionRequest, VersionFileError> {
    const KEY: &str = "flutterSdkVersion";

    let path = project_dir.join(FVM_CONFIG);
    let json: serde_json::Value =
        serde_json::from_str(&read(&path)?).map_err(|source| VersionFileError::Json {
            path: path.clone(),
            source,
        })?;

    let value = json
        .get(KEY)
        .and_then(serde_json::Value::as_str)
        .ok_or(VersionFileError::MissingKey {
            path: path.clone(),
            key: KEY,
        })?;

    info!("Read Flutter version {value} from FVM configuration");

    if is_channel_name(value) {
        return Ok(VersionRequest {
            version: String::new(),
            channel: value.to_string(),
        });
    }

    Ok(VersionRequest {
        version: value.to_string(),
        channel: ANY_CHANNEL.to_string(),
    })
}

/// Read `environment.flutter` from the pubspec under `project_dir`.
///
/// # Errors
///
/// Returns an error if the file is missing, unparsable, lacks the key, or
/// the version is an unquoted number.
pub fn read_pubspec(project_dir: &Path) -> Result<VersionRequest, VersionFileError> {
    const KEY: &str = "environment.flutter";

    let path = project_dir.join(PUBSPEC);
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&read(&path)?).map_err(|source| VersionFileError::Yaml {
            path: path.clone(),
            source,
        })?;

    let value = match yaml.get("environment").and_then(|env| env.get("flutter")) {
        Some(serde_yaml::Value::String(s)) => s.clone(),
        // `flutter: 1.20` is the float 1.2 by the time it gets here
        Some(serde_yaml::Value::Number(n)) => {
            return Err(VersionFileError::NotAString {
                path: path.clone(),
                key: KEY,
                value: n.to_string(),
            });
        }
        _ => {
            return Err(VersionFileError::MissingKey {
                path: path.clone(),
                key: KEY,
            });
        }
    };

    info!("Read Flutter version {value} from pubspec.yaml");

    Ok(VersionRequest {
        version: value,
        channel: ANY_CHANNEL.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_fvm(dir: &Path, version: &str) {
        fs::create_dir_all(dir.join(".fvm")).unwrap();
        fs::write(
            dir.join(FVM_CONFIG),
            format!("{{\n  \"flutterSdkVersion\": \"{version}\",\n  \"flavors\": {{}}\n}}"),
        )
        .unwrap();
    }

    #[test]
    fn test_fvm_version() {
        let dir = tempdir().unwrap();
        write_fvm(dir.path(), "2.0.6");
        assert_eq!(
            read_fvm(dir.path()).unwrap(),
            VersionRequest {
                version: "2.0.6".into(),
                channel: "any".into(),
            }
        );
    }

    #[test]
    fn test_fvm_channel() {
        let dir = tempdir().unwrap();
        write_fvm(dir.path(), "dev");
        assert_eq!(
            read_fvm(dir.path()).unwrap(),
            VersionRequest {
                version: String::new(),
                channel: "dev".into(),
            }
        );
    }

    #[test]
    fn test_fvm_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_fvm(dir.path()),
            Err(VersionFileError::Io { .. })
        ));
    }

    #[test]
    fn test_fvm_missing_key() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".fvm")).unwrap();
        fs::write(dir.path().join(FVM_CONFIG), "{}").unwrap();
        let err = read_fvm(dir.path()).unwrap_err();
        assert!(err.to_string().contains("flutterSdkVersion"));
    }

    #[test]
    fn test_pubspec_version() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PUBSPEC),
            "name: 'test'\nversion: 1.0.0\n\nenvironment:\n  flutter: '2.0.6'\n  sdk: '>=2.10.0 <3.0.0'",
        )
        .unwrap();
        assert_eq!(
            read_pubspec(dir.path()).unwrap(),
            VersionRequest {
                version: "2.0.6".into(),
                channel: "any".into(),
            }
        );
    }

    #[test]
    fn test_pubspec_unquoted_version_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PUBSPEC),
            "name: test\nenvironment:\n  flutter: 1.20\n",
        )
        .unwrap();

        let err = read_pubspec(dir.path()).unwrap_err();
        assert!(matches!(err, VersionFileError::NotAString { .. }));
        assert!(err.to_string().contains("quoted"));
    }

    #[test]
    fn test_pubspec_quoted_short_version_is_kept() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PUBSPEC),
            "name: test\nenvironment:\n  flutter: '1.20'\n",
        )
        .unwrap();
        assert_eq!(read_pubspec(dir.path()).unwrap().version, "1.20");
    }

    #[test]
    fn test_pubspec_without_flutter_constraint() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PUBSPEC),
            "name: test\nenvironment:\n  sdk: '>=2.12.0 <3.0.0'\n",
        )
        .unwrap();
        assert!(matches!(
            read_pubspec(dir.path()),
            Err(VersionFileError::MissingKey { .. })
        ));
    }
}
