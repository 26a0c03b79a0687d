//! Exporting the installed SDK to the caller's environment.
//!
//! On a CI runner that exposes `GITHUB_ENV` / `GITHUB_PATH` the values are
//! appended to those files. Anywhere else they are rendered as shell
//! `export` lines for the caller to `eval`.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Variable pointing at the SDK root.
pub const FLUTTER_ROOT: &str = "FLUTTER_ROOT";

/// Variables and PATH entries for an installed SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkEnvironment {
    pub variables: Vec<(String, String)>,
    pub path_entries: Vec<PathBuf>,
}

impl SdkEnvironment {
    /// `FLUTTER_ROOT`, plus the `flutter` and bundled `dart` binaries on PATH.
    pub fn for_sdk(root: &Path) -> Self {
        Self {
            variables: vec![(FLUTTER_ROOT.to_string(), root.display().to_string())],
            path_entries: vec![
                root.join("bin"),
                root.join("bin").join("cache").join("dart-sdk").join("bin"),
            ],
        }
    }
}

/// Where exported values end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// Append to the runner's env and path files.
    Runner { env_file: PathBuf, path_file: PathBuf },
    /// Render `export` lines for a POSIX shell.
    Shell,
}

impl ExportTarget {
    /// Pick the runner files when both are advertised, otherwise the shell.
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        match (file("GITHUB_ENV"), file("GITHUB_PATH")) {
            (Some(env_file), Some(path_file)) => Self::Runner {
                env_file,
                path_file,
            },
            _ => Self::Shell,
        }
    }
}

/// Export `env` to `target`, returning any lines the caller should print.
///
/// # Errors
///
/// Returns an error if a runner file cannot be appended to.
pub fn export(env: &SdkEnvironment, target: &ExportTarget) -> io::Result<Vec<String>> {
    match target {
        ExportTarget::Runner {
            env_file,
            path_file,
        } => {
            let mut file = OpenOptions::new().create(true).append(true).open(env_file)?;
            for (key, value) in &env.variables {
                writeln!(file, "{key}={value}")?;
            }

            let mut file = OpenOptions::new().create(true).append(true).open(path_file)?;
            for entry in &env.path_entries {
                writeln!(file, "{}", entry.display())?;
            }

            debug!(
                "Exported {} variables and {} PATH entries to runner files",
                env.variables.len(),
                env.path_entries.len()
            );
            Ok(Vec::new())
        }
        ExportTarget::Shell => {
            let separator = if cfg!(windows) { ";" } else { ":" };
            let mut lines: Vec<String> = env
                .variables
                .iter()
                .map(|(key, value)| format!("export {key}=\"{value}\""))
                .collect();

            let path = env
                .path_entries
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(separator);
            lines.push(format!("export PATH=\"{path}{separator}$PATH\""));

            Ok(lines)
        }
    }
}
