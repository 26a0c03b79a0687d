//! Archive extraction module
//!
//! Handles tar.xz (Linux), zip (macOS, Windows), and tar.gz archives.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use tracing::debug;
use xz2::read::XzDecoder;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Archive error: {0}")]
    Archive(String),
}

/// Archive formats found in the release catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarXz,
    TarGz,
    Zip,
}

/// Detect archive format from a file name
pub fn detect_format(name: &str) -> Option<ArchiveFormat> {
    let name = name.to_lowercase();

    if name.ends_with(".tar.xz") || name.ends_with(".txz") {
        Some(ArchiveFormat::TarXz)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(ArchiveFormat::TarGz)
    } else if name.ends_with(".zip") {
        Some(ArchiveFormat::Zip)
    } else {
        None
    }
}

/// Extract `archive_path` into `dest_dir` and return the SDK root inside it.
///
/// The format is chosen from `original_name` (the downloaded file's name as
/// published) since the local file may have been saved under another name.
///
/// # Errors
///
/// Returns an error if the format is unknown, the archive is corrupt, or an
/// entry would be written outside `dest_dir`.
pub fn extract_archive(
    archive_path: &Path,
    original_name: &str,
    dest_dir: &Path,
) -> Result<PathBuf, ExtractError> {
    if !archive_path.is_file() {
        return Err(ExtractError::Archive(format!(
            "{} is not a file",
            archive_path.display()
        )));
    }

    let format = detect_format(original_name)
        .ok_or_else(|| ExtractError::UnsupportedFormat(original_name.to_string()))?;

    let entries = match format {
        ArchiveFormat::TarXz => {
            let reader = BufReader::new(File::open(archive_path)?);
            extract_tar(XzDecoder::new(reader), dest_dir)?
        }
        ArchiveFormat::TarGz => {
            let reader = BufReader::new(File::open(archive_path)?);
            extract_tar(GzDecoder::new(reader), dest_dir)?
        }
        ArchiveFormat::Zip => extract_zip(archive_path, dest_dir)?,
    };

    debug!(
        "Extracted {} entries from {} into {}",
        entries,
        original_name,
        dest_dir.display()
    );

    Ok(sdk_root(dest_dir)?)
}

/// Extract a tar archive from a reader
fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<usize, ExtractError> {
    fs::create_dir_all(dest_dir)?;

    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);
    let mut count = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        // unpack_in refuses entries that would land outside dest_dir
        if !entry.unpack_in(dest_dir)? {
            return Err(ExtractError::Archive(format!(
                "Invalid path in archive: {}",
                entry_path.display()
            )));
        }
        count += 1;
    }

    Ok(count)
}

/// Extract a zip archive
fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;

    fs::create_dir_all(dest_dir)?;
    let mut count = 0;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::Archive(e.to_string()))?;
        let Some(relative_path) = file.enclosed_name().map(|p| p.to_path_buf()) else {
            debug!("Skipping unsafe zip entry {}", file.name());
            continue;
        };
        let absolute_path = dest_dir.join(&relative_path);

        if file.is_dir() {
            fs::create_dir_all(&absolute_path)?;
            continue;
        }

        if let Some(p) = absolute_path.parent() {
            fs::create_dir_all(p)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = file.unix_mode();

            // Symlinks are stored as regular entries whose content is the target
            if let Some(mode) = mode.filter(|m| m & 0o170_000 == 0o120_000) {
                let mut target = String::new();
                file.read_to_string(&mut target)?;
                if absolute_path.symlink_metadata().is_ok() {
                    fs::remove_file(&absolute_path)?;
                }
                std::os::unix::fs::symlink(&target, &absolute_path)?;
                debug!("Linked {} -> {target} (mode {mode:o})", relative_path.display());
                count += 1;
                continue;
            }

            let mut outfile = File::create(&absolute_path)?;
            io::copy(&mut file, &mut outfile)?;
            if let Some(mode) = mode {
                fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }
        #[cfg(not(unix))]
        {
            let mut outfile = File::create(&absolute_path)?;
            io::copy(&mut file, &mut outfile)?;
        }

        count += 1;
    }

    Ok(count)
}

/// The single top-level directory inside `dir`, or `dir` itself if there is not exactly one.
///
/// Hidden entries (like `.DS_Store`) are ignored.
pub fn sdk_root(dir: &Path) -> io::Result<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(Result::ok).collect();
    entries.retain(|e| !e.file_name().to_string_lossy().starts_with('.'));

    if entries.len() == 1 && entries[0].file_type()?.is_dir() {
        Ok(entries[0].path())
    } else {
        Ok(dir.to_path_buf())
    }
}
