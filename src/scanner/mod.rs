//! Metric directory scanner.
//!
//! Lists the direct entries of the metrics directory. Subdirectories are
//! never descended into.

use crate::error::{JoinError, Result};
use crate::merge::is_metric_file;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A metric source found in the metrics directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricFile {
    /// File name without the directory part.
    pub file_name: String,
    /// Full path to the file.
    pub path: PathBuf,
}

/// List the regular files directly inside `folder`, sorted by name.
///
/// Symlinks are resolved, so a link to a file counts as a file. Names that
/// are not valid UTF-8 are rendered lossily.
pub fn list_metric_files(folder: &Path) -> Result<Vec<String>> {
    Ok(read_files(folder)?
        .into_iter()
        .map(|file| file.file_name)
        .collect())
}

/// List the metric source files in `folder`, i.e. regular files ending in `extension`.
pub fn scan_metric_files(folder: &Path, extension: &str) -> Result<Vec<MetricFile>> {
    let files = read_files(folder)?
        .into_iter()
        .filter(|file| {
            let keep = is_metric_file(&file.file_name, extension);
            if !keep {
                debug!("Ignoring {} (no {} suffix)", file.file_name, extension);
            }
            keep
        })
        .collect();

    Ok(files)
}

/// Regular files directly inside `folder`, keeping the path walkdir reports.
fn read_files(folder: &Path) -> Result<Vec<MetricFile>> {
    if !folder.exists() {
        return Err(JoinError::NotFound {
            path: folder.to_path_buf(),
        });
    }

    if !folder.is_dir() {
        return Err(JoinError::InvalidInput(format!(
            "not a directory: {}",
            folder.display()
        )));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if is_dangling_link(&e) => {
                warn!("Skipping dangling link: {}", e);
                continue;
            }
            Err(e) => return Err(walk_error(folder, e)),
        };

        if !entry.file_type().is_file() {
            debug!("Skipping non-file entry: {}", entry.path().display());
            continue;
        }

        files.push(MetricFile {
            file_name: entry.file_name().to_string_lossy().to_string(),
            path: entry.into_path(),
        });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// A directory entry whose link target is missing, which is not a file.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    err.depth() == 1
        && err
            .io_error()
            .map_or(false, |e| e.kind() == io::ErrorKind::NotFound)
}

fn walk_error(folder: &Path, err: walkdir::Error) -> JoinError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| folder.to_path_buf());
    JoinError::Io {
        path,
        source: err.into(),
    }
}
