//! Log directory discovery.

use std::path::{Path, PathBuf};

use investigator_core::error::{InvestigatorError, Result};
use tracing::debug;

/// List the regular files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into. Symlinks are followed, so a link to
/// a regular file counts as a file. Fails with
/// [`InvestigatorError::DirectoryNotFound`] when `dir` is missing or is not a
/// directory; an existing directory without files yields an empty list.
/// Returned errors are left to the caller to report.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(InvestigatorError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(entry) => debug!("Skipping non-file entry {}", entry.path().display()),
            // The directory itself could not be listed.
            Err(e) if e.depth() == 0 => return Err(InvestigatorError::Io(e.into())),
            Err(e) => debug!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }

    files.sort();
    Ok(files)
}
