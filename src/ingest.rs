//! Archive ingestion: extract an uploaded zip into a per-run scratch
//! directory and enumerate its file entries.

use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, error, info};
use zip::ZipArchive;

use crate::error::{AlchemistError, Result};

/// The extracted members of one uploaded archive, materialized on disk.
///
/// The scratch directory is unique per run and removed when this value is
/// dropped, so a failed pipeline never leaves extraction state behind.
pub struct ExtractedFileSet {
    scratch: TempDir,
    files: Vec<PathBuf>,
}

impl ExtractedFileSet {
    /// Root of the scratch directory the members were extracted into.
    pub fn root(&self) -> &Path {
        self.scratch.path()
    }

    /// Relative member paths, in archive order. Directory entries excluded.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Owned copy of the scratch path, for post-run cleanup verification.
    pub fn scratch_path(&self) -> PathBuf {
        self.scratch.path().to_path_buf()
    }

    /// Removes the scratch directory now instead of at drop time.
    pub fn close(self) -> Result<()> {
        self.scratch.close().map_err(AlchemistError::from)
    }
}

/// Extracts all file entries of `bytes` into a fresh scratch directory.
///
/// Fails with `InvalidArchive` if the bytes are not a readable zip container
/// or an entry path would escape the scratch root.
pub fn extract_archive(bytes: &[u8]) -> Result<ExtractedFileSet> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        error!(error = ?e, "Uploaded bytes are not a readable zip archive");
        AlchemistError::InvalidArchive {
            reason: e.to_string(),
        }
    })?;

    let scratch = TempDir::new()?;
    debug!(scratch = %scratch.path().display(), entries = archive.len(), "Extracting archive");

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| AlchemistError::InvalidArchive {
                reason: format!("entry {index}: {e}"),
            })?;

        if entry.is_dir() {
            continue;
        }

        let rel_path = sanitize_entry_path(entry.name())?;
        let out_path = scratch.path().join(&rel_path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out_file = fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out_file)?;

        debug!(path = %rel_path.display(), "Extracted member");
        files.push(rel_path);
    }

    info!(
        count = files.len(),
        scratch = %scratch.path().display(),
        "Archive extracted"
    );

    Ok(ExtractedFileSet { scratch, files })
}

/// Rejects entry names that are absolute or traverse outside the scratch
/// root. `./` components are dropped, everything else must be a normal
/// path segment.
fn sanitize_entry_path(name: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(AlchemistError::InvalidArchive {
                    reason: format!("unsafe entry path: {name}"),
                })
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(AlchemistError::InvalidArchive {
            reason: format!("empty entry path: {name}"),
        });
    }
    Ok(clean)
}
