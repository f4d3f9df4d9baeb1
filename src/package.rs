//! Output packaging: write the final artifact into a second scratch
//! directory and zip it up for download.

use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AlchemistError, Result};

/// File name for the generated service application inside the archive.
pub const GENERATED_FILE_NAME: &str = "app.py";

/// File name for the static usage sample shipped alongside it.
pub const USAGE_FILE_NAME: &str = "USAGE.txt";

const USAGE_EXAMPLE: &str = "\
Run the generated application:

    pip install flask
    python app.py

The API listens on http://127.0.0.1:5000 by default. Inspect app.py for the
routes the transformation produced.
";

/// The zipped result of one run, plus the (already removed) scratch path it
/// was staged in.
pub struct PackagedArchive {
    pub bytes: Vec<u8>,
    pub scratch_path: PathBuf,
}

/// Stages `artifact` as `app.py` in a fresh scratch directory, optionally
/// alongside the usage sample, and zips every file in that directory with
/// relative-path naming. The scratch directory is removed before returning.
pub fn package_artifact(artifact: &str, include_usage_example: bool) -> Result<PackagedArchive> {
    let scratch = TempDir::new()?;
    let scratch_path = scratch.path().to_path_buf();

    fs::write(scratch.path().join(GENERATED_FILE_NAME), artifact)?;
    if include_usage_example {
        fs::write(scratch.path().join(USAGE_FILE_NAME), USAGE_EXAMPLE)?;
    }

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut names: Vec<String> = Vec::new();
        for entry in fs::read_dir(scratch.path())? {
            let entry = entry?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        // Deterministic member order regardless of directory iteration order.
        names.sort();

        for name in &names {
            let content = fs::read(scratch.path().join(name))?;
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| AlchemistError::InvalidArchive {
                    reason: format!("failed to add {name}: {e}"),
                })?;
            writer.write_all(&content)?;
        }

        writer.finish().map_err(|e| AlchemistError::InvalidArchive {
            reason: format!("failed to finalize output archive: {e}"),
        })?;
    }
    let bytes = cursor.into_inner();

    info!(
        bytes = bytes.len(),
        usage_example = include_usage_example,
        "Output archive packaged"
    );

    if let Err(e) = scratch.close() {
        warn!(error = ?e, path = %scratch_path.display(), "Failed to remove packaging scratch");
    }

    Ok(PackagedArchive {
        bytes,
        scratch_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::io::Read;
    use zip::ZipArchive;

    fn unpack(bytes: &[u8]) -> BTreeMap<String, String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut members = BTreeMap::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).unwrap();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            members.insert(entry.name().to_string(), content);
        }
        members
    }

    #[test]
    fn packages_generated_file_with_usage_sample() {
        let packaged = package_artifact("from flask import Flask", true).unwrap();
        let members = unpack(&packaged.bytes);

        assert_eq!(members.len(), 2);
        assert_eq!(members[GENERATED_FILE_NAME], "from flask import Flask");
        assert!(members[USAGE_FILE_NAME].contains("python app.py"));
    }

    #[test]
    fn packages_exactly_one_file_without_usage_sample() {
        let packaged = package_artifact("code", false).unwrap();
        let members = unpack(&packaged.bytes);

        assert_eq!(members.len(), 1);
        assert_eq!(members[GENERATED_FILE_NAME], "code");
    }

    #[test]
    fn packaging_scratch_is_removed() {
        let packaged = package_artifact("code", true).unwrap();
        assert!(!packaged.scratch_path.exists());
    }
}
