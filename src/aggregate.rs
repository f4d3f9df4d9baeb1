//! Content aggregation: concatenate extracted source files into one text
//! blob, each file under a `# File:` header naming its path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{AlchemistError, Result};

/// Concatenates the files under `root` in the order supplied.
///
/// Each section is `# File: <path>` followed by the file's full text and a
/// blank line. Non-file entries are skipped; a member that cannot be opened
/// or is not valid UTF-8 fails with `UnreadableFile`.
pub fn aggregate_sources(root: &Path, files: &[PathBuf]) -> Result<String> {
    let mut aggregated = String::new();
    let mut sections = 0usize;

    for rel_path in files {
        let full_path = root.join(rel_path);
        if !full_path.is_file() {
            warn!(path = %rel_path.display(), "Skipping non-file entry");
            continue;
        }

        let content = fs::read_to_string(&full_path).map_err(|e| {
            AlchemistError::UnreadableFile {
                path: rel_path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        aggregated.push_str(&format!(
            "# File: {}\n{}\n\n",
            header_name(rel_path),
            content
        ));
        sections += 1;
        debug!(path = %rel_path.display(), bytes = content.len(), "Aggregated file");
    }

    info!(sections, total_bytes = aggregated.len(), "Aggregation complete");
    Ok(aggregated)
}

/// Header paths always use forward slashes, matching archive entry names.
fn header_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
