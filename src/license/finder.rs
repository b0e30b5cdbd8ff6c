use std::path::Path;

use crate::error::{Error, Result};

/// Upper-cased file names that are treated as license files.
pub const LICENSE_FILE_NAMES: &[&str] = &[
    "COPYING",
    "COPYING.MD",
    "COPYING.TXT",
    "LICENSE",
    "LICENSE.MD",
    "LICENSE.TXT",
];

/// List the regular files in `dir` whose upper-cased name equals one of `names`.
///
/// Names come back sorted, whatever order the filesystem lists them in.
/// An empty result is not an error.
pub fn find_license_files(dir: &Path, names: &[&str]) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::read(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::read(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        let upper = name.to_uppercase();
        if names.iter().any(|candidate| *candidate == upper) {
            found.push(name);
        }
    }

    found.sort();
    Ok(found)
}
