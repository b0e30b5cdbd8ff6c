use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

pub const MANIFEST_NAME: &str = "go.mod";

/// What kind of input the user pointed us at. Decided once, up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A `go.mod` file.
    Manifest,
    /// Anything else: assumed to be a Go binary carrying build metadata.
    Artifact,
}

/// Classify `path` by name, after checking that it exists and is a file.
pub fn detect_input(path: &Path) -> Result<InputKind> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::InputNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(Error::read(path, e)),
    };

    if meta.is_dir() {
        return Err(Error::NotAManifestOrArtifact(path.to_path_buf()));
    }

    if path.file_name().is_some_and(|name| name == MANIFEST_NAME) {
        Ok(InputKind::Manifest)
    } else {
        Ok(InputKind::Artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_manifest_by_name() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("go.mod");
        std::fs::write(&manifest, "module example/root\n").unwrap();
        assert_eq!(detect_input(&manifest).unwrap(), InputKind::Manifest);
    }

    #[test]
    fn test_other_files_are_artifacts() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("server");
        std::fs::write(&binary, [0u8; 8]).unwrap();
        assert_eq!(detect_input(&binary).unwrap(), InputKind::Artifact);
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = detect_input(&dir.path().join("go.mod")).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
        assert!(err.to_string().contains("no such go.mod file or Go binary"));
    }

    #[test]
    fn test_directory_rejected() {
        let dir = TempDir::new().unwrap();
        let err = detect_input(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NotAManifestOrArtifact(_)));
    }
}
