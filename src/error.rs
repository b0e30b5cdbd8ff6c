use std::path::PathBuf;

use thiserror::Error;

use crate::models::ModuleReference;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: no such go.mod file or Go binary", .0.display())]
    InputNotFound(PathBuf),

    #[error("{}: path must be a go.mod file or a Go binary built with module support", .0.display())]
    NotAManifestOrArtifact(PathBuf),

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {reason}", path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("invalid module path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("license not found for {module} in {}: {cause}", dir.display())]
    LicenseNotFound {
        module: ModuleReference,
        dir: PathBuf,
        cause: MissingLicense,
    },

    #[error("{} license(s) not in the allow-list: {}", violations.len(), violations.join(", "))]
    PolicyViolation { violations: Vec<String> },

    #[error("error downloading modules: {reason}\n{output}")]
    Download { reason: String, output: String },
}

impl Error {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read {
            path: path.into(),
            source,
        }
    }
}

/// Why a dependency ended up without a usable license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingLicense {
    /// The module directory is absent or holds no file from the name table.
    NoLicenseFile,
    /// License files exist but none of them was recognized by the classifier.
    Unrecognized(Vec<String>),
}

impl std::fmt::Display for MissingLicense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingLicense::NoLicenseFile => write!(f, "no license file"),
            MissingLicense::Unrecognized(files) => {
                write!(f, "unrecognized license in {}", files.join(", "))
            }
        }
    }
}

/// A go.mod syntax error with its 1-based line number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}
