use std::path::Path;

use crate::detector::{detect_input, InputKind};
use crate::error::Result;
use crate::models::ModuleInfo;

pub mod buildinfo;
pub mod gomod;

pub trait Analyzer {
    fn analyze(&self, path: &Path) -> Result<ModuleInfo>;
}

/// Extract the root module and its requirements from a `go.mod` or a Go binary.
pub fn extract(path: &Path) -> Result<ModuleInfo> {
    match detect_input(path)? {
        InputKind::Manifest => gomod::GoModAnalyzer::new().analyze(path),
        InputKind::Artifact => buildinfo::BuildInfoAnalyzer::new().analyze(path),
    }
}
