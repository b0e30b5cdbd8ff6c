use std::collections::HashMap;
use std::path::PathBuf;

/// A module identity: import path plus (possibly pseudo-) version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModuleReference {
    pub path: String,
    pub version: String,
}

impl ModuleReference {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }

    /// Canonical `path@version` form used for exclusion matching and reporting.
    pub fn canonical(&self) -> String {
        format!("{}@{}", self.path, self.version)
    }

    /// pkg.go.dev license tab for this module, for cross-referencing a report.
    pub fn lookup_url(&self) -> String {
        format!("https://pkg.go.dev/{}?tab=licenses", self.canonical())
    }
}

impl std::fmt::Display for ModuleReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}@{}", self.path, self.version)
        }
    }
}

/// The root module and its requirement list, independent of the input kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleInfo {
    pub module: ModuleReference,
    pub requirements: Vec<ModuleReference>,
    /// Replacement module path → the requirement it replaced, as declared.
    pub original_paths: HashMap<String, ModuleReference>,
}

/// One (dependency, license file, detected type) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct LicenseRecord {
    pub module: ModuleReference,
    pub file_name: String,
    /// Relative to the module cache root, e.g. `github.com/!burnt!sushi/toml@v1.2.0/COPYING`.
    pub file_path: PathBuf,
    pub content: Vec<u8>,
    pub license_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LicenseRisk {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Proprietary,
    Unknown,
}

impl std::fmt::Display for LicenseRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseRisk::Permissive => write!(f, "Permissive"),
            LicenseRisk::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseRisk::StrongCopyleft => write!(f, "Strong Copyleft"),
            LicenseRisk::Proprietary => write!(f, "Proprietary"),
            LicenseRisk::Unknown => write!(f, "Unknown"),
        }
    }
}
