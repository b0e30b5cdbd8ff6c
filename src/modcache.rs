//! Module cache layout: `<root>/<escaped module path>@<version>/`.
//!
//! The cache root is resolved once from the environment ([`CacheRoot::from_env`])
//! and then passed explicitly to everything that needs it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::ModuleReference;

pub const GOMODCACHE: &str = "GOMODCACHE";
pub const GOPATH: &str = "GOPATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRoot(PathBuf);

impl CacheRoot {
    #[cfg(test)]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Resolve from the process environment and the user's home directory.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok(), dirs::home_dir())
    }

    /// `GOMODCACHE`, else the first `GOPATH` entry + `pkg/mod`, else `$HOME/go/pkg/mod`.
    /// Empty values count as unset.
    pub fn resolve<F>(lookup: F, home: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(cache) = set(GOMODCACHE) {
            return Self(PathBuf::from(cache));
        }

        let gopath = set(GOPATH)
            .and_then(|list| std::env::split_paths(&list).find(|p| !p.as_os_str().is_empty()))
            .unwrap_or_else(|| home.unwrap_or_default().join("go"));

        Self(gopath.join("pkg").join("mod"))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Absolute directory of `module` inside the cache.
    pub fn locate(&self, module: &ModuleReference) -> Result<PathBuf> {
        Ok(self.0.join(module_dir(module)?))
    }
}

/// Cache-relative directory name of a module: `<escaped path>@<version>`.
pub fn module_dir(module: &ModuleReference) -> Result<String> {
    Ok(format!("{}@{}", escape_path(&module.path)?, module.version))
}

/// Escape a module path for the case-insensitive cache: every uppercase
/// letter becomes `!` followed by its lowercase form.
pub fn escape_path(path: &str) -> Result<String> {
    check_path(path).map_err(|reason| Error::InvalidPath {
        path: path.to_string(),
        reason,
    })?;

    let mut escaped = String::with_capacity(path.len() + 4);
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    Ok(escaped)
}

fn check_path(path: &str) -> std::result::Result<(), String> {
    if path.is_empty() {
        return Err("empty string".to_string());
    }
    if path.starts_with('-') {
        return Err("leading dash".to_string());
    }
    if path.starts_with('/') {
        return Err("leading slash".to_string());
    }
    if path.ends_with('/') {
        return Err("trailing slash".to_string());
    }
    if path.contains("//") {
        return Err("double slash".to_string());
    }
    path.split('/').try_for_each(check_element)
}

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn check_element(elem: &str) -> std::result::Result<(), String> {
    if elem.is_empty() {
        return Err("empty path element".to_string());
    }
    if elem.chars().all(|c| c == '.') {
        return Err(format!("invalid path element {elem:?}"));
    }
    if elem.starts_with('.') {
        return Err(format!("leading dot in path element {elem:?}"));
    }
    if elem.ends_with('.') {
        return Err(format!("trailing dot in path element {elem:?}"));
    }
    if let Some(c) = elem
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')))
    {
        return Err(format!("invalid char {c:?}"));
    }

    let short = elem.split('.').next().unwrap_or(elem);
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(short)) {
        return Err(format!("{elem:?} disallowed as path element component on Windows"));
    }
    if let Some((_, digits)) = short.rsplit_once('~') {
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return Err("trailing tilde and digits in path element".to_string());
        }
    }
    Ok(())
}
