use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::models::LicenseRecord;

/// License types that are acceptable. An empty list allows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(BTreeSet<String>);

impl AllowList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact, case-sensitive comparison against the allowed types.
    pub fn allows(&self, license_type: &str) -> bool {
        self.0.is_empty() || self.0.contains(license_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Outcome of checking every record against an [`AllowList`].
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub accepted: bool,
    /// Rejected records, in report order.
    pub violations: Vec<LicenseRecord>,
}

impl Verdict {
    /// Turn a rejected verdict into [`Error::PolicyViolation`].
    pub fn check(&self) -> Result<()> {
        if self.accepted {
            return Ok(());
        }
        Err(Error::PolicyViolation {
            violations: self
                .violations
                .iter()
                .map(|r| format!("{} ({}): {}", r.module.canonical(), r.file_name, r.license_type))
                .collect(),
        })
    }
}

/// Check all records and collect every violation in one pass.
///
/// Each record stands on its own: a file that matched several license types
/// is accepted only if every one of those types is allowed.
pub fn enforce(records: &[LicenseRecord], allow: &AllowList) -> Verdict {
    let violations: Vec<LicenseRecord> = records
        .iter()
        .filter(|r| !allow.allows(&r.license_type))
        .cloned()
        .collect();

    Verdict {
        accepted: violations.is_empty(),
        violations,
    }
}
