//! Report renderers for resolved license records.
//!
//! - [`table`]: colored table with a summary line; respects `--quiet`.
//! - [`dump`]: every license text, one section per dependency.
//! - [`markdown`]: a Markdown document with pkg.go.dev links and license texts.
//!
//! JSON output is produced here directly from [`RecordView`].

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::cli::ReportFormat;
use crate::models::{LicenseRecord, ModuleReference};
use crate::policy::{AllowList, Verdict};

pub mod dump;
pub mod markdown;
pub mod table;

pub fn render(
    format: ReportFormat,
    out: &mut dyn Write,
    records: &[LicenseRecord],
    verdict: &Verdict,
    allow: &AllowList,
    quiet: bool,
) -> Result<()> {
    match format {
        ReportFormat::Table => table::render(out, records, verdict, allow, quiet),
        ReportFormat::Dump => dump::render(out, records),
        ReportFormat::Markdown => markdown::render(out, records),
        ReportFormat::Json => {
            let views: Vec<RecordView> = records
                .iter()
                .map(|r| RecordView::new(r, allow))
                .collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&views)?)?;
            Ok(())
        }
    }
}

/// Serializable shape of a record; the license body is left out.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub module: &'a str,
    pub version: &'a str,
    pub license: &'a str,
    pub file: &'a str,
    pub path: String,
    pub url: String,
    pub allowed: bool,
}

impl<'a> RecordView<'a> {
    pub fn new(record: &'a LicenseRecord, allow: &AllowList) -> Self {
        Self {
            module: &record.module.path,
            version: &record.module.version,
            license: &record.license_type,
            file: &record.file_name,
            path: record.file_path.display().to_string(),
            url: record.module.lookup_url(),
            allowed: allow.allows(&record.license_type),
        }
    }
}

/// Records of one license file: the file is shared, the types differ.
pub(crate) struct LicenseFile<'a> {
    pub record: &'a LicenseRecord,
    pub types: Vec<&'a str>,
}

/// Group records by dependency, then by file, keeping report order.
pub(crate) fn group(records: &[LicenseRecord]) -> Vec<(&ModuleReference, Vec<LicenseFile<'_>>)> {
    let mut groups: Vec<(&ModuleReference, Vec<LicenseFile<'_>>)> = Vec::new();

    for record in records {
        let same_module = groups.last().is_some_and(|(m, _)| *m == &record.module);
        if !same_module {
            groups.push((&record.module, Vec::new()));
        }
        let Some((_, files)) = groups.last_mut() else {
            continue;
        };

        let same_file = files
            .last()
            .is_some_and(|f| f.record.file_name == record.file_name);
        if !same_file {
            files.push(LicenseFile {
                record,
                types: Vec::new(),
            });
        }
        if let Some(file) = files.last_mut() {
            file.types.push(record.license_type.as_str());
        }
    }

    groups
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{LicenseRecord, ModuleReference};

    pub fn record(path: &str, version: &str, file: &str, license_type: &str, body: &str) -> LicenseRecord {
        LicenseRecord {
            module: ModuleReference::new(path, version),
            file_name: file.to_string(),
            file_path: format!("{path}@{version}/{file}").into(),
            content: body.as_bytes().to_vec(),
            license_type: license_type.to_string(),
        }
    }

    pub fn sample() -> Vec<LicenseRecord> {
        vec![
            record("example/a", "v1.0.0", "LICENSE", "MIT", "MIT text"),
            record("example/b", "v0.2.0", "COPYING", "Apache-2.0", "dual text"),
            record("example/b", "v0.2.0", "COPYING", "MIT", "dual text"),
            record("example/b", "v0.2.0", "LICENSE", "GPL-3.0", "GPL text"),
        ]
    }
}
