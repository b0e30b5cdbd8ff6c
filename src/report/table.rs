use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::license::spdx::risk_of;
use crate::models::{LicenseRecord, LicenseRisk};
use crate::policy::{AllowList, Verdict};

/// Render a colored table report.
pub fn render(
    out: &mut dyn Write,
    records: &[LicenseRecord],
    verdict: &Verdict,
    allow: &AllowList,
    quiet: bool,
) -> Result<()> {
    let total = records.len();
    let rejected = verdict.violations.len();
    let allowed = total - rejected;
    let dependencies = super::group(records).len();

    if quiet {
        writeln!(
            out,
            "Dependencies: {}  Licenses: {}  Allowed: {}  Rejected: {}",
            dependencies,
            total,
            allowed.to_string().green(),
            rejected.to_string().red(),
        )?;
        return Ok(());
    }

    writeln!(out, "\n {} v{}\n", "golicense".bold(), env!("CARGO_PKG_VERSION"))?;

    let policy = if allow.is_empty() {
        "all license types allowed".to_string()
    } else {
        allow.iter().collect::<Vec<_>>().join(", ")
    };

    writeln!(out, " ┌────────────────────────────────────────────────────┐")?;
    writeln!(out, " │  {:<48} │", "SUMMARY".bold())?;
    writeln!(out, " │  {:<48} │", format!("Dependencies : {}", dependencies))?;
    writeln!(
        out,
        " │  {:<48} │",
        format!("{}  Allowed    : {:>4}  {}", "✓".green(), allowed, summarize(records, allow, true))
    )?;
    writeln!(
        out,
        " │  {:<48} │",
        format!("{}  Rejected   : {:>4}  {}", "✗".red(), rejected, summarize(records, allow, false))
    )?;
    writeln!(out, " │  {:<48} │", format!("Policy       : {}", policy))?;
    writeln!(out, " └────────────────────────────────────────────────────┘\n")?;

    if total > 0 {
        writeln!(out, "{}", build_table(records, allow))?;
    }

    if rejected > 0 {
        writeln!(
            out,
            "\n {} Licenses not in the allow-list:\n",
            "[REJECTED]".red().bold()
        )?;
        writeln!(out, "{}", build_table(&verdict.violations, allow))?;
    }

    Ok(())
}

fn build_table(records: &[LicenseRecord], allow: &AllowList) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Module").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Verdict").add_attribute(Attribute::Bold),
        ]);

    for record in records {
        let (verdict_str, verdict_color) = if allow.allows(&record.license_type) {
            ("✓ allowed", Color::Green)
        } else {
            ("✗ rejected", Color::Red)
        };

        let risk = risk_of(&record.license_type);
        let risk_color = match risk {
            LicenseRisk::Permissive => Color::Green,
            LicenseRisk::WeakCopyleft => Color::Yellow,
            LicenseRisk::StrongCopyleft => Color::Red,
            LicenseRisk::Proprietary => Color::Magenta,
            LicenseRisk::Unknown => Color::DarkGrey,
        };

        table.add_row(vec![
            Cell::new(&record.module.path),
            Cell::new(&record.module.version),
            Cell::new(&record.license_type),
            Cell::new(risk.to_string()).fg(risk_color),
            Cell::new(record.file_path.display()),
            Cell::new(verdict_str)
                .fg(verdict_color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    table
}

/// Top three license types among allowed (or rejected) records, e.g. `[MIT (12), ISC (2)]`.
fn summarize(records: &[LicenseRecord], allow: &AllowList, allowed: bool) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records
        .iter()
        .filter(|r| allow.allows(&r.license_type) == allowed)
    {
        *counts.entry(record.license_type.as_str()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(license, count)| format!("{} ({})", license, count))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
