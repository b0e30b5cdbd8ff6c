use std::io::Write;

use anyhow::Result;

use crate::models::LicenseRecord;

/// Write every license text, one section per dependency. A file that matched
/// several license types is printed once.
pub fn render(out: &mut dyn Write, records: &[LicenseRecord]) -> Result<()> {
    for (module, files) in super::group(records) {
        writeln!(out, "## {}", module.canonical())?;
        writeln!(out)?;
        for file in files {
            writeln!(out, "Source: {}/{}", module.canonical(), file.record.file_name)?;
            writeln!(out)?;
            out.write_all(&file.record.content)?;
            if !file.record.content.ends_with(b"\n") {
                writeln!(out)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
