use std::io::Write;

use anyhow::Result;

use crate::models::LicenseRecord;

/// Write a Markdown document: a section per dependency with its pkg.go.dev
/// license page and every license text in a fenced block.
pub fn render(out: &mut dyn Write, records: &[LicenseRecord]) -> Result<()> {
    writeln!(out, "# Third-party licenses")?;

    for (module, files) in super::group(records) {
        writeln!(out)?;
        writeln!(out, "## {}", module.canonical())?;
        writeln!(out)?;

        let mut types: Vec<&str> = files.iter().flat_map(|f| f.types.iter().copied()).collect();
        types.sort_unstable();
        types.dedup();
        writeln!(out, "- License: {}", types.join(", "))?;
        writeln!(out, "- Details: <{}>", module.lookup_url())?;

        for file in files {
            let text = String::from_utf8_lossy(&file.record.content);
            let fence = fence_for(&text);
            writeln!(out)?;
            writeln!(out, "### {}", file.record.file_name)?;
            writeln!(out)?;
            writeln!(out, "{fence}text")?;
            write!(out, "{text}")?;
            if !text.ends_with('\n') {
                writeln!(out)?;
            }
            writeln!(out, "{fence}")?;
        }
    }
    Ok(())
}

/// A backtick fence longer than any backtick run inside `text`.
fn fence_for(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{record, sample};

    #[test]
    fn test_markdown_sections() {
        let records = sample();
        let mut out = Vec::new();
        render(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("# Third-party licenses\n"));
        assert!(text.contains("## example/b@v0.2.0\n\n- License: Apache-2.0, GPL-3.0, MIT\n"));
        assert!(text.contains("- Details: <https://pkg.go.dev/example/a@v1.0.0?tab=licenses>"));
        assert!(text.contains("### COPYING\n\n```text\ndual text\n```\n"));
        assert_eq!(text.matches("### COPYING").count(), 1);
    }

    #[test]
    fn test_fence_outgrows_backticks_in_content() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("has ```` four"), "`````");

        let records = vec![record("example/c", "v1.0.0", "LICENSE", "MIT", "a ``` b")];
        let mut out = Vec::new();
        render(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("````text\na ``` b\n````\n"));
    }
}
