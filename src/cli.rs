use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "golicense",
    about = "Collect the licenses of the dependencies of a go.mod file or a Go binary built with module support",
    version
)]
pub struct Cli {
    /// go.mod file or Go binary to inspect
    #[arg(required_unless_present_any = ["list_licenses", "list_names"])]
    pub path: Option<PathBuf>,

    /// Write the report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value = "table", value_name = "FORMAT")]
    pub format: ReportFormat,

    /// Comma-separated list of allowed license types (empty allows all)
    #[arg(short, long, value_name = "LIST")]
    pub allowed: Option<String>,

    /// Comma-separated list of path@version dependencies to skip
    #[arg(short, long, value_name = "LIST")]
    pub exclude: Option<String>,

    /// Run `go mod download` for all dependencies before resolving
    #[arg(short, long)]
    pub download: bool,

    /// Policy config file [default: <dir>/.golicense/config.toml, fallback ~/.config/golicense/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List the license types the classifier can detect
    #[arg(long)]
    pub list_licenses: bool,

    /// List the file names searched for licenses
    #[arg(long)]
    pub list_names: bool,

    /// Log each dependency, its cache path and the license files found
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line (table format)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Colored table, one row per detected license
    Table,
    /// Full license texts, one section per dependency
    Dump,
    /// Markdown document with license texts and pkg.go.dev links
    Markdown,
    Json,
}

/// Split a comma-separated flag value, dropping blank entries.
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(Some("MIT, ,Apache-2.0,")), vec!["MIT", "Apache-2.0"]);
        assert_eq!(
            split_list(Some("github.com/example/replacement@v2.0.0,github.com/example/other@v1.0.0")),
            vec!["github.com/example/replacement@v2.0.0", "github.com/example/other@v1.0.0"]
        );
        assert!(split_list(Some("  ")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_path_required_unless_listing() {
        assert!(Cli::try_parse_from(["golicense"]).is_err());
        assert!(Cli::try_parse_from(["golicense", "--list-names"]).is_ok());

        let cli = Cli::try_parse_from([
            "golicense", "-f", "markdown", "-a", "MIT,ISC", "-o", "out.md", "go.mod",
        ])
        .unwrap();
        assert_eq!(cli.format, ReportFormat::Markdown);
        assert_eq!(cli.path, Some(PathBuf::from("go.mod")));
        assert_eq!(split_list(cli.allowed.as_deref()), vec!["MIT", "ISC"]);
    }
}
