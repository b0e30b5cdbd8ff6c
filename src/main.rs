//! `golicense`: list the licenses of a Go module's dependencies and enforce an allow-list.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load policy config ([`config::load_config`]).
//! 3. Extract the root module and requirements from a `go.mod` or a Go binary ([`analyzer`]).
//! 4. Optionally fill the module cache (`--download`, [`download`]).
//! 5. Find and classify license files in the module cache ([`resolver`], [`license`]).
//! 6. Check every detected license against the allow-list ([`policy`]).
//! 7. Render the requested report ([`report`]).
//! 8. Exit `0` (clean) or `1` (any error or any license outside the allow-list).

mod analyzer;
mod cli;
mod config;
mod detector;
mod download;
mod error;
mod license;
mod modcache;
mod models;
mod policy;
mod report;
mod resolver;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{split_list, Cli};
use config::load_config;
use license::classifier::{known_licenses, TextClassifier};
use license::finder::LICENSE_FILE_NAMES;
use modcache::CacheRoot;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_licenses {
        for id in known_licenses() {
            println!("{id}");
        }
        return Ok(());
    }
    if cli.list_names {
        for name in LICENSE_FILE_NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(path) = cli.path.as_deref() else {
        anyhow::bail!("no go.mod or binary given");
    };

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let config = load_config(base_dir, cli.config.as_deref())?;
    let allow = config.allow_list(&split_list(cli.allowed.as_deref()));
    let exclusions = config.exclusions(&split_list(cli.exclude.as_deref()));
    if allow.is_empty() {
        info!("no allow-list configured, every license type is accepted");
    }
    if !exclusions.is_empty() {
        debug!(?exclusions, "skipping excluded dependencies");
    }

    let info = analyzer::extract(path)?;
    info!(
        module = %info.module,
        requirements = info.requirements.len(),
        "extracted module info"
    );

    if cli.download {
        download::download(&info)?;
    }

    let cache = CacheRoot::from_env();
    debug!(cache = %cache.path().display(), "using module cache");

    let classifier = TextClassifier::new()?;
    let records = resolver::resolve(&cache, &info, LICENSE_FILE_NAMES, &exclusions, &classifier)?;
    let verdict = policy::enforce(&records, &allow);

    match &cli.output {
        Some(file) => {
            colored::control::set_override(false);
            let mut out = BufWriter::new(File::create(file)?);
            report::render(cli.format, &mut out, &records, &verdict, &allow, cli.quiet)?;
            out.flush()?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            report::render(cli.format, &mut out, &records, &verdict, &allow, cli.quiet)?;
            out.flush()?;
        }
    }

    if let Err(err) = verdict.check() {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `--verbose` turns on per-dependency debug logs.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("golicense={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}
