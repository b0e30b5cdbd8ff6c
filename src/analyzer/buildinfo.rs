//! Build metadata embedded in Go binaries (`go version -m`).
//!
//! The linker writes a 32-byte header starting with `\xff Go buildinf:` into a
//! 16-byte aligned data section. Since Go 1.18 (flag bit `0x2`) the header is
//! followed by two length-prefixed strings: the toolchain version and the
//! module info text, which lists `mod` and `dep` lines separated by tabs.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ModuleInfo, ModuleReference};

const MAGIC: &[u8] = b"\xff Go buildinf:";
const HEADER_LEN: usize = 32;
const ALIGN: usize = 16;
const FLAGS_INLINE_STRINGS: u8 = 0x2;
const SENTINEL_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct BuildInfo {
    pub go_version: String,
    pub main: ModuleReference,
    pub deps: Vec<Dep>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dep {
    pub module: ModuleReference,
    /// Set when a `=>` line follows the `dep` line.
    pub replace: Option<ModuleReference>,
}

pub struct BuildInfoAnalyzer;

impl BuildInfoAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl super::Analyzer for BuildInfoAnalyzer {
    fn analyze(&self, path: &Path) -> Result<ModuleInfo> {
        let data = std::fs::read(path).map_err(|e| Error::read(path, e))?;
        let info = read_build_info(&data).map_err(|reason| Error::Artifact {
            path: path.to_path_buf(),
            reason,
        })?;

        debug!("{} built with {}", path.display(), info.go_version);

        // Deps are reported as recorded: the binary already reflects the
        // resolution that happened at build time.
        let requirements = info
            .deps
            .into_iter()
            .map(|dep| {
                if let Some(replace) = &dep.replace {
                    debug!("{} was built from replacement {}", dep.module, replace);
                }
                dep.module
            })
            .collect();

        Ok(ModuleInfo {
            module: info.main,
            requirements,
            ..ModuleInfo::default()
        })
    }
}

/// Locate and decode the build info blob of a Go binary image.
///
/// The whole image is scanned, not just the start of the data section, so a
/// copy of the magic elsewhere (a binary linking `debug/buildinfo` carries one
/// in rodata) can come first. Each aligned candidate is tried in turn and the
/// first one that decodes wins.
pub fn read_build_info(data: &[u8]) -> std::result::Result<BuildInfo, String> {
    let mut first_error = None;
    for start in header_candidates(data) {
        match decode_at(data, start) {
            Ok(info) => return Ok(info),
            Err(reason) => {
                debug!("skipping build info candidate at {start:#x}: {reason}");
                first_error.get_or_insert(reason);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| "not a Go executable".to_string()))
}

fn decode_at(data: &[u8], start: usize) -> std::result::Result<BuildInfo, String> {
    let flags = data[start + 15];
    if flags & FLAGS_INLINE_STRINGS == 0 {
        return Err("unsupported build info layout (built with Go older than 1.18)".to_string());
    }

    let mut pos = start + HEADER_LEN;
    let go_version = String::from_utf8_lossy(read_bytes(data, &mut pos)?).into_owned();
    let mod_info = strip_sentinels(read_bytes(data, &mut pos)?);
    if mod_info.is_empty() {
        return Err("not built with module support".to_string());
    }

    let mut info = parse_mod_info(&String::from_utf8_lossy(mod_info))?;
    info.go_version = go_version;
    Ok(info)
}

fn header_candidates(data: &[u8]) -> impl Iterator<Item = usize> + '_ {
    (0..data.len())
        .step_by(ALIGN)
        .take_while(|off| off + HEADER_LEN <= data.len())
        .filter(|&off| {
            data[off..].starts_with(MAGIC) && matches!(data[off + MAGIC.len()], 4 | 8)
        })
}

fn read_uvarint(data: &[u8], pos: &mut usize) -> std::result::Result<u64, String> {
    let mut value: u64 = 0;
    for shift in (0..64).step_by(7) {
        let byte = *data
            .get(*pos)
            .ok_or_else(|| "truncated build info".to_string())?;
        *pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err("malformed build info length".to_string())
}

fn read_bytes<'a>(data: &'a [u8], pos: &mut usize) -> std::result::Result<&'a [u8], String> {
    let len = usize::try_from(read_uvarint(data, pos)?)
        .map_err(|_| "malformed build info length".to_string())?;
    let end = pos
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| "truncated build info".to_string())?;
    let bytes = &data[*pos..end];
    *pos = end;
    Ok(bytes)
}

/// Module info is framed by 16 sentinel bytes on each side.
fn strip_sentinels(mod_info: &[u8]) -> &[u8] {
    let len = mod_info.len();
    if len > 2 * SENTINEL_LEN && mod_info[len - SENTINEL_LEN - 1] == b'\n' {
        &mod_info[SENTINEL_LEN..len - SENTINEL_LEN]
    } else {
        &[]
    }
}

fn parse_mod_info(text: &str) -> std::result::Result<BuildInfo, String> {
    let mut main = None;
    let mut deps: Vec<Dep> = Vec::new();

    for line in text.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.as_slice() {
            ["mod", path, version, ..] => main = Some(ModuleReference::new(*path, *version)),
            ["dep", path, version, ..] => deps.push(Dep {
                module: ModuleReference::new(*path, *version),
                replace: None,
            }),
            ["=>", path, rest @ ..] => {
                let last = deps
                    .last_mut()
                    .ok_or_else(|| format!("replacement without a module: {line}"))?;
                let version = rest.first().copied().unwrap_or("");
                last.replace = Some(ModuleReference::new(*path, version));
            }
            _ => {}
        }
    }

    let main = main.ok_or_else(|| "build info has no main module".to_string())?;
    Ok(BuildInfo {
        go_version: String::new(),
        main,
        deps,
    })
}
