//! `go.mod` parsing and replace-directive resolution.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result, SyntaxError};
use crate::models::{ModuleInfo, ModuleReference};

/// Parsed manifest, before replacements are applied.
#[derive(Debug, Default, PartialEq)]
pub struct GoMod {
    pub module: Option<String>,
    pub requires: Vec<ModuleReference>,
    pub replaces: Vec<Replace>,
}

/// `replace OLD [VERSION] => NEW [VERSION]`. A `new` without a version is a
/// local directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Replace {
    pub old: ModuleReference,
    pub new: ModuleReference,
}

pub struct GoModAnalyzer;

impl GoModAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl super::Analyzer for GoModAnalyzer {
    fn analyze(&self, path: &Path) -> Result<ModuleInfo> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let manifest = parse(&content).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(manifest.resolve())
    }
}

impl GoMod {
    /// Apply replace directives to the requirement list.
    ///
    /// Replacements are keyed by the old path; when several target the same
    /// path the last one wins. Each path appears at most once in the result.
    pub fn resolve(&self) -> ModuleInfo {
        let replacements: HashMap<&str, &ModuleReference> = self
            .replaces
            .iter()
            .map(|r| (r.old.path.as_str(), &r.new))
            .collect();

        let mut info = ModuleInfo {
            module: ModuleReference::new(self.module.clone().unwrap_or_default(), ""),
            ..ModuleInfo::default()
        };
        let mut seen = HashSet::new();

        for req in &self.requires {
            let replacement = replacements.get(req.path.as_str()).copied();
            let resolved = replacement.unwrap_or(req);

            if !seen.insert(resolved.path.as_str()) {
                debug!("dropping duplicate requirement {}", resolved);
                continue;
            }
            if replacement.is_some() {
                debug!("{} replaced by {}", req, resolved);
                info.original_paths
                    .insert(resolved.path.clone(), req.clone());
            }
            info.requirements.push(resolved.clone());
        }

        info
    }
}

const BLOCK_VERBS: &[&str] = &[
    "module", "go", "toolchain", "require", "replace", "exclude", "retract", "godebug", "ignore",
    "tool",
];

/// Parse `go.mod` content.
pub fn parse(content: &str) -> std::result::Result<GoMod, SyntaxError> {
    let mut manifest = GoMod::default();
    let mut block: Option<(String, usize)> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let tokens = tokenize(raw).map_err(|message| SyntaxError { line, message })?;
        if tokens.is_empty() {
            continue;
        }

        if let Some((verb, _)) = &block {
            if tokens == [")"] {
                block = None;
                continue;
            }
            let verb = verb.clone();
            apply(&mut manifest, &verb, &tokens, line)?;
            continue;
        }

        let verb = tokens[0].as_str();
        let args = &tokens[1..];
        if args.first().map(String::as_str) == Some("(") {
            if !BLOCK_VERBS.contains(&verb) {
                return Err(SyntaxError {
                    line,
                    message: format!("unknown block type: {verb}"),
                });
            }
            match &args[1..] {
                [] => block = Some((verb.to_string(), line)),
                [close] if close == ")" => {}
                _ => {
                    return Err(SyntaxError {
                        line,
                        message: "unexpected tokens after '('".to_string(),
                    })
                }
            }
            continue;
        }

        apply(&mut manifest, verb, args, line)?;
    }

    if let Some((verb, line)) = block {
        return Err(SyntaxError {
            line,
            message: format!("unterminated {verb} block"),
        });
    }

    Ok(manifest)
}

fn apply(
    manifest: &mut GoMod,
    verb: &str,
    args: &[String],
    line: usize,
) -> std::result::Result<(), SyntaxError> {
    let err = |message: String| SyntaxError { line, message };

    match verb {
        "module" => {
            let [path] = args else {
                return Err(err("usage: module module/path".to_string()));
            };
            if manifest.module.is_some() {
                return Err(err("repeated module statement".to_string()));
            }
            manifest.module = Some(path.clone());
        }
        "go" | "toolchain" => {
            if args.len() != 1 {
                return Err(err(format!("usage: {verb} <version>")));
            }
        }
        "exclude" | "retract" | "godebug" | "ignore" | "tool" => {}
        "require" => {
            let [path, version] = args else {
                return Err(err("usage: require module/path v1.2.3".to_string()));
            };
            check_version(version).map_err(err)?;
            manifest
                .requires
                .push(ModuleReference::new(path.as_str(), version.as_str()));
        }
        "replace" => manifest.replaces.push(parse_replace(args).map_err(err)?),
        other => return Err(err(format!("unknown directive: {other}"))),
    }
    Ok(())
}

fn parse_replace(args: &[String]) -> std::result::Result<Replace, String> {
    const USAGE: &str = "usage: replace module/path [v1.2.3] => other/module v1.4\n\t \
                         or replace module/path [v1.2.3] => ../local/directory";

    let arrow = args
        .iter()
        .position(|t| t == "=>")
        .ok_or_else(|| USAGE.to_string())?;
    let (old, new) = (&args[..arrow], &args[arrow + 1..]);

    let old = match old {
        [path] => ModuleReference::new(path.as_str(), ""),
        [path, version] => {
            check_version(version)?;
            ModuleReference::new(path.as_str(), version.as_str())
        }
        _ => return Err(USAGE.to_string()),
    };

    let new = match new {
        [path] => {
            if !is_local_path(path) {
                return Err(format!(
                    "replacement module without version must be directory path \
                     (rooted or starting with ./ or ../): {path}"
                ));
            }
            ModuleReference::new(path.as_str(), "")
        }
        [path, version] => {
            check_version(version)?;
            ModuleReference::new(path.as_str(), version.as_str())
        }
        _ => return Err(USAGE.to_string()),
    };

    Ok(Replace { old, new })
}

fn check_version(version: &str) -> std::result::Result<(), String> {
    if version.len() < 2 || !version.starts_with('v') {
        return Err(format!("invalid module version {version:?}"));
    }
    Ok(())
}

fn is_local_path(path: &str) -> bool {
    path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path.starts_with(".\\")
        || path.starts_with("..\\")
        || Path::new(path).is_absolute()
}

/// Split one line into tokens: `//` comments are dropped, `"..."` and
/// `` `...` `` strings are unquoted, and `(` / `)` stand on their own.
fn tokenize(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        match c {
            '/' if line_comment_starts(&mut chars.clone()) => break,
            '(' | ')' => {
                tokens.push(c.to_string());
                chars.next();
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => s.push(unescape(&mut chars)?),
                        Some(other) => s.push(other),
                        None => return Err("unterminated quoted string".to_string()),
                    }
                }
                tokens.push(s);
            }
            '`' => {
                chars.next();
                let mut s = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(other) => s.push(other),
                        None => return Err("unterminated raw string".to_string()),
                    }
                }
                tokens.push(s);
            }
            _ => {
                let mut s = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | '`') {
                        break;
                    }
                    if c == '/' && line_comment_starts(&mut chars.clone()) {
                        break;
                    }
                    s.push(c);
                    chars.next();
                }
                tokens.push(s);
            }
        }
    }
    Ok(tokens)
}

/// Decode the escape sequence after a `\\` in a `"..."` string. Byte escapes
/// (`\\x`, octal) are limited to ASCII so the token stays valid UTF-8.
fn unescape(chars: &mut impl Iterator<Item = char>) -> std::result::Result<char, String> {
    let c = chars
        .next()
        .ok_or_else(|| "unterminated quoted string".to_string())?;
    let simple = match c {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0b}'),
        '\\' => Some('\\'),
        '"' => Some('"'),
        _ => None,
    };
    if let Some(decoded) = simple {
        return Ok(decoded);
    }

    let (len, radix) = match c {
        'x' => (2, 16),
        'u' => (4, 16),
        'U' => (8, 16),
        '0'..='7' => (3, 8),
        _ => return Err(format!("invalid escape sequence \\{c}")),
    };
    let mut digits = String::new();
    if radix == 8 {
        digits.push(c);
    }
    while digits.len() < len {
        match chars.next() {
            Some(d) if d.is_digit(radix) => digits.push(d),
            _ => return Err(format!("invalid escape sequence \\{c}{digits}")),
        }
    }
    let code = u32::from_str_radix(&digits, radix)
        .map_err(|_| format!("invalid escape sequence \\{c}{digits}"))?;

    if matches!(c, 'x' | '0'..='7') && code > 0x7f {
        return Err(format!("non-ASCII byte escape {code:#x} is not supported"));
    }
    char::from_u32(code).ok_or_else(|| format!("invalid Unicode code point {code:#x}"))
}

fn line_comment_starts(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    chars.next() == Some('/') && chars.next() == Some('/')
}
