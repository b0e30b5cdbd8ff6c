use std::process::Command;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::ModuleInfo;

/// Fetch the root module (when it has a release version) and every
/// requirement into the module cache with `go mod download`.
pub fn download(info: &ModuleInfo) -> Result<()> {
    let args = download_args(info);
    info!("downloading {} modules", args.len() - 2);

    let output = Command::new("go")
        .args(&args)
        .output()
        .map_err(|e| Error::Download {
            reason: format!("could not run go: {e}"),
            output: String::new(),
        })?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(Error::Download {
            reason: output.status.to_string(),
            output: combined,
        });
    }
    Ok(())
}

fn download_args(info: &ModuleInfo) -> Vec<String> {
    let mut args = vec!["mod".to_string(), "download".to_string()];
    if is_valid_semver(&info.module.version) {
        args.push(info.module.canonical());
    }
    args.extend(info.requirements.iter().map(|m| m.canonical()));
    args
}

/// Go's notion of a semantic version: `v` followed by MAJOR[.MINOR[.PATCH]],
/// with prerelease and build suffixes allowed only on the full form.
pub fn is_valid_semver(version: &str) -> bool {
    let Some(rest) = version.strip_prefix('v') else {
        return false;
    };

    let (rest, build) = match rest.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (rest, None),
    };
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let parts: Vec<&str> = core.split('.').collect();
    if parts.len() > 3 || !parts.iter().all(|p| is_number(p)) {
        return false;
    }
    if (pre.is_some() || build.is_some()) && parts.len() != 3 {
        return false;
    }

    let identifiers_ok = |s: &str| {
        s.split('.').all(|id| {
            !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
    };
    let pre_ok = pre.map_or(true, |pre| {
        identifiers_ok(pre)
            && pre
                .split('.')
                .all(|id| !id.chars().all(|c| c.is_ascii_digit()) || is_number(id))
    });
    pre_ok && build.map_or(true, identifiers_ok)
}

/// Decimal without leading zeros.
fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModuleReference;

    #[test]
    fn test_semver_validity() {
        for ok in ["v1", "v1.2", "v1.2.3", "v1.2.3-pre", "v1.2.3-rc.1+meta", "v0.0.0-20230101120000-abcdef123456"] {
            assert!(is_valid_semver(ok), "{ok}");
        }
        for bad in ["", "1.2.3", "v", "v1.2.3.4", "v01.2.3", "v1.2-pre", "(devel)", "v1.2.3-01", "v1.2.3+"] {
            assert!(!is_valid_semver(bad), "{bad}");
        }
    }

    #[test]
    fn test_download_args_skip_devel_root() {
        let mut info = ModuleInfo {
            module: ModuleReference::new("example.com/app", "(devel)"),
            requirements: vec![ModuleReference::new("example/dep", "v1.0.0")],
            ..ModuleInfo::default()
        };
        assert_eq!(download_args(&info), vec!["mod", "download", "example/dep@v1.0.0"]);

        info.module.version = "v1.4.0".to_string();
        assert_eq!(
            download_args(&info),
            vec!["mod", "download", "example.com/app@v1.4.0", "example/dep@v1.0.0"]
        );
    }
}
