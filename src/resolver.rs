//! Dependency → license resolution over the module cache.

use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;

use tracing::debug;

use crate::error::{Error, MissingLicense, Result};
use crate::license::classifier::Classifier;
use crate::license::finder::find_license_files;
use crate::modcache::{escape_path, CacheRoot};
use crate::models::{LicenseRecord, ModuleInfo, ModuleReference};

/// Dependencies to skip, as `path@version` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<String>);

impl ExclusionSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Matches the canonical form, the escaped cache form, or the requirement
    /// the module replaced in the manifest, as it was declared.
    pub fn excludes(
        &self,
        module: &ModuleReference,
        original_paths: &HashMap<String, ModuleReference>,
    ) -> bool {
        if self.0.contains(&module.canonical()) {
            return true;
        }
        if let Ok(escaped) = escape_path(&module.path) {
            if self.0.contains(&format!("{}@{}", escaped, module.version)) {
                return true;
            }
        }
        original_paths
            .get(&module.path)
            .is_some_and(|original| self.0.contains(&original.canonical()))
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Build one [`LicenseRecord`] per (requirement, license file, detected type),
/// in requirement order.
///
/// A dependency that is not excluded aborts the whole run when it has no
/// license file, or when any of its license files is not recognized.
pub fn resolve(
    cache: &CacheRoot,
    info: &ModuleInfo,
    names: &[&str],
    exclusions: &ExclusionSet,
    classifier: &dyn Classifier,
) -> Result<Vec<LicenseRecord>> {
    let mut records = Vec::new();

    for module in &info.requirements {
        if exclusions.excludes(module, &info.original_paths) {
            debug!("skipping excluded dependency {}", module.canonical());
            continue;
        }

        let dir = cache.locate(module)?;
        let relative_dir = dir.strip_prefix(cache.path()).unwrap_or(&dir).to_path_buf();
        debug!(
            dependency = %module.canonical(),
            local_path = %dir.display(),
            lookup = %module.lookup_url(),
            "resolving"
        );

        let files = match find_license_files(&dir, names) {
            Ok(files) => files,
            Err(Error::Read { source, .. }) if source.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        if files.is_empty() {
            return Err(Error::LicenseNotFound {
                module: module.clone(),
                dir,
                cause: MissingLicense::NoLicenseFile,
            });
        }
        debug!("found {:?}", files);

        let mut unrecognized = Vec::new();

        for name in files {
            let path = dir.join(&name);
            let content = std::fs::read(&path).map_err(|e| Error::read(&path, e))?;
            let matches = classifier.classify(&content);
            if matches.is_empty() {
                unrecognized.push(name);
                continue;
            }

            let file_path = relative_dir.join(&name);
            for m in matches {
                records.push(LicenseRecord {
                    module: module.clone(),
                    file_name: name.clone(),
                    file_path: file_path.clone(),
                    content: content.clone(),
                    license_type: m.id,
                });
            }
        }

        if !unrecognized.is_empty() {
            return Err(Error::LicenseNotFound {
                module: module.clone(),
                dir,
                cause: MissingLicense::Unrecognized(unrecognized),
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::extract;
    use crate::license::classifier::{LicenseMatch, TextClassifier};
    use crate::license::finder::LICENSE_FILE_NAMES;
    use crate::policy::{enforce, AllowList};
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const MIT: &str = "Permission is hereby granted, free of charge, to any person obtaining a copy \
        of this software. The above copyright notice and this permission notice shall be included \
        in all copies or substantial portions of the Software.";

    const APACHE: &str = "Licensed under the Apache License, Version 2.0";

    /// Reports one match per type listed, for any non-empty content.
    struct StubClassifier(&'static [&'static str]);

    impl Classifier for StubClassifier {
        fn classify(&self, content: &[u8]) -> Vec<LicenseMatch> {
            if content.is_empty() {
                return Vec::new();
            }
            self.0
                .iter()
                .map(|id| LicenseMatch {
                    id: id.to_string(),
                    start: 0,
                    end: content.len(),
                })
                .collect()
        }
    }

    struct Fixture {
        _dir: TempDir,
        cache: CacheRoot,
        manifest: PathBuf,
    }

    fn fixture(manifest: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let cache = CacheRoot::new(dir.path().join("pkg").join("mod"));
        std::fs::create_dir_all(cache.path()).unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let manifest_path = project.join("go.mod");
        std::fs::write(&manifest_path, manifest).unwrap();
        Fixture {
            _dir: dir,
            cache,
            manifest: manifest_path,
        }
    }

    fn put_file(cache: &CacheRoot, module_dir: &str, name: &str, content: &str) {
        let dir = cache.path().join(module_dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn run(f: &Fixture, exclusions: &ExclusionSet) -> Result<Vec<LicenseRecord>> {
        let info = extract(&f.manifest)?;
        let classifier = TextClassifier::new().unwrap();
        resolve(&f.cache, &info, LICENSE_FILE_NAMES, exclusions, &classifier)
    }

    const SIMPLE: &str = "module example/root\n\nrequire example/dep v1.0.0\n";

    #[test]
    fn test_end_to_end_mit_dependency() {
        let f = fixture(SIMPLE);
        put_file(&f.cache, "example/dep@v1.0.0", "LICENSE", MIT);

        let records = run(&f, &ExclusionSet::default()).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.module, ModuleReference::new("example/dep", "v1.0.0"));
        assert_eq!(r.file_name, "LICENSE");
        assert_eq!(r.file_path, Path::new("example/dep@v1.0.0/LICENSE"));
        assert_eq!(r.license_type, "MIT");
        assert_eq!(r.content, MIT.as_bytes());

        let verdict = enforce(&records, &AllowList::default());
        assert!(verdict.accepted);
    }

    #[test]
    fn test_missing_cache_directory_is_license_not_found() {
        let f = fixture(SIMPLE);

        let err = run(&f, &ExclusionSet::default()).unwrap_err();
        match &err {
            Error::LicenseNotFound { module, dir, cause } => {
                assert_eq!(module, &ModuleReference::new("example/dep", "v1.0.0"));
                assert_eq!(dir, &f.cache.path().join("example/dep@v1.0.0"));
                assert_eq!(cause, &MissingLicense::NoLicenseFile);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("example/dep@v1.0.0"));
    }

    #[test]
    fn test_directory_without_license_files() {
        let f = fixture(SIMPLE);
        put_file(&f.cache, "example/dep@v1.0.0", "LICENSE-MIT", MIT);

        let err = run(&f, &ExclusionSet::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::LicenseNotFound { cause: MissingLicense::NoLicenseFile, .. }
        ));
    }

    #[test]
    fn test_unrecognized_license_is_an_error() {
        let f = fixture(SIMPLE);
        put_file(&f.cache, "example/dep@v1.0.0", "LICENSE", "All rights reserved.");

        let err = run(&f, &ExclusionSet::default()).unwrap_err();
        match err {
            Error::LicenseNotFound { module, cause, .. } => {
                assert_eq!(module.path, "example/dep");
                assert_eq!(cause, MissingLicense::Unrecognized(vec!["LICENSE".to_string()]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unrecognized_sibling_file_fails_the_dependency() {
        let f = fixture(SIMPLE);
        put_file(&f.cache, "example/dep@v1.0.0", "LICENSE", MIT);
        put_file(
            &f.cache,
            "example/dep@v1.0.0",
            "COPYING",
            "Proprietary. All use requires a paid commercial agreement.",
        );

        let err = run(&f, &ExclusionSet::default()).unwrap_err();
        match err {
            Error::LicenseNotFound { module, cause, .. } => {
                assert_eq!(module, ModuleReference::new("example/dep", "v1.0.0"));
                assert_eq!(cause, MissingLicense::Unrecognized(vec!["COPYING".to_string()]));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_excluded_dependency_is_skipped_even_if_absent() {
        let f = fixture(
            "module example/root\n\nrequire (\n\texample/dep v1.0.0\n\texample/other v0.2.0\n)\n",
        );
        put_file(&f.cache, "example/other@v0.2.0", "LICENSE", MIT);

        let exclusions: ExclusionSet = ["example/dep@v1.0.0"].into_iter().collect();
        let records = run(&f, &exclusions).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| r.module.path != "example/dep"));
    }

    #[test]
    fn test_exclusion_matches_replacement_or_original_path() {
        let f = fixture(
            "module example/root\n\
             require github.com/example/original v1.0.0\n\
             replace github.com/example/original => github.com/example/replacement v2.0.0\n",
        );

        let by_replacement: ExclusionSet =
            ["github.com/example/replacement@v2.0.0"].into_iter().collect();
        assert!(run(&f, &by_replacement).unwrap().is_empty());

        let by_original: ExclusionSet =
            ["github.com/example/original@v1.0.0"].into_iter().collect();
        assert!(run(&f, &by_original).unwrap().is_empty());

        let mixed: ExclusionSet = ["github.com/example/original@v2.0.0"].into_iter().collect();
        assert!(run(&f, &mixed).is_err());

        assert!(run(&f, &ExclusionSet::default()).is_err());
    }

    #[test]
    fn test_exclusion_matches_escaped_form() {
        let info = ModuleInfo {
            requirements: vec![ModuleReference::new("github.com/BurntSushi/toml", "v1.3.2")],
            ..ModuleInfo::default()
        };
        let exclusions: ExclusionSet = ["github.com/!burnt!sushi/toml@v1.3.2"].into_iter().collect();
        assert!(exclusions.excludes(&info.requirements[0], &info.original_paths));
    }

    #[test]
    fn test_uppercase_path_is_escaped_on_disk() {
        let f = fixture("module example/root\nrequire github.com/BurntSushi/toml v1.3.2\n");
        put_file(&f.cache, "github.com/!burnt!sushi/toml@v1.3.2", "COPYING", MIT);

        let records = run(&f, &ExclusionSet::default()).unwrap();
        assert_eq!(
            records[0].file_path,
            Path::new("github.com/!burnt!sushi/toml@v1.3.2/COPYING")
        );
        assert_eq!(records[0].module.path, "github.com/BurntSushi/toml");
    }

    #[test]
    fn test_invalid_module_path_aborts() {
        let f = fixture(
            "module example/root\n\
             require example/local v1.0.0\n\
             require example/dep v1.0.0\n\
             replace example/local => ../local\n",
        );
        put_file(&f.cache, "example/dep@v1.0.0", "LICENSE", MIT);

        let err = run(&f, &ExclusionSet::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { ref path, .. } if path == "../local"));
    }

    #[test]
    fn test_records_follow_requirement_order() {
        let f = fixture(
            "module example/root\nrequire (\n\texample/zeta v1.0.0\n\texample/alpha v1.0.0\n)\n",
        );
        put_file(&f.cache, "example/zeta@v1.0.0", "LICENSE", MIT);
        put_file(&f.cache, "example/alpha@v1.0.0", "LICENSE", APACHE);
        put_file(&f.cache, "example/alpha@v1.0.0", "COPYING", MIT);

        let records = run(&f, &ExclusionSet::default()).unwrap();
        let summary: Vec<(&str, &str, &str)> = records
            .iter()
            .map(|r| (r.module.path.as_str(), r.file_name.as_str(), r.license_type.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("example/zeta", "LICENSE", "MIT"),
                ("example/alpha", "COPYING", "MIT"),
                ("example/alpha", "LICENSE", "Apache-2.0"),
            ]
        );
        assert!(records.iter().all(|r| r.module.path != "example/root"));
    }

    #[test]
    fn test_one_record_per_classifier_match() {
        let f = fixture(SIMPLE);
        put_file(&f.cache, "example/dep@v1.0.0", "LICENSE", "dual licensed");
        let info = extract(&f.manifest).unwrap();

        let records = resolve(
            &f.cache,
            &info,
            LICENSE_FILE_NAMES,
            &ExclusionSet::default(),
            &StubClassifier(&["MIT", "Apache-2.0"]),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_name, records[1].file_name);

        let allow: AllowList = ["MIT", "Apache-2.0"].into_iter().collect();
        assert!(enforce(&records, &allow).accepted);

        let allow: AllowList = ["MIT"].into_iter().collect();
        let verdict = enforce(&records, &allow);
        assert!(!verdict.accepted);
        assert_eq!(verdict.violations[0].license_type, "Apache-2.0");
    }

    #[test]
    fn test_manifest_without_requirements_resolves_to_nothing() {
        let f = fixture("module example/root\n");
        assert!(run(&f, &ExclusionSet::default()).unwrap().is_empty());
    }
}
