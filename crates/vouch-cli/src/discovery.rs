//! Test-definition discovery
//!
//! Definition functions are compiled into the test binary, so discovery
//! resolves requested paths against a registry of source entries rather
//! than loading files. Entries registered under a real directory are still
//! checked against the filesystem: walking the directory surfaces typos in
//! requested paths, and files present on disk but never registered are
//! simply not part of the run.
//!
//! A directory may register a bootstrap function; it is loaded once, before
//! any of that directory's definitions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use vouch_core::{DefineFn, Definition, Discovery, RunnerError, RunnerResult};
use walkdir::WalkDir;

/// The compiled-in registry of test-definition sources.
#[derive(Default)]
pub struct SourceSet {
    entries: Vec<(PathBuf, DefineFn)>,
    bootstraps: Vec<(PathBuf, DefineFn)>,
}

impl SourceSet {
    pub fn new() -> Self {
        SourceSet::default()
    }

    /// Register the definitions contributed by one source path.
    pub fn add(mut self, path: impl Into<PathBuf>, define: DefineFn) -> Self {
        self.entries.push((path.into(), define));
        self
    }

    /// Register a bootstrap for a directory, loaded once before any of the
    /// directory's definitions.
    pub fn bootstrap(mut self, dir: impl Into<PathBuf>, define: DefineFn) -> Self {
        self.bootstraps.push((dir.into(), define));
        self
    }

    /// Entries under `requested`, either by path prefix or through the
    /// files actually present when `requested` is a directory on disk.
    fn select(&self, requested: &Path) -> RunnerResult<BTreeSet<PathBuf>> {
        let mut selected = BTreeSet::new();

        for (path, _) in &self.entries {
            if path == requested || path.starts_with(requested) {
                selected.insert(path.clone());
            }
        }

        if requested.is_dir() {
            let walker = WalkDir::new(requested)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

            for entry in walker {
                let entry = entry.map_err(|e| RunnerError::Discovery {
                    path: requested.to_path_buf(),
                    message: e.to_string(),
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let file = entry.path();
                if self.entries.iter().any(|(path, _)| path == file) {
                    selected.insert(file.to_path_buf());
                }
            }
        }

        Ok(selected)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

impl Discovery for SourceSet {
    fn discover(&self, paths: &[PathBuf]) -> RunnerResult<Vec<Definition>> {
        let mut selected: BTreeSet<PathBuf> = BTreeSet::new();
        for requested in paths {
            selected.extend(self.select(requested)?);
        }

        if selected.is_empty() {
            return Err(RunnerError::NoTestsFound);
        }

        // Bootstraps run once per contributing directory, immediately ahead
        // of that directory's first definition. BTreeSet iteration keeps
        // everything in lexical order.
        let mut definitions = Vec::new();
        let mut loaded = vec![false; self.bootstraps.len()];
        for path in &selected {
            for (slot, (dir, define)) in self.bootstraps.iter().enumerate() {
                if !loaded[slot] && path.starts_with(dir) {
                    loaded[slot] = true;
                    definitions.push(Definition::new(dir.clone(), *define));
                }
            }
            for (entry, define) in &self.entries {
                if entry == path {
                    definitions.push(Definition::new(path.clone(), *define));
                }
            }
        }

        Ok(definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use vouch_core::Runner;

    fn define_nothing(_: &mut Runner) {}

    fn define_one(runner: &mut Runner) {
        runner.test("one", |t| {
            t.is(1).equal(1)?;
            Ok(())
        });
    }

    fn sources(set: &SourceSet, paths: &[&str]) -> Vec<PathBuf> {
        let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
        set.discover(&paths)
            .unwrap()
            .into_iter()
            .map(|d| d.source)
            .collect()
    }

    #[test]
    fn prefix_selection_is_lexically_ordered() {
        let set = SourceSet::new()
            .add("tests/unit/b.rs", define_nothing)
            .add("tests/unit/a.rs", define_nothing)
            .add("tests/other/c.rs", define_nothing);

        assert_eq!(
            sources(&set, &["tests/unit"]),
            vec![
                PathBuf::from("tests/unit/a.rs"),
                PathBuf::from("tests/unit/b.rs")
            ]
        );
    }

    #[test]
    fn exact_path_selects_one_entry() {
        let set = SourceSet::new()
            .add("tests/a.rs", define_nothing)
            .add("tests/b.rs", define_nothing);

        assert_eq!(sources(&set, &["tests/a.rs"]), vec![PathBuf::from("tests/a.rs")]);
    }

    #[test]
    fn nothing_selected_is_no_tests_found() {
        let set = SourceSet::new().add("tests/a.rs", define_nothing);
        let result = set.discover(&[PathBuf::from("elsewhere")]);
        assert!(matches!(result, Err(RunnerError::NoTestsFound)));
    }

    #[test]
    fn bootstrap_precedes_directory_definitions() {
        let set = SourceSet::new()
            .add("tests/a.rs", define_nothing)
            .bootstrap("tests", define_nothing);

        assert_eq!(
            sources(&set, &["tests"]),
            vec![PathBuf::from("tests"), PathBuf::from("tests/a.rs")]
        );
    }

    #[test]
    fn each_bootstrap_loads_just_before_its_own_directory() {
        let set = SourceSet::new()
            .add("tests/slow/s.rs", define_nothing)
            .add("tests/fast/f.rs", define_nothing)
            .bootstrap("tests/slow", define_nothing)
            .bootstrap("tests/fast", define_nothing);

        assert_eq!(
            sources(&set, &["tests"]),
            vec![
                PathBuf::from("tests/fast"),
                PathBuf::from("tests/fast/f.rs"),
                PathBuf::from("tests/slow"),
                PathBuf::from("tests/slow/s.rs"),
            ]
        );
    }

    #[test]
    fn bootstrap_for_unselected_directory_is_skipped() {
        let set = SourceSet::new()
            .add("tests/a.rs", define_nothing)
            .bootstrap("other", define_nothing);

        assert_eq!(sources(&set, &["tests"]), vec![PathBuf::from("tests/a.rs")]);
    }

    #[test]
    fn real_directories_resolve_registered_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("case.rs");
        fs::write(&file, "").unwrap();
        fs::write(dir.path().join(".hidden.rs"), "").unwrap();

        let set = SourceSet::new().add(&file, define_one);
        let paths = vec![dir.path().to_path_buf()];
        let definitions = set.discover(&paths).unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].source, file);
    }

    #[test]
    fn definitions_register_their_tests() {
        let set = SourceSet::new().add("tests/one.rs", define_one);
        let definitions = set.discover(&[PathBuf::from("tests")]).unwrap();

        let mut runner = Runner::new();
        for definition in &definitions {
            definition.register(&mut runner);
        }
        assert_eq!(runner.tests().len(), 1);
    }
}
