// src/context/related_tests.rs
//
// Companion test discovery. Searches the target's directory tree for
// pytest-style test files that import the target.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::context::imports::ReferenceResolver;
use crate::context::types::ResolveError;
use crate::detectors::language::Language;

/// Keeps the prompt bounded.
pub const MAX_RELATED_TESTS: usize = 1;

/* ============================================================
   Public entry
   ============================================================ */

/// Test files under the target's directory whose imports point at the target.
///
/// Matching is by substring: the target's file name must appear in a probed
/// import path, so short names (`io.py`) can match unrelated files
/// (`studio.py`).
pub fn related_tests(
    resolver: &dyn ReferenceResolver,
    language: Language,
    target: &Path,
) -> Result<Vec<PathBuf>, ResolveError> {
    if !language.resolves_related_tests() {
        return Ok(Vec::new());
    }

    let Some(needle) = target.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };

    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut hits = Vec::new();

    for candidate in python_test_files(&dir)? {
        let content = match std::fs::read_to_string(&candidate) {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %candidate.display(), error = %e, "skipping unreadable test file");
                continue;
            }
        };
        let lines: Vec<&str> = content.lines().collect();

        if resolver.references(&lines, needle) {
            hits.push(candidate);
            if hits.len() >= MAX_RELATED_TESTS {
                break;
            }
        }
    }

    Ok(hits)
}

/* ============================================================
   Helpers
   ============================================================ */

/// Candidates grouped by name pattern: every `tests.py` in the tree, then
/// `test.py`, then `test_*.py`, then `*_test.py`. Name order within a group.
fn python_test_files(dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let mut out: Vec<(usize, PathBuf)> = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(ResolveError::Walk {
                    root: dir.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if let Some(rank) = entry.file_name().to_str().and_then(test_name_rank) {
            out.push((rank, entry.into_path()));
        }
    }

    // Stable: walk order is kept inside each group.
    out.sort_by_key(|(rank, _)| *rank);
    Ok(out.into_iter().map(|(_, path)| path).collect())
}

fn test_name_rank(name: &str) -> Option<usize> {
    match name {
        "tests.py" => return Some(0),
        "test.py" => return Some(1),
        _ => {}
    }

    let stem = name.strip_suffix(".py")?;
    if stem.starts_with("test_") {
        Some(2)
    } else if stem.ends_with("_test") {
        Some(3)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::imports::HeuristicResolver;
    use std::fs;

    fn write(path: &Path, body: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_name_patterns() {
        for (rank, name) in ["tests.py", "test.py", "test_calc.py", "calc_test.py"]
            .into_iter()
            .enumerate()
        {
            assert_eq!(test_name_rank(name), Some(rank), "{name}");
        }
        for name in ["calc.py", "testing.py", "test_calc.js", "contest.py"] {
            assert_eq!(test_name_rank(name), None, "{name}");
        }
    }

    #[test]
    fn tests_py_wins_over_prefixed_test_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("calc.py");
        write(&target, "");
        write(&dir.path().join("test_calc.py"), "import calc\n");
        write(&dir.path().join("pkg/tests.py"), "import calc\n");

        let resolver = HeuristicResolver::new(dir.path());
        let found = related_tests(&resolver, Language::Python, &target).unwrap();

        assert_eq!(found, vec![dir.path().join("pkg/tests.py")]);
    }

    #[test]
    fn unreadable_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("calc.py");
        write(&target, "");
        fs::write(dir.path().join("tests.py"), [0xff, 0xfe, 0x00]).unwrap();
        write(&dir.path().join("test_calc.py"), "import calc\n");

        let resolver = HeuristicResolver::new(dir.path());
        let found = related_tests(&resolver, Language::Python, &target).unwrap();

        assert_eq!(found, vec![dir.path().join("test_calc.py")]);
    }

    #[test]
    fn finds_test_that_imports_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("calc.py");
        write(&target, "def add(a, b): return a + b\n");
        write(&dir.path().join("tests/test_calc.py"), "from calc import add\n");
        write(&dir.path().join("tests/test_other.py"), "import os\n");

        let resolver = HeuristicResolver::new(dir.path());
        let found = related_tests(&resolver, Language::Python, &target).unwrap();

        assert_eq!(found, vec![dir.path().join("tests/test_calc.py")]);
    }

    #[test]
    fn result_is_capped_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("calc.py");
        write(&target, "");
        write(&dir.path().join("a/test_calc.py"), "import calc\n");
        write(&dir.path().join("b/calc_test.py"), "import calc\n");

        let resolver = HeuristicResolver::new(dir.path());
        let found = related_tests(&resolver, Language::Python, &target).unwrap();

        assert_eq!(found, vec![dir.path().join("a/test_calc.py")]);
    }

    #[test]
    fn tests_not_referencing_target_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("calc.py");
        write(&target, "");
        write(&dir.path().join("other.py"), "");
        write(&dir.path().join("test_other.py"), "import other\n");

        let resolver = HeuristicResolver::new(dir.path());
        let found = related_tests(&resolver, Language::Python, &target).unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn only_python_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("calc.js");
        write(&target, "");
        write(&dir.path().join("test_calc.py"), "import calc\n");

        let resolver = HeuristicResolver::new(dir.path());
        let found = related_tests(&resolver, Language::JavaScript, &target).unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("gone/calc.py");

        let resolver = HeuristicResolver::new(dir.path());
        let err = related_tests(&resolver, Language::Python, &target).unwrap_err();

        assert!(matches!(err, ResolveError::Walk { .. }));
    }
}
