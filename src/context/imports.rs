//! context/imports.rs
//!
//! Heuristic import scanning. No parsing: lines that look like imports are
//! split on whitespace and every token is mapped onto candidate file names,
//! which are then probed on disk.

use std::path::{Path, PathBuf};

use crate::detectors::language::Language;

/// Probe order. First existing candidate wins.
pub const PROBE_EXTENSIONS: [&str; 3] = ["py", "js", "ts"];

const IMPORT_MARKERS: [&str; 3] = ["import ", "from ", "require("];

/// A token pulled from an import-like line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Reference {
    /// `.sibling` with every dot stripped.
    Relative(String),
    /// Token that already names a file, e.g. `helpers.js`.
    Explicit(String),
    /// `pkg.module` rewritten to `pkg/module`.
    Dotted(String),
    /// Bare identifier, lower-cased.
    Identifier(String),
}

impl Reference {
    /// Candidate paths in probe order.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            Reference::Explicit(path) => vec![path.clone()],
            Reference::Relative(stem) | Reference::Dotted(stem) | Reference::Identifier(stem) => {
                PROBE_EXTENSIONS
                    .iter()
                    .map(|ext| format!("{stem}.{ext}"))
                    .collect()
            }
        }
    }
}

/* ============================================================
   Public API
   ============================================================ */

pub fn is_import_line(line: &str) -> bool {
    IMPORT_MARKERS.iter().any(|m| line.contains(m))
}

pub fn classify(token: &str) -> Option<Reference> {
    // Parent-relative imports never name a file under the probe root.
    if token.starts_with("..") {
        return None;
    }

    if token.len() > 1 && token.starts_with('.') {
        let stem: String = token.chars().filter(|c| *c != '.').collect();
        let stem = stem.trim_start_matches('/');
        return (!stem.is_empty()).then(|| Reference::Relative(stem.to_string()));
    }

    if has_probe_extension(token) {
        return Some(Reference::Explicit(token.to_string()));
    }

    if token.contains('.') {
        let path = token
            .split('.')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let path = path.trim_start_matches('/');
        return (!path.is_empty()).then(|| Reference::Dotted(path.to_string()));
    }

    if is_identifier(token) {
        return Some(Reference::Identifier(token.to_lowercase()));
    }

    None
}

/// Returns the first candidate that exists under `root` and satisfies `accept`.
///
/// `accept` sees the candidate as written (relative to `root`).
pub fn probe(root: &Path, reference: &Reference, accept: impl Fn(&str) -> bool) -> Option<PathBuf> {
    reference
        .candidates()
        .into_iter()
        .find(|c| accept(c.as_str()) && root.join(c).is_file())
        .map(|c| root.join(c))
}

/// Maps source lines onto files they reference.
///
/// Callers never depend on how references are found, only on the ordered
/// output, so a real parser can replace the heuristic one.
pub trait ReferenceResolver {
    /// Existing files referenced by `lines`, in first-discovered order.
    fn resolve(&self, language: Language, lines: &[&str]) -> Vec<PathBuf>;

    /// True if any import-like line references a file whose probed path
    /// contains `needle`.
    fn references(&self, lines: &[&str], needle: &str) -> bool;

    /// Directory candidates are probed against.
    fn root(&self) -> &Path;
}

/// Token heuristics over `import `, `from ` and `require(` lines.
#[derive(Debug, Clone)]
pub struct HeuristicResolver {
    root: PathBuf,
}

impl HeuristicResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn references_in<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = Reference> + 'a {
        lines
            .iter()
            .filter(|l| is_import_line(l))
            .flat_map(|l| l.split_whitespace())
            .filter_map(classify)
    }
}

impl ReferenceResolver for HeuristicResolver {
    fn resolve(&self, language: Language, lines: &[&str]) -> Vec<PathBuf> {
        if !language.resolves_related_sources() {
            return Vec::new();
        }

        Self::references_in(lines)
            .filter_map(|r| probe(&self.root, &r, |_| true))
            .collect()
    }

    fn references(&self, lines: &[&str], needle: &str) -> bool {
        Self::references_in(lines).any(|r| probe(&self.root, &r, |c| c.contains(needle)).is_some())
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

/* ============================================================
   Helpers
   ============================================================ */

fn has_probe_extension(token: &str) -> bool {
    PROBE_EXTENSIONS.iter().any(|ext| {
        token
            .strip_suffix(*ext)
            .is_some_and(|rest| rest.len() > 1 && rest.ends_with('.'))
    })
}

/// Same rule Python uses for identifiers.
fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn classify_covers_each_token_shape() {
        assert_eq!(classify(".sibling"), Some(Reference::Relative("sibling".into())));
        assert_eq!(classify("helpers.js"), Some(Reference::Explicit("helpers.js".into())));
        assert_eq!(classify("pkg.models"), Some(Reference::Dotted("pkg/models".into())));
        assert_eq!(classify("Widget"), Some(Reference::Identifier("widget".into())));
    }

    #[test]
    fn classify_rejects_noise() {
        assert_eq!(classify("*"), None);
        assert_eq!(classify("{"), None);
        assert_eq!(classify("1abc"), None);
        assert_eq!(classify("."), None);
    }

    #[test]
    fn parent_relative_import_does_not_resolve_to_sibling() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "parent.py");

        let resolver = HeuristicResolver::new(dir.path());

        assert_eq!(classify("..parent"), None);
        assert!(resolver
            .resolve(Language::Python, &["from ..parent import X"])
            .is_empty());
    }

    #[test]
    fn relative_import_of_sibling_resolves() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "sibling.py");

        let resolver = HeuristicResolver::new(dir.path());
        let found = resolver.resolve(Language::Python, &["from .sibling import X"]);

        assert!(found.contains(&dir.path().join("sibling.py")));
    }

    #[test]
    fn probe_order_prefers_py_then_js_then_ts() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "shared.ts");
        touch(dir.path(), "shared.js");

        let resolver = HeuristicResolver::new(dir.path());
        let found = resolver.resolve(Language::JavaScript, &["import shared"]);

        assert_eq!(found, vec![dir.path().join("shared.js")]);
    }

    #[test]
    fn dotted_module_maps_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "app/models.py");

        let resolver = HeuristicResolver::new(dir.path());
        let found = resolver.resolve(Language::Python, &["import app.models"]);

        assert_eq!(found, vec![dir.path().join("app/models.py")]);
    }

    #[test]
    fn lines_without_import_markers_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "helper.py");

        let resolver = HeuristicResolver::new(dir.path());
        let found = resolver.resolve(Language::Python, &["helper = 1", "print(helper)"]);

        assert!(found.is_empty());
    }

    #[test]
    fn duplicates_are_kept_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "util.py");
        touch(dir.path(), "core.py");

        let resolver = HeuristicResolver::new(dir.path());
        let found = resolver.resolve(
            Language::Python,
            &["import util", "from core import util"],
        );

        assert_eq!(
            found,
            vec![
                dir.path().join("util.py"),
                dir.path().join("core.py"),
                dir.path().join("util.py"),
            ]
        );
    }

    #[test]
    fn unsupported_languages_resolve_nothing() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "widget.py");

        let resolver = HeuristicResolver::new(dir.path());
        for lang in [Language::Cpp, Language::CSharp, Language::Go, Language::Java] {
            assert!(resolver.resolve(lang, &["import widget"]).is_empty());
        }
    }

    #[test]
    fn references_requires_needle_in_probed_path() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "calc.py");
        touch(dir.path(), "other.py");

        let resolver = HeuristicResolver::new(dir.path());

        assert!(resolver.references(&["from calc import add"], "calc.py"));
        assert!(!resolver.references(&["from other import add"], "calc.py"));
    }
}
