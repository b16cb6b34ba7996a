//! detectors/language.rs
//!
//! Per-file language detection based on the file extension.

use std::fmt;
use std::path::Path;

use crate::detectors::framework::TestFramework;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Cpp,
    CSharp,
    Go,
    Unknown,
}

/// How coverage is collected once a test file has been written.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CoverageStrategy {
    /// Run immediately against the freshly written test file.
    PerFile,
    /// Run once per batch against the module root.
    Batched,
    /// No coverage tooling wired for this language.
    Unsupported,
}

const KNOWN: [Language; 7] = [
    Language::Python,
    Language::JavaScript,
    Language::TypeScript,
    Language::Java,
    Language::Cpp,
    Language::CSharp,
    Language::Go,
];

/* ============================================================
   Public API
   ============================================================ */

impl Language {
    /// Case-insensitive extension lookup. Anything unmapped is `Unknown`.
    pub fn detect(path: &Path) -> Language {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Language::Unknown;
        };
        let ext = ext.to_ascii_lowercase();

        KNOWN
            .into_iter()
            .find(|lang| lang.extension() == Some(ext.as_str()))
            .unwrap_or(Language::Unknown)
    }

    /// Extension without the leading dot.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Language::Python => Some("py"),
            Language::JavaScript => Some("js"),
            Language::TypeScript => Some("ts"),
            Language::Java => Some("java"),
            Language::Cpp => Some("cpp"),
            Language::CSharp => Some("cs"),
            Language::Go => Some("go"),
            Language::Unknown => None,
        }
    }

    pub fn framework(self) -> TestFramework {
        match self {
            Language::Python => TestFramework::Pytest,
            Language::JavaScript | Language::TypeScript => TestFramework::Jest,
            Language::Java => TestFramework::JUnit,
            Language::Cpp => TestFramework::GoogleTest,
            Language::CSharp => TestFramework::NUnit,
            Language::Go => TestFramework::GoTesting,
            Language::Unknown => TestFramework::Unknown,
        }
    }

    /// Languages whose imports the heuristic source resolver understands.
    pub fn resolves_related_sources(self) -> bool {
        matches!(
            self,
            Language::Python | Language::JavaScript | Language::TypeScript
        )
    }

    /// Only pytest-style companion tests are discovered today.
    pub fn resolves_related_tests(self) -> bool {
        matches!(self, Language::Python)
    }

    pub fn line_comment(self) -> &'static str {
        match self {
            Language::Python => "#",
            _ => "//",
        }
    }

    pub fn coverage_strategy(self) -> CoverageStrategy {
        match self {
            Language::Go => CoverageStrategy::Batched,
            Language::Python | Language::JavaScript | Language::TypeScript => {
                CoverageStrategy::PerFile
            }
            _ => CoverageStrategy::Unsupported,
        }
    }

    /// Import line used when embedding a related module into the prompt.
    pub fn import_statement(self, module_path: &str) -> String {
        match self {
            Language::Go => format!("import \"{module_path}\""),
            _ => format!("import {}", module_path.replace('/', ".")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Go => "Go",
            Language::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_maps_every_known_extension() {
        let cases = [
            ("app.py", Language::Python, "pytest"),
            ("app.js", Language::JavaScript, "jest"),
            ("app.ts", Language::TypeScript, "jest"),
            ("App.java", Language::Java, "JUnit"),
            ("engine.cpp", Language::Cpp, "Google Test"),
            ("Program.cs", Language::CSharp, "NUnit"),
            ("main.go", Language::Go, "testing"),
        ];

        for (file, lang, framework) in cases {
            let detected = Language::detect(Path::new(file));
            assert_eq!(detected, lang, "{file}");
            assert_eq!(detected.framework().label(), framework, "{file}");
        }
    }

    #[test]
    fn detect_is_case_insensitive() {
        assert_eq!(Language::detect(Path::new("MODULE.PY")), Language::Python);
        assert_eq!(Language::detect(Path::new("src/Main.Go")), Language::Go);
    }

    #[test]
    fn unmapped_extensions_are_unknown() {
        for file in ["lib.rs", "README", "notes.txt", ".py", "archive.tar.gz"] {
            let detected = Language::detect(Path::new(file));
            assert_eq!(detected, Language::Unknown, "{file}");
            assert_eq!(detected.framework().label(), "unknown");
        }
    }

    #[test]
    fn display_uses_prompt_names() {
        assert_eq!(Language::Cpp.to_string(), "C++");
        assert_eq!(Language::CSharp.to_string(), "C#");
        assert_eq!(Language::TypeScript.to_string(), "TypeScript");
    }

    #[test]
    fn go_coverage_is_batched() {
        assert_eq!(Language::Go.coverage_strategy(), CoverageStrategy::Batched);
        assert_eq!(Language::Python.coverage_strategy(), CoverageStrategy::PerFile);
        assert_eq!(Language::CSharp.coverage_strategy(), CoverageStrategy::Unsupported);
    }

    #[test]
    fn import_statement_follows_language_convention() {
        assert_eq!(Language::Go.import_statement("pkg/util"), "import \"pkg/util\"");
        assert_eq!(Language::Python.import_statement("pkg/util"), "import pkg.util");
    }
}
