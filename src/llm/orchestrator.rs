use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::context::ContextEngine;
use crate::detectors::language::{CoverageStrategy, Language};
use crate::llm::backend::{CompletionBackend, LlmError};
use crate::llm::prompt::{build_prompt, PromptError};
use crate::testgen::file::{save_test, test_file_path};
use crate::testgen::runner::{CommandRunner, Coverage};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("failed to generate test cases: {0}")]
    Llm(#[from] LlmError),

    #[error("generated test code is empty")]
    Empty,

    #[error("error saving test cases to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// File names or paths that are never processed (the tool's own files).
    pub exclude: Vec<String>,
    /// Check for, and install if needed, each language's coverage tool.
    pub check_tools: bool,
}

/// Coverage work deferred to the end of the batch.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct PendingCoverage {
    pub go_module: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SkipReason {
    UnknownLanguage,
    Excluded,
}

#[derive(Debug)]
pub enum FileOutcome {
    Generated { test_file: PathBuf },
    Skipped(SkipReason),
    Failed(GenerateError),
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl BatchReport {
    pub fn generated(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Generated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Drives the whole batch: prompt, completion, persistence, coverage.
pub struct Orchestrator<'a, R> {
    backend: &'a dyn CompletionBackend,
    engine: ContextEngine<'a>,
    coverage: Coverage<R>,
    options: BatchOptions,
}

impl<'a, R: CommandRunner> Orchestrator<'a, R> {
    pub fn new(
        backend: &'a dyn CompletionBackend,
        engine: ContextEngine<'a>,
        coverage: Coverage<R>,
        options: BatchOptions,
    ) -> Self {
        Self {
            backend,
            engine,
            coverage,
            options,
        }
    }

    /// Processes every file in order. A failing file is logged and recorded;
    /// it never stops the batch.
    pub fn run(&self, files: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut pending = PendingCoverage::default();

        if files.is_empty() {
            info!("No files changed.");
            return report;
        }

        for file in files {
            let outcome = match self.admit(file) {
                Err(reason) => FileOutcome::Skipped(reason),
                Ok(language) => {
                    info!(file = %file.display(), %language, "processing");
                    match self.process_file(file, language, &mut pending) {
                        Ok(test_file) => FileOutcome::Generated { test_file },
                        Err(e) => {
                            error!(file = %file.display(), error = %e, "error processing file");
                            FileOutcome::Failed(e)
                        }
                    }
                }
            };
            report.files.push((file.clone(), outcome));
        }

        self.flush(pending);

        info!(
            generated = report.generated(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch complete"
        );
        report
    }

    fn admit(&self, file: &Path) -> Result<Language, SkipReason> {
        if self.is_excluded(file) {
            debug!(file = %file.display(), "skipping excluded file");
            return Err(SkipReason::Excluded);
        }

        match Language::detect(file) {
            Language::Unknown => {
                warn!(file = %file.display(), "unsupported file type");
                Err(SkipReason::UnknownLanguage)
            }
            language => Ok(language),
        }
    }

    fn is_excluded(&self, file: &Path) -> bool {
        let name = file.file_name().and_then(|n| n.to_str());
        self.options
            .exclude
            .iter()
            .any(|e| Some(e.as_str()) == name || file == Path::new(e))
    }

    /// One file end to end. Go coverage is recorded in `pending` rather than
    /// run here.
    fn process_file(
        &self,
        file: &Path,
        language: Language,
        pending: &mut PendingCoverage,
    ) -> Result<PathBuf, GenerateError> {
        let related = self.engine.gather(language, file);
        let prompt = build_prompt(language, file, &related, self.engine.resolver().root())?;

        let raw = self.backend.complete(&prompt)?;
        let code = normalize_completion(&raw);
        if code.is_empty() {
            return Err(GenerateError::Empty);
        }

        let test_file = save_test(language, file, &code).map_err(|source| GenerateError::Save {
            path: test_file_path(language, file),
            source,
        })?;

        if self.options.check_tools {
            self.coverage.ensure_tool(language);
        }

        match language.coverage_strategy() {
            CoverageStrategy::PerFile => {
                if let Err(e) = self.coverage.run_for_file(language, &test_file) {
                    error!(file = %test_file.display(), error = %e, "error generating coverage report");
                }
            }
            CoverageStrategy::Batched => pending.go_module = true,
            CoverageStrategy::Unsupported => {
                debug!(%language, "no coverage tooling for language");
            }
        }

        Ok(test_file)
    }

    fn flush(&self, pending: PendingCoverage) {
        if !pending.go_module {
            return;
        }

        if let Err(e) = self.coverage.run_go_module() {
            error!(error = %e, "error generating Go coverage report");
        }
    }
}

/* ============================================================
   Completion normalisation
   ============================================================ */

/// Straightens curly quotes and strips a surrounding code fence.
pub fn normalize_completion(text: &str) -> String {
    let text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    let Some(after_fence) = text.strip_prefix("```") else {
        return text.trim().to_string();
    };

    let body = match after_fence.find('\n') {
        Some(i) => &after_fence[i + 1..],
        None => after_fence,
    };
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);

    body.trim().to_string()
}
