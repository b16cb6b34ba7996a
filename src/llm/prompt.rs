use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info};

use crate::context::types::{RelatedContext, RelatedKind, ResolvedFile};
use crate::detectors::language::Language;

const DEFAULT_GO_PACKAGE: &str = "main";

#[derive(Debug, Clone)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("error reading file {path}: {source}")]
    ReadTarget {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Assembles the request for one changed file.
///
/// Only an unreadable target fails; unreadable related files are logged and
/// left out.
pub fn build_prompt(
    language: Language,
    target: &Path,
    related: &RelatedContext,
    probe_root: &Path,
) -> Result<LlmPrompt, PromptError> {
    let code = std::fs::read_to_string(target).map_err(|source| PromptError::ReadTarget {
        path: target.to_path_buf(),
        source,
    })?;

    let user = user_prompt(language, target, &code, related, probe_root);
    info!(
        file = %target.display(),
        chars = user.len(),
        "created prompt"
    );

    Ok(LlmPrompt {
        system: system_prompt(),
        user,
    })
}

/* ============================================================
   System prompt
   ============================================================ */

fn system_prompt() -> String {
    "You are a senior software engineer specialized in writing comprehensive test suites."
        .to_string()
}

/* ============================================================
   User prompt
   ============================================================ */

fn user_prompt(
    language: Language,
    target: &Path,
    code: &str,
    related: &RelatedContext,
    probe_root: &Path,
) -> String {
    let file = target.display();
    let framework = language.framework();
    let mut out = String::new();

    /* ---------- HEADER ---------- */
    out.push_str(&format!(
        "Generate comprehensive unit tests for the following {language} file: {file} using {framework}.\n\n"
    ));

    /* ---------- REQUIREMENTS ---------- */
    out.push_str("Requirements:\n");
    out.push_str("1. Include edge cases, normal cases, and error cases.\n");
    out.push_str("2. Use mocking where appropriate for external dependencies.\n");
    out.push_str("3. Include setup and teardown if needed.\n");
    out.push_str("4. Add descriptive test names and docstrings.\n");
    out.push_str(&format!("5. Follow {framework} best practices.\n"));
    out.push_str("6. Ensure high code coverage.\n");
    out.push_str("7. Test both success and failure scenarios.\n");
    out.push_str(&format!("8. {}\n\n", package_instruction(language, code)));

    /* ---------- CODE ---------- */
    out.push_str(&format!("Code to test (File: {file}):\n\n{code}\n\n"));

    /* ---------- RELATED ---------- */
    out.push_str("Related context:\n");
    for f in &related.sources {
        if let Some(block) = related_block(language, f, probe_root) {
            out.push_str(&block);
        }
    }

    out.push_str("\n\nRelated test cases:\n");
    for f in &related.tests {
        if let Some(block) = related_block(language, f, probe_root) {
            out.push_str(&block);
        }
    }

    out.push_str(
        "\n\nGenerate only the test code without any explanations or notes. \
         Ensure that the test file includes at least one valid test function.",
    );

    out
}

/* ============================================================
   Helpers
   ============================================================ */

fn package_instruction(language: Language, code: &str) -> String {
    match language {
        Language::Go => format!(
            "The test code must start with the correct package declaration: package {}.",
            go_package_name(code)
        ),
        _ => "Ensure the test code starts with the correct package declaration.".to_string(),
    }
}

/// Name from the first `package <name>` line, `main` if there is none.
pub fn go_package_name(code: &str) -> String {
    code.lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("package "))
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or(DEFAULT_GO_PACKAGE)
        .to_string()
}

/// Extension stripped, separators normalised to `/`, relative to the probe root.
pub fn module_path(path: &Path, probe_root: &Path) -> String {
    let rel = path.strip_prefix(probe_root).unwrap_or(path);
    rel.with_extension("")
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .filter(|c| *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn related_block(language: Language, f: &ResolvedFile, probe_root: &Path) -> Option<String> {
    let content = match f.read() {
        Ok(c) => c,
        Err(e) => {
            error!(file = %f.path.display(), error = %e, "error reading related file");
            return None;
        }
    };

    let comment = language.line_comment();

    match f.kind {
        RelatedKind::Source => {
            let module = module_path(&f.path, probe_root);
            let shown = match language {
                Language::Go => module.clone(),
                _ => module.replace('/', "."),
            };
            info!(file = %f.path.display(), module = %shown, "included related file");

            Some(format!(
                "\n\n{comment} Module: {shown}\n{}\n{content}",
                language.import_statement(&module),
            ))
        }
        RelatedKind::Test => {
            info!(file = %f.path.display(), "included related test file");

            Some(format!(
                "\n\n{comment} Related test file: {}\n{content}",
                f.path.display()
            ))
        }
    }
}
