// src/testgen/file.rs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::detectors::language::Language;

const PREVIEW_LINES: usize = 5;

/* ============================================================
   Public API
   ============================================================ */

/// Where the generated test for `source` is written: always beside it.
///
/// Go gets `<stem>_test.go`; everything else `test_<stem><ext>`. A stem that
/// already ends in `_test` is used unchanged.
pub fn test_file_path(language: Language, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("generated");
    let already_test = stem.ends_with("_test");

    let name = match language {
        Language::Go if already_test => format!("{stem}.go"),
        Language::Go => format!("{stem}_test.go"),
        _ => {
            let ext = source
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{e}"))
                .unwrap_or_default();
            if already_test {
                format!("{stem}{ext}")
            } else {
                format!("test_{stem}{ext}")
            }
        }
    };

    source.with_file_name(name)
}

/// Writes (truncating) the generated test next to its source.
pub fn save_test(language: Language, source: &Path, test_code: &str) -> io::Result<PathBuf> {
    let path = test_file_path(language, source);
    fs::write(&path, test_code)?;
    info!(file = %path.display(), "test cases saved");

    log_written(&path);
    Ok(path)
}

/* ============================================================
   Helpers
   ============================================================ */

fn log_written(path: &Path) {
    match fs::metadata(path) {
        Ok(meta) => info!(file = %path.display(), bytes = meta.len(), "test file written"),
        Err(e) => {
            error!(file = %path.display(), error = %e, "test file was not created");
            return;
        }
    }

    match fs::read_to_string(path) {
        Ok(text) => {
            let preview = text.lines().take(PREVIEW_LINES).collect::<Vec<_>>().join("\n");
            debug!(file = %path.display(), "first lines:\n{preview}");
        }
        Err(e) => error!(file = %path.display(), error = %e, "error reading back test file"),
    }
}
