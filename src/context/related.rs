// src/context/related.rs
//
// Related-source lookup for a single changed file.

use std::path::{Path, PathBuf};

use crate::context::imports::ReferenceResolver;
use crate::context::types::ResolveError;
use crate::detectors::language::Language;

pub fn related_sources(
    resolver: &dyn ReferenceResolver,
    language: Language,
    file: &Path,
) -> Result<Vec<PathBuf>, ResolveError> {
    if !language.resolves_related_sources() {
        return Ok(Vec::new());
    }

    let src = std::fs::read_to_string(file).map_err(|e| ResolveError::read(file, e))?;
    let lines: Vec<&str> = src.lines().collect();

    Ok(resolver.resolve(language, &lines))
}
