// src/context/engine.rs

use std::path::Path;

use tracing::{error, info};

use crate::context::related::related_sources;
use crate::context::related_tests::related_tests;
use crate::context::{ReferenceResolver, RelatedContext, ResolvedFile};
use crate::detectors::language::Language;

/// Gathers related sources and tests for a changed file.
///
/// Resolution failures are logged here and degrade to an empty list; they
/// never fail the file.
pub struct ContextEngine<'a> {
    resolver: &'a dyn ReferenceResolver,
}

impl<'a> ContextEngine<'a> {
    pub fn new(resolver: &'a dyn ReferenceResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &dyn ReferenceResolver {
        self.resolver
    }

    pub fn gather(&self, language: Language, target: &Path) -> RelatedContext {
        let sources = match related_sources(self.resolver, language, target) {
            Ok(paths) => paths,
            Err(e) => {
                error!(file = %target.display(), error = %e, "error identifying related files");
                Vec::new()
            }
        };

        if sources.is_empty() {
            info!(file = %target.display(), "no related files found");
        } else {
            info!(file = %target.display(), related = ?sources, "related files");
        }

        let tests = match related_tests(self.resolver, language, target) {
            Ok(paths) => paths,
            Err(e) => {
                error!(file = %target.display(), error = %e, "error identifying related test files");
                Vec::new()
            }
        };

        if tests.is_empty() {
            info!(file = %target.display(), "no related test files found");
        } else {
            info!(file = %target.display(), related = ?tests, "related test files");
        }

        RelatedContext {
            sources: sources.into_iter().map(ResolvedFile::source).collect(),
            tests: tests.into_iter().map(ResolvedFile::test).collect(),
        }
    }
}
