// src/context/types.rs
//
// Shared data model for related-file resolution.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RelatedKind {
    Source,
    Test,
}

/// A reference that matched an existing file on disk.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ResolvedFile {
    pub kind: RelatedKind,

    /// Path as probed (joined onto the probe root).
    pub path: PathBuf,
}

impl ResolvedFile {
    pub fn source(path: PathBuf) -> Self {
        Self {
            kind: RelatedKind::Source,
            path,
        }
    }

    pub fn test(path: PathBuf) -> Self {
        Self {
            kind: RelatedKind::Test,
            path,
        }
    }

    pub fn read(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

/// Everything gathered for one changed file, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct RelatedContext {
    pub sources: Vec<ResolvedFile>,
    pub tests: Vec<ResolvedFile>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl ResolveError {
    pub fn read(path: &Path, source: io::Error) -> Self {
        ResolveError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
