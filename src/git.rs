// src/git.rs
use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] io::Error),

    #[error("git diff failed: {0}")]
    Failed(String),
}

pub fn is_git_repo() -> bool {
    std::path::Path::new(".git").exists()
}

/// Files changed between `since` and the working tree that still exist.
pub fn changed_files(since: &str) -> Result<Vec<PathBuf>, GitError> {
    let out = Command::new("git")
        .args(["diff", "--name-only", since])
        .output()?;

    if !out.status.success() {
        return Err(GitError::Failed(
            String::from_utf8_lossy(&out.stderr).trim().to_string(),
        ));
    }

    Ok(parse_name_only(&String::from_utf8_lossy(&out.stdout))
        .into_iter()
        .filter(|p| p.is_file())
        .collect())
}

/// One path per non-blank line of `git diff --name-only` output.
pub fn parse_name_only(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_only_skips_blank_lines() {
        let out = "src/a.py\n\n  web/b.ts  \n";
        assert_eq!(
            parse_name_only(out),
            vec![PathBuf::from("src/a.py"), PathBuf::from("web/b.ts")]
        );
    }

    #[test]
    fn parse_name_only_of_empty_output() {
        assert!(parse_name_only("").is_empty());
    }
}
