// Coverage collection through external tools.
// Commands are described as data and handed to a CommandRunner, so the
// batching rules can be checked without spawning anything.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::detectors::language::{CoverageStrategy, Language};

pub const GO_MODULE_MANIFEST: &str = "go.mod";
pub const GO_PROFILE: &str = "coverage_report.out";
pub const GO_HTML: &str = "coverage_report.html";
pub const TEXT_REPORT: &str = "coverage_report.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Redirect stdout into this file.
    pub stdout: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: None,
            stdout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn stdout_to(mut self, path: PathBuf) -> Self {
        self.stdout = Some(path);
        self
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: String },

    #[error("failed to open report file {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'go.mod' not found in repository root: {root}")]
    MissingModuleManifest { root: PathBuf },
}

pub trait CommandRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<(), CoverageError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, cmd: &ToolCommand) -> Result<(), CoverageError> {
        (**self).run(cmd)
    }
}

/// Spawns real processes and waits for them.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<(), CoverageError> {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);

        if let Some(dir) = &cmd.cwd {
            command.current_dir(dir);
        }

        if let Some(path) = &cmd.stdout {
            let file = File::create(path).map_err(|source| CoverageError::Report {
                path: path.clone(),
                source,
            })?;
            command.stdout(Stdio::from(file));
        }

        let status = command.status().map_err(|source| CoverageError::Spawn {
            command: cmd.to_string(),
            source,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(CoverageError::Failed {
                command: cmd.to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// Outcome of checking for a language's coverage tool.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ToolStatus {
    Present,
    Installed,
    Missing,
    BuiltIn,
    Unchecked,
}

/* ============================================================
   Coverage
   ============================================================ */

pub struct Coverage<R> {
    runner: R,
    root: PathBuf,
}

impl<R: CommandRunner> Coverage<R> {
    pub fn new(runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
        }
    }

    /// Per-file coverage. Languages with batched or no coverage are a no-op.
    pub fn run_for_file(&self, language: Language, test_file: &Path) -> Result<(), CoverageError> {
        if language.coverage_strategy() != CoverageStrategy::PerFile {
            return Ok(());
        }

        let report = self.root.join(TEXT_REPORT);

        let commands = match language {
            Language::Python => vec![
                ToolCommand::new("coverage", &["run"]).arg(test_file.display().to_string()),
                ToolCommand::new("coverage", &["report", "-m", "--omit=*/site-packages/*"])
                    .stdout_to(report.clone()),
            ],
            _ => vec![ToolCommand::new("npx", &["jest", "--coverage"])
                .in_dir(&self.root)
                .stdout_to(report.clone())],
        };

        for cmd in &commands {
            info!(command = %cmd, "running coverage");
            self.runner.run(cmd)?;
        }

        info!(report = %report.display(), "code coverage report saved");
        Ok(())
    }

    /// Module-wide Go coverage: cover profile plus HTML rendering.
    pub fn run_go_module(&self) -> Result<(), CoverageError> {
        info!(root = %self.root.display(), "repository root");

        if !self.root.join(GO_MODULE_MANIFEST).is_file() {
            return Err(CoverageError::MissingModuleManifest {
                root: self.root.clone(),
            });
        }

        let profile = self.root.join(GO_PROFILE);
        let html = self.root.join(GO_HTML);

        let test = ToolCommand::new("go", &["test", "./...", "-coverprofile"])
            .arg(profile.display().to_string())
            .in_dir(&self.root);
        info!(command = %test, "running go test in repository root");
        self.runner.run(&test)?;
        info!(profile = %profile.display(), "generated cover profile");

        let cover = ToolCommand::new("go", &["tool", "cover", "-html"])
            .arg(profile.display().to_string())
            .arg("-o")
            .arg(html.display().to_string())
            .in_dir(&self.root);
        self.runner.run(&cover)?;
        info!(report = %html.display(), "HTML coverage report generated");

        report_artifact(&profile);
        report_artifact(&html);
        Ok(())
    }

    /// Makes sure the coverage tool for `language` is available, installing
    /// it where that can be done automatically.
    pub fn ensure_tool(&self, language: Language) -> ToolStatus {
        let (check, install) = match language {
            Language::Python => (
                ToolCommand::new("python3", &["-m", "pip", "show", "coverage"]),
                ToolCommand::new("python3", &["-m", "pip", "install", "coverage"]),
            ),
            Language::JavaScript | Language::TypeScript => (
                ToolCommand::new("npx", &["jest", "--version"]).in_dir(&self.root),
                ToolCommand::new("npm", &["install", "jest"]).in_dir(&self.root),
            ),
            Language::Java => {
                info!("make sure Jacoco is configured in your Maven/Gradle build");
                return ToolStatus::Unchecked;
            }
            Language::Go => {
                info!("Go's built-in coverage tools are available");
                return ToolStatus::BuiltIn;
            }
            _ => {
                warn!(%language, "coverage tool check is not configured, add it manually");
                return ToolStatus::Unchecked;
            }
        };

        if self.runner.run(&check).is_ok() {
            info!(%language, "coverage tool is already installed");
            return ToolStatus::Present;
        }

        error!(%language, "coverage tool is not installed or not accessible");

        match self.runner.run(&install) {
            Ok(()) => {
                info!(%language, "coverage tool has been installed");
                ToolStatus::Installed
            }
            Err(e) => {
                error!(%language, error = %e, "failed to install the coverage tool, install it manually");
                ToolStatus::Missing
            }
        }
    }
}

fn report_artifact(path: &Path) {
    match fs::metadata(path) {
        Ok(meta) => info!(file = %path.display(), bytes = meta.len(), "coverage artifact exists"),
        Err(_) => error!(file = %path.display(), "coverage artifact does not exist"),
    }
}

/* ============================================================
   Test support
   ============================================================ */
