mod config;
mod context;
mod detectors;
mod git;
mod llm;
mod logger;
mod testgen;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use crate::{
    config::GeneratorConfig,
    context::{ContextEngine, HeuristicResolver},
    llm::{
        client::LlmClient,
        orchestrator::{BatchOptions, BatchReport, FileOutcome, Orchestrator},
    },
    testgen::runner::{Coverage, SystemRunner},
};

/// Paths this tool never generates tests for: its own binary and entry point.
///
/// Both currently classify as `Unknown` and are skipped before this list is
/// consulted. It only takes effect if Rust sources ever become a target.
const SELF_EXCLUSIONS: [&str; 2] = [env!("CARGO_BIN_NAME"), file!()];

#[derive(Parser, Debug)]
#[command(
    name = "testforge",
    version,
    about = "Generate unit tests for the files changed in a commit using an LLM, then collect coverage."
)]
struct Cli {
    /// Changed files to generate tests for
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// When no files are given, use `git diff --name-only <REV>`
    #[arg(long, value_name = "REV")]
    since: Option<String>,

    /// Directory imports are probed against and coverage reports are written to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Extra file names or paths to skip
    #[arg(long, value_name = "PATH")]
    exclude: Vec<String>,

    /// Don't check for (or install) coverage tools
    #[arg(long)]
    skip_tool_check: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    tracing::debug!(?cli, "parsed CLI arguments");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cfg = GeneratorConfig::from_env()?;
    tracing::debug!(?cfg, "loaded configuration");

    let files = changed_files(&cli)?;

    let client = LlmClient::new(&cfg)?;
    let resolver = HeuristicResolver::new(&cli.root);
    let coverage = Coverage::new(SystemRunner, &cli.root);

    let mut exclude: Vec<String> = SELF_EXCLUSIONS.iter().map(|s| s.to_string()).collect();
    exclude.extend(cli.exclude.iter().cloned());

    let orchestrator = Orchestrator::new(
        &client,
        ContextEngine::new(&resolver),
        coverage,
        BatchOptions {
            exclude,
            check_tools: !cli.skip_tool_check,
        },
    );

    let report = orchestrator.run(&files);
    log_outcomes(&report);
    Ok(())
}

fn log_outcomes(report: &BatchReport) {
    for (file, outcome) in &report.files {
        match outcome {
            FileOutcome::Generated { test_file } => {
                info!(file = %file.display(), test_file = %test_file.display(), "generated");
            }
            FileOutcome::Skipped(reason) => {
                tracing::debug!(file = %file.display(), ?reason, "skipped");
            }
            FileOutcome::Failed(e) => {
                warn!(file = %file.display(), error = %e, "no test generated");
            }
        }
    }
}

fn changed_files(cli: &Cli) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let files = clean_paths(&cli.files);

    if !files.is_empty() {
        return Ok(files);
    }

    match &cli.since {
        Some(rev) => {
            if !git::is_git_repo() {
                warn!("current directory does not look like a git repository");
            }
            Ok(git::changed_files(rev)?)
        }
        None => Ok(files),
    }
}

/// Trims surrounding whitespace and drops arguments left blank.
fn clean_paths(args: &[PathBuf]) -> Vec<PathBuf> {
    args.iter()
        .filter_map(|p| match p.to_str() {
            Some(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| PathBuf::from(s))
            }
            None => Some(p.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_trimmed_and_blanks_dropped() {
        let args: Vec<PathBuf> = [" a.py", "b.go\n", "   ", "", "dir/c.js"]
            .iter()
            .map(PathBuf::from)
            .collect();

        assert_eq!(
            clean_paths(&args),
            vec![
                PathBuf::from("a.py"),
                PathBuf::from("b.go"),
                PathBuf::from("dir/c.js"),
            ]
        );
    }

    #[test]
    fn self_exclusions_name_binary_and_entry_point() {
        assert!(SELF_EXCLUSIONS.contains(&"testforge"));
        assert!(SELF_EXCLUSIONS.iter().any(|s| s.ends_with("main.rs")));
    }
}
