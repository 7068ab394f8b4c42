//! Regenerating repository metadata for split buckets.
//!
//! Each bucket directory is turned into a standalone repository by running
//! `createrepo_c <dir> --no-database` in it. Runs are independent and
//! best-effort: a failing run is logged at `warn` level and reported in the
//! returned outcomes, but never stops the remaining buckets nor undoes the
//! ones already indexed.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default indexing command.
pub const DEFAULT_CREATEREPO: &str = "createrepo_c";

/// What happened when indexing one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Success,
    /// The tool ran and exited unsuccessfully.
    Failed { code: Option<i32>, stderr: String },
    /// The tool could not be started.
    NotRun { message: String },
}

impl IndexOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IndexOutcome::Success)
    }
}

/// Something that can write repository metadata into a directory.
pub trait RepoIndexer {
    fn index(&self, dir: &Path) -> IndexOutcome;
}

/// Runs an external `createrepo_c` compatible command.
#[derive(Debug, Clone)]
pub struct CreaterepoIndexer {
    program: String,
    args: Vec<String>,
}

impl CreaterepoIndexer {
    /// `command` is split on whitespace: the first word is the program, the
    /// rest are passed before the directory argument.
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .unwrap_or_else(|| DEFAULT_CREATEREPO.to_string());
        Self {
            program,
            args: words.collect(),
        }
    }
}

impl Default for CreaterepoIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_CREATEREPO)
    }
}

impl RepoIndexer for CreaterepoIndexer {
    fn index(&self, dir: &Path) -> IndexOutcome {
        debug!("Running {} on {}", self.program, dir.display());
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(dir)
            .arg("--no-database")
            .output();

        match output {
            Ok(output) if output.status.success() => IndexOutcome::Success,
            Ok(output) => IndexOutcome::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
            Err(e) => IndexOutcome::NotRun {
                message: format!("cannot run {}: {}", self.program, e),
            },
        }
    }
}

/// Index every directory in `dirs`, one after the other.
pub fn regenerate(indexer: &dyn RepoIndexer, dirs: &[PathBuf]) -> Vec<(PathBuf, IndexOutcome)> {
    dirs.iter()
        .map(|dir| {
            let outcome = indexer.index(dir);
            match &outcome {
                IndexOutcome::Success => debug!("Indexed {}", dir.display()),
                IndexOutcome::Failed { code, stderr } => warn!(
                    "Indexing {} failed (exit code {}): {}",
                    dir.display(),
                    code.map(|c| c.to_string())
                        .unwrap_or_else(|| "none".to_string()),
                    stderr
                ),
                IndexOutcome::NotRun { message } => {
                    warn!("Indexing {} skipped: {}", dir.display(), message)
                }
            }
            (dir.clone(), outcome)
        })
        .collect()
}
