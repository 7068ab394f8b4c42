//! Orchestrator for a complete split
//!
//! Runs the stages of a split in order, each to completion before the next:
//!
//! 1. Check the target directory (before any metadata is read)
//! 2. Load `repomd.xml`; stop if the repository has no module metadata
//! 3. Build the module index and the package index
//! 4. Resolve the partition
//! 5. Validate that every package file exists (unless skipped)
//! 6. Materialize the buckets into the target directory
//! 7. Regenerate repository metadata per bucket (if requested)

use crate::createrepo::{self, IndexOutcome, RepoIndexer};
use crate::error::{Error, Result};
use crate::materialize::{self, Action, BucketOutput};
use crate::modulemd::ModuleIndex;
use crate::partition::Partition;
use crate::repodata::Repomd;
use crate::validate::{self, ValidationReport};
use log::info;
use std::path::{Path, PathBuf};

/// Options of a split run.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Repository to split.
    pub repository: PathBuf,
    /// Directory receiving one sub-directory per bucket. Without a target the
    /// run stops after validation.
    pub target: Option<PathBuf>,
    pub action: Action,
    /// Do not fail when package files are missing.
    pub skip_missing: bool,
    /// Run the indexer on every bucket directory.
    pub create_repos: bool,
}

/// Everything a completed split produced.
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub partition: Partition,
    pub validation: ValidationReport,
    pub buckets: Vec<BucketOutput>,
    pub indexed: Vec<(PathBuf, IndexOutcome)>,
}

/// Result of [`execute`].
#[derive(Debug, Clone)]
pub enum SplitOutcome {
    /// The repository has no module metadata; nothing was done.
    NotModular,
    Split(SplitReport),
}

/// Load the metadata of `root` and compute its partition.
///
/// Returns `Ok(None)` when the repository is not modular.
pub fn resolve(root: &Path) -> Result<Option<Partition>> {
    let repomd = Repomd::load(root)?;
    let raw_modules = match repomd.read_modules()? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    let modules = ModuleIndex::from_bytes(raw_modules)?;
    let packages = repomd.load_packages()?;
    let partition = Partition::resolve(&packages, &modules);
    info!(
        "Resolved {} packages into {} buckets",
        packages.len(),
        partition.len()
    );
    Ok(Some(partition))
}

/// Absolute form of the repository path, so symlinks stay valid.
pub fn repository_root(repository: &Path) -> Result<PathBuf> {
    repository.canonicalize().map_err(|e| Error::RepoMetadata {
        path: repository.to_path_buf(),
        message: format!("cannot access repository: {}", e),
    })
}

/// Execute a complete split.
pub fn execute(options: &SplitOptions, indexer: &dyn RepoIndexer) -> Result<SplitOutcome> {
    if let Some(target) = &options.target {
        materialize::check_target(target)?;
    }

    let root = repository_root(&options.repository)?;
    let partition = match resolve(&root)? {
        Some(partition) => partition,
        None => return Ok(SplitOutcome::NotModular),
    };

    let validation = validate::validate(&root, &partition);
    if !options.skip_missing {
        validation.clone().into_result()?;
    }

    let mut buckets = Vec::new();
    let mut indexed = Vec::new();
    if let Some(target) = &options.target {
        buckets = materialize::materialize(&partition, &root, target, options.action)?;
        if options.create_repos {
            let dirs: Vec<PathBuf> = buckets.iter().map(|bucket| bucket.dir.clone()).collect();
            indexed = createrepo::regenerate(indexer, &dirs);
        }
    }

    Ok(SplitOutcome::Split(SplitReport {
        partition,
        validation,
        buckets,
        indexed,
    }))
}
