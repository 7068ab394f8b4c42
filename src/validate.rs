//! Missing-package detection.
//!
//! Repository metadata can outlive the files it describes. Before anything is
//! written, every location of every bucket is checked under the repository
//! root. The walk never stops early, so one run lists every missing file.

use crate::error::{Error, Result};
use crate::partition::Partition;
use log::warn;
use std::path::{Path, PathBuf};

/// A package location that does not exist under the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPackage {
    pub bucket: String,
    pub path: PathBuf,
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub missing: Vec<MissingPackage>,
}

impl ValidationReport {
    /// True when no location is missing.
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }

    /// Turn a failed report into [`Error::MissingPackages`].
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::MissingPackages {
                count: self.missing.len(),
            })
        }
    }
}

/// Check every (bucket, path) pair of `partition` against `root`.
///
/// Each missing path is logged at `warn` level as it is found.
pub fn validate(root: &Path, partition: &Partition) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (bucket, paths) in partition.buckets() {
        for path in paths {
            if !root.join(path).exists() {
                warn!("Path {} from {} does not exist", path.display(), bucket);
                report.missing.push(MissingPackage {
                    bucket: bucket.to_string(),
                    path: path.clone(),
                });
            }
        }
    }

    report
}
