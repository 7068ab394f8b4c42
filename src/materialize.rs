//! Placing bucket contents on disk.
//!
//! Every bucket of a [`Partition`] becomes a directory under the target
//! directory, named after the bucket key, holding one entry per package file
//! (flattened to the file name). Entries are created with one of three
//! [`Action`]s.
//!
//! `copy` skips source files that do not exist: they were either reported by
//! [`crate::validate`] already or the caller asked to skip missing packages.
//! `hardlink` and `symlink` fail on a missing source instead.

use crate::error::{Error, Result};
use crate::partition::Partition;
use log::{debug, info};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// How package files are placed into bucket directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Create a hard link to the source file
    #[default]
    Hardlink,
    /// Create a symbolic link to the absolute source path
    Symlink,
    /// Copy the file content
    Copy,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Hardlink => "hardlink",
            Action::Symlink => "symlink",
            Action::Copy => "copy",
        };
        f.write_str(name)
    }
}

/// Result of placing a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Placed,
    /// The source was missing and the action tolerates that.
    Skipped,
}

/// One materialized bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketOutput {
    pub key: String,
    pub dir: PathBuf,
    pub placed: usize,
    pub skipped: usize,
}

/// Check that `target` can receive a split.
///
/// The target may be absent, or an empty directory. Nothing is created here,
/// so that a run that ends early leaves the filesystem untouched.
pub fn check_target(target: &Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }
    if !target.is_dir() {
        return Err(Error::Config {
            message: format!("Target must be a directory: {}", target.display()),
            hint: None,
        });
    }
    if fs::read_dir(target)?.next().is_some() {
        return Err(Error::Config {
            message: format!("Target must be empty: {}", target.display()),
            hint: Some("Remove its contents or choose another --target".to_string()),
        });
    }
    Ok(())
}

/// Place `src` at `dst` using `action`.
pub fn place(src: &Path, dst: &Path, action: Action) -> Result<Placement> {
    let result = match action {
        Action::Copy => match fs::copy(src, dst) {
            Err(e) if e.kind() == io::ErrorKind::NotFound && !src.exists() => {
                debug!("Skipping missing {}", src.display());
                return Ok(Placement::Skipped);
            }
            other => other.map(|_| ()),
        },
        Action::Hardlink => fs::hard_link(src, dst),
        Action::Symlink => {
            // symlink(2) happily creates dangling links
            if !src.exists() {
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("source {} does not exist", src.display()),
                ))
            } else {
                symlink(src, dst)
            }
        }
    };

    result.map(|_| Placement::Placed).map_err(|e| Error::Materialize {
        path: dst.to_path_buf(),
        message: format!("{} from {} failed: {}", action, src.display(), e),
    })
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Create one directory per bucket under `target` and fill it.
///
/// `repo_root` should be absolute when `action` is [`Action::Symlink`], since
/// links point at `repo_root.join(location)` verbatim. Buckets are processed
/// in [`Partition::buckets`] order and the first error aborts the run.
pub fn materialize(
    partition: &Partition,
    repo_root: &Path,
    target: &Path,
    action: Action,
) -> Result<Vec<BucketOutput>> {
    fs::create_dir_all(target).map_err(|e| Error::Materialize {
        path: target.to_path_buf(),
        message: format!("cannot create target directory: {}", e),
    })?;

    let mut outputs = Vec::with_capacity(partition.len());
    for (key, paths) in partition.buckets() {
        let dir = target.join(key);
        fs::create_dir(&dir).map_err(|e| Error::Materialize {
            path: dir.clone(),
            message: format!("cannot create bucket directory: {}", e),
        })?;

        let mut output = BucketOutput {
            key: key.to_string(),
            dir: dir.clone(),
            placed: 0,
            skipped: 0,
        };
        for location in paths {
            let file_name = location.file_name().ok_or_else(|| Error::Materialize {
                path: location.clone(),
                message: "package location has no file name".to_string(),
            })?;
            match place(&repo_root.join(location), &dir.join(file_name), action)? {
                Placement::Placed => output.placed += 1,
                Placement::Skipped => output.skipped += 1,
            }
        }

        info!(
            "{}: {} package(s) placed in {} ({} skipped)",
            key,
            output.placed,
            dir.display(),
            output.skipped
        );
        outputs.push(output);
    }

    Ok(outputs)
}
