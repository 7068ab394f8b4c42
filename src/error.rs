//! # Error Handling
//!
//! This module defines the centralized error type for the `modsplit` library.
//! It uses the `thiserror` library to create an `Error` enum that covers every
//! failure mode of the split pipeline, with messages that name the offending
//! file, document or path.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants follow the stages of a split:
//!   - target directory checks (`Config`)
//!   - repository metadata loading (`RepoMetadata`)
//!   - module document parsing and normalization (`ModuleParse`,
//!     `ModuleUpgrade`, `InvalidNevra`)
//!   - the missing-package gate (`MissingPackages`)
//!   - placing files on disk (`Materialize`)
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Failures of the external `createrepo_c` run are deliberately absent: they
//! are reported per bucket by [`crate::createrepo`] and never abort a split.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for modsplit operations
#[derive(Error, Debug)]
pub enum Error {
    /// The target directory cannot be used for a split.
    ///
    /// Raised before any metadata is read, so a bad `--target` never costs a
    /// metadata load.
    #[error("Target configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Config {
        message: String,
        /// Optional hint for how to fix the target
        hint: Option<String>,
    },

    /// `repomd.xml` or `primary.xml` is missing, unreadable or malformed.
    #[error("Repository metadata error in {}: {message}", path.display())]
    RepoMetadata { path: PathBuf, message: String },

    /// The module document could not be decompressed or parsed.
    ///
    /// `failures` holds one entry per rejected YAML document so that every
    /// problem is reported in one pass.
    #[error("Module metadata parse error: {message}{}", format_failures(failures))]
    ModuleParse {
        message: String,
        failures: Vec<String>,
    },

    /// A module stream could not be normalized to the target mdversion.
    #[error("Cannot upgrade module stream {stream} from mdversion {from} to {to}")]
    ModuleUpgrade { stream: String, from: u64, to: u64 },

    /// A package identity string is not of the form `name-[epoch:]version-release.arch`.
    #[error("Invalid NEVRA '{value}': {message}")]
    InvalidNevra { value: String, message: String },

    /// The partition references package files that do not exist.
    #[error("{count} package file(s) referenced by the repository metadata are missing")]
    MissingPackages { count: usize },

    /// A bucket could not be materialized.
    #[error("Failed to materialize {}: {message}", path.display())]
    Materialize { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_failures(failures: &[String]) -> String {
    failures
        .iter()
        .map(|f| format!("\n  - {}", f))
        .collect::<String>()
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let error = Error::Config {
            message: "Target must be empty".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Target configuration error"));
        assert!(display.contains("Target must be empty"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_config_with_hint() {
        let error = Error::Config {
            message: "Target must be a directory".to_string(),
            hint: Some("Remove the file or pick another --target".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("pick another --target"));
    }

    #[test]
    fn test_error_display_module_parse_lists_failures() {
        let error = Error::ModuleParse {
            message: "2 document(s) failed to parse".to_string(),
            failures: vec![
                "document 1: missing field `stream`".to_string(),
                "document 3: unknown document type 'foo'".to_string(),
            ],
        };
        let display = format!("{}", error);
        assert!(display.contains("Module metadata parse error"));
        assert!(display.contains("\n  - document 1: missing field `stream`"));
        assert!(display.contains("\n  - document 3: unknown document type 'foo'"));
    }

    #[test]
    fn test_error_display_module_upgrade() {
        let error = Error::ModuleUpgrade {
            stream: "nodejs:12".to_string(),
            from: 3,
            to: 2,
        };
        assert_eq!(
            error.to_string(),
            "Cannot upgrade module stream nodejs:12 from mdversion 3 to 2"
        );
    }

    #[test]
    fn test_error_display_repo_metadata() {
        let error = Error::RepoMetadata {
            path: PathBuf::from("/srv/repo/repodata/repomd.xml"),
            message: "no primary entry".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("/srv/repo/repodata/repomd.xml"));
        assert!(display.contains("no primary entry"));
    }

    #[test]
    fn test_error_display_missing_packages() {
        let error = Error::MissingPackages { count: 2 };
        assert!(error.to_string().starts_with("2 package file(s)"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }
}
