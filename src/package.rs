//! Package identities and the repository package index.
//!
//! A package is identified by its NEVRA (name, epoch, version, release,
//! architecture). The same identity appears in two independently produced
//! places: the `<package>` entries of `primary.xml` and the `artifacts.rpms`
//! lists of module streams. [`PackageIdentity`] is the typed join key between
//! them, so that `foo-1.0-1.noarch` and `foo-0:1.0-1.noarch` match.

use crate::error::{Error, Result};
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

fn nevra_regex() -> &'static Regex {
    static NEVRA: OnceLock<Regex> = OnceLock::new();
    NEVRA.get_or_init(|| {
        // Version and release never contain '-', so a greedy name is unambiguous.
        Regex::new(r"^(?P<name>.+)-(?:(?P<epoch>[0-9]+):)?(?P<version>[^-:]+)-(?P<release>[^-]+)\.(?P<arch>[^.-]+)$")
            .expect("NEVRA regex is valid")
    })
}

/// The (name, epoch, version, release, arch) tuple of a package build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageIdentity {
    pub name: String,
    pub epoch: u64,
    pub version: String,
    pub release: String,
    pub arch: String,
}

impl PackageIdentity {
    pub fn new(
        name: impl Into<String>,
        epoch: u64,
        version: impl Into<String>,
        release: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            epoch,
            version: version.into(),
            release: release.into(),
            arch: arch.into(),
        }
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}-{}.{}",
            self.name, self.epoch, self.version, self.release, self.arch
        )
    }
}

impl FromStr for PackageIdentity {
    type Err = Error;

    /// Parse `name-[epoch:]version-release.arch`. A missing epoch means 0.
    fn from_str(s: &str) -> Result<Self> {
        let caps = nevra_regex()
            .captures(s.trim())
            .ok_or_else(|| Error::InvalidNevra {
                value: s.to_string(),
                message: "expected name-[epoch:]version-release.arch".to_string(),
            })?;

        let epoch = match caps.name("epoch") {
            Some(m) => m.as_str().parse::<u64>().map_err(|e| Error::InvalidNevra {
                value: s.to_string(),
                message: format!("bad epoch: {}", e),
            })?,
            None => 0,
        };

        Ok(Self {
            name: caps["name"].to_string(),
            epoch,
            version: caps["version"].to_string(),
            release: caps["release"].to_string(),
            arch: caps["arch"].to_string(),
        })
    }
}

/// One package of the repository and its location relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub identity: PackageIdentity,
    pub location: PathBuf,
}

/// Every package of a repository snapshot, keyed by identity.
///
/// `primary.xml` may list one NEVRA at several locations (the same build
/// copied into two directories). All of them are kept, so every listed file
/// ends up in some bucket.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: HashMap<PackageIdentity, Vec<PackageRecord>>,
    len: usize,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Records sharing an identity are all kept.
    pub fn insert(&mut self, record: PackageRecord) {
        let records = self.packages.entry(record.identity.clone()).or_default();
        if let Some(first) = records.first() {
            debug!(
                "Package {} is listed at {} and {}",
                record.identity,
                first.location.display(),
                record.location.display()
            );
        }
        records.push(record);
        self.len += 1;
    }

    /// Every record with the given identity, in insertion order.
    pub fn get(&self, identity: &PackageIdentity) -> &[PackageRecord] {
        self.packages
            .get(identity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Locations of the packages with the given identity.
    pub fn locations<'a>(
        &'a self,
        identity: &PackageIdentity,
    ) -> impl Iterator<Item = &'a Path> + 'a {
        self.get(identity).iter().map(|r| r.location.as_path())
    }

    pub fn contains(&self, identity: &PackageIdentity) -> bool {
        self.packages.contains_key(identity)
    }

    /// Number of records, counting every location of a repeated identity.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all records in unspecified order.
    pub fn records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values().flatten()
    }
}

impl FromIterator<PackageRecord> for PackageIndex {
    fn from_iter<I: IntoIterator<Item = PackageRecord>>(iter: I) -> Self {
        let mut index = PackageIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
