//! # Partition Resolution
//!
//! Joins the package index of a repository with the module index to decide
//! which bucket every package file belongs to.
//!
//! ## Rules
//!
//! 1. A module stream's bucket holds the location of every declared artifact
//!    that is present in the package index. Declared artifacts missing from
//!    the index (other architectures, pruned snapshots) are skipped.
//! 2. A package claimed by several streams is placed in each of their
//!    buckets. Module buckets may overlap.
//! 3. Every indexed package that no stream claims goes to the
//!    [`NON_MODULAR`] bucket, so module and non-modular buckets never overlap
//!    and every indexed package lands somewhere.
//!
//! Streams that claim nothing still get an (empty) bucket. An identity listed
//! at several locations contributes all of them, to the module buckets that
//! claim it or to [`NON_MODULAR`].

use crate::modulemd::ModuleIndex;
use crate::package::{PackageIdentity, PackageIndex};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;

/// Bucket key of the packages that belong to no module stream.
pub const NON_MODULAR: &str = "non_modular";

/// Assignment of package locations to buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// NSVCA -> package locations.
    modules: BTreeMap<String, BTreeSet<PathBuf>>,
    non_modular: BTreeSet<PathBuf>,
}

impl Partition {
    /// Compute the partition of `packages` according to `modules`.
    pub fn resolve(packages: &PackageIndex, modules: &ModuleIndex) -> Self {
        let mut buckets: BTreeMap<String, BTreeSet<PathBuf>> = BTreeMap::new();
        let mut claimed: HashSet<&PackageIdentity> = HashSet::new();

        for stream in modules.streams() {
            let bucket = buckets.entry(stream.nsvca()).or_default();
            for artifact in &stream.artifacts {
                let records = packages.get(artifact);
                if records.is_empty() {
                    debug!(
                        "{} declares {} which is not in the repository",
                        stream.nsvca(),
                        artifact
                    );
                }
                for record in records {
                    bucket.insert(record.location.clone());
                    claimed.insert(&record.identity);
                }
            }
        }

        let non_modular = packages
            .records()
            .filter(|record| !claimed.contains(&record.identity))
            .map(|record| record.location.clone())
            .collect();

        Self {
            modules: buckets,
            non_modular,
        }
    }

    /// Package locations of one bucket, module or [`NON_MODULAR`].
    pub fn bucket(&self, key: &str) -> Option<&BTreeSet<PathBuf>> {
        if key == NON_MODULAR {
            Some(&self.non_modular)
        } else {
            self.modules.get(key)
        }
    }

    /// All buckets: module buckets in key order, then [`NON_MODULAR`].
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &BTreeSet<PathBuf>)> {
        self.modules
            .iter()
            .map(|(key, paths)| (key.as_str(), paths))
            .chain(std::iter::once((NON_MODULAR, &self.non_modular)))
    }

    pub fn module_buckets(&self) -> &BTreeMap<String, BTreeSet<PathBuf>> {
        &self.modules
    }

    pub fn non_modular(&self) -> &BTreeSet<PathBuf> {
        &self.non_modular
    }

    /// Number of buckets, including [`NON_MODULAR`].
    pub fn len(&self) -> usize {
        self.modules.len() + 1
    }

    /// Always false: the non-modular bucket exists even when empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of (bucket, path) pairs.
    pub fn path_count(&self) -> usize {
        self.buckets().map(|(_, paths)| paths.len()).sum()
    }
}
