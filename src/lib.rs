//! # modsplit
//!
//! Splits a modular RPM repository into one repository per module stream,
//! plus one `non_modular` repository for every package no stream claims.
//!
//! ## Quick Example
//!
//! ```
//! use modsplit::modulemd::ModuleIndex;
//! use modsplit::package::{PackageIdentity, PackageIndex, PackageRecord};
//! use modsplit::partition::Partition;
//!
//! let packages: PackageIndex = ["nodejs-1:12.22.1-1.x86_64", "bash-0:5.1-2.x86_64"]
//!     .iter()
//!     .map(|nevra| PackageRecord {
//!         identity: nevra.parse::<PackageIdentity>().unwrap(),
//!         location: format!("Packages/{}.rpm", nevra).into(),
//!     })
//!     .collect();
//!
//! let modules = ModuleIndex::from_yaml(r#"
//! document: modulemd
//! version: 2
//! data:
//!   name: nodejs
//!   stream: "12"
//!   artifacts:
//!     rpms:
//!       - nodejs-1:12.22.1-1.x86_64
//! "#).unwrap();
//!
//! let partition = Partition::resolve(&packages, &modules);
//! assert_eq!(partition.bucket("nodejs:12").unwrap().len(), 1);
//! assert_eq!(partition.non_modular().len(), 1);
//! ```
//!
//! ## Pipeline
//!
//! [`split::execute`] runs the whole split:
//!
//! 1.  **Target check** (`materialize::check_target`): the target must be
//!     absent or an empty directory.
//! 2.  **Metadata loading** (`repodata`): `repomd.xml`, then the package index
//!     from the `primary` file. A repository without a `modules` entry is not
//!     modular and the run ends here.
//! 3.  **Module index** (`modulemd`): parse and normalize `modules.yaml`.
//! 4.  **Partition** (`partition`): assign every package location to buckets.
//! 5.  **Validation** (`validate`): report every missing package file.
//! 6.  **Materialization** (`materialize`): one directory per bucket, filled by
//!     copy, hardlink or symlink.
//! 7.  **Regeneration** (`createrepo`): optionally run `createrepo_c` in each
//!     bucket directory.

pub mod compression;
pub mod createrepo;
pub mod error;
pub mod materialize;
pub mod modulemd;
pub mod output;
pub mod package;
pub mod partition;
pub mod repodata;
pub mod split;
pub mod validate;

#[cfg(test)]
mod partition_proptest;
