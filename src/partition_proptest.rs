//! Property-based tests for partition resolution.
//!
//! Repositories and module indexes are generated from small name pools so
//! that streams frequently share packages and reference packages the
//! repository does not have, and so that some identities sit at two
//! locations.

#[cfg(test)]
mod proptest_tests {
    use crate::modulemd::{ModuleIndex, ModuleStream};
    use crate::package::{PackageIdentity, PackageIndex, PackageRecord};
    use crate::partition::{Partition, NON_MODULAR};
    use proptest::prelude::*;
    use std::collections::{BTreeSet, HashMap};
    use std::path::PathBuf;

    const ARCHES: &[&str] = &["noarch", "x86_64"];

    fn identity(n: u8) -> PackageIdentity {
        PackageIdentity::new(
            format!("pkg{}", n % 16),
            0,
            "1.0",
            "1",
            ARCHES[(n / 16) as usize % ARCHES.len()],
        )
    }

    fn location(id: &PackageIdentity, copy: u8) -> PathBuf {
        PathBuf::from(format!("Packages/{}/{}-{}.rpm", copy, id.name, id.arch))
    }

    /// Packages present in the repository; an identity may be listed twice.
    fn packages_strategy() -> impl Strategy<Value = PackageIndex> {
        prop::collection::btree_set((0u8..32, 0u8..2), 0..24).prop_map(|ids| {
            ids.into_iter()
                .map(|(n, copy)| {
                    let identity = identity(n);
                    PackageRecord {
                        location: location(&identity, copy),
                        identity,
                    }
                })
                .collect()
        })
    }

    /// Streams declaring packages from the same pool, present or not.
    fn modules_strategy() -> impl Strategy<Value = ModuleIndex> {
        prop::collection::vec(prop::collection::btree_set(0u8..32, 0..8), 0..6).prop_map(
            |streams| {
                streams
                    .into_iter()
                    .enumerate()
                    .map(|(i, ids)| ModuleStream {
                        mdversion: 2,
                        name: format!("mod{}", i % 3),
                        stream: format!("s{}", i),
                        version: Some(1),
                        context: Some("c".to_string()),
                        arch: Some("x86_64".to_string()),
                        artifacts: ids.into_iter().map(identity).collect(),
                    })
                    .collect()
            },
        )
    }

    fn declared(modules: &ModuleIndex) -> BTreeSet<PackageIdentity> {
        modules
            .streams()
            .flat_map(|stream| stream.artifacts.iter().cloned())
            .collect()
    }

    proptest! {
        /// Property: every indexed package is either non-modular or in at
        /// least one module bucket, never both and never neither
        #[test]
        fn every_package_lands_exactly_one_side(
            packages in packages_strategy(),
            modules in modules_strategy(),
        ) {
            let partition = Partition::resolve(&packages, &modules);
            for record in packages.records() {
                let in_module = partition
                    .module_buckets()
                    .values()
                    .any(|paths| paths.contains(&record.location));
                let in_non_modular = partition.non_modular().contains(&record.location);
                prop_assert!(in_module ^ in_non_modular, "{} misplaced", record.identity);
            }
        }

        /// Property: no non-modular package is declared by any stream
        #[test]
        fn non_modular_packages_are_undeclared(
            packages in packages_strategy(),
            modules in modules_strategy(),
        ) {
            let partition = Partition::resolve(&packages, &modules);
            let declared = declared(&modules);
            let by_location: HashMap<&PathBuf, &PackageIdentity> = packages
                .records()
                .map(|record| (&record.location, &record.identity))
                .collect();

            for path in partition.non_modular() {
                let identity = by_location[path];
                prop_assert!(!declared.contains(identity));
            }
        }

        /// Property: each module bucket path is an indexed package the stream declares
        #[test]
        fn module_buckets_only_hold_declared_indexed_packages(
            packages in packages_strategy(),
            modules in modules_strategy(),
        ) {
            let partition = Partition::resolve(&packages, &modules);
            for stream in modules.streams() {
                let bucket = partition.bucket(&stream.nsvca()).unwrap();
                let expected: BTreeSet<PathBuf> = stream
                    .artifacts
                    .iter()
                    .flat_map(|artifact| packages.locations(artifact))
                    .map(PathBuf::from)
                    .collect();
                prop_assert_eq!(bucket, &expected);
            }
            prop_assert!(partition.bucket(NON_MODULAR).is_some());
        }

        /// Property: resolution is deterministic
        #[test]
        fn resolution_is_deterministic(
            packages in packages_strategy(),
            modules in modules_strategy(),
        ) {
            prop_assert_eq!(
                Partition::resolve(&packages, &modules),
                Partition::resolve(&packages, &modules)
            );
        }
    }
}
