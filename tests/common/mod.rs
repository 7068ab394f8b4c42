//! Shared test utilities for integration and E2E tests.
//!
//! Builds synthetic modular repositories on disk: `repodata/repomd.xml`, a
//! gzip-compressed `primary.xml.gz`, an optional `modules.yaml.gz` and the
//! package files themselves.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = RepoFixture::new();
//!     fixture.write_repo(&["a-0:1-1.noarch"], Some(&module_yaml("m", "s", &[])));
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use assert_fs::TempDir;
use flate2::write::GzEncoder;
use flate2::Compression;
use modsplit::package::PackageIdentity;
use std::io::Write;
use std::path::PathBuf;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{module_yaml, package_file, RepoFixture, SCENARIO_A_PACKAGES};
}

/// Three packages; the first two belong to `nodejs:12:1:abc:x86_64`.
#[allow(dead_code)]
pub const SCENARIO_A_PACKAGES: &[&str] = &[
    "nodejs-1:12.22.1-1.module_el8.x86_64",
    "npm-1:6.14.11-1.module_el8.x86_64",
    "bash-0:5.1-2.el8.x86_64",
];

/// File name of a package, `name-version-release.arch.rpm`.
pub fn package_file(nevra: &str) -> String {
    let id: PackageIdentity = nevra.parse().expect("fixture NEVRA is valid");
    format!("{}-{}-{}.{}.rpm", id.name, id.version, id.release, id.arch)
}

/// A single modulemd v2 document.
#[allow(dead_code)]
pub fn module_yaml(name: &str, stream: &str, rpms: &[&str]) -> String {
    let mut yaml = format!(
        "---\ndocument: modulemd\nversion: 2\ndata:\n  name: {}\n  stream: \"{}\"\n  version: 1\n  context: abc\n  arch: x86_64\n  artifacts:\n    rpms:\n",
        name, stream
    );
    if rpms.is_empty() {
        yaml.push_str("      []\n");
    }
    for rpm in rpms {
        yaml.push_str(&format!("      - \"{}\"\n", rpm));
    }
    yaml.push_str("...\n");
    yaml
}

fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// A temporary directory holding a repository (`repo/`) and room for a
/// split target (`out/`).
pub struct RepoFixture {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl RepoFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.temp.path().join("repo")
    }

    pub fn target(&self) -> PathBuf {
        self.temp.path().join("out")
    }

    /// Write metadata for `packages` and create all their files.
    pub fn write_repo(&self, packages: &[&str], modules: Option<&str>) {
        self.write_metadata(packages, modules);
        self.write_package_files(packages);
    }

    /// Write `repomd.xml`, `primary.xml.gz` and, if given, `modules.yaml.gz`.
    pub fn write_metadata(&self, packages: &[&str], modules: Option<&str>) {
        let repodata = self.temp.child("repo/repodata");
        repodata.create_dir_all().unwrap();

        let mut primary = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<metadata xmlns=\"http://linux.duke.edu/metadata/common\" xmlns:rpm=\"http://linux.duke.edu/metadata/rpm\">\n",
        );
        for nevra in packages {
            let id: PackageIdentity = nevra.parse().unwrap();
            primary.push_str(&format!(
                "<package type=\"rpm\">\n  <name>{}</name>\n  <arch>{}</arch>\n  <version epoch=\"{}\" ver=\"{}\" rel=\"{}\"/>\n  <location href=\"Packages/{}\"/>\n</package>\n",
                id.name,
                id.arch,
                id.epoch,
                id.version,
                id.release,
                package_file(nevra)
            ));
        }
        primary.push_str("</metadata>\n");
        repodata
            .child("primary.xml.gz")
            .write_binary(&gzip(&primary))
            .unwrap();

        let mut repomd = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<repomd xmlns=\"http://linux.duke.edu/metadata/repo\">\n  <data type=\"primary\"><location href=\"repodata/primary.xml.gz\"/></data>\n",
        );
        if let Some(modules) = modules {
            repodata
                .child("modules.yaml.gz")
                .write_binary(&gzip(modules))
                .unwrap();
            repomd.push_str(
                "  <data type=\"modules\"><location href=\"repodata/modules.yaml.gz\"/></data>\n",
            );
        }
        repomd.push_str("</repomd>\n");
        repodata.child("repomd.xml").write_str(&repomd).unwrap();
    }

    /// Create the package files of `packages` under `repo/Packages`.
    pub fn write_package_files(&self, packages: &[&str]) {
        for nevra in packages {
            self.temp
                .child(format!("repo/Packages/{}", package_file(nevra)))
                .write_str(nevra)
                .unwrap();
        }
    }

    /// Scenario A: three packages, one stream declaring two of them.
    pub fn scenario_a(&self) {
        self.write_repo(
            SCENARIO_A_PACKAGES,
            Some(&module_yaml("nodejs", "12", &SCENARIO_A_PACKAGES[..2])),
        );
    }
}
