//! # Repository Metadata Loading
//!
//! Reads the yum/dnf repository metadata of a local repository:
//!
//! - `repodata/repomd.xml`, the manifest that lists the other metadata files
//!   by type (`primary`, `filelists`, `modules`, ...).
//! - The `primary` file, which lists every package with its NEVRA and its
//!   location relative to the repository root.
//!
//! The `modules` entry is optional. Its absence means the repository is not
//! modular, which callers treat as a "nothing to do" condition rather than an
//! error, so it is exposed as [`Repomd::modules`] and checked before the
//! (comparatively large) primary file is parsed.
//!
//! XML is parsed with `xot`. Element names are matched on their local name so
//! that the default `http://linux.duke.edu/metadata/*` namespaces need no
//! special handling.

use crate::compression;
use crate::error::{Error, Result};
use crate::package::{PackageIdentity, PackageIndex, PackageRecord};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use xot::{Node, Xot};

/// Location of `repomd.xml` relative to the repository root.
pub const REPOMD_PATH: &str = "repodata/repomd.xml";

/// The parsed `repomd.xml` of a repository.
#[derive(Debug, Clone)]
pub struct Repomd {
    /// Absolute repository root.
    pub root: PathBuf,
    /// Path of the `primary` metadata file.
    pub primary: PathBuf,
    /// Path of the `modules` metadata file, if the repository is modular.
    pub modules: Option<PathBuf>,
    /// All entries of the manifest, type -> absolute path.
    pub entries: HashMap<String, PathBuf>,
}

impl Repomd {
    /// Read `repodata/repomd.xml` under `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(REPOMD_PATH);
        let xml = fs::read_to_string(&path).map_err(|e| metadata_error(&path, e.to_string()))?;
        let entries: HashMap<String, PathBuf> = parse_repomd(&xml, &path)?
            .into_iter()
            .map(|(kind, href)| (kind, root.join(href)))
            .collect();

        let primary = entries
            .get("primary")
            .cloned()
            .ok_or_else(|| metadata_error(&path, "no 'primary' entry"))?;
        let modules = entries.get("modules").cloned();

        debug!(
            "Loaded {} with {} entries (modules: {})",
            path.display(),
            entries.len(),
            modules.is_some()
        );

        Ok(Self {
            root: root.to_path_buf(),
            primary,
            modules,
            entries,
        })
    }

    /// Parse the `primary` file into a package index.
    pub fn load_packages(&self) -> Result<PackageIndex> {
        let bytes = read_metadata_file(&self.primary)?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| metadata_error(&self.primary, format!("not valid UTF-8: {}", e)))?;
        let index = parse_primary(&xml, &self.primary)?;
        debug!(
            "Indexed {} packages from {}",
            index.len(),
            self.primary.display()
        );
        Ok(index)
    }

    /// Read the raw, still compressed, module document.
    ///
    /// Returns `Ok(None)` for a non-modular repository.
    pub fn read_modules(&self) -> Result<Option<Vec<u8>>> {
        match &self.modules {
            Some(path) => fs::read(path)
                .map(Some)
                .map_err(|e| metadata_error(path, e.to_string())),
            None => Ok(None),
        }
    }
}

/// Read a metadata file and undo its compression.
pub fn read_metadata_file(path: &Path) -> Result<Vec<u8>> {
    let raw = fs::read(path).map_err(|e| metadata_error(path, e.to_string()))?;
    compression::decompress(raw).map_err(|e| metadata_error(path, e.to_string()))
}

/// Parse `repomd.xml` into `type -> location href` pairs.
pub fn parse_repomd(xml: &str, path: &Path) -> Result<HashMap<String, String>> {
    let mut xot = Xot::new();
    let doc = xot
        .parse(xml)
        .map_err(|e| metadata_error(path, e.to_string()))?;
    let type_attr = xot.add_name("type");
    let href_attr = xot.add_name("href");
    let root = xot
        .document_element(doc)
        .map_err(|e| metadata_error(path, e.to_string()))?;

    if !is_element(&xot, root, "repomd") {
        return Err(metadata_error(path, "root element is not <repomd>"));
    }

    let mut entries = HashMap::new();
    for data in child_elements(&xot, root, "data") {
        let kind = xot
            .get_attribute(data, type_attr)
            .ok_or_else(|| metadata_error(path, "<data> without a type attribute"))?;
        let href = first_child(&xot, data, "location")
            .and_then(|location| xot.get_attribute(location, href_attr))
            .ok_or_else(|| metadata_error(path, format!("<data type=\"{}\"> has no location", kind)))?;
        entries.insert(kind.to_string(), href.to_string());
    }

    Ok(entries)
}

/// Parse a `primary.xml` document into a package index.
pub fn parse_primary(xml: &str, path: &Path) -> Result<PackageIndex> {
    let mut xot = Xot::new();
    let doc = xot
        .parse(xml)
        .map_err(|e| metadata_error(path, e.to_string()))?;
    let epoch_attr = xot.add_name("epoch");
    let ver_attr = xot.add_name("ver");
    let rel_attr = xot.add_name("rel");
    let href_attr = xot.add_name("href");
    let root = xot
        .document_element(doc)
        .map_err(|e| metadata_error(path, e.to_string()))?;

    if !is_element(&xot, root, "metadata") {
        return Err(metadata_error(path, "root element is not <metadata>"));
    }

    let mut index = PackageIndex::new();
    for (position, package) in child_elements(&xot, root, "package").enumerate() {
        let context = |what: &str| metadata_error(path, format!("package #{}: {}", position + 1, what));

        let name = child_text(&xot, package, "name").ok_or_else(|| context("missing <name>"))?;
        let arch = child_text(&xot, package, "arch").ok_or_else(|| context("missing <arch>"))?;
        let version = first_child(&xot, package, "version").ok_or_else(|| context("missing <version>"))?;
        let epoch = match xot.get_attribute(version, epoch_attr) {
            Some(value) if !value.is_empty() => value
                .parse::<u64>()
                .map_err(|_| context(&format!("invalid epoch '{}'", value)))?,
            _ => 0,
        };
        let ver = xot
            .get_attribute(version, ver_attr)
            .ok_or_else(|| context("<version> without ver"))?;
        let rel = xot
            .get_attribute(version, rel_attr)
            .ok_or_else(|| context("<version> without rel"))?;
        let href = first_child(&xot, package, "location")
            .and_then(|location| xot.get_attribute(location, href_attr))
            .ok_or_else(|| context("missing <location href>"))?;

        index.insert(PackageRecord {
            identity: PackageIdentity::new(name, epoch, ver, rel, arch),
            location: PathBuf::from(href),
        });
    }

    Ok(index)
}

fn metadata_error(path: &Path, message: impl Into<String>) -> Error {
    Error::RepoMetadata {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn is_element(xot: &Xot, node: Node, local: &str) -> bool {
    xot.element(node)
        .map(|element| xot.local_name_str(element.name()) == local)
        .unwrap_or(false)
}

fn child_elements<'a>(xot: &'a Xot, node: Node, local: &'a str) -> impl Iterator<Item = Node> + 'a {
    xot.children(node)
        .filter(move |&child| is_element(xot, child, local))
}

fn first_child(xot: &Xot, node: Node, local: &str) -> Option<Node> {
    child_elements(xot, node, local).next()
}

fn child_text<'a>(xot: &'a Xot, node: Node, local: &str) -> Option<&'a str> {
    first_child(xot, node, local)
        .and_then(|child| xot.text_content_str(child))
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
