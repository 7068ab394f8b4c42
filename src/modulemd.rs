//! # Module Index
//!
//! Builds a [`ModuleIndex`] from the `modules.yaml` document of a modular
//! repository. The document is a stream of YAML documents, each with a
//! `document` type and a `version`:
//!
//! ```yaml
//! ---
//! document: modulemd
//! version: 2
//! data:
//!   name: nodejs
//!   stream: "12"
//!   version: 8030020210304194401
//!   context: 229f0a1c
//!   arch: x86_64
//!   artifacts:
//!     rpms:
//!       - nodejs-1:12.22.1-1.module_el8.x86_64
//! ...
//! ```
//!
//! Only `modulemd` documents carry artifacts. `modulemd-defaults`,
//! `modulemd-translations` and `modulemd-obsoletes` documents are accepted and
//! skipped. Anything else is a parse failure.
//!
//! Building is all-or-nothing: every document is parsed, every failure is
//! collected, and if there is at least one the whole build fails with the
//! full list. A split computed from a partially understood module document
//! would silently put modular packages into the wrong bucket.
//!
//! After parsing, every stream is upgraded to [`TARGET_MDVERSION`].

use crate::compression;
use crate::error::{Error, Result};
use crate::package::PackageIdentity;
use log::debug;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::collections::{BTreeSet, HashMap};

/// The modulemd stream schema version every stream is normalized to.
pub const TARGET_MDVERSION: u64 = 2;

/// Document types that are valid in a module index but carry no artifacts.
const IGNORED_DOCUMENTS: &[&str] = &[
    "modulemd-defaults",
    "modulemd-translations",
    "modulemd-obsoletes",
];

/// One stream of a module, with the package identities it ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStream {
    /// The modulemd schema version this stream is expressed in.
    pub mdversion: u64,
    pub name: String,
    pub stream: String,
    pub version: Option<u64>,
    pub context: Option<String>,
    pub arch: Option<String>,
    /// Declared `artifacts.rpms`.
    pub artifacts: BTreeSet<PackageIdentity>,
}

impl ModuleStream {
    /// `name:stream:version:context:arch`, without trailing empty components.
    pub fn nsvca(&self) -> String {
        // Version 0 means unset.
        let version = self
            .version
            .filter(|&v| v != 0)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let mut parts = vec![
            self.name.as_str(),
            self.stream.as_str(),
            version.as_str(),
            self.context.as_deref().unwrap_or(""),
            self.arch.as_deref().unwrap_or(""),
        ];
        while parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }
        parts.join(":")
    }

    /// Convert this stream to mdversion `target`.
    ///
    /// Version 1 streams have the same artifact layout as version 2, so the
    /// upgrade only relabels them. Every other conversion is unsupported.
    pub fn upgrade(mut self, target: u64) -> Result<Self> {
        match (self.mdversion, target) {
            (from, to) if from == to => Ok(self),
            (1, 2) => {
                self.mdversion = 2;
                Ok(self)
            }
            (from, to) => Err(Error::ModuleUpgrade {
                stream: format!("{}:{}", self.name, self.stream),
                from,
                to,
            }),
        }
    }
}

/// A module and all of its streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub streams: Vec<ModuleStream>,
}

/// Every module of a module document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleIndex {
    modules: Vec<Module>,
    positions: HashMap<String, usize>,
}

impl ModuleIndex {
    /// Build an index from the raw, possibly gzip-compressed, document bytes.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let bytes = compression::decompress(raw).map_err(|e| Error::ModuleParse {
            message: format!("cannot decompress module metadata: {}", e),
            failures: Vec::new(),
        })?;
        let text = String::from_utf8(bytes).map_err(|e| Error::ModuleParse {
            message: format!("module metadata is not valid UTF-8: {}", e),
            failures: Vec::new(),
        })?;
        Self::from_yaml(&text)
    }

    /// Build an index from a multi-document YAML string.
    ///
    /// The text is read twice. The first pass checks that it is valid YAML
    /// and reads the `document`/`version` header of every document. The
    /// second pass deserializes stream data straight from the source, so
    /// plain scalars such as `stream: 5.30` keep their exact spelling.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let mut headers = Vec::new();
        for (position, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
            let value = Value::deserialize(document).map_err(|e| Error::ModuleParse {
                message: format!("document {} is not valid YAML: {}", position + 1, e),
                failures: Vec::new(),
            })?;
            headers.push((!value.is_null()).then_some(value));
        }

        let mut streams = Vec::new();
        let mut failures = Vec::new();
        let documents = serde_yaml::Deserializer::from_str(text);
        for ((position, header), document) in headers.into_iter().enumerate().zip(documents) {
            let header = match header {
                Some(header) => header,
                None => continue,
            };
            match parse_document(header, document) {
                Ok(Some(stream)) => streams.push(stream),
                Ok(None) => {}
                Err(problems) => failures.extend(
                    problems
                        .into_iter()
                        .map(|problem| format!("document {}: {}", position + 1, problem)),
                ),
            }
        }

        if !failures.is_empty() {
            return Err(Error::ModuleParse {
                message: format!("{} problem(s) in module metadata", failures.len()),
                failures,
            });
        }

        let mut index = ModuleIndex::default();
        for stream in streams {
            index.add_stream(stream.upgrade(TARGET_MDVERSION)?);
        }
        debug!(
            "Built module index with {} modules and {} streams",
            index.len(),
            index.streams().count()
        );
        Ok(index)
    }

    fn add_stream(&mut self, stream: ModuleStream) {
        match self.positions.get(&stream.name) {
            Some(&position) => self.modules[position].streams.push(stream),
            None => {
                self.positions.insert(stream.name.clone(), self.modules.len());
                self.modules.push(Module {
                    name: stream.name.clone(),
                    streams: vec![stream],
                });
            }
        }
    }

    /// Module names in the order they first appear in the document.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|module| module.name.as_str())
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.positions.get(name).map(|&position| &self.modules[position])
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// All streams of all modules.
    pub fn streams(&self) -> impl Iterator<Item = &ModuleStream> {
        self.modules.iter().flat_map(|module| module.streams.iter())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<ModuleStream> for ModuleIndex {
    fn from_iter<I: IntoIterator<Item = ModuleStream>>(iter: I) -> Self {
        let mut index = ModuleIndex::default();
        for stream in iter {
            index.add_stream(stream);
        }
        index
    }
}

#[derive(Debug, Deserialize)]
struct DocumentHeader {
    document: String,
    version: u64,
}

/// The `data` of a `modulemd` document, read from the YAML source.
#[derive(Debug, Default, Deserialize)]
struct StreamDocument {
    #[serde(default)]
    data: StreamData,
}

#[derive(Debug, Default, Deserialize)]
struct StreamData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    stream: Option<String>,
    #[serde(default, deserialize_with = "scalar_u64")]
    version: Option<u64>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    arch: Option<String>,
    #[serde(default)]
    artifacts: Artifacts,
}

#[derive(Debug, Default, Deserialize)]
struct Artifacts {
    #[serde(default)]
    rpms: Vec<String>,
}

/// Parse one YAML document. `Ok(None)` means a valid document without a stream.
fn parse_document<'de>(
    header: Value,
    document: serde_yaml::Deserializer<'de>,
) -> std::result::Result<Option<ModuleStream>, Vec<String>> {
    let header: DocumentHeader = serde_yaml::from_value(header).map_err(|e| vec![e.to_string()])?;

    if IGNORED_DOCUMENTS.contains(&header.document.as_str()) {
        return Ok(None);
    }
    if header.document != "modulemd" {
        return Err(vec![format!("unknown document type '{}'", header.document)]);
    }

    let data = StreamDocument::deserialize(document)
        .map_err(|e| vec![format!("invalid modulemd data: {}", e)])?
        .data;

    let mut problems = Vec::new();
    if data.name.is_none() {
        problems.push("module name is required".to_string());
    }
    if data.stream.is_none() {
        problems.push("module stream is required".to_string());
    }

    let mut artifacts = BTreeSet::new();
    for rpm in &data.artifacts.rpms {
        match rpm.parse::<PackageIdentity>() {
            Ok(identity) => {
                artifacts.insert(identity);
            }
            Err(e) => problems.push(e.to_string()),
        }
    }

    match (data.name, data.stream) {
        (Some(name), Some(stream)) if problems.is_empty() => Ok(Some(ModuleStream {
            mdversion: header.version,
            name,
            stream,
            version: data.version,
            context: data.context,
            arch: data.arch,
            artifacts,
        })),
        _ => Err(problems),
    }
}

/// Versions are integers, but quoted versions are accepted as well.
fn scalar_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid version '{}'", s))),
    }
}
