//! Per-document forensic report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::date::PdfDate;
use crate::inspector::ObjectRecord;
use crate::metadata::RawMetadata;
use crate::scanner::{RevisionIndexEntry, RevisionScan};

/// Everything learned about one document.
///
/// Built once through [`ReportBuilder`]; immutable afterwards. A report is
/// produced for every document, even when metadata is missing entirely and
/// zero objects were inspected.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// File name component of the path.
    pub filename: String,
    /// Path the document was read from.
    pub full_path: PathBuf,
    /// `/Author` metadata.
    pub author: Option<String>,
    /// `/Creator` metadata (authoring application).
    pub creator_tool: Option<String>,
    /// `/Producer` metadata.
    pub producer: Option<String>,
    /// Normalized `/CreationDate`.
    pub creation_date: Option<PdfDate>,
    /// Normalized `/ModDate`.
    pub mod_date: Option<PdfDate>,
    /// `startxref` offsets in scan order.
    pub startxrefs: Vec<u64>,
    /// Raw trailer spans in scan order.
    pub trailers: Vec<String>,
    /// All range-bearing xref entries in scan order.
    pub revision_indices: Vec<RevisionIndexEntry>,
    /// Inspection results in object-number order.
    pub objects: Vec<ObjectRecord>,
    /// Full unfiltered dump of the document, or an embedded error
    /// description when that dump failed.
    pub audit_dump: String,
}

impl DocumentReport {
    /// Start building a report for the document at `path`.
    pub fn builder(path: &Path) -> ReportBuilder {
        ReportBuilder::new(path)
    }

    /// Number of `startxref` tokens found.
    pub fn startxref_count(&self) -> usize {
        self.startxrefs.len()
    }

    /// Number of raw trailer spans found.
    pub fn trailer_count(&self) -> usize {
        self.trailers.len()
    }

    /// Modification date, falling back to the creation date.
    pub fn effective_mod_date(&self) -> Option<&PdfDate> {
        self.mod_date.as_ref().or(self.creation_date.as_ref())
    }
}

/// Pure aggregation of the per-document analysis outputs.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    filename: String,
    full_path: PathBuf,
    author: Option<String>,
    creator_tool: Option<String>,
    producer: Option<String>,
    creation_date: Option<PdfDate>,
    mod_date: Option<PdfDate>,
    startxrefs: Vec<u64>,
    trailers: Vec<String>,
    revision_indices: Vec<RevisionIndexEntry>,
    objects: Vec<ObjectRecord>,
    audit_dump: String,
}

impl ReportBuilder {
    /// Create a builder for the document at `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            full_path: path.to_path_buf(),
            ..Default::default()
        }
    }

    /// Copy the identity fields from raw metadata.
    pub fn metadata(mut self, metadata: &RawMetadata) -> Self {
        self.author = metadata.author.clone();
        self.creator_tool = metadata.creator.clone();
        self.producer = metadata.producer.clone();
        self
    }

    /// Set the normalized creation date.
    pub fn creation_date(mut self, date: Option<PdfDate>) -> Self {
        self.creation_date = date;
        self
    }

    /// Set the normalized modification date.
    pub fn mod_date(mut self, date: Option<PdfDate>) -> Self {
        self.mod_date = date;
        self
    }

    /// Adopt the structural scan results.
    pub fn scan(mut self, scan: RevisionScan) -> Self {
        self.startxrefs = scan.startxrefs;
        self.trailers = scan.trailers;
        self.revision_indices = scan.entries;
        self
    }

    /// Adopt the ordered inspection records.
    pub fn objects(mut self, objects: Vec<ObjectRecord>) -> Self {
        self.objects = objects;
        self
    }

    /// Attach the audit dump (content or embedded error description).
    pub fn audit_dump(mut self, dump: String) -> Self {
        self.audit_dump = dump;
        self
    }

    /// Finish the report.
    pub fn build(self) -> DocumentReport {
        DocumentReport {
            filename: self.filename,
            full_path: self.full_path,
            author: self.author,
            creator_tool: self.creator_tool,
            producer: self.producer,
            creation_date: self.creation_date,
            mod_date: self.mod_date,
            startxrefs: self.startxrefs,
            trailers: self.trailers,
            revision_indices: self.revision_indices,
            objects: self.objects,
            audit_dump: self.audit_dump,
        }
    }
}
