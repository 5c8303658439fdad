//! # pdftrail
//!
//! Forensic reconstruction of PDF revision history and modification
//! timelines from raw file bytes.
//!
//! Potentially altered documents (signed contracts in particular) are
//! examined without trusting a PDF renderer: the trailing cross-reference
//! structure is recovered with tolerant pattern matching, the objects
//! introduced by the most recent revision are inspected through an external
//! dump tool, and the findings of all documents are merged into one
//! chronologically ordered event timeline.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use pdftrail::{build_timeline, AnalyzeOptions, Analyzer, CommandDump};
//!
//! fn main() -> pdftrail::Result<()> {
//!     let dump = Arc::new(CommandDump::new("pdf-parser"));
//!     let analyzer = Analyzer::new(dump, AnalyzeOptions::default());
//!
//!     let paths = vec![PathBuf::from("contract.pdf"), PathBuf::from("annex.pdf")];
//!     let run = analyzer.analyze_paths(&paths)?;
//!
//!     for event in build_timeline(&run.reports)? {
//!         println!("{} {} {}", event.date, event.operation, event.document);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Design
//!
//! - **Tolerant by default**: missing metadata, absent structure, or a
//!   failing dump tool degrade to absent fields and failure records; a
//!   report is produced for every readable document.
//! - **Deterministic**: documents and objects are processed by bounded
//!   worker pools, but every result is index-tagged and reassembled, so two
//!   runs over the same input produce identical output.
//! - **Injected external capability**: the per-object dump is a trait;
//!   tests substitute mocks, production wires up [`CommandDump`].

pub mod date;
pub mod dump;
pub mod error;
pub mod inspector;
pub mod metadata;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod scanner;
pub mod timeline;

// Re-export commonly used types
pub use date::{DateNormalizer, PdfDate};
pub use dump::{CommandDump, DumpError, ObjectDump};
pub use error::{Error, Result};
pub use inspector::{ObjectContent, ObjectInspector, ObjectRecord};
pub use metadata::RawMetadata;
pub use pipeline::{AnalysisRun, AnalyzeOptions, Analyzer, DocumentFailure};
pub use render::{document_rows, timeline_rows, to_json, DocumentRow, JsonFormat, TimelineRow};
pub use report::{DocumentReport, ReportBuilder};
pub use scanner::{ObjectRange, RevisionIndexEntry, RevisionScan, RevisionScanner};
pub use timeline::{build_timeline, Operation, TimelineEvent, SIGNIFICANT_SUBTYPES};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Analyze a single document with default options.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use pdftrail::CommandDump;
///
/// let dump = Arc::new(CommandDump::new("pdf-parser"));
/// let report = pdftrail::analyze_file("contract.pdf", dump).unwrap();
/// println!("{} startxrefs", report.startxref_count());
/// ```
pub fn analyze_file<P: AsRef<Path>>(path: P, dump: Arc<dyn ObjectDump>) -> Result<DocumentReport> {
    Analyzer::new(dump, AnalyzeOptions::default()).analyze_document(path.as_ref())
}

/// Analyze a batch of documents with default options.
///
/// Output order equals input order; per-document failures are collected in
/// the returned [`AnalysisRun`].
pub fn analyze_files(paths: &[PathBuf], dump: Arc<dyn ObjectDump>) -> Result<AnalysisRun> {
    Analyzer::new(dump, AnalyzeOptions::default()).analyze_paths(paths)
}
