//! Batch analysis across documents.
//!
//! Documents are independent, so a bounded rayon pool fans the per-document
//! work out; every outcome is tagged with the document's input index and
//! reassembled in that order, keeping the run deterministic regardless of
//! completion order. No shared mutable state crosses documents and nothing
//! persists between runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use serde::Serialize;

use crate::date::DateNormalizer;
use crate::dump::ObjectDump;
use crate::error::{Error, Result};
use crate::inspector::{ObjectInspector, DEFAULT_DUMP_TIMEOUT, DEFAULT_OBJECT_WORKERS};
use crate::metadata;
use crate::report::DocumentReport;
use crate::scanner::RevisionScanner;

/// Options for batch analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Document-level worker threads (0 = library default).
    pub workers: usize,

    /// Concurrent dump calls per document.
    pub object_workers: usize,

    /// Budget for a single dump call.
    pub dump_timeout: Duration,
}

impl AnalyzeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document-level worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-document dump concurrency.
    pub fn with_object_workers(mut self, workers: usize) -> Self {
        self.object_workers = workers.max(1);
        self
    }

    /// Set the per-call dump budget.
    pub fn with_dump_timeout(mut self, timeout: Duration) -> Self {
        self.dump_timeout = timeout;
        self
    }

    /// Process documents and objects one at a time.
    pub fn sequential(mut self) -> Self {
        self.workers = 1;
        self.object_workers = 1;
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            object_workers: DEFAULT_OBJECT_WORKERS,
            dump_timeout: DEFAULT_DUMP_TIMEOUT,
        }
    }
}

/// A document that could not be analyzed.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    /// Path of the failed document.
    pub path: PathBuf,
    /// Why its report could not be built.
    pub error: String,
}

/// Outcome of one batch run, in input order.
#[derive(Debug, Serialize)]
pub struct AnalysisRun {
    /// Reports for the documents that analyzed cleanly.
    pub reports: Vec<DocumentReport>,
    /// Documents whose report construction was aborted.
    pub failures: Vec<DocumentFailure>,
}

impl AnalysisRun {
    /// Merge the reports into a timeline.
    pub fn timeline(&self) -> Result<Vec<crate::timeline::TimelineEvent>> {
        crate::timeline::build_timeline(&self.reports)
    }
}

/// Analyzes documents with shared, pre-compiled components.
pub struct Analyzer {
    options: AnalyzeOptions,
    normalizer: DateNormalizer,
    scanner: RevisionScanner,
    inspector: ObjectInspector,
}

impl Analyzer {
    /// Create an analyzer around the injected dump capability.
    pub fn new(dump: Arc<dyn ObjectDump>, options: AnalyzeOptions) -> Self {
        let inspector = ObjectInspector::new(dump)
            .with_timeout(options.dump_timeout)
            .with_workers(options.object_workers);
        Self {
            options,
            normalizer: DateNormalizer::new(),
            scanner: RevisionScanner::new(),
            inspector,
        }
    }

    /// Analyze a single document into its report.
    ///
    /// Everything short of an unreadable file or an out-of-range date
    /// degrades to absent fields; a report is produced even when the
    /// document has no usable structure at all.
    pub fn analyze_document(&self, path: &Path) -> Result<DocumentReport> {
        let data = fs::read(path)?;

        let raw = metadata::extract_metadata(path, &data);
        let creation_date = self
            .normalizer
            .normalize("CreationDate", raw.creation_date.as_deref())?;
        let mod_date = self
            .normalizer
            .normalize("ModDate", raw.mod_date.as_deref())?;

        let scan = self.scanner.scan(&data);
        let numbers = scan.inspection_set();
        log::debug!(
            "{}: {} xref entries, {} objects to inspect",
            path.display(),
            scan.entries.len(),
            numbers.len()
        );

        let objects = self.inspector.inspect(path, &numbers);
        let audit_dump = self.inspector.audit_dump(path);

        Ok(DocumentReport::builder(path)
            .metadata(&raw)
            .creation_date(creation_date)
            .mod_date(mod_date)
            .scan(scan)
            .objects(objects)
            .audit_dump(audit_dump)
            .build())
    }

    /// Analyze a batch of documents concurrently.
    ///
    /// Output order always equals input order. Per-document failures are
    /// collected, never fatal for the batch; an empty batch is refused
    /// with [`Error::NoDocuments`].
    pub fn analyze_paths(&self, paths: &[PathBuf]) -> Result<AnalysisRun> {
        if paths.is_empty() {
            return Err(Error::NoDocuments);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .build()
            .map_err(|err| Error::Pool(err.to_string()))?;

        let mut tagged: Vec<(usize, &PathBuf, Result<DocumentReport>)> = pool.install(|| {
            paths
                .par_iter()
                .enumerate()
                .map(|(index, path)| (index, path, self.analyze_document(path)))
                .collect()
        });
        // The index tag is authoritative for reassembly.
        tagged.sort_by_key(|(index, _, _)| *index);

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        for (_, path, outcome) in tagged {
            match outcome {
                Ok(report) => reports.push(report),
                Err(err) => {
                    log::warn!("skipping {}: {}", path.display(), err);
                    failures.push(DocumentFailure {
                        path: path.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(AnalysisRun { reports, failures })
    }
}
