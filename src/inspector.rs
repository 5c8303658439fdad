//! Per-object inspection through the external dump capability.
//!
//! Each candidate object number is dumped, and the textual output is
//! classified into type, subtype, and first shown text. Dump calls run in a
//! bounded worker pool and every call carries a timeout, so one hung or
//! oversized object cannot stall the document. Results are index-tagged and
//! reassembled so the record order is deterministic regardless of
//! completion order.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, RecvTimeoutError};
use regex::Regex;
use serde::Serialize;

use crate::dump::{DumpError, ObjectDump};

/// Default budget for a single dump call.
pub const DEFAULT_DUMP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of concurrent dump calls per document.
pub const DEFAULT_OBJECT_WORKERS: usize = 4;

/// What inspecting one object produced: extracted content or a failure
/// description, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObjectContent {
    /// The dump succeeded and was classified.
    Extracted {
        /// First `/Type /<token>` in the dump, if any.
        type_name: Option<String>,
        /// First `/Subtype /<token>` in the dump, if any.
        subtype: Option<String>,
        /// First parenthesized string literal followed by a text-show
        /// marker, if any.
        text: Option<String>,
    },
    /// The dump call failed or timed out.
    Failed(String),
}

/// Inspection result for one object number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRecord {
    /// Object number, unique within a document's inspected set.
    pub number: u32,
    /// Extracted content or failure description.
    pub content: ObjectContent,
}

impl ObjectRecord {
    /// Extracted type token, absent for failed records.
    pub fn type_name(&self) -> Option<&str> {
        match &self.content {
            ObjectContent::Extracted { type_name, .. } => type_name.as_deref(),
            ObjectContent::Failed(_) => None,
        }
    }

    /// Extracted subtype token, absent for failed records.
    pub fn subtype(&self) -> Option<&str> {
        match &self.content {
            ObjectContent::Extracted { subtype, .. } => subtype.as_deref(),
            ObjectContent::Failed(_) => None,
        }
    }

    /// Extracted text, absent for failed records.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            ObjectContent::Extracted { text, .. } => text.as_deref(),
            ObjectContent::Failed(_) => None,
        }
    }

    /// Value for the text column of the report sink: the extracted text,
    /// or the failure description for failed records.
    pub fn text_cell(&self) -> Option<&str> {
        match &self.content {
            ObjectContent::Extracted { text, .. } => text.as_deref(),
            ObjectContent::Failed(description) => Some(description),
        }
    }

    /// Whether the dump call for this object failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.content, ObjectContent::Failed(_))
    }
}

/// Classifies objects of a document via the injected dump capability.
pub struct ObjectInspector {
    dump: Arc<dyn ObjectDump>,
    timeout: Duration,
    workers: usize,
    type_pattern: Regex,
    subtype_pattern: Regex,
    text_pattern: Regex,
}

impl ObjectInspector {
    /// Create an inspector with default timeout and worker count.
    pub fn new(dump: Arc<dyn ObjectDump>) -> Self {
        Self {
            dump,
            timeout: DEFAULT_DUMP_TIMEOUT,
            workers: DEFAULT_OBJECT_WORKERS,
            type_pattern: Regex::new(r"/Type\s*/([A-Za-z0-9]+)").unwrap(),
            subtype_pattern: Regex::new(r"/Subtype\s*/([A-Za-z0-9]+)").unwrap(),
            text_pattern: Regex::new(r"\(([^)]*)\)\s*Tj?").unwrap(),
        }
    }

    /// Set the per-call time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of concurrent dump calls.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Inspect every object number in order.
    ///
    /// Records come back sorted by their position in `numbers`; a failed
    /// dump yields a failure record and the remaining objects still run.
    pub fn inspect(&self, path: &Path, numbers: &[u32]) -> Vec<ObjectRecord> {
        if numbers.is_empty() {
            return Vec::new();
        }

        let workers = self.workers.min(numbers.len());
        let (job_tx, job_rx) = unbounded();
        for job in numbers.iter().copied().enumerate() {
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let mut tagged: Vec<(usize, ObjectRecord)> = Vec::with_capacity(numbers.len());
        thread::scope(|scope| {
            let (result_tx, result_rx) = unbounded();
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (index, number) in job_rx.iter() {
                        let record = self.inspect_object(path, number);
                        if result_tx.send((index, record)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);
            for item in result_rx.iter() {
                tagged.push(item);
            }
        });

        tagged.sort_by_key(|(index, _)| *index);
        tagged.into_iter().map(|(_, record)| record).collect()
    }

    /// One full unfiltered dump of the document, for audit inclusion.
    ///
    /// Failure embeds the error description instead of propagating; the
    /// content is not structurally parsed.
    pub fn audit_dump(&self, path: &Path) -> String {
        match self.dump_with_timeout(path, None) {
            Ok(output) => output,
            Err(err) => format!("dump failed: {err}"),
        }
    }

    fn inspect_object(&self, path: &Path, number: u32) -> ObjectRecord {
        match self.dump_with_timeout(path, Some(number)) {
            Ok(output) => ObjectRecord {
                number,
                content: self.classify(&output),
            },
            Err(err) => {
                log::warn!("object {} of {}: {}", number, path.display(), err);
                ObjectRecord {
                    number,
                    content: ObjectContent::Failed(err.to_string()),
                }
            }
        }
    }

    /// Only the first match of each pattern is taken, even when several
    /// occur in the dump.
    fn classify(&self, output: &str) -> ObjectContent {
        let capture = |pattern: &Regex| {
            pattern
                .captures(output)
                .map(|caps| caps[1].to_string())
        };
        ObjectContent::Extracted {
            type_name: capture(&self.type_pattern),
            subtype: capture(&self.subtype_pattern),
            text: capture(&self.text_pattern),
        }
    }

    /// Run one dump call on a detached thread and bound the wait.
    fn dump_with_timeout(&self, path: &Path, object: Option<u32>) -> Result<String, DumpError> {
        let (tx, rx) = bounded(1);
        let dump = Arc::clone(&self.dump);
        let path = path.to_path_buf();
        thread::spawn(move || {
            let _ = tx.send(dump.dump(&path, object));
        });
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(DumpError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(DumpError::Tool("dump call terminated unexpectedly".to_string()))
            }
        }
    }
}
