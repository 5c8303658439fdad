//! Fixed-column materialization of reports and timelines.
//!
//! The report sink consumes one table per document (one row per inspected
//! object, or a single placeholder row) and one table for the merged
//! timeline. Persistence of the tables is up to the sink; this module only
//! shapes the rows and serializes them to JSON.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::report::DocumentReport;
use crate::scanner::ObjectRange;
use crate::timeline::TimelineEvent;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// One row of the per-document table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRow {
    pub filename: String,
    pub full_path: String,
    pub author: Option<String>,
    pub creator_tool: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub startxrefs: Vec<u64>,
    pub startxrefs_count: usize,
    pub trailers: Vec<String>,
    pub trailers_count: usize,
    pub revision_indices: Vec<ObjectRange>,
    pub object_number: Option<u32>,
    pub object_type: Option<String>,
    pub object_subtype: Option<String>,
    pub object_text: Option<String>,
}

/// One row of the timeline table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub date: String,
    pub document: String,
    pub operation: String,
    pub element: Option<String>,
    pub value: Option<String>,
    pub note: Option<String>,
}

/// Materialize one report as table rows.
///
/// One row per object record; a document without objects still yields a
/// single placeholder row carrying the document columns.
pub fn document_rows(report: &DocumentReport) -> Vec<DocumentRow> {
    if report.objects.is_empty() {
        return vec![base_row(report)];
    }
    report
        .objects
        .iter()
        .map(|record| {
            let mut row = base_row(report);
            row.object_number = Some(record.number);
            row.object_type = record.type_name().map(str::to_string);
            row.object_subtype = record.subtype().map(str::to_string);
            row.object_text = record.text_cell().map(str::to_string);
            row
        })
        .collect()
}

fn base_row(report: &DocumentReport) -> DocumentRow {
    DocumentRow {
        filename: report.filename.clone(),
        full_path: report.full_path.display().to_string(),
        author: report.author.clone(),
        creator_tool: report.creator_tool.clone(),
        producer: report.producer.clone(),
        creation_date: report.creation_date.as_ref().map(|date| date.to_string()),
        mod_date: report.mod_date.as_ref().map(|date| date.to_string()),
        startxrefs: report.startxrefs.clone(),
        startxrefs_count: report.startxref_count(),
        trailers: report.trailers.clone(),
        trailers_count: report.trailer_count(),
        revision_indices: report
            .revision_indices
            .iter()
            .flat_map(|entry| entry.ranges.iter().copied())
            .collect(),
        object_number: None,
        object_type: None,
        object_subtype: None,
        object_text: None,
    }
}

/// Materialize a timeline as table rows.
pub fn timeline_rows(events: &[TimelineEvent]) -> Vec<TimelineRow> {
    events
        .iter()
        .map(|event| TimelineRow {
            date: event.date.to_string(),
            document: event.document.clone(),
            operation: event.operation.to_string(),
            element: event.element.clone(),
            value: event.value.clone(),
            note: event.note.clone(),
        })
        .collect()
}

/// Serialize any report artifact to JSON.
pub fn to_json<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };
    result.map_err(|err| Error::Render(format!("JSON serialization error: {}", err)))
}
