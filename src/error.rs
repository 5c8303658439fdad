//! Error types for the pdftrail library.

use std::io;
use thiserror::Error;

/// Result type alias for pdftrail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading a document.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A date matched the timestamp pattern but carries out-of-range
    /// calendar fields. Never sanitized; fatal for the affected document.
    #[error("malformed {field} value {value:?}: matches the timestamp pattern but is not a valid calendar date")]
    MalformedDate {
        /// Metadata field the value came from (e.g. "CreationDate").
        field: &'static str,
        /// The raw value as found in the document.
        value: String,
    },

    /// No documents were supplied for analysis.
    #[error("no PDF documents to analyze")]
    NoDocuments,

    /// No document produced a single timeline event.
    #[error("no timeline data: no document produced any event")]
    NoTimelineData,

    /// Worker pool could not be constructed.
    #[error("worker pool error: {0}")]
    Pool(String),

    /// Error while serializing reports or timelines.
    #[error("rendering error: {0}")]
    Render(String),
}
