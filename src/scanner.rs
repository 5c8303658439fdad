//! Tolerant structural scanning of cross-reference blocks and trailers.
//!
//! PDF files are a binary/text hybrid and incremental updates make the
//! trailing structure of a tampered file unreliable, so this scanner works
//! on pattern matches over a permissive single-byte decoding of the raw
//! content rather than on a parsed object graph. The matching semantics are
//! deliberately heuristic and are pinned by tests; "fixing" them would
//! change which revision gets selected on malformed inputs.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Serialize;

/// One `(start, count)` object-number range declared by an xref block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectRange {
    /// First object number in the range.
    pub start: u32,
    /// Number of consecutive objects.
    pub count: u32,
}

/// Ordered ranges extracted from one discovered xref block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionIndexEntry {
    /// Ranges in declaration order; never empty.
    pub ranges: Vec<ObjectRange>,
}

impl RevisionIndexEntry {
    /// Greatest declared starting object number across this entry's ranges.
    pub fn max_start(&self) -> u32 {
        self.ranges.iter().map(|range| range.start).max().unwrap_or(0)
    }
}

/// Structural findings for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevisionScan {
    /// Offsets following each `startxref` token, in scan order.
    pub startxrefs: Vec<u64>,
    /// Raw `<<…>>` spans mentioning `/Type /XRef`, kept for reporting.
    pub trailers: Vec<String>,
    /// Entries from blocks that declared at least one range, in scan order.
    pub entries: Vec<RevisionIndexEntry>,
}

impl RevisionScan {
    /// Number of `startxref` tokens found.
    pub fn startxref_count(&self) -> usize {
        self.startxrefs.len()
    }

    /// Number of raw trailer spans found.
    pub fn trailer_count(&self) -> usize {
        self.trailers.len()
    }

    /// The entry describing the most recent revision.
    ///
    /// Selection is by greatest declared starting object number, not by
    /// byte position or discovery order; ties keep the first entry in scan
    /// order. This can mistrack true chronology on malformed inputs and is
    /// preserved as-is.
    pub fn selected_entry(&self) -> Option<&RevisionIndexEntry> {
        let mut best: Option<&RevisionIndexEntry> = None;
        for entry in &self.entries {
            match best {
                Some(current) if entry.max_start() <= current.max_start() => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    /// Object numbers introduced by the selected revision, deduplicated
    /// and ascending. Empty when no block declared any range.
    pub fn inspection_set(&self) -> Vec<u32> {
        let Some(entry) = self.selected_entry() else {
            return Vec::new();
        };
        let mut numbers = BTreeSet::new();
        for range in &entry.ranges {
            for number in range.start..range.start.saturating_add(range.count) {
                numbers.insert(number);
            }
        }
        numbers.into_iter().collect()
    }
}

/// Scans raw document bytes for revision structure.
pub struct RevisionScanner {
    startxref: Regex,
    trailer: Regex,
    xref_block: Regex,
    size: Regex,
    index: Regex,
}

impl RevisionScanner {
    /// Create a scanner with all patterns compiled.
    pub fn new() -> Self {
        Self {
            startxref: Regex::new(r"startxref\s+(\d+)").unwrap(),
            trailer: Regex::new(r"(?s)<<[^>]*?/Type\s*/XRef.*?>>").unwrap(),
            xref_block: Regex::new(r"<<\s*(?:.|\n)*?/Type\s*/XRef\s*(?:.|\n)*?>>").unwrap(),
            size: Regex::new(r"/Size\s+(\d+)").unwrap(),
            index: Regex::new(r"/Index\s*\[([^\]]+)\]").unwrap(),
        }
    }

    /// Scan the full raw content of a document.
    pub fn scan(&self, data: &[u8]) -> RevisionScan {
        let text = decode_permissive(data);

        let startxrefs = self
            .startxref
            .captures_iter(&text)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        let trailers = self
            .trailer
            .find_iter(&text)
            .map(|found| found.as_str().to_string())
            .collect();

        let entries = self
            .xref_block
            .find_iter(&text)
            .filter_map(|block| self.block_entry(block.as_str()))
            .collect();

        RevisionScan {
            startxrefs,
            trailers,
            entries,
        }
    }

    /// Ranges for one xref block: `/Index` pairs when usable, else a
    /// single `(0, Size)` range, else nothing.
    fn block_entry(&self, block: &str) -> Option<RevisionIndexEntry> {
        let ranges = self.index_ranges(block).or_else(|| self.size_range(block))?;
        Some(RevisionIndexEntry { ranges })
    }

    fn index_ranges(&self, block: &str) -> Option<Vec<ObjectRange>> {
        let caps = self.index.captures(block)?;
        let mut numbers = Vec::new();
        for token in caps[1].split_whitespace() {
            // A non-numeric token invalidates the whole array.
            numbers.push(token.parse::<u32>().ok()?);
        }
        let ranges: Vec<ObjectRange> = numbers
            .chunks_exact(2)
            .map(|pair| ObjectRange {
                start: pair[0],
                count: pair[1],
            })
            .collect();
        if ranges.is_empty() {
            return None;
        }
        Some(ranges)
    }

    fn size_range(&self, block: &str) -> Option<Vec<ObjectRange>> {
        let caps = self.size.captures(block)?;
        let size = caps[1].parse::<u32>().ok()?;
        Some(vec![ObjectRange {
            start: 0,
            count: size,
        }])
    }
}

impl Default for RevisionScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode with the single-byte mapping covering all 256 values.
///
/// Structural tokens are ASCII, so the mapping cannot affect what the
/// patterns match; it only keeps arbitrary binary content representable.
fn decode_permissive(data: &[u8]) -> String {
    data.iter().map(|&byte| char::from(byte)).collect()
}
