//! Cross-document modification timeline.
//!
//! Merges the reports of all analyzed documents into one chronologically
//! ordered sequence of forensic events. Reports must arrive in original
//! input order; the sort is stable, so events whose dates cannot be
//! resolved keep their relative order behind all resolvable ones.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::date::PdfDate;
use crate::error::{Error, Result};
use crate::report::DocumentReport;

/// Object subtypes that mark a forensically significant modification.
pub const SIGNIFICANT_SUBTYPES: [&str; 7] = [
    "sig",
    "signature",
    "text",
    "tx",
    "initial",
    "initials",
    "image",
];

/// Subtypes whose extracted text is carried into the event value.
const TEXT_SUBTYPES: [&str; 2] = ["text", "tx"];

/// Kind of document operation an event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    /// The document was created.
    Creation,
    /// A significant object was introduced by the latest revision.
    Modification,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Creation => write!(f, "Creation"),
            Operation::Modification => write!(f, "Modification"),
        }
    }
}

/// One entry of the merged timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    /// When the operation happened, as far as the document claims.
    pub date: PdfDate,
    /// Name of the document the event derives from.
    pub document: String,
    /// What happened.
    pub operation: Operation,
    /// Normalized subtype of the touched element, for modifications.
    pub element: Option<String>,
    /// Extracted text for text-bearing elements.
    pub value: Option<String>,
    /// Reference back to the object number, for modifications.
    pub note: Option<String>,
}

/// Merge reports into one ascending timeline.
///
/// Emits one Creation event per document with a present creation date, and
/// one Modification event per object record whose normalized subtype is
/// significant, dated with the modification date falling back to the
/// creation date. Returns [`Error::NoTimelineData`] when nothing qualifies.
pub fn build_timeline(reports: &[DocumentReport]) -> Result<Vec<TimelineEvent>> {
    let mut events = Vec::new();
    for report in reports {
        collect_events(report, &mut events);
    }
    if events.is_empty() {
        return Err(Error::NoTimelineData);
    }

    let mut keyed: Vec<(Option<DateTime<FixedOffset>>, TimelineEvent)> = events
        .into_iter()
        .map(|event| (resolve_date(&event.date), event))
        .collect();
    // Stable: unresolvable dates sort last, keeping their relative order.
    keyed.sort_by(|(left, _), (right, _)| match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    Ok(keyed.into_iter().map(|(_, event)| event).collect())
}

fn collect_events(report: &DocumentReport, events: &mut Vec<TimelineEvent>) {
    if let Some(creation) = &report.creation_date {
        events.push(TimelineEvent {
            date: creation.clone(),
            document: report.filename.clone(),
            operation: Operation::Creation,
            element: None,
            value: None,
            note: None,
        });
    }

    let Some(effective) = report.effective_mod_date() else {
        return;
    };
    for record in &report.objects {
        let Some(subtype) = record.subtype() else {
            continue;
        };
        let subtype = subtype.trim().to_lowercase();
        if !SIGNIFICANT_SUBTYPES.contains(&subtype.as_str()) {
            continue;
        }
        let value = if TEXT_SUBTYPES.contains(&subtype.as_str()) {
            record.text().map(str::to_string)
        } else {
            None
        };
        events.push(TimelineEvent {
            date: effective.clone(),
            document: report.filename.clone(),
            operation: Operation::Modification,
            element: Some(subtype),
            value,
            note: Some(format!("object #{}", record.number)),
        });
    }
}

fn resolve_date(date: &PdfDate) -> Option<DateTime<FixedOffset>> {
    match date {
        PdfDate::Resolved(dt) => Some(*dt),
        PdfDate::Opaque(raw) => parse_loose(raw),
    }
}

/// Best-effort coercion of an opaque date into something comparable.
/// Naive forms are taken as UTC.
fn parse_loose(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y%m%d%H%M%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::date::DateNormalizer;
    use crate::inspector::{ObjectContent, ObjectRecord};
    use crate::report::ReportBuilder;

    fn date(raw: &str) -> Option<PdfDate> {
        DateNormalizer::new().normalize("CreationDate", Some(raw)).unwrap()
    }

    fn record(number: u32, subtype: &str, text: Option<&str>) -> ObjectRecord {
        ObjectRecord {
            number,
            content: ObjectContent::Extracted {
                type_name: Some("Annot".to_string()),
                subtype: Some(subtype.to_string()),
                text: text.map(str::to_string),
            },
        }
    }

    fn report(name: &str) -> ReportBuilder {
        ReportBuilder::new(Path::new(name))
    }

    #[test]
    fn test_creation_events_sorted_ascending() {
        let reports = vec![
            report("a.pdf")
                .creation_date(date("D:20230101000000+00'00'"))
                .build(),
            report("b.pdf")
                .creation_date(date("D:20220615000000+00'00'"))
                .build(),
            report("c.pdf")
                .creation_date(date("D:20230501000000+00'00'"))
                .build(),
        ];
        let timeline = build_timeline(&reports).unwrap();
        let names: Vec<&str> = timeline.iter().map(|event| event.document.as_str()).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf", "c.pdf"]);
        assert!(timeline
            .iter()
            .all(|event| event.operation == Operation::Creation));
    }

    #[test]
    fn test_modification_uses_mod_date_with_creation_fallback() {
        let with_mod = report("mod.pdf")
            .creation_date(date("D:20230101000000+00'00'"))
            .mod_date(date("D:20230301000000+00'00'"))
            .objects(vec![record(4, "Sig", None)])
            .build();
        let without_mod = report("nomod.pdf")
            .creation_date(date("D:20230201000000+00'00'"))
            .objects(vec![record(9, "Image", None)])
            .build();

        let timeline = build_timeline(&[with_mod, without_mod]).unwrap();
        let modifications: Vec<&TimelineEvent> = timeline
            .iter()
            .filter(|event| event.operation == Operation::Modification)
            .collect();
        assert_eq!(modifications.len(), 2);
        assert_eq!(
            modifications[0].date.to_string(),
            "2023-02-01T00:00:00+00:00"
        );
        assert_eq!(modifications[0].element.as_deref(), Some("image"));
        assert_eq!(modifications[0].note.as_deref(), Some("object #9"));
        assert_eq!(
            modifications[1].date.to_string(),
            "2023-03-01T00:00:00+00:00"
        );
        assert_eq!(modifications[1].element.as_deref(), Some("sig"));
    }

    #[test]
    fn test_value_only_for_text_subtypes() {
        let built = report("doc.pdf")
            .creation_date(date("D:20230101000000+00'00'"))
            .objects(vec![
                record(1, "Text", Some("amended clause")),
                record(2, "Sig", Some("ignored")),
                record(3, "Tx", None),
            ])
            .build();
        let timeline = build_timeline(&[built]).unwrap();
        let modifications: Vec<&TimelineEvent> = timeline
            .iter()
            .filter(|event| event.operation == Operation::Modification)
            .collect();
        assert_eq!(modifications[0].value.as_deref(), Some("amended clause"));
        assert_eq!(modifications[1].value, None);
        assert_eq!(modifications[2].value, None);
        assert_eq!(modifications[2].element.as_deref(), Some("tx"));
    }

    #[test]
    fn test_insignificant_and_failed_records_emit_nothing() {
        let built = report("doc.pdf")
            .creation_date(date("D:20230101000000+00'00'"))
            .objects(vec![
                record(1, "Widget", None),
                ObjectRecord {
                    number: 2,
                    content: ObjectContent::Failed("timed out".to_string()),
                },
            ])
            .build();
        let timeline = build_timeline(&[built]).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].operation, Operation::Creation);
    }

    #[test]
    fn test_no_effective_date_suppresses_modifications() {
        let built = report("doc.pdf")
            .objects(vec![record(1, "Sig", None)])
            .build();
        assert!(matches!(
            build_timeline(&[built]),
            Err(Error::NoTimelineData)
        ));
    }

    #[test]
    fn test_unresolvable_dates_sort_last_in_stable_order() {
        let reports = vec![
            report("x.pdf")
                .creation_date(Some(PdfDate::Opaque("first opaque".to_string())))
                .build(),
            report("y.pdf")
                .creation_date(date("D:20230101000000+00'00'"))
                .build(),
            report("z.pdf")
                .creation_date(Some(PdfDate::Opaque("second opaque".to_string())))
                .build(),
        ];
        let timeline = build_timeline(&reports).unwrap();
        let names: Vec<&str> = timeline.iter().map(|event| event.document.as_str()).collect();
        assert_eq!(names, vec!["y.pdf", "x.pdf", "z.pdf"]);
    }

    #[test]
    fn test_opaque_but_coercible_date_participates_in_sort() {
        let reports = vec![
            report("late.pdf")
                .creation_date(date("D:20230601000000+00'00'"))
                .build(),
            report("early.pdf")
                .creation_date(Some(PdfDate::Opaque("2022-01-05".to_string())))
                .build(),
        ];
        let timeline = build_timeline(&reports).unwrap();
        assert_eq!(timeline[0].document, "early.pdf");
    }

    #[test]
    fn test_empty_input_signals_no_timeline_data() {
        assert!(matches!(build_timeline(&[]), Err(Error::NoTimelineData)));
    }

    #[test]
    fn test_subtype_normalization_trims_and_lowercases() {
        let built = report("doc.pdf")
            .creation_date(date("D:20230101000000+00'00'"))
            .objects(vec![record(5, "  SIGNATURE ", None)])
            .build();
        let timeline = build_timeline(&[built]).unwrap();
        let modification = timeline
            .iter()
            .find(|event| event.operation == Operation::Modification)
            .unwrap();
        assert_eq!(modification.element.as_deref(), Some("signature"));
    }
}
