//! Tolerant extraction of document-information metadata.
//!
//! Only the information dictionary is read; no page content is rendered.
//! Every failure path degrades to absent fields so a report is produced
//! for every document regardless of how broken it is.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};

/// Raw metadata strings as found in the information dictionary.
///
/// Dates are left unparsed here; normalization happens in
/// [`crate::date::DateNormalizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    /// `/Author`
    pub author: Option<String>,
    /// `/Creator` (the authoring application)
    pub creator: Option<String>,
    /// `/Producer`
    pub producer: Option<String>,
    /// `/CreationDate`, raw
    pub creation_date: Option<String>,
    /// `/ModDate`, raw
    pub mod_date: Option<String>,
}

/// Extract metadata from raw document content.
///
/// Load or lookup failures leave every field absent.
pub fn extract_metadata(path: &Path, data: &[u8]) -> RawMetadata {
    match Document::load_mem(data) {
        Ok(doc) => info_metadata(&doc),
        Err(err) => {
            log::warn!("metadata unavailable for {}: {}", path.display(), err);
            RawMetadata::default()
        }
    }
}

fn info_metadata(doc: &Document) -> RawMetadata {
    let Some(info) = info_dictionary(doc) else {
        return RawMetadata::default();
    };
    RawMetadata {
        author: dict_string(info, b"Author"),
        creator: dict_string(info, b"Creator"),
        producer: dict_string(info, b"Producer"),
        creation_date: dict_string(info, b"CreationDate"),
        mod_date: dict_string(info, b"ModDate"),
    }
}

/// `/Info` may be a reference or a direct dictionary.
fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn dict_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when the BOM is present, else UTF-8,
/// else byte-per-char.
fn decode_text(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter(|chunk| chunk.len() == 2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        if let Ok(text) = String::from_utf16(&units) {
            return text;
        }
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn literal(value: &str) -> Object {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    }

    #[test]
    fn test_dict_string_variants() {
        let mut dict = Dictionary::new();
        dict.set("Author", literal("A. Notary"));
        dict.set("Creator", Object::Name(b"Writer".to_vec()));
        dict.set("Producer", Object::Integer(7));

        assert_eq!(dict_string(&dict, b"Author"), Some("A. Notary".to_string()));
        assert_eq!(dict_string(&dict, b"Creator"), Some("Writer".to_string()));
        assert_eq!(dict_string(&dict, b"Producer"), None);
        assert_eq!(dict_string(&dict, b"Missing"), None);
    }

    #[test]
    fn test_decode_text_utf16be() {
        // BOM + "Contrat signé"
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Contrat signé".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text(&bytes), "Contrat signé");
    }

    #[test]
    fn test_decode_text_fallback_byte_per_char() {
        // Invalid UTF-8, no BOM
        let bytes = [0x41, 0xE9, 0x42];
        assert_eq!(decode_text(&bytes), "AéB");
    }

    #[test]
    fn test_direct_info_dictionary() {
        let mut doc = Document::with_version("1.5");
        let mut info = Dictionary::new();
        info.set("Author", literal("someone"));
        info.set("CreationDate", literal("D:20230101120000+00'00'"));
        doc.trailer.set("Info", Object::Dictionary(info));

        let metadata = info_metadata(&doc);
        assert_eq!(metadata.author, Some("someone".to_string()));
        assert_eq!(
            metadata.creation_date,
            Some("D:20230101120000+00'00'".to_string())
        );
        assert_eq!(metadata.mod_date, None);
    }

    #[test]
    fn test_referenced_info_dictionary() {
        let mut doc = Document::with_version("1.5");
        let mut info = Dictionary::new();
        info.set("Producer", literal("pdftrail test"));
        let id = doc.add_object(Object::Dictionary(info));
        doc.trailer.set("Info", Object::Reference(id));

        let metadata = info_metadata(&doc);
        assert_eq!(metadata.producer, Some("pdftrail test".to_string()));
    }

    #[test]
    fn test_unreadable_content_yields_absent_fields() {
        let metadata = extract_metadata(Path::new("garbage.pdf"), b"not a pdf at all");
        assert_eq!(metadata, RawMetadata::default());
    }
}
