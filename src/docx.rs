//! DOCX raw-text extraction
//!
//! A .docx file is an OOXML zip container; the document body lives in
//! `word/document.xml`. Paragraph and tab marks become whitespace, the
//! remaining tags are stripped and entities decoded. Good enough for
//! prompt ingestion; no styling or structure is kept.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::{Cursor, Read};

/// Extract the raw text of a word-processing document from its bytes.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("not an OOXML container")?;

    let mut entry = archive
        .by_name("word/document.xml")
        .context("missing word/document.xml")?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .context("document.xml is not valid UTF-8")?;

    Ok(document_xml_to_text(&xml))
}

/// Flatten WordprocessingML into plain text.
fn document_xml_to_text(xml: &str) -> String {
    // Paragraph ends, line breaks and tabs become whitespace before the
    // tags are dropped, so words from adjacent runs do not fuse.
    let xml = xml.replace("</w:p>", "\n").replace("<w:tab/>", "\t");
    let br_re = Regex::new(r"<w:br\s*/>").unwrap();
    let xml = br_re.replace_all(&xml, "\n");

    let tag_re = Regex::new(r"<[^>]+>").unwrap();
    let text = tag_re.replace_all(&xml, "");

    decode_entities(text.trim())
}

fn decode_entities(s: &str) -> String {
    // &amp; last, so "&amp;lt;" decodes to "&lt;" and not "<".
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
