//! Content extraction: turn a fetched body into plain text
//!
//! Dispatches on the declared Content-Type of whichever response is active
//! (primary or confirmation-resolved). Text-ish types pass through, PDF and
//! DOCX get a binary parse, everything else becomes an opaque marker.

use crate::docx;

/// Extract plain text from a response body according to its declared
/// content type.
///
/// Parse failures (corrupt PDF/DOCX) come back as `Err` with a
/// human-readable reason; the pipeline maps them onto the generic fetch
/// warning rather than letting them propagate.
pub fn extract_text(content_type: &str, bytes: &[u8]) -> Result<String, String> {
    let ct = content_type.to_lowercase();

    if ct.contains("text/") || ct.contains("json") || ct.contains("csv") || ct.contains("xml") {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }

    if ct.contains("pdf") {
        // pdf-extract works from memory; keep errors as strings so callers
        // can surface them as warnings without a new error enum.
        return pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string());
    }

    if ct.contains("word") || ct.contains("openxmlformats") {
        return docx::extract_docx_text(bytes).map_err(|e| e.to_string());
    }

    Ok(binary_marker(content_type))
}

/// Opaque stand-in for content we do not attempt to extract.
pub fn binary_marker(content_type: &str) -> String {
    format!("[Binary file: {}]", content_type)
}
