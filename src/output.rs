//! Output bounds: keep extracted text within prompt-sized limits

/// Default cap on extracted text, sized so downstream LLM prompt payloads
/// stay within provider token limits.
pub const MAX_TEXT_CHARS: usize = 50_000;

/// Literal suffix appended whenever text is cut.
pub const TRUNCATION_SUFFIX: &str = "\n... [truncated]";

/// Cap text at `max_chars` bytes, marking the cut visibly. Applied
/// uniformly regardless of source type. `0` disables the bound.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.len() <= max_chars {
        return text.to_string();
    }

    // Back off to a char boundary; only matters for multi-byte tails.
    let mut cut = max_chars;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }

    format!("{}{}", &text[..cut], TRUNCATION_SUFFIX)
}
