pub const SNIPPET_MAX_CHARS: usize = 150;
const ELLIPSIS: &str = "...";

/// Fixed-length preview of `content`.
///
/// `_query` is accepted so a highlighting pass can be added without changing
/// callers; no highlighting happens today. The cut may land mid-word.
pub fn create_snippet(content: &str, _query: &str) -> String {
    match content.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], ELLIPSIS),
        None => content.to_string(),
    }
}
