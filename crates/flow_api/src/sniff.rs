use std::sync::OnceLock;

use regex::Regex;

fn html_marker_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)<!doctype html|<html|<head|<body|<title")
            .expect("html marker regex must compile")
    })
}

/// Heuristic for reverse-proxy or server error pages delivered where a stream
/// or JSON document was expected.
///
/// Shared by both stream readers, the chunk guard and every non-streaming
/// response check so detection is identical everywhere.
pub fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    html_marker_regex().is_match(trimmed) || trimmed.to_ascii_lowercase().ends_with("</html>")
}

/// `Content-Type` values that announce an HTML page.
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
