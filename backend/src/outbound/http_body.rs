//! Helpers shared by the reqwest-based adapters.

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Whitespace-collapsed, length-limited rendering of a response body for
/// error messages and logs.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(body_preview(b"{\n  \"error\":   \"boom\"\n}"), "{ \"error\": \"boom\" }");
    }

    #[test]
    fn truncates_long_bodies() {
        let preview = body_preview("x".repeat(500).as_bytes());
        assert_eq!(preview.len(), PREVIEW_CHAR_LIMIT + 3);
        assert!(preview.ends_with("..."));
    }
}
