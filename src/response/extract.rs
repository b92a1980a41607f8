use super::error::ExtractionError;

const FENCE: &str = "```";

/// Returns the JSON object substring of `raw`: first `{` through last `}`.
///
/// A leading markdown fence (with an optional language tag) is removed first, and
/// the text after its closing fence is ignored.
pub fn extract(raw: &str) -> Result<&str, ExtractionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let body = strip_fence(trimmed);

    let start = body.find('{');
    let end = body.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
        _ => Err(ExtractionError::no_object(trimmed)),
    }
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(FENCE) else {
        return text;
    };

    // Language tag runs up to the first whitespace or brace.
    let tag_len = rest
        .find(|c: char| c.is_whitespace() || c == '{')
        .unwrap_or(rest.len());
    let rest = &rest[tag_len..];

    match rest.find(FENCE) {
        Some(close) => rest[..close].trim(),
        None => rest.trim(),
    }
}
