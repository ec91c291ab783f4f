//! Embedded-JSON extraction from mixed vision-model output.
//!
//! Models wrap their JSON in prose and fenced code blocks. Extraction is a
//! plain scan, never a parse-and-catch: a fenced ```json block wins, then the
//! outermost brace span. Failure is an explicit `None`.

/// Locate the JSON object embedded in a model reply.
///
/// Returns the candidate slice without validating it; callers decode with
/// serde and treat decode failure separately.
pub fn extract_embedded_json(text: &str) -> Option<&str> {
    if let Some(fenced) = fenced_block(text) {
        if let Some(span) = brace_span(fenced) {
            return Some(span);
        }
    }
    brace_span(text)
}

/// Contents of the first ```json fence, if the closing fence exists.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```json")?;
    let rest = &text[start + "```json".len()..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

/// The span from the first `{` to the last `}`, when both exist in order.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_fenced_json_block() {
        let text = "Sure, here is the analysis:\n```json\n{\"description\": \"a window\"}\n```\nLet me know!";
        assert_eq!(
            extract_embedded_json(text),
            Some("{\"description\": \"a window\"}")
        );
    }

    #[test]
    fn test_extracts_bare_braces_with_surrounding_prose() {
        let text = "The result is {\"panes\": \"2\"} as requested.";
        assert_eq!(extract_embedded_json(text), Some("{\"panes\": \"2\"}"));
    }

    #[test]
    fn test_extracts_nested_object_outermost_span() {
        let text = "{\"description\": \"x\", \"structured_data\": {\"daytime\": \"day\"}}";
        assert_eq!(extract_embedded_json(text), Some(text));
    }

    #[test]
    fn test_unterminated_fence_falls_back_to_braces() {
        let text = "```json\n{\"daytime\": \"night\"}";
        assert_eq!(extract_embedded_json(text), Some("{\"daytime\": \"night\"}"));
    }

    #[test]
    fn test_truncated_json_returns_none() {
        assert_eq!(extract_embedded_json("{\"description\": \"cut off"), None);
    }

    #[test]
    fn test_no_braces_returns_none() {
        assert_eq!(extract_embedded_json("I could not analyze the image."), None);
        assert_eq!(extract_embedded_json(""), None);
    }

    #[test]
    fn test_reversed_braces_return_none() {
        assert_eq!(extract_embedded_json("} not json {"), None);
    }

    #[test]
    fn test_fence_without_json_content_falls_back() {
        let text = "```json\nnothing here\n``` but later {\"a\": 1}";
        assert_eq!(extract_embedded_json(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extracted_slice_is_parseable() {
        let text = "prose ```json\n{\"description\": \"tall window\", \"structured_data\": {}}\n``` prose";
        let slice = extract_embedded_json(text).unwrap();
        let value: serde_json::Value = serde_json::from_str(slice).unwrap();
        assert_eq!(value["description"], "tall window");
    }
}
