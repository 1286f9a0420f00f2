//! Parse raw model output into JSON

use serde_json::Value;

/// Parse the model's text as JSON, tolerating a markdown code fence.
///
/// Models sometimes wrap their JSON in ```json fences even when told not
/// to; the fence is stripped before parsing. A parse failure is returned
/// to the caller, which decides between fallback and default.
pub fn parse_model_output(response: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(strip_fence(response))
}

/// Drop a surrounding markdown code fence, if any
fn strip_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return trimmed,
    };
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_json() {
        let value = parse_model_output(r#"{"title": "crash"}"#).unwrap();
        assert_eq!(value["title"], "crash");
    }

    #[test]
    fn test_parses_fenced_json() {
        let raw = "```json\n{\"title\": \"crash\"}\n```";
        let value = parse_model_output(raw).unwrap();
        assert_eq!(value["title"], "crash");
    }

    #[test]
    fn test_parses_bare_fence() {
        let raw = "```\n[1, 2]\n```";
        let value = parse_model_output(raw).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_prose_is_an_error() {
        assert!(parse_model_output("Sorry, I cannot help with that.").is_err());
    }

    #[test]
    fn test_truncated_json_is_an_error() {
        assert!(parse_model_output(r#"{"title": "cra"#).is_err());
    }
}
