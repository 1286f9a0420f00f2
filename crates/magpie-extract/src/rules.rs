//! Rule-based field extraction
//!
//! Deterministic, infallible counterpart to the LLM pass. Two extractors:
//! a semantic-version pattern and a steps-by-heading scan.

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bv?\d+\.\d+(?:\.\d+)*\b").unwrap());
static STEPS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)steps to reproduce|reproduc|how to reproduce").unwrap());
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// First semantic-version-like token in `text`, if any.
///
/// # Examples
///
/// ```
/// use magpie_extract::rules::extract_version;
///
/// assert_eq!(extract_version("broken since v2.5.1 on linux"), Some("v2.5.1".to_string()));
/// assert_eq!(extract_version("no version mentioned here"), None);
/// ```
pub fn extract_version(text: &str) -> Option<String> {
    VERSION.find(text).map(|m| m.as_str().to_string())
}

/// Reproduction steps from the first paragraph whose text matches a
/// reproduction-related keyword.
///
/// Paragraphs are blank-line-delimited. The matching paragraph is returned
/// line by line with leading/trailing bullets, dots and whitespace
/// stripped; no match yields an empty vec.
pub fn extract_steps(text: &str) -> Vec<String> {
    for paragraph in PARAGRAPH_BREAK.split(text) {
        if STEPS_HEADING.is_match(paragraph) {
            return paragraph
                .lines()
                .map(|line| line.trim_matches(|c: char| c == '-' || c == '.' || c.is_whitespace()))
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_with_v_prefix() {
        assert_eq!(extract_version("crash in v2.5.1"), Some("v2.5.1".to_string()));
    }

    #[test]
    fn test_version_without_prefix() {
        assert_eq!(extract_version("running 1.2.0 in prod"), Some("1.2.0".to_string()));
    }

    #[test]
    fn test_two_part_version() {
        assert_eq!(extract_version("since 3.14 release"), Some("3.14".to_string()));
    }

    #[test]
    fn test_first_version_wins() {
        assert_eq!(
            extract_version("upgraded from 1.0.0 to 2.0.0"),
            Some("1.0.0".to_string())
        );
    }

    #[test]
    fn test_no_version_pattern() {
        assert_eq!(extract_version("there is nothing to find"), None);
    }

    #[test]
    fn test_steps_by_heading() {
        let text = "some intro\n\nsteps to reproduce\n- open the app\n- click save\n\nexpected: no crash";
        assert_eq!(
            extract_steps(text),
            vec!["steps to reproduce", "open the app", "click save"]
        );
    }

    #[test]
    fn test_steps_heading_variants() {
        let text = "How to reproduce:\n1. start server\n2. send request";
        let steps = extract_steps(text);
        assert_eq!(steps.len(), 3);
        // Leading enumerator digits survive; only bullets and dots are stripped
        assert_eq!(steps[1], "1. start server");
    }

    #[test]
    fn test_no_reproduction_paragraph() {
        assert!(extract_steps("just a description\n\nand an expectation").is_empty());
    }

    #[test]
    fn test_first_matching_paragraph_wins() {
        let text = "reproduction\nstep one\n\nsteps to reproduce\nother steps";
        assert_eq!(extract_steps(text), vec!["reproduction", "step one"]);
    }
}
