//! Schema repair: coerce parsed model JSON into the fixed field contract

use magpie_domain::{DefectFields, Severity, MAX_FIELD_CHARS};
use serde_json::{Map, Value};

/// Repair a parsed model object into [`DefectFields`].
///
/// Per key: keep the parsed value when present, otherwise the default. A
/// non-array `steps_to_reproduce` is coerced to a single-element array of
/// its stringification (empty array when absent or empty). Every string is
/// truncated to [`MAX_FIELD_CHARS`] and whitespace-trimmed. Severity goes
/// through the lenient vocabulary parse, so unknown labels fold to
/// `UnKnow` rather than surviving as free text.
pub fn repair(map: &Map<String, Value>) -> DefectFields {
    DefectFields {
        title: string_field(map, "title"),
        description: string_field(map, "description"),
        version: string_field(map, "version"),
        severity: Severity::from_label(&string_field(map, "severity")),
        steps_to_reproduce: sequence_field(map, "steps_to_reproduce"),
        stack_trace: string_field(map, "stack_trace"),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(value) => clamp(&stringify(value)),
        None => String::new(),
    }
}

fn sequence_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| clamp(&stringify(item)))
            .filter(|item| !item.is_empty())
            .collect(),
        Some(value) => {
            let single = clamp(&stringify(value));
            if single.is_empty() {
                Vec::new()
            } else {
                vec![single]
            }
        }
        None => Vec::new(),
    }
}

/// Render a JSON scalar as text; null becomes the empty string
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Truncate to the schema's field cap, then trim surrounding whitespace
fn clamp(s: &str) -> String {
    let truncated: String = s.chars().take(MAX_FIELD_CHARS).collect();
    truncated.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let fields = repair(&object(json!({"title": "crash"})));
        assert_eq!(fields.title, "crash");
        assert_eq!(fields.description, "");
        assert_eq!(fields.version, "");
        assert_eq!(fields.severity, Severity::UnKnow);
        assert!(fields.steps_to_reproduce.is_empty());
        assert_eq!(fields.stack_trace, "");
    }

    #[test]
    fn test_bare_string_steps_become_single_element_array() {
        let fields = repair(&object(json!({"steps_to_reproduce": "open the app"})));
        assert_eq!(fields.steps_to_reproduce, vec!["open the app".to_string()]);
    }

    #[test]
    fn test_empty_scalar_steps_become_empty_array() {
        let fields = repair(&object(json!({"steps_to_reproduce": ""})));
        assert!(fields.steps_to_reproduce.is_empty());
        let fields = repair(&object(json!({"steps_to_reproduce": null})));
        assert!(fields.steps_to_reproduce.is_empty());
    }

    #[test]
    fn test_numeric_version_is_stringified() {
        let fields = repair(&object(json!({"version": 2.5})));
        assert_eq!(fields.version, "2.5");
    }

    #[test]
    fn test_severity_is_vocabulary_checked() {
        let fields = repair(&object(json!({"severity": "high"})));
        assert_eq!(fields.severity, Severity::High);
        let fields = repair(&object(json!({"severity": "catastrophic"})));
        assert_eq!(fields.severity, Severity::UnKnow);
    }

    #[test]
    fn test_long_strings_are_clamped() {
        let long = "x".repeat(MAX_FIELD_CHARS + 100);
        let fields = repair(&object(json!({"description": long})));
        assert_eq!(fields.description.chars().count(), MAX_FIELD_CHARS);
    }

    #[test]
    fn test_strings_are_trimmed() {
        let fields = repair(&object(json!({"title": "  padded  "})));
        assert_eq!(fields.title, "padded");
    }

    #[test]
    fn test_mixed_type_steps_are_stringified() {
        let fields = repair(&object(json!({"steps_to_reproduce": ["open", 2, "save"]})));
        assert_eq!(fields.steps_to_reproduce, vec!["open", "2", "save"]);
    }
}
