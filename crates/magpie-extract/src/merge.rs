//! Reconcile the LLM pass, the rule pass and the original issue

use magpie_domain::{DefectFields, RawIssue, StandardizedDefect};

/// Cleaned-text prefix used when the model produced no description
pub const DESCRIPTION_FALLBACK_CHARS: usize = 2000;

/// Merge the three extraction sources into one persistable record.
///
/// Precedence is LLM > rule/original > hard default, field by field:
/// LLM title over the issue title, LLM description over a cleaned-text
/// prefix, LLM version over the rule-extracted one, LLM steps over the
/// rule-extracted ones. Severity arrives already vocabulary-folded (empty
/// and unknown are `UnKnow` by the time repair is done).
///
/// `repo_id` is left empty on purpose: the pipeline attaches it after
/// merge, because the repository identifier belongs to the run, not to
/// the extraction.
pub fn merge(
    issue: &RawIssue,
    cleaned: &str,
    rule_version: Option<String>,
    rule_steps: Vec<String>,
    llm: DefectFields,
) -> StandardizedDefect {
    let title = if llm.title.is_empty() {
        issue.title.clone()
    } else {
        llm.title
    };
    let description = if llm.description.is_empty() {
        cleaned.chars().take(DESCRIPTION_FALLBACK_CHARS).collect()
    } else {
        llm.description
    };
    let version = if llm.version.is_empty() {
        rule_version.unwrap_or_default()
    } else {
        llm.version
    };
    let steps_to_reproduce = if llm.steps_to_reproduce.is_empty() {
        rule_steps
    } else {
        llm.steps_to_reproduce
    };

    StandardizedDefect {
        repo_id: String::new(),
        issue_id: issue.issue_id,
        platform: issue.platform,
        title,
        description,
        version,
        steps_to_reproduce,
        severity: llm.severity,
        stack_trace: llm.stack_trace,
        url: issue.url.clone(),
        created_at: issue.created_at.clone(),
    }
}
