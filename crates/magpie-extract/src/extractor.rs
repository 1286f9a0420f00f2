//! The total LLM extraction entry point

use crate::lang::detect_language;
use crate::parser::parse_model_output;
use crate::prompt::prompts_for;
use crate::repair::repair;
use magpie_domain::DefectFields;
use magpie_llm::{CompletionProvider, RetryPolicy};
use tracing::{debug, info, warn};

/// Cap on the heuristic fallback title
pub const FALLBACK_TITLE_CHARS: usize = 200;

/// LLM-backed defect-field extraction
///
/// `extract` is total: every failure mode inside — exhausted retries, an
/// unparsable model reply, a wrong-shaped one — degrades to the heuristic
/// fallback or the default schema. Callers always receive a complete
/// [`DefectFields`] and never an error.
pub struct DefectExtractor<P: CompletionProvider> {
    provider: P,
    policy: RetryPolicy,
}

impl<P: CompletionProvider> DefectExtractor<P> {
    /// Create an extractor with the default retry policy
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Extract defect fields from cleaned report text.
    ///
    /// Blank input short-circuits to the default schema without a model
    /// call.
    pub async fn extract(&self, text: &str) -> DefectFields {
        if text.trim().is_empty() {
            debug!("blank input, returning default fields without a model call");
            return DefectFields::default();
        }

        let lang = detect_language(text);
        debug!(?lang, chars = text.chars().count(), "starting model extraction");
        let (system, user) = prompts_for(lang, text);

        let raw = match self.policy.run(|| self.provider.complete(system, &user)).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "model call failed after retries, returning default fields");
                return DefectFields::default();
            }
        };

        let value = match parse_model_output(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "model output was not JSON, using heuristic fallback");
                return heuristic_fields(text);
            }
        };

        match value.as_object() {
            Some(map) => {
                let fields = repair(map);
                info!(severity = %fields.severity, "model extraction complete");
                fields
            }
            None => {
                warn!("model output was JSON but not an object, returning default fields");
                DefectFields::default()
            }
        }
    }
}

/// Heuristic stand-in when the model replied with non-JSON: title from the
/// first non-blank line of the original input, description from the next
/// few lines.
fn heuristic_fields(text: &str) -> DefectFields {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut fields = DefectFields::default();
    if let Some(first) = lines.first() {
        fields.title = first.chars().take(FALLBACK_TITLE_CHARS).collect();
        fields.description = lines.iter().skip(1).take(4).copied().collect::<Vec<_>>().join(" ");
    }
    fields
}
