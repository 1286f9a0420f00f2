//! Magpie Text Normalizer
//!
//! Deterministic cleaning of raw issue bodies before extraction. Three
//! stages, always applied in order by [`clean`]:
//!
//! 1. [`strip_markup`] — HTML tags and code blocks out, paragraph breaks kept
//! 2. [`remove_noise`] — tracker URLs, mentions, labels, emoji, control
//!    characters, over-long log lines
//! 3. [`normalize`] — lowercase, punctuation and whitespace collapsed
//!
//! Pure functions: no I/O, same input always yields the same output, and
//! [`normalize`] is idempotent on its own output.

#![warn(missing_docs)]

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Lines whose trimmed length exceeds this are dropped as noise
/// (minified bundles, raw log dumps).
pub const MAX_LINE_CHARS: usize = 500;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap());
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap());
static BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:br\s*/?|/p|/div|/li|/tr|/h[1-6])>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static FENCED_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]*`").unwrap());
static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static HOSTED_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:github\.com|gitee\.com|gitlab\.com|gitlab\.io)/\S+").unwrap()
});
static SSH_REMOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"git@(?:github\.com|gitee\.com|gitlab\.com):\S+").unwrap());
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[A-Za-z0-9_-]+").unwrap());
static LABEL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"~[A-Za-z0-9_:-]+").unwrap());
static MILESTONE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[A-Za-z0-9_-]+").unwrap());
static EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        "[\u{1F300}-\u{1FAFF}\u{2600}-\u{27BF}\u{2B00}-\u{2BFF}\
         \u{2300}-\u{23FF}\u{1F1E6}-\u{1F1FF}\u{200D}\u{FE0F}\u{3030}]+",
    )
    .unwrap()
});
// Control characters except tab and newline
static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").unwrap());
static HORIZONTAL_WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static CJK_PUNCT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([，。！？；：]){2,}").unwrap());

static PUNCT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,!?;:，。！？；：]){2,}").unwrap());
static EDGE_NONWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\w\s]+|[^\w\s]+$").unwrap());

/// Full cleaning pass: markup strip, noise removal, final normalization.
///
/// # Examples
///
/// ```
/// use magpie_normalize::clean;
///
/// let cleaned = clean("<p>App CRASHES on save!!!</p>\n```rust\npanic!()\n```");
/// assert_eq!(cleaned, "app crashes on save");
/// ```
pub fn clean(raw: &str) -> String {
    normalize(&remove_noise(&strip_markup(raw)))
}

/// Strip HTML tags and code blocks, preserving paragraph breaks as newlines.
pub fn strip_markup(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = SCRIPT_BLOCK.replace_all(text, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = BREAK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    let text = FENCED_CODE.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Remove tracker-specific noise: hosting URLs, SSH remotes, mentions,
/// label/milestone tokens, emoji, control characters and over-long lines.
pub fn remove_noise(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = HOSTED_URL.replace_all(text, "");
    let text = SSH_REMOTE.replace_all(&text, "");
    let text = MENTION.replace_all(&text, "");
    let text = LABEL_TOKEN.replace_all(&text, "");
    let text = MILESTONE_TOKEN.replace_all(&text, "");
    let text = EMOJI.replace_all(&text, "");

    let text: String = text.nfkd().collect();
    let text = CONTROL_CHARS.replace_all(&text, "");

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| line.trim().chars().count() <= MAX_LINE_CHARS)
        .collect();
    let text = kept.join("\n");

    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    let text = HORIZONTAL_WS_RUN.replace_all(&text, " ");

    // NFKC folds full-width forms back together (全角 -> 半角)
    let text: String = text.nfkc().collect();
    let text = CJK_PUNCT_RUN.replace_all(&text, "$1");
    text.trim().to_string()
}

/// Final normalization: lowercase, collapse repeated punctuation, trim
/// leading/trailing non-word characters, collapse whitespace runs.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.to_lowercase();
    let text = PUNCT_RUN.replace_all(&text, "$1");
    let text = EDGE_NONWORD.replace_all(&text, "");
    // Paragraph breaks survive so the rule extractor can still split on them
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    let text = HORIZONTAL_WS_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_renders_paragraphs() {
        let out = strip_markup("<p>first</p><p>second</p>");
        assert_eq!(out, "first\nsecond");
    }

    #[test]
    fn test_strip_markup_drops_code() {
        let out = strip_markup("before\n```\nlet x = 1;\n```\nafter `inline` end");
        assert!(!out.contains("let x"));
        assert!(!out.contains("inline"));
        assert!(out.contains("before"));
        assert!(out.contains("after"));
    }

    #[test]
    fn test_strip_markup_decodes_entities() {
        assert_eq!(strip_markup("a &amp; b &lt;tag&gt;"), "a & b <tag>");
    }

    #[test]
    fn test_remove_noise_platform_urls_and_remotes() {
        let out = remove_noise(
            "see https://github.com/o/r/issues/1 and git@gitlab.com:o/r.git for details",
        );
        assert!(!out.contains("github.com"));
        assert!(!out.contains("gitlab.com"));
        assert!(out.contains("see"));
        assert!(out.contains("for details"));
    }

    #[test]
    fn test_remove_noise_mentions_labels_emoji() {
        let out = remove_noise("ping @octocat about ~bug and &v2 \u{1F600}\u{1F680}");
        assert!(!out.contains("octocat"));
        assert!(!out.contains("~bug"));
        assert!(!out.contains("&v2"));
        assert!(!out.contains('\u{1F600}'));
    }

    #[test]
    fn test_remove_noise_drops_minified_lines() {
        let long_line = "x".repeat(MAX_LINE_CHARS + 1);
        let input = format!("short line\n{long_line}\nanother short line");
        let out = remove_noise(&input);
        assert!(out.contains("short line"));
        assert!(out.contains("another short line"));
        assert!(!out.contains(&long_line));
    }

    #[test]
    fn test_remove_noise_keeps_boundary_line() {
        let boundary = "y".repeat(MAX_LINE_CHARS);
        assert!(remove_noise(&boundary).contains(&boundary));
    }

    #[test]
    fn test_normalize_lowercases_and_collapses() {
        assert_eq!(normalize("The APP Crashed!!!   badly"), "the app crashed! badly");
    }

    #[test]
    fn test_normalize_trims_edge_punctuation() {
        assert_eq!(normalize("***important***"), "important");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("Some TEXT,,, with   Noise!!!");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_normalize_preserves_paragraph_breaks() {
        let out = normalize("Steps to Reproduce\nopen app\n\nExpected\nno crash");
        assert!(out.contains("\n\n"));
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_clean_full_report() {
        let raw = "<h2>Crash Report</h2>\
                   <p>App crashes on save. See https://github.com/o/r/issues/3</p>\
                   ```\nstack frame\n```\
                   <p>cc @maintainer</p>";
        let out = clean(raw);
        assert!(out.contains("crash report"));
        assert!(out.contains("app crashes on save"));
        assert!(!out.contains("github.com"));
        assert!(!out.contains("stack frame"));
        assert!(!out.contains("maintainer"));
    }
}
