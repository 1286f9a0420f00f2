//! Input language detection for prompt selection

/// CJK density above which input is treated as Chinese
pub const CJK_RATIO_THRESHOLD: f64 = 0.2;

/// Prompt language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// Chinese prompt pair
    Zh,
    /// English prompt pair
    En,
}

/// Pick the prompt language for `text`.
///
/// Counts characters in the CJK Unified Ideographs block (U+4E00–U+9FFF)
/// against all non-whitespace characters; a ratio above
/// [`CJK_RATIO_THRESHOLD`] selects Chinese. Blank input defaults to
/// Chinese.
///
/// # Examples
///
/// ```
/// use magpie_extract::{detect_language, Lang};
///
/// assert_eq!(detect_language("登录页面崩溃了"), Lang::Zh);
/// assert_eq!(detect_language("the login page crashes"), Lang::En);
/// assert_eq!(detect_language("   "), Lang::Zh);
/// ```
pub fn detect_language(text: &str) -> Lang {
    let mut cjk = 0usize;
    let mut total = 0usize;
    for ch in text.chars().filter(|c| !c.is_whitespace()) {
        total += 1;
        if ('\u{4e00}'..='\u{9fff}').contains(&ch) {
            cjk += 1;
        }
    }
    if total == 0 {
        return Lang::Zh;
    }
    if cjk as f64 / total as f64 > CJK_RATIO_THRESHOLD {
        Lang::Zh
    } else {
        Lang::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_ascii_is_english() {
        assert_eq!(detect_language("crash when clicking save"), Lang::En);
    }

    #[test]
    fn test_mostly_chinese_is_chinese() {
        assert_eq!(detect_language("保存时程序崩溃"), Lang::Zh);
    }

    #[test]
    fn test_blank_defaults_to_chinese() {
        assert_eq!(detect_language(""), Lang::Zh);
        assert_eq!(detect_language(" \n\t"), Lang::Zh);
    }

    #[test]
    fn test_threshold_boundary() {
        // 1 CJK char out of 5 non-whitespace = 0.2, not above the threshold
        assert_eq!(detect_language("abcd崩"), Lang::En);
        // 2 out of 5 = 0.4, above it
        assert_eq!(detect_language("abc崩溃"), Lang::Zh);
    }

    #[test]
    fn test_mixed_report_with_log_noise_stays_english() {
        let text = "squid 报错 but the rest of this report is an english log dump \
                    with many ascii words";
        assert_eq!(detect_language(text), Lang::En);
    }
}
