// src/intake/reply.rs
// Reply post-processing: role-label cleanup and the one-question rule

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Quoted lines shorter than this are treated as echoed applicant text
const ECHOED_QUOTE_MAX_LEN: usize = 100;

/// Default shortest first question the one-question rule will cut down to
pub const DEFAULT_SINGLE_QUESTION_MIN_PREFIX: usize = 10;

const ROLE_LABELS: &[&str] = &["User:", "Assistant:", "System:"];

static LEADING_ROLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: static literal pattern; compilation cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)^(user|assistant|system):\s*").expect("role prefix regex")
});

/// Drop role-labelled lines and short quoted lines, then any leading role prefix
pub fn clean_response(text: &str) -> String {
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|line| {
            let stripped = line.trim();
            if ROLE_LABELS.iter().any(|label| stripped.starts_with(label)) {
                return false;
            }
            let echoed_quote = stripped.len() >= 2
                && stripped.starts_with('"')
                && stripped.ends_with('"')
                && stripped.chars().count() < ECHOED_QUOTE_MAX_LEN;
            !echoed_quote
        })
        .collect();

    let joined = kept.join("\n");
    LEADING_ROLE_RE.replace(joined.trim(), "").into_owned()
}

/// Keep only the first question when the text asks more than one.
///
/// The cut is made after the first `?` only when the kept prefix is longer
/// than `min_prefix` characters; shorter prefixes are left alone.
pub fn enforce_single_question(text: &str, min_prefix: usize) -> String {
    let question_marks = text.matches('?').count();
    if question_marks <= 1 {
        return text.to_string();
    }

    let Some(pos) = text.find('?') else {
        return text.to_string();
    };
    let truncated = text[..=pos].trim();
    if truncated.chars().count() > min_prefix {
        debug!(question_marks, "Truncated reply to its first question");
        truncated.to_string()
    } else {
        text.to_string()
    }
}
