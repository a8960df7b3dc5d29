//! Rewrites `@token` / `@"token"` occurrences in rendered content into
//! `<at id="N">label</at>` spans and builds the matching mention records.
//!
//! Matching is literal and case-sensitive. Content is assumed to be escaped
//! already; labels are inserted verbatim.

use super::reference::Reference;
use crate::api::MentionRecord;
use regex::{NoExpand, Regex};
use tracing::{debug, warn};

/// Quote forms accepted around a token. HTML renderers may have turned the
/// quotes into entities by the time injection runs.
const QUOTE: &str = r#"(?:"|&quot;)"#;

/// Builds the literal matcher for one token.
///
/// Tokens containing whitespace only match in quoted form; all others match
/// both `@token` and `@"token"`.
pub fn build_token_pattern(token: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(token);
    let quoted = format!("@{QUOTE}{escaped}{QUOTE}");
    if token.chars().any(char::is_whitespace) {
        Regex::new(&quoted)
    } else {
        Regex::new(&format!("{quoted}|@{escaped}"))
    }
}

pub fn mention_span(sequence_id: usize, label: &str) -> String {
    format!("<at id=\"{sequence_id}\">{label}</at>")
}

/// Replaces every mention of every reference and returns the rewritten content
/// plus one record per reference, in input order.
///
/// References are applied in list order, each with a global replace. When one
/// token is a substring of another the outcome depends on that order; this is
/// reported through [`overlapping_tokens`] but not resolved.
pub fn inject_mentions(content: &str, references: &[Reference]) -> (String, Vec<MentionRecord>) {
    inject_mentions_as(content, references, str::to_string)
}

/// Like [`inject_mentions`], but matches each token in the form `token_form`
/// gives it. Use this when the content has been escaped (e.g. rendered to
/// HTML) and the tokens must be escaped the same way to be found.
pub fn inject_mentions_as<F>(
    content: &str,
    references: &[Reference],
    token_form: F,
) -> (String, Vec<MentionRecord>)
where
    F: Fn(&str) -> String,
{
    if references.is_empty() {
        return (content.to_string(), Vec::new());
    }

    for (first, second) in overlapping_tokens(references) {
        warn!(
            first = references[first].token(),
            second = references[second].token(),
            "Mention tokens overlap; replacement order decides the result"
        );
    }

    let mut rewritten = content.to_string();
    let mut records = Vec::with_capacity(references.len());

    for (sequence_id, reference) in references.iter().enumerate() {
        records.push(reference.to_record(sequence_id));

        let token = reference.token();
        if token.is_empty() {
            debug!(sequence_id, "Skipping replacement for empty mention token");
            continue;
        }

        let pattern = match build_token_pattern(&token_form(token)) {
            Ok(pattern) => pattern,
            Err(err) => {
                warn!(token, %err, "Could not build mention pattern; leaving text unchanged");
                continue;
            }
        };

        if !pattern.is_match(&rewritten) {
            debug!(token, sequence_id, "Mention token not found in content");
            continue;
        }

        let span = mention_span(sequence_id, reference.label());
        rewritten = pattern.replace_all(&rewritten, NoExpand(&span)).into_owned();
    }

    (rewritten, records)
}

/// Index pairs `(a, b)` where the token at `a` occurs inside the distinct token at `b`.
pub fn overlapping_tokens(references: &[Reference]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (a, left) in references.iter().enumerate() {
        for (b, right) in references.iter().enumerate() {
            let (short, long) = (left.token(), right.token());
            if a != b && !short.is_empty() && short != long && long.contains(short) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}
