//! Whitespace tokenizer and case canonicalization.

use std::borrow::Cow;

use crate::config::CasePolicy;

/// Splits `text` on runs of whitespace, dropping empty tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Returns true if `text` yields at least one token.
pub fn has_tokens(text: &str) -> bool {
    tokenize(text).next().is_some()
}

/// Brings `text` into the form stored as an index key under `policy`.
pub fn canonicalize(policy: CasePolicy, text: &str) -> Cow<'_, str> {
    match policy {
        CasePolicy::Sensitive => Cow::Borrowed(text),
        CasePolicy::Insensitive => {
            if text.chars().any(char::is_uppercase) {
                Cow::Owned(text.to_lowercase())
            } else {
                Cow::Borrowed(text)
            }
        }
    }
}
