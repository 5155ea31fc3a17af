use thiserror::Error;

/// Why a predicate could not be parsed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvalidXPathReason {
    #[error("unclosed predicate bracket")]
    UnclosedBracket,
    #[error("unmatched closing bracket")]
    UnmatchedBracket,
    #[error("malformed predicate")]
    MalformedPredicate,
    #[error("unsupported predicate value")]
    UnsupportedValue,
}

/// A list-key predicate in an XPath could not be parsed.
///
/// `fragment` is the offending substring, starting at the bracket that
/// failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid XPath '{xpath}': {reason} in '{fragment}'")]
pub struct InvalidXPathError {
    pub xpath: String,
    pub fragment: String,
    pub reason: InvalidXPathReason,
}

impl InvalidXPathError {
    /// Builds the error for the bracket at byte offset `pos` of `xpath`.
    pub(crate) fn at(xpath: &str, pos: usize) -> Self {
        let rest = &xpath[pos..];
        if rest.starts_with(']') {
            return Self {
                xpath: xpath.to_string(),
                fragment: rest.to_string(),
                reason: InvalidXPathReason::UnmatchedBracket,
            };
        }
        let Some(close) = rest.find(']') else {
            return Self {
                xpath: xpath.to_string(),
                fragment: rest.to_string(),
                reason: InvalidXPathReason::UnclosedBracket,
            };
        };
        let fragment = &rest[..=close];
        let reason = match fragment[1..close].split_once('=') {
            Some((key, _)) if !key.trim().is_empty() => InvalidXPathReason::UnsupportedValue,
            _ => InvalidXPathReason::MalformedPredicate,
        };
        Self {
            xpath: xpath.to_string(),
            fragment: fragment.to_string(),
            reason,
        }
    }
}
