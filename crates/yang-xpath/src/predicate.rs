//! List-key predicate grammar.
//!
//! A predicate is `[key=value]` where `value` is a single-quoted literal, a
//! double-quoted literal or `concat(lit, lit, ...)`. Within a literal a
//! backslash followed by the enclosing quote stands for that quote.

use regex::Regex;
use std::sync::OnceLock;

const LITERAL: &str = r#"(?:"(?:[^"\\]|\\"|\\)*"|'(?:[^'\\]|\\'|\\)*')"#;

fn predicate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r#"^\[\s*(?P<key>[^=\[\]'"\s]+)\s*=\s*(?:(?P<lit>{LITERAL})|concat\(\s*(?P<args>{LITERAL}(?:\s*,\s*{LITERAL})*)\s*\))\s*\]"#
        );
        Regex::new(&pattern).unwrap()
    })
}

fn literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""((?:[^"\\]|\\"|\\)*)"|'((?:[^'\\]|\\'|\\)*)'"#).unwrap()
    })
}

/// One parsed predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Predicate<'a> {
    pub key: &'a str,
    pub value: String,
    /// Byte length of the predicate text, brackets included.
    pub len: usize,
}

/// Matches a predicate at the very start of `input`.
pub(crate) fn match_predicate(input: &str) -> Option<Predicate<'_>> {
    let caps = predicate_regex().captures(input)?;
    let key = caps.name("key")?.as_str();
    let value = match (caps.name("lit"), caps.name("args")) {
        (Some(lit), _) => concat_literals(lit.as_str()),
        (None, Some(args)) => concat_literals(args.as_str()),
        (None, None) => return None,
    };
    Some(Predicate {
        key,
        value,
        len: caps.get(0)?.end(),
    })
}

/// Concatenates every quoted literal found in `text`, unescaping quotes.
fn concat_literals(text: &str) -> String {
    let mut out = String::new();
    for caps in literal_regex().captures_iter(text) {
        if let Some(double) = caps.get(1) {
            out.push_str(&double.as_str().replace("\\\"", "\""));
        } else if let Some(single) = caps.get(2) {
            out.push_str(&single.as_str().replace("\\'", "'"));
        }
    }
    out
}
