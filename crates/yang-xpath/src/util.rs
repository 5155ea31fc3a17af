//! XPath string helpers.

use crate::predicate::match_predicate;

/// Removes every well-formed list-key predicate from `xpath`.
///
/// Brackets that do not parse as a predicate are left in place.
///
/// # Example
///
/// ```
/// use yang_xpath::strip_predicates;
///
/// assert_eq!(strip_predicates(r#"/m:a[k="v"]/m:b[x='1'][y="2"]/m:c"#), "/m:a/m:b/m:c");
/// assert_eq!(strip_predicates("/a[1]/b"), "/a[1]/b");
/// ```
pub fn strip_predicates(xpath: &str) -> String {
    let mut out = String::with_capacity(xpath.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(offset) = xpath[pos..].find('[') {
        let start = pos + offset;
        match match_predicate(&xpath[start..]) {
            Some(predicate) => {
                out.push_str(&xpath[copied..start]);
                pos = start + predicate.len;
                copied = pos;
            }
            None => pos = start + 1,
        }
    }
    out.push_str(&xpath[copied..]);
    out
}

/// Splits an XPath into its steps, dropping empty ones.
///
/// Predicates are not interpreted, so strip them first when values may
/// contain `/`.
///
/// ```
/// use yang_xpath::xpath_steps;
///
/// assert_eq!(xpath_steps("/m:a/m:b"), vec!["m:a", "m:b"]);
/// assert_eq!(xpath_steps(""), Vec::<&str>::new());
/// ```
pub fn xpath_steps(xpath: &str) -> Vec<&str> {
    xpath.split('/').filter(|step| !step.is_empty()).collect()
}

/// Returns a step without its `module:` prefix.
pub fn local_name(step: &str) -> &str {
    match step.split_once(':') {
        Some((_, local)) => local,
        None => step,
    }
}

/// Returns the module prefix of the first step, if it has one.
///
/// ```
/// use yang_xpath::module_prefix;
///
/// assert_eq!(module_prefix("/ietf-interfaces:interfaces/interface"), Some("ietf-interfaces"));
/// assert_eq!(module_prefix("/a/b:c"), None);
/// ```
pub fn module_prefix(xpath: &str) -> Option<&str> {
    let first = xpath.trim_start_matches('/');
    let end = first.find(['/', '[']).unwrap_or(first.len());
    first[..end].split_once(':').map(|(prefix, _)| prefix)
}

/// Appends `/prefix:name` to `xpath`, leaving out the prefix when `name` is
/// already qualified or no prefix is known.
pub fn append_step(xpath: &mut String, prefix: Option<&str>, name: &str) {
    xpath.push('/');
    if !name.contains(':') {
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            xpath.push_str(prefix);
            xpath.push(':');
        }
    }
    xpath.push_str(name);
}
