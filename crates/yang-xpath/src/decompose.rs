//! Decomposition of list-key predicates.

use crate::error::InvalidXPathError;
use crate::predicate::match_predicate;
use crate::types::XPathSegment;
use crate::util::{append_step, module_prefix};

/// Decomposes the list-key predicates of `xpath` into the ordered key
/// assignments that create its list entries.
///
/// Given
///
/// ```text
/// /m:listA[keyA="valueA"]/m:listB[keyB1="1"][keyB2="2"]/m:leaf
/// ```
///
/// the result is
///
/// ```text
/// /m:listA/m:keyA                                  = valueA
/// /m:listA[keyA="valueA"]/m:listB/m:keyB1          = 1
/// /m:listA[keyA="valueA"]/m:listB[keyB1="1"]/m:keyB2 = 2   (leaf predicate)
/// ```
///
/// Keys that are not namespace-qualified take the module prefix of the first
/// step. An XPath without predicates yields an empty vector.
///
/// # Errors
///
/// Returns [`InvalidXPathError`] for an unmatched bracket or a predicate
/// whose value is not a quoted literal or `concat(...)` of literals.
///
/// # Example
///
/// ```
/// use yang_xpath::decompose_xpath_list_keys;
///
/// let segments = decompose_xpath_list_keys(r#"/a[k="v"]/b"#).unwrap();
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].xpath, "/a/k");
/// assert_eq!(segments[0].value, "v");
/// assert!(segments[0].is_leaf_predicate);
/// ```
pub fn decompose_xpath_list_keys(xpath: &str) -> Result<Vec<XPathSegment>, InvalidXPathError> {
    let module = module_prefix(xpath);
    let bytes = xpath.as_bytes();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'[' => {
                let predicate =
                    match_predicate(&xpath[pos..]).ok_or_else(|| InvalidXPathError::at(xpath, pos))?;
                let mut leaf = xpath[..pos].to_string();
                append_step(&mut leaf, module, predicate.key);
                segments.push(XPathSegment::new(leaf, predicate.value, false));
                pos += predicate.len;
            }
            b']' => return Err(InvalidXPathError::at(xpath, pos)),
            _ => pos += 1,
        }
    }

    if let Some(last) = segments.last_mut() {
        last.is_leaf_predicate = true;
    }
    Ok(segments)
}
