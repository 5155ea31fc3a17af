use serde::{Deserialize, Serialize};

/// A key assignment needed for an XPath's list entries to exist.
///
/// `xpath` addresses the key leaf; everything before the list's own
/// predicate run is kept verbatim, so the segment for an inner key embeds
/// the values of the outer keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XPathSegment {
    pub xpath: String,
    pub value: String,
    /// True only for the last predicate of the whole XPath.
    pub is_leaf_predicate: bool,
}

impl XPathSegment {
    pub fn new(xpath: impl Into<String>, value: impl Into<String>, is_leaf_predicate: bool) -> Self {
        Self {
            xpath: xpath.into(),
            value: value.into(),
            is_leaf_predicate,
        }
    }
}
