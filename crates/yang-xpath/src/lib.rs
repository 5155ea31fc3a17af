//! YANG XPath utilities for NETCONF replay.
//!
//! Configuration XPaths recorded by a YANG tree-grid look like
//! `/m:iface[name="eth0"]/m:mtu`: `/`-separated steps where list steps carry
//! one or more `[key=value]` predicates. Values are single- or double-quoted
//! literals, or `concat(...)` of literals.
//!
//! This crate decomposes those predicates into the key assignments that
//! create the list entries, and provides the helpers used to compare paths
//! structurally (with predicates stripped).
//!
//! # Example
//!
//! ```
//! use yang_xpath::{decompose_xpath_list_keys, strip_predicates, XPathSegment};
//!
//! let xpath = r#"/m:listA[ka="x"]/m:listB[kb="y"]/m:leaf"#;
//! let segments = decompose_xpath_list_keys(xpath).unwrap();
//! assert_eq!(
//!     segments,
//!     vec![
//!         XPathSegment::new("/m:listA/m:ka", "x", false),
//!         XPathSegment::new(r#"/m:listA[ka="x"]/m:listB/m:kb"#, "y", true),
//!     ]
//! );
//!
//! assert_eq!(strip_predicates(xpath), "/m:listA/m:listB/m:leaf");
//! ```

mod error;
pub use error::{InvalidXPathError, InvalidXPathReason};

mod types;
pub use types::XPathSegment;

mod predicate;

mod decompose;
pub use decompose::decompose_xpath_list_keys;

mod util;
pub use util::{append_step, local_name, module_prefix, strip_predicates, xpath_steps};
