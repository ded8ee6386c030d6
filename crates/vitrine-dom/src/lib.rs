//! Arena DOM for Vitrine pages.
//!
//! The page widgets never talk to a browser engine directly. They operate on
//! this [`Document`]: parsed from HTML, queried with a small subset of CSS
//! selectors, mutated in place, and serialized back out.

pub mod dom;
pub mod parser;
pub mod selector;
pub mod serialize;

pub use dom::{Attribute, Document, ElementData, Node, NodeId, NodeKind, TagName};
pub use parser::parse_html;
pub use selector::Selector;
pub use serialize::{inner_html, outer_html, to_html};
