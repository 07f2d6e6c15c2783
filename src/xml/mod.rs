//! XML tree and namespace-tolerant queries used by every extractor.

pub mod query;
mod tree;

pub use query::{children_by_tag, exists, find_by_tag, find_first, first_text, texts, Strategy};
pub use tree::{Element, Node, XmlTree};
