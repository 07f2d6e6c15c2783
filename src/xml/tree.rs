//! Owned element tree built from quick-xml events.
//!
//! Parsing never fails: malformed markup produces the tree read so far, with
//! unclosed elements closed implicitly, and [`XmlTree::is_malformed`] set.

use quick_xml::events::{BytesStart, Event};

/// Name of the synthetic node that holds the document element.
const DOCUMENT_NODE: &str = "#document";

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its qualified name and resolved namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    nodes: Vec<Node>,
}

impl Element {
    fn new(name: String, namespace: Option<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            namespace,
            attributes,
            nodes: Vec::new(),
        }
    }

    /// Qualified name as written (`c:ser`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix of the qualified name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Name without its prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace URI bound to the element's prefix where it was declared.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Attribute by exact qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute by qualified name, falling back to a local-name match
    /// (`r:embed` finds `embed` or `rel:embed`).
    pub fn attr_tolerant(&self, name: &str) -> Option<&str> {
        self.attr(name).or_else(|| {
            let local = local_part(name);
            self.attributes
                .iter()
                .filter(|(key, _)| !key.starts_with("xmlns"))
                .find(|(key, _)| local_part(key) == local)
                .map(|(_, value)| value.as_str())
        })
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Child nodes, text included.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Parsed markup plus a flag telling whether the input was well-formed.
#[derive(Debug, Clone)]
pub struct XmlTree {
    document: Element,
    error: Option<String>,
}

/// An open element and the namespace declarations it introduced.
struct Frame {
    element: Element,
    scope: Vec<(String, String)>,
}

impl XmlTree {
    /// Parse markup into a tree, tolerating malformed input.
    pub fn parse(xml: &str) -> Self {
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = false;

        let mut stack = vec![Frame {
            element: Element::new(DOCUMENT_NODE.to_string(), None, Vec::new()),
            scope: vec![(
                "xml".to_string(),
                "http://www.w3.org/XML/1998/namespace".to_string(),
            )],
        }];
        let mut error: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let frame = open_frame(e, &stack);
                    stack.push(frame);
                }
                Ok(Event::Empty(ref e)) => {
                    let frame = open_frame(e, &stack);
                    attach(&mut stack, Node::Element(frame.element));
                }
                Ok(Event::End(ref e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match stack.iter().rposition(|f| f.element.name == name) {
                        Some(pos) if pos > 0 => {
                            if pos != stack.len() - 1 {
                                error.get_or_insert_with(|| {
                                    format!("unclosed element inside </{}>", name)
                                });
                            }
                            while stack.len() > pos {
                                close_top(&mut stack);
                            }
                        }
                        _ => {
                            error.get_or_insert_with(|| format!("unmatched end tag </{}>", name));
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            error.get_or_insert_with(|| err.to_string());
                            String::from_utf8_lossy(e).into_owned()
                        }
                    };
                    if !text.is_empty() && stack.len() > 1 {
                        attach(&mut stack, Node::Text(text));
                    }
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(e).into_owned();
                    attach(&mut stack, Node::Text(text));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    error.get_or_insert_with(|| {
                        format!("{} at position {}", e, reader.buffer_position())
                    });
                    break;
                }
                _ => {}
            }
            buf.clear();
        }

        if stack.len() > 1 {
            error.get_or_insert_with(|| "unexpected end of document".to_string());
            while stack.len() > 1 {
                close_top(&mut stack);
            }
        }

        let document = stack
            .pop()
            .map(|f| f.element)
            .unwrap_or_else(|| Element::new(DOCUMENT_NODE.to_string(), None, Vec::new()));

        Self { document, error }
    }

    /// Synthetic node whose children are the top-level elements.
    pub fn document(&self) -> &Element {
        &self.document
    }

    /// The document element, if any markup was read.
    pub fn root(&self) -> Option<&Element> {
        self.document.children().next()
    }

    /// Whether the markup was malformed.
    pub fn is_malformed(&self) -> bool {
        self.error.is_some()
    }

    /// First parse error encountered.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

fn open_frame(e: &BytesStart<'_>, stack: &[Frame]) -> Frame {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    let mut scope = Vec::new();

    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        if key == "xmlns" {
            scope.push((String::new(), value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((prefix.to_string(), value.clone()));
        }
        attributes.push((key, value));
    }

    let prefix = name.split_once(':').map(|(p, _)| p).unwrap_or("");
    let namespace = scope
        .iter()
        .rev()
        .chain(stack.iter().rev().flat_map(|f| f.scope.iter().rev()))
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty());

    Frame {
        element: Element::new(name, namespace, attributes),
        scope,
    }
}

fn attach(stack: &mut [Frame], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.element.nodes.push(node);
    }
}

fn close_top(stack: &mut Vec<Frame>) {
    if let Some(frame) = stack.pop() {
        attach(stack, Node::Element(frame.element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let tree = XmlTree::parse(
            r#"<?xml version="1.0"?>
<p:sld xmlns:p="urn:p" xmlns:a="urn:a">
  <a:t>Hello &amp; welcome</a:t>
  <a:off x="10" y="20"/>
</p:sld>"#,
        );
        assert!(!tree.is_malformed());
        let root = tree.root().unwrap();
        assert_eq!(root.name(), "p:sld");
        assert_eq!(root.prefix(), Some("p"));
        assert_eq!(root.local_name(), "sld");
        assert_eq!(root.namespace(), Some("urn:p"));

        let children: Vec<&Element> = root.children().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].text(), "Hello & welcome");
        assert_eq!(children[0].namespace(), Some("urn:a"));
        assert_eq!(children[1].attr("y"), Some("20"));
    }

    #[test]
    fn test_default_namespace_and_rebinding() {
        let tree = XmlTree::parse(r#"<root xmlns="urn:d"><x:item xmlns:x="urn:c"/><item/></root>"#);
        let root = tree.root().unwrap();
        assert_eq!(root.namespace(), Some("urn:d"));
        let children: Vec<&Element> = root.children().collect();
        assert_eq!(children[0].namespace(), Some("urn:c"));
        assert_eq!(children[1].namespace(), Some("urn:d"));
    }

    #[test]
    fn test_attr_tolerant() {
        let tree = XmlTree::parse(r#"<blip xmlns:rel="urn:r" rel:embed="rId3"/>"#);
        let blip = tree.root().unwrap();
        assert_eq!(blip.attr("r:embed"), None);
        assert_eq!(blip.attr_tolerant("r:embed"), Some("rId3"));
        assert_eq!(blip.attr_tolerant("r:link"), None);
    }

    #[test]
    fn test_unclosed_elements_are_kept() {
        let tree = XmlTree::parse("<a><b><c>text");
        assert!(tree.is_malformed());
        let root = tree.root().unwrap();
        assert_eq!(root.name(), "a");
        assert_eq!(root.text(), "text");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let tree = XmlTree::parse("<a><b>one</a><c>two</c>");
        assert!(tree.is_malformed());
        let names: Vec<&str> = tree.document().children().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_input() {
        let tree = XmlTree::parse("");
        assert!(tree.root().is_none());
        assert!(!tree.is_malformed());
    }
}
