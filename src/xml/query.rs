//! Namespace-tolerant element lookup.
//!
//! Producers disagree on how they spell OOXML names: most write `c:ser`,
//! some bind a different prefix to the chart namespace, some drop the prefix
//! entirely. A selector is a space-separated descendant path of logical
//! names (`"c:tx c:strRef c:v"`), and [`find_by_tag`] runs it through
//! [`STRATEGIES`] in order, returning the first non-empty result.

use super::tree::Element;

/// Namespace URIs conventionally bound to each prefix, transitional first.
const WELL_KNOWN_NAMESPACES: &[(&str, &[&str])] = &[
    (
        "a",
        &[
            "http://schemas.openxmlformats.org/drawingml/2006/main",
            "http://purl.oclc.org/ooxml/drawingml/main",
        ],
    ),
    (
        "p",
        &[
            "http://schemas.openxmlformats.org/presentationml/2006/main",
            "http://purl.oclc.org/ooxml/presentationml/main",
        ],
    ),
    (
        "c",
        &[
            "http://schemas.openxmlformats.org/drawingml/2006/chart",
            "http://purl.oclc.org/ooxml/drawingml/chart",
        ],
    ),
    (
        "r",
        &[
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
            "http://purl.oclc.org/ooxml/officeDocument/relationships",
        ],
    ),
    (
        "pic",
        &[
            "http://schemas.openxmlformats.org/drawingml/2006/picture",
            "http://purl.oclc.org/ooxml/drawingml/picture",
        ],
    ),
];

/// One step of a selector path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step<'s> {
    qualified: &'s str,
    prefix: Option<&'s str>,
    local: &'s str,
}

impl<'s> Step<'s> {
    fn parse(token: &'s str) -> Self {
        match token.split_once(':') {
            Some((prefix, local)) => Self {
                qualified: token,
                prefix: Some(prefix),
                local,
            },
            None => Self {
                qualified: token,
                prefix: None,
                local: token,
            },
        }
    }
}

/// How a selector step is compared against an element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Literal qualified name (`c:ser` matches only `c:ser`).
    EscapedPrefixed,
    /// Prefix resolved to its well-known namespace URI, so `ns0:ser` bound to
    /// the chart namespace matches `c:ser`.
    ResolvedPrefixed,
    /// Unprefixed tag equal to the bare local name.
    Unprefixed,
    /// Local name only, whatever the prefix.
    LocalName,
}

/// Lookup order. The first strategy that yields a match wins.
pub const STRATEGIES: [Strategy; 4] = [
    Strategy::EscapedPrefixed,
    Strategy::ResolvedPrefixed,
    Strategy::Unprefixed,
    Strategy::LocalName,
];

impl Strategy {
    fn matches(self, element: &Element, step: &Step<'_>) -> bool {
        match self {
            Strategy::EscapedPrefixed => step.prefix.is_some() && element.name() == step.qualified,
            Strategy::ResolvedPrefixed => {
                let (Some(prefix), Some(namespace)) = (step.prefix, element.namespace()) else {
                    return false;
                };
                element.local_name() == step.local
                    && WELL_KNOWN_NAMESPACES
                        .iter()
                        .find(|(known, _)| *known == prefix)
                        .is_some_and(|(_, uris)| uris.contains(&namespace))
            }
            Strategy::Unprefixed => element.name() == step.local,
            Strategy::LocalName => element.local_name() == step.local,
        }
    }

    /// Descendants of `scope` matching the whole path, in document order.
    fn select<'a>(self, scope: &'a Element, steps: &[Step<'_>]) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(scope, 0, steps, &mut found);
        found
    }

    // `matched` counts the leading steps already satisfied by ancestors.
    // Greedy ancestor matching is sufficient for descendant combinators.
    fn collect<'a>(
        self,
        element: &'a Element,
        matched: usize,
        steps: &[Step<'_>],
        found: &mut Vec<&'a Element>,
    ) {
        let last = steps.len() - 1;
        for child in element.children() {
            if matched == last && self.matches(child, &steps[last]) {
                found.push(child);
            }
            let next = if matched < last && self.matches(child, &steps[matched]) {
                matched + 1
            } else {
                matched
            };
            self.collect(child, next, steps, found);
        }
    }
}

fn parse_selector(selector: &str) -> Vec<Step<'_>> {
    selector.split_whitespace().map(Step::parse).collect()
}

/// All descendants of `scope` matching `selector`.
///
/// Strategies are tried lazily in [`STRATEGIES`] order; an empty result
/// means no strategy matched. Never fails.
pub fn find_by_tag<'a>(scope: &'a Element, selector: &str) -> Vec<&'a Element> {
    let steps = parse_selector(selector);
    if steps.is_empty() {
        return Vec::new();
    }
    STRATEGIES
        .iter()
        .map(|strategy| strategy.select(scope, &steps))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// First descendant matching `selector`.
pub fn find_first<'a>(scope: &'a Element, selector: &str) -> Option<&'a Element> {
    find_by_tag(scope, selector).into_iter().next()
}

/// Direct children of `element` named by a single logical name.
pub fn children_by_tag<'a>(element: &'a Element, name: &str) -> Vec<&'a Element> {
    let step = Step::parse(name.trim());
    if step.local.is_empty() {
        return Vec::new();
    }
    STRATEGIES
        .iter()
        .map(|strategy| {
            element
                .children()
                .filter(|child| strategy.matches(child, &step))
                .collect::<Vec<_>>()
        })
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Trimmed, non-empty text of every element matching `selector`.
pub fn texts(scope: &Element, selector: &str) -> Vec<String> {
    find_by_tag(scope, selector)
        .into_iter()
        .map(|el| el.text().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// First non-empty text found by trying `selectors` in order.
pub fn first_text(scope: &Element, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| texts(scope, selector).into_iter().next())
}

/// Whether any element matches `selector`.
pub fn exists(scope: &Element, selector: &str) -> bool {
    !find_by_tag(scope, selector).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlTree;

    const CHART_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

    fn names<'a>(elements: &[&'a Element]) -> Vec<&'a str> {
        elements.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_prefixed_lookup() {
        let tree = XmlTree::parse(&format!(
            r#"<c:chartSpace xmlns:c="{}"><c:ser><c:v>1</c:v></c:ser><c:ser/></c:chartSpace>"#,
            CHART_NS
        ));
        let found = find_by_tag(tree.document(), "c:ser");
        assert_eq!(found.len(), 2);
        assert_eq!(texts(tree.document(), "c:ser c:v"), vec!["1"]);
    }

    #[test]
    fn test_document_without_prefixes() {
        let tree = XmlTree::parse(
            r#"<chartSpace><chart><ser><tx><v>Revenue</v></tx></ser></chart></chartSpace>"#,
        );
        let found = find_by_tag(tree.document(), "c:ser");
        assert_eq!(names(&found), vec!["ser"]);
        assert_eq!(
            first_text(tree.document(), &["c:ser c:tx c:v"]),
            Some("Revenue".to_string())
        );
    }

    #[test]
    fn test_foreign_prefix_bound_to_known_namespace() {
        let tree = XmlTree::parse(&format!(
            r#"<ns0:chartSpace xmlns:ns0="{}"><ns0:ser/><other:ser xmlns:other="urn:x"/></ns0:chartSpace>"#,
            CHART_NS
        ));
        // The namespace-resolved strategy wins before the local-name one can
        // pull in the unrelated `other:ser`.
        let found = find_by_tag(tree.document(), "c:ser");
        assert_eq!(names(&found), vec!["ns0:ser"]);
    }

    #[test]
    fn test_local_name_fallback() {
        let tree = XmlTree::parse(r#"<x:root xmlns:x="urn:x"><x:pic/><x:pic/></x:root>"#);
        let found = find_by_tag(tree.document(), "p:pic");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_first_strategy_wins() {
        let tree = XmlTree::parse(r#"<root xmlns:p="urn:p"><p:sp/><sp/></root>"#);
        let found = find_by_tag(tree.document(), "p:sp");
        assert_eq!(names(&found), vec!["p:sp"]);
    }

    #[test]
    fn test_descendant_path_order() {
        let tree = XmlTree::parse(
            r#"<r><a:p xmlns:a="urn:a"><a:t>one</a:t></a:p><a:t xmlns:a="urn:a">loose</a:t><a:p xmlns:a="urn:a"><a:r><a:t>two</a:t></a:r></a:p></r>"#,
        );
        assert_eq!(texts(tree.document(), "a:p a:t"), vec!["one", "two"]);
        assert_eq!(texts(tree.document(), "a:t"), vec!["one", "loose", "two"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let tree = XmlTree::parse("<root><a/></root>");
        assert!(find_by_tag(tree.document(), "c:ser").is_empty());
        assert!(find_by_tag(tree.document(), "   ").is_empty());
        assert!(find_first(tree.document(), "c:ser").is_none());
        assert!(!exists(tree.document(), "c:ser"));
        assert_eq!(first_text(tree.document(), &["c:title", "title"]), None);
    }

    #[test]
    fn test_children_by_tag_is_direct_only() {
        let tree = XmlTree::parse(
            r#"<p:grpSp xmlns:p="urn:p"><p:sp/><p:grpSp><p:sp/></p:grpSp><p:sp/></p:grpSp>"#,
        );
        let group = tree.root().unwrap();
        assert_eq!(children_by_tag(group, "p:sp").len(), 2);
        assert_eq!(find_by_tag(group, "p:sp").len(), 3);
    }
}
