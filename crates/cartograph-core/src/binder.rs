//! Binds graphical elements of an inlined diagram to activity ids.

use crate::config::BinderConfig;
use crate::error::Result;
use crate::identifier::{ActivityId, IdentifierMap, extract_identifier};
use roxmltree::NodeId;
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Diagram markup after it has been inlined into the page.
///
/// The markup is validated once on construction; [`Diagram::document`] re-parses it on demand so
/// node ids stay stable for the lifetime of the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    markup: String,
}

impl Diagram {
    pub fn inline(markup: impl Into<String>) -> Result<Self> {
        let markup = markup.into();
        parse_markup(&markup)?;
        Ok(Self { markup })
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn document(&self) -> Result<roxmltree::Document<'_>> {
        parse_markup(&self.markup)
    }
}

/// Parses diagram markup. Exports from desktop diagram tools routinely carry a DOCTYPE, so DTDs
/// are accepted.
pub fn parse_markup(text: &str) -> Result<roxmltree::Document<'_>> {
    let mut opt = roxmltree::ParsingOptions::default();
    opt.allow_dtd = true;
    Ok(roxmltree::Document::parse_with_options(text, opt)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeBinding {
    pub node: NodeId,
    /// Local element name, e.g. `g` or `rect`.
    pub element: String,
    pub embedded_id: String,
    pub activity_id: ActivityId,
    /// Byte range of the element in the diagram markup.
    pub range: Range<usize>,
}

/// The bindings of one diagram load, plus the hover state driven by pointer events.
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    bindings: Vec<ShapeBinding>,
    /// Every element inside a bound shape, mapped to its innermost binding.
    owners: FxHashMap<NodeId, usize>,
    highlighted: Option<usize>,
}

impl BindingSet {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ShapeBinding> {
        self.bindings.iter()
    }

    /// The binding whose shape is exactly `node`.
    pub fn get(&self, node: NodeId) -> Option<&ShapeBinding> {
        self.bindings.iter().find(|b| b.node == node)
    }

    /// The binding an event targeting `target` belongs to: the target itself or its nearest
    /// bound ancestor.
    pub fn resolve(&self, target: NodeId) -> Option<&ShapeBinding> {
        self.owners.get(&target).map(|&i| &self.bindings[i])
    }

    pub fn pointer_enter(&mut self, target: NodeId) -> Option<&ShapeBinding> {
        let idx = *self.owners.get(&target)?;
        self.highlighted = Some(idx);
        Some(&self.bindings[idx])
    }

    pub fn pointer_leave(&mut self, target: NodeId) {
        if self.owners.get(&target).copied() == self.highlighted {
            self.highlighted = None;
        }
    }

    pub fn highlighted(&self) -> Option<&ShapeBinding> {
        self.highlighted.map(|i| &self.bindings[i])
    }

    /// Activity to navigate to for a click on `target`, unless the press turned into a drag.
    pub fn click(&self, target: NodeId, allows_click: bool) -> Option<ActivityId> {
        let binding = self.resolve(target)?;
        if !allows_click {
            tracing::debug!(activity = %binding.activity_id, "click suppressed after drag");
            return None;
        }
        Some(binding.activity_id)
    }
}

impl<'a> IntoIterator for &'a BindingSet {
    type Item = &'a ShapeBinding;
    type IntoIter = std::slice::Iter<'a, ShapeBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeBinder {
    config: BinderConfig,
}

impl ShapeBinder {
    pub fn new(config: BinderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Scans every graphical descendant of `root` and binds those whose embedded identifier is
    /// present in `map`. Each call yields an independent set.
    pub fn bind_all(&self, root: roxmltree::Node<'_, '_>, map: &IdentifierMap) -> BindingSet {
        let mut set = BindingSet::default();
        let candidates = root
            .descendants()
            .skip(1)
            .filter(|n| n.is_element() && self.config.is_graphical(n.tag_name().name()));

        for node in candidates {
            let Some(embedded_id) = extract_identifier(node, &self.config.strategies) else {
                continue;
            };
            let Some(activity_id) = map.get(embedded_id) else {
                tracing::trace!(embedded_id, "shape identifier has no activity");
                continue;
            };

            let idx = set.bindings.len();
            set.bindings.push(ShapeBinding {
                node: node.id(),
                element: node.tag_name().name().to_string(),
                embedded_id: embedded_id.to_string(),
                activity_id,
                range: node.range(),
            });
            for inner in node.descendants().filter(|n| n.is_element()) {
                set.owners.insert(inner.id(), idx);
            }
        }

        tracing::debug!(bindings = set.len(), "bound diagram shapes");
        set
    }

    pub fn bind_diagram(&self, diagram: &Diagram, map: &IdentifierMap) -> Result<BindingSet> {
        let doc = diagram.document()?;
        Ok(self.bind_all(doc.root_element(), map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::VISIO_SVG_NAMESPACE;

    fn visio(body: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:v="{VISIO_SVG_NAMESPACE}">{body}</svg>"#
        )
    }

    fn find<'a, 'i>(doc: &'a roxmltree::Document<'i>, id: &str) -> roxmltree::Node<'a, 'i> {
        doc.descendants()
            .find(|n| n.attribute("id") == Some(id))
            .unwrap()
    }

    #[test]
    fn binds_only_mapped_shapes() {
        let svg = visio(r#"<g id="s1" v:mID="A1"><rect/></g><path d="M0 0"/>"#);
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let map: IdentifierMap = [("A1", 42)].into_iter().collect();

        let set = ShapeBinder::default().bind_all(doc.root_element(), &map);
        assert_eq!(set.len(), 1);
        let b = set.iter().next().unwrap();
        assert_eq!(b.activity_id, ActivityId(42));
        assert_eq!(b.embedded_id, "A1");
        assert_eq!(b.element, "g");

        let path = doc.descendants().find(|n| n.has_tag_name("path")).unwrap();
        assert!(set.resolve(path.id()).is_none());
    }

    #[test]
    fn unknown_identifiers_and_non_graphical_elements_are_skipped() {
        let svg = visio(
            r#"<title id="A1">x</title><g v:mID="Z9"/><defs><rect data-shape-id="A1"/></defs>"#,
        );
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let map: IdentifierMap = [("A1", 1)].into_iter().collect();
        let set = ShapeBinder::default().bind_all(doc.root_element(), &map);
        // `defs` is not graphical but its `rect` child is.
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().element, "rect");
    }

    #[test]
    fn root_element_itself_is_not_bound() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" data-shape-id="A1"/>"#;
        let doc = roxmltree::Document::parse(svg).unwrap();
        let map: IdentifierMap = [("A1", 1)].into_iter().collect();
        assert!(ShapeBinder::default().bind_all(doc.root_element(), &map).is_empty());
    }

    #[test]
    fn events_on_children_resolve_to_innermost_binding() {
        let svg = visio(
            r#"<g id="outer" v:mID="O"><rect id="r1"/><g id="inner" v:mID="I"><rect id="r2"/></g></g>"#,
        );
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let map: IdentifierMap = [("O", 1), ("I", 2)].into_iter().collect();
        let mut set = ShapeBinder::default().bind_all(doc.root_element(), &map);

        assert_eq!(set.click(find(&doc, "r1").id(), true), Some(ActivityId(1)));
        assert_eq!(set.click(find(&doc, "r2").id(), true), Some(ActivityId(2)));

        let r2 = find(&doc, "r2").id();
        assert_eq!(set.pointer_enter(r2).map(|b| b.activity_id), Some(ActivityId(2)));
        assert_eq!(set.highlighted().map(|b| b.embedded_id.as_str()), Some("I"));
        set.pointer_leave(find(&doc, "r1").id());
        assert!(set.highlighted().is_some());
        set.pointer_leave(r2);
        assert!(set.highlighted().is_none());
    }

    #[test]
    fn click_after_drag_is_suppressed() {
        let svg = visio(r#"<g id="s" v:mID="A1"/>"#);
        let doc = roxmltree::Document::parse(&svg).unwrap();
        let map: IdentifierMap = [("A1", 42)].into_iter().collect();
        let set = ShapeBinder::default().bind_all(doc.root_element(), &map);
        let s = find(&doc, "s").id();
        assert_eq!(set.click(s, false), None);
        assert_eq!(set.click(s, true), Some(ActivityId(42)));
    }

    #[test]
    fn rebinding_yields_a_fresh_set() {
        let svg = visio(r#"<g id="s" v:mID="A1"/>"#);
        let diagram = Diagram::inline(svg).unwrap();
        let map: IdentifierMap = [("A1", 42)].into_iter().collect();
        let binder = ShapeBinder::default();

        let mut first = binder.bind_diagram(&diagram, &map).unwrap();
        let node = first.iter().next().unwrap().node;
        first.pointer_enter(node);

        let second = binder.bind_diagram(&diagram, &map).unwrap();
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
        assert!(first.highlighted().is_some());
        assert!(second.highlighted().is_none());
    }

    #[test]
    fn inline_rejects_malformed_markup_and_accepts_doctype() {
        assert!(Diagram::inline("<svg><g></svg>").is_err());
        let with_dtd = r#"<?xml version="1.0"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        assert!(Diagram::inline(with_dtd).is_ok());
    }
}
