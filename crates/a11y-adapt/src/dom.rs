//! Mutable HTML document built on html5ever's reference DOM.
//!
//! Every operation is synchronous and edits the shared tree in place. Lookups
//! that find nothing return `None` or an empty list; structural insertions
//! against a node without a parent do nothing and report `false`.

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

use crate::types::{AdaptError, AdaptResult};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A parsed document, owned by exactly one pipeline run.
pub struct Document {
    dom: RcDom,
}

/// A handle to one node of a [`Document`].
#[derive(Clone)]
pub struct NodeRef(Handle);

impl Document {
    /// Parse a full HTML document. The parser never fails; malformed input is
    /// repaired the way browsers repair it, so `<head>` and `<body>` always
    /// exist afterwards.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// The document node itself.
    pub fn root(&self) -> NodeRef {
        NodeRef(self.dom.document.clone())
    }

    /// First element with the given tag (and class, when given), in document order.
    pub fn find_first(&self, tag: &str, class: Option<&str>) -> Option<NodeRef> {
        self.root().find_first(tag, class)
    }

    /// All elements with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodeRef> {
        self.find_all_of(&[tag])
    }

    /// All elements whose tag is any of `tags`, in document order.
    pub fn find_all_of(&self, tags: &[&str]) -> Vec<NodeRef> {
        descendants(&self.dom.document)
            .into_iter()
            .filter(|h| element_name(h).is_some_and(|name| tags.contains(&name)))
            .map(NodeRef)
            .collect()
    }

    pub fn head(&self) -> Option<NodeRef> {
        self.find_first("head", None)
    }

    pub fn body(&self) -> Option<NodeRef> {
        self.find_first("body", None)
    }

    /// Create a detached HTML element.
    pub fn create_element(&self, tag: &str) -> NodeRef {
        NodeRef(Node::new(NodeData::Element {
            name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
            attrs: RefCell::new(Vec::new()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point: false,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeRef {
        NodeRef(new_text(text))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: &NodeRef, child: &NodeRef) {
        detach(&child.0);
        child.0.parent.set(Some(Rc::downgrade(&parent.0)));
        parent.0.children.borrow_mut().push(child.0.clone());
    }

    /// Insert `child` as the first child of `parent`, detaching it first.
    pub fn prepend_child(&mut self, parent: &NodeRef, child: &NodeRef) {
        detach(&child.0);
        child.0.parent.set(Some(Rc::downgrade(&parent.0)));
        parent.0.children.borrow_mut().insert(0, child.0.clone());
    }

    /// Insert `node` as the sibling immediately following `anchor`.
    ///
    /// Returns `false` without touching the tree when `anchor` has no parent.
    pub fn insert_after(&mut self, anchor: &NodeRef, node: &NodeRef) -> bool {
        let Some(parent) = parent_of(&anchor.0) else {
            return false;
        };
        detach(&node.0);
        let mut children = parent.children.borrow_mut();
        let Some(index) = children.iter().position(|c| Rc::ptr_eq(c, &anchor.0)) else {
            return false;
        };
        node.0.parent.set(Some(Rc::downgrade(&parent)));
        children.insert(index + 1, node.0.clone());
        true
    }

    /// Remove `node` (and its subtree) from the tree.
    pub fn detach(&mut self, node: &NodeRef) {
        detach(&node.0);
    }

    /// Replace all children of `node` with a single text node.
    pub fn set_text(&mut self, node: &NodeRef, text: &str) {
        let old: Vec<Handle> = node.0.children.borrow_mut().drain(..).collect();
        for child in &old {
            child.parent.set(None);
        }
        let text_node = new_text(text);
        text_node.parent.set(Some(Rc::downgrade(&node.0)));
        node.0.children.borrow_mut().push(text_node);
    }

    /// Serialize back to markup the same parser can read.
    pub fn serialize(&self) -> AdaptResult<String> {
        let mut out = Vec::new();
        let handle: SerializableHandle = self.dom.document.clone().into();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut out, &handle, opts).map_err(|e| AdaptError::Serialize(e.to_string()))?;
        String::from_utf8(out).map_err(|e| AdaptError::Serialize(e.to_string()))
    }
}

impl NodeRef {
    /// Lowercase tag name, or `None` for non-element nodes.
    pub fn tag_name(&self) -> Option<String> {
        element_name(&self.0).map(str::to_string)
    }

    pub fn is_element(&self, tag: &str) -> bool {
        element_name(&self.0) == Some(tag)
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == name)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, overwriting any existing value. No-op on non-elements.
    pub fn set_attr(&self, name: &str, value: &str) {
        let NodeData::Element { attrs, .. } = &self.0.data else {
            return;
        };
        let mut attrs = attrs.borrow_mut();
        if let Some(existing) = attrs.iter_mut().find(|a| &*a.name.local == name) {
            existing.value = StrTendril::from_slice(value);
        } else {
            attrs.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from_slice(value),
            });
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attr(&self, name: &str) -> bool {
        let NodeData::Element { attrs, .. } = &self.0.data else {
            return false;
        };
        let mut attrs = attrs.borrow_mut();
        let before = attrs.len();
        attrs.retain(|a| &*a.name.local != name);
        attrs.len() != before
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for handle in descendants(&self.0) {
            if let NodeData::Text { contents } = &handle.data {
                out.push_str(&contents.borrow());
            }
        }
        out
    }

    /// The text of this node when its only child is a single text node.
    pub fn sole_text(&self) -> Option<String> {
        let children = self.0.children.borrow();
        match children.as_slice() {
            [only] => match &only.data {
                NodeData::Text { contents } => Some(contents.borrow().to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<NodeRef> {
        parent_of(&self.0).map(NodeRef)
    }

    /// The next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self) -> Option<NodeRef> {
        let parent = parent_of(&self.0)?;
        let children = parent.children.borrow();
        let index = children.iter().position(|c| Rc::ptr_eq(c, &self.0))?;
        children[index + 1..]
            .iter()
            .find(|c| matches!(c.data, NodeData::Element { .. }))
            .cloned()
            .map(NodeRef)
    }

    pub fn element_children(&self) -> Vec<NodeRef> {
        self.0
            .children
            .borrow()
            .iter()
            .filter(|c| matches!(c.data, NodeData::Element { .. }))
            .cloned()
            .map(NodeRef)
            .collect()
    }

    /// First descendant element with the given tag (and class, when given).
    pub fn find_first(&self, tag: &str, class: Option<&str>) -> Option<NodeRef> {
        descendants(&self.0)
            .into_iter()
            .map(NodeRef)
            .find(|node| node.is_element(tag) && class.map_or(true, |c| node.has_class(c)))
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match element_name(&self.0) {
            Some(name) => write!(f, "NodeRef(<{name}>)"),
            None => write!(f, "NodeRef(#non-element)"),
        }
    }
}

fn element_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

fn parent_of(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    handle.parent.set(weak);
    parent
}

fn detach(handle: &Handle) {
    if let Some(parent) = handle.parent.take().and_then(|w| w.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(c, handle));
    }
}

/// Pre-order descendants of `root`, excluding `root` itself.
fn descendants(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(handle) = stack.pop() {
        stack.extend(handle.children.borrow().iter().rev().cloned());
        out.push(handle);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html><html><head><title>T</title></head>\
        <body><div class=\"hero\"><p class=\"lead intro\">Hello</p><p>Other</p></div>\
        <img src=\"a.png\"><img src=\"b.png\" alt=\"B\"></body></html>";

    #[test]
    fn test_parse_synthesizes_head_and_body() {
        let doc = Document::parse("<p>bare</p>");
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
    }

    #[test]
    fn test_find_first_with_class() {
        let doc = Document::parse(PAGE);
        let lead = doc.find_first("p", Some("lead")).unwrap();
        assert_eq!(lead.text(), "Hello");
        assert!(doc.find_first("p", Some("missing")).is_none());
        assert!(doc.find_first("video", None).is_none());
    }

    #[test]
    fn test_find_all_in_document_order() {
        let doc = Document::parse(PAGE);
        let imgs = doc.find_all("img");
        assert_eq!(imgs.len(), 2);
        assert_eq!(imgs[0].attr("src").as_deref(), Some("a.png"));
        assert_eq!(imgs[1].attr("alt").as_deref(), Some("B"));
    }

    #[test]
    fn test_attribute_roundtrip() {
        let doc = Document::parse(PAGE);
        let img = doc.find_first("img", None).unwrap();
        assert!(!img.has_attr("alt"));
        img.set_attr("alt", "a picture");
        img.set_attr("alt", "a red circle");
        assert_eq!(img.attr("alt").as_deref(), Some("a red circle"));
        assert!(img.remove_attr("alt"));
        assert!(!img.remove_attr("alt"));
    }

    #[test]
    fn test_insert_after_places_sibling() {
        let mut doc = Document::parse(PAGE);
        let hero = doc.find_first("div", Some("hero")).unwrap();
        let note = doc.create_element("aside");
        assert!(doc.insert_after(&hero, &note));
        assert!(hero.next_element_sibling().unwrap().ptr_eq(&note));
    }

    #[test]
    fn test_insert_after_detached_anchor_is_noop() {
        let mut doc = Document::parse(PAGE);
        let orphan = doc.create_element("div");
        let node = doc.create_element("span");
        assert!(!doc.insert_after(&orphan, &node));
        assert!(node.parent().is_none());
    }

    #[test]
    fn test_prepend_child_becomes_first() {
        let mut doc = Document::parse(PAGE);
        let body = doc.body().unwrap();
        let banner = doc.create_element("div");
        banner.set_attr("id", "banner");
        doc.prepend_child(&body, &banner);
        assert!(body.element_children()[0].ptr_eq(&banner));
    }

    #[test]
    fn test_set_text_and_sole_text() {
        let mut doc = Document::parse(PAGE);
        let lead = doc.find_first("p", Some("lead")).unwrap();
        assert_eq!(lead.sole_text().as_deref(), Some("Hello"));
        doc.set_text(&lead, "Hi");
        assert_eq!(lead.text(), "Hi");
        let hero = doc.find_first("div", Some("hero")).unwrap();
        assert!(hero.sole_text().is_none());
    }

    #[test]
    fn test_serialize_reparses_identically() {
        let mut doc = Document::parse(PAGE);
        let head = doc.head().unwrap();
        let style = doc.create_element("style");
        doc.append_child(&head, &style);
        doc.set_text(&style, "p > a { color: red; }");
        let html = doc.serialize().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<style>p > a { color: red; }</style>"));
        let again = Document::parse(&html).serialize().unwrap();
        assert_eq!(html, again);
    }

    #[test]
    fn test_detach_removes_subtree() {
        let mut doc = Document::parse(PAGE);
        let hero = doc.find_first("div", Some("hero")).unwrap();
        doc.detach(&hero);
        assert!(doc.find_first("p", Some("lead")).is_none());
        assert!(hero.parent().is_none());
    }
}
