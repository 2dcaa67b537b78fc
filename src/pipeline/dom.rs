//! Thin helpers over html5ever's reference DOM.
//!
//! Parsing always produces a full document (`<html><head><body>` are
//! synthesised when missing), which matches how the reports are consumed.
//! Tree edits splice `children` vectors directly and keep the weak `parent`
//! back-pointers in sync.

use crate::error::DocReportError;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Parse an HTML string into a DOM.
pub fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Serialise a whole document, doctype included.
pub fn to_html(dom: &RcDom) -> Result<String, DocReportError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let document = SerializableHandle::from(dom.document.clone());
    serialize(&mut output, &document, opts)
        .map_err(|e| DocReportError::HtmlSerialization(e.to_string()))?;

    String::from_utf8(output)
        .map_err(|e| DocReportError::HtmlSerialization(format!("UTF-8 conversion failed: {}", e)))
}

/// Local tag name of an element, `None` for other node kinds.
pub fn tag_name(node: &Handle) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// Value of attribute `attr` on an element.
pub fn attribute(node: &Handle, attr: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == attr)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// True when the element's whitespace-separated `class` list contains `class`.
pub fn has_class(node: &Handle, class: &str) -> bool {
    attribute(node, "class")
        .map(|v| v.split_ascii_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Remove every attribute from an element.
pub fn clear_attributes(node: &Handle) {
    if let NodeData::Element { ref attrs, .. } = node.data {
        attrs.borrow_mut().clear();
    }
}

/// Depth-first pre-order list of all elements named `tag` under `root`.
pub fn find_elements(root: &Handle, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if tag_name(&node) == Some(tag) {
            found.push(node.clone());
        }
        // Reverse so the leftmost child is visited first.
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    found
}

/// Create a detached HTML element without attributes.
pub fn create_element(tag: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(tag)),
            attrs: RefCell::new(Vec::new()),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Point each child's parent link at `parent`.
pub fn adopt(parent: &Handle, children: &[Handle]) {
    for child in children {
        child.parent.set(Some(Rc::downgrade(parent)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_images_in_document_order() {
        let dom = parse(r#"<p><img src="a.png"></p><div><img src="b.png"><img src="c.png"></div>"#);
        let srcs: Vec<String> = find_elements(&dom.document, "img")
            .iter()
            .filter_map(|n| attribute(n, "src"))
            .collect();
        assert_eq!(srcs, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn class_matching_uses_tokens() {
        let dom = parse(r#"<div class="prompt input_prompt">x</div>"#);
        let div = &find_elements(&dom.document, "div")[0];
        assert!(has_class(div, "prompt"));
        assert!(has_class(div, "input_prompt"));
        assert!(!has_class(div, "prom"));
    }

    #[test]
    fn round_trip_keeps_markup() {
        let dom = parse("<!DOCTYPE html><html><head></head><body><p>A</p></body></html>");
        let html = to_html(&dom).unwrap();
        assert_eq!(
            html,
            "<!DOCTYPE html><html><head></head><body><p>A</p></body></html>"
        );
    }
}
