//! Document model — parsing, structural edits and serialization over
//! `markup5ever_rcdom`.
//!
//! A `<template>` element keeps its wrapped content in `template_contents`,
//! a detached `Document` node that plays the role of a fragment. Inserting a
//! fragment anywhere inserts its children instead.

use std::cell::RefCell;
use std::io;
use std::rc::{Rc, Weak};

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use markup5ever::serialize::{Serialize, Serializer, TraversalScope};
use markup5ever::{Attribute, LocalName, Namespace, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::error::DomError;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse an HTML document and return its root `Document` node.
///
/// The HTML tokenizer reads `<?target data?>` as a bogus comment; those are
/// turned back into processing instructions so attribute directives survive.
pub fn parse_document(html: &str) -> Handle {
    let dom = html5ever::parse_document(RcDom::default(), Default::default()).one(html);
    restore_processing_instructions(&dom.document);
    dom.document
}

fn restore_processing_instructions(handle: &Handle) {
    let children: Vec<Handle> = handle.children.borrow().clone();
    for child in children {
        if let NodeData::Comment { contents } = &child.data {
            if let Some((target, data)) = split_bogus_instruction(contents) {
                let instruction = Node::new(NodeData::ProcessingInstruction {
                    target: StrTendril::from_slice(target),
                    contents: StrTendril::from_slice(data),
                });
                // The comment is a child we just listed, the replace cannot miss.
                let _ = replace_with(&child, instruction);
                continue;
            }
        }
        if let Some(content) = template_content(&child) {
            restore_processing_instructions(&content);
        }
        restore_processing_instructions(&child);
    }
}

fn split_bogus_instruction(comment: &str) -> Option<(&str, &str)> {
    let body = comment.strip_prefix('?')?;
    let body = body.strip_suffix('?').unwrap_or(body);
    let (target, data) = match body.find(char::is_whitespace) {
        Some(at) => (&body[..at], body[at..].trim()),
        None => (body, ""),
    };
    if target.is_empty() {
        return None;
    }
    Some((target, data))
}

// ---------------------------------------------------------------------------
// Construction and inspection
// ---------------------------------------------------------------------------

/// A new, detached text node.
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// A new, empty fragment.
pub fn new_fragment() -> Handle {
    Node::new(NodeData::Document)
}

pub fn is_fragment(node: &Handle) -> bool {
    matches!(node.data, NodeData::Document)
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

/// Local name of an element, `None` for every other node kind.
pub fn local_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

/// Target and data of a processing instruction.
pub fn instruction(node: &Handle) -> Option<(&str, &str)> {
    match &node.data {
        NodeData::ProcessingInstruction { target, contents } => Some((&**target, &**contents)),
        _ => None,
    }
}

/// Wrapped content of a `<template>` element.
pub fn template_content(node: &Handle) -> Option<Handle> {
    match &node.data {
        NodeData::Element {
            template_contents, ..
        } => template_contents.borrow().clone(),
        _ => None,
    }
}

pub fn parent(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

pub fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

fn index_in(parent: &Handle, node: &Handle) -> Option<usize> {
    parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, node))
}

/// Elements under `root` in document order, `root` excluded. Template content
/// is not entered.
pub fn elements(root: &Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    collect_elements(root, &mut out);
    out
}

fn collect_elements(node: &Handle, out: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if is_element(child) {
            out.push(child.clone());
        }
        collect_elements(child, out);
    }
}

/// Concatenated text of `node` and its descendants (DOM `textContent`).
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
        return;
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// All attributes of an element as `(name, value)` pairs, in source order.
pub fn attributes(node: &Handle) -> Vec<(String, String)> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return Vec::new();
    };
    attrs
        .borrow()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect()
}

pub fn attribute(node: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &node.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| attr.value.to_string())
}

/// Set (or add) an attribute. Returns `false` when `node` is not an element.
pub fn set_attribute(node: &Handle, name: &str, value: &str) -> bool {
    let NodeData::Element { attrs, .. } = &node.data else {
        return false;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs.iter_mut().find(|attr| &*attr.name.local == name) {
        Some(existing) => existing.value = StrTendril::from_slice(value),
        None => attrs.push(Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
            value: StrTendril::from_slice(value),
        }),
    }
    true
}

pub fn remove_attribute(node: &Handle, name: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs.borrow_mut().retain(|attr| &*attr.name.local != name);
    }
}

/// Rewrite every attribute value in place; `rewrite` returns `None` to keep a
/// value untouched.
pub fn rewrite_attributes(node: &Handle, mut rewrite: impl FnMut(&str) -> Option<String>) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };
    for attr in attrs.borrow_mut().iter_mut() {
        if let Some(value) = rewrite(&*attr.value) {
            attr.value = StrTendril::from_slice(&value);
        }
    }
}

// ---------------------------------------------------------------------------
// Structural edits
// ---------------------------------------------------------------------------

/// Deep copy of `node`, template content included. The copy is detached.
pub fn deep_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone)),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
    };
    let copy = Node::new(data);
    for child in node.children.borrow().iter() {
        append(&copy, deep_clone(child));
    }
    copy
}

/// Append `child` as the last child of `parent`, detaching it first.
/// A fragment contributes its children. Returns the inserted nodes.
pub fn append(parent: &Handle, child: Handle) -> Vec<Handle> {
    let nodes = insertion_nodes(child);
    for node in &nodes {
        node.parent.set(Some(Rc::downgrade(parent)));
    }
    parent.children.borrow_mut().extend(nodes.iter().cloned());
    nodes
}

/// Remove `node` from its parent.
pub fn detach(node: &Handle) -> Result<(), DomError> {
    let parent = parent(node).ok_or(DomError::Detached)?;
    let index = index_in(&parent, node).ok_or(DomError::NotAChild)?;
    parent.children.borrow_mut().remove(index);
    node.parent.set(None);
    Ok(())
}

/// Replace `node` in its parent with `replacement`, at the same position.
/// A fragment replacement inserts its children in order. Returns the nodes
/// now standing where `node` stood.
pub fn replace_with(node: &Handle, replacement: Handle) -> Result<Vec<Handle>, DomError> {
    let parent = parent(node).ok_or(DomError::Detached)?;
    index_in(&parent, node).ok_or(DomError::NotAChild)?;
    if Rc::ptr_eq(node, &replacement) {
        return Ok(vec![replacement]);
    }

    let nodes = insertion_nodes(replacement);
    // Taking the replacement out of its own parent may shift `node`.
    let index = index_in(&parent, node).ok_or(DomError::NotAChild)?;
    {
        let mut siblings = parent.children.borrow_mut();
        siblings.remove(index);
        for (offset, inserted) in nodes.iter().enumerate() {
            inserted.parent.set(Some(Rc::downgrade(&parent)));
            siblings.insert(index + offset, inserted.clone());
        }
    }
    node.parent.set(None);
    Ok(nodes)
}

/// Replace all children with a single text node (DOM `textContent` setter).
/// On a text node, replaces its data. Other node kinds are left alone.
pub fn set_text(node: &Handle, text: &str) {
    match &node.data {
        NodeData::Text { contents } => *contents.borrow_mut() = StrTendril::from_slice(text),
        NodeData::Element { .. } | NodeData::Document => {
            drop(take_children(node));
            if !text.is_empty() {
                append(node, new_text(text));
            }
        }
        _ => {}
    }
}

fn take_children(node: &Handle) -> Vec<Handle> {
    let children = std::mem::take(&mut *node.children.borrow_mut());
    for child in &children {
        child.parent.set(None);
    }
    children
}

fn insertion_nodes(node: Handle) -> Vec<Handle> {
    if is_fragment(&node) {
        return take_children(&node);
    }
    // Already detached is fine here.
    let _ = detach(&node);
    vec![node]
}

// ---------------------------------------------------------------------------
// Diagnostics helpers
// ---------------------------------------------------------------------------

/// Short, single-line description of a node for log output.
pub fn describe(node: &Handle) -> String {
    match &node.data {
        NodeData::Document => "#fragment".to_string(),
        NodeData::Doctype { name, .. } => format!("<!DOCTYPE {name}>"),
        NodeData::Text { contents } => {
            let text = contents.borrow();
            let short: String = text.chars().take(24).collect();
            if text.chars().count() > 24 {
                format!("#text {short:?}…")
            } else {
                format!("#text {short:?}")
            }
        }
        NodeData::Comment { contents } => format!("<!--{contents}-->"),
        NodeData::ProcessingInstruction { target, contents } => {
            format!("<?{target} {contents}?>")
        }
        NodeData::Element { name, attrs, .. } => {
            let mut out = format!("<{}", name.local);
            for attr in attrs.borrow().iter() {
                out.push_str(&format!(" {}=\"{}\"", attr.name.local, attr.value));
            }
            out.push('>');
            out
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serialize the children of `node` as HTML. Template content is written
/// inside its `<template>` element.
pub fn to_html(node: &Handle) -> io::Result<String> {
    write_html(node, TraversalScope::ChildrenOnly(None))
}

/// Serialize `node` itself and its subtree as HTML.
pub fn outer_html(node: &Handle) -> io::Result<String> {
    write_html(node, TraversalScope::IncludeNode)
}

fn write_html(node: &Handle, scope: TraversalScope) -> io::Result<String> {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };
    serialize(&mut bytes, &Markup(node.clone()), opts)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

struct Markup(Handle);

impl Serialize for Markup {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(&self.0, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in content_children(&self.0) {
                    write_node(&child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

fn content_children(node: &Handle) -> Vec<Handle> {
    match template_content(node) {
        Some(content) => children(&content),
        None => children(node),
    }
}

fn write_node<S: Serializer>(node: &Handle, serializer: &mut S) -> io::Result<()> {
    match &node.data {
        NodeData::Document => {
            for child in children(node) {
                write_node(&child, serializer)?;
            }
            Ok(())
        }
        NodeData::Doctype { name, .. } => serializer.write_doctype(name),
        NodeData::Text { contents } => serializer.write_text(&contents.borrow()),
        NodeData::Comment { contents } => serializer.write_comment(contents),
        NodeData::ProcessingInstruction { target, contents } => {
            serializer.write_processing_instruction(target, contents)
        }
        NodeData::Element { name, attrs, .. } => {
            {
                let attrs = attrs.borrow();
                serializer.start_elem(
                    name.clone(),
                    attrs.iter().map(|attr| (&attr.name, &*attr.value)),
                )?;
            }
            for child in content_children(node) {
                write_node(&child, serializer)?;
            }
            serializer.end_elem(name.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
