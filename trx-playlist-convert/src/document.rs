// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An arena-backed element tree for report documents.
//!
//! Only elements and their attributes are retained: text, comments and processing instructions
//! carry nothing the conversion needs. Elements are stored in document order, so the descendants
//! of an element occupy a contiguous range of the arena directly after it.

use crate::errors::MalformedInputError;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::borrow::Cow;

/// The identifier of an element within a [`Document`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementId(usize);

/// A single element in a [`Document`].
#[derive(Clone, Debug)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    parent: Option<ElementId>,
    // Index of this element within its parent's children.
    sibling_index: usize,
    children: Vec<ElementId>,
    // One past the last descendant of this element.
    subtree_end: usize,
}

impl Element {
    /// Returns the local name of this element, without any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unescaped value of the attribute with the given local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if this element carries all the given attributes.
    pub fn has_attributes(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.attribute(name).is_some())
    }

    /// Returns the parent of this element, or `None` for the root.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Returns the child elements of this element, in document order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// A parsed report document.
#[derive(Clone, Debug)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Parses a document from its text.
    ///
    /// Returns an error if the text is not well-formed: syntax errors, mismatched or unclosed
    /// tags, a missing root element, or more than one root element.
    pub fn parse(input: &str) -> Result<Self, MalformedInputError> {
        let mut reader = Reader::from_str(input);
        let mut elements: Vec<Element> = Vec::new();
        let mut open: Vec<ElementId> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|error| {
                MalformedInputError::new(error.to_string(), reader.buffer_position(), input)
            })?;
            match event {
                Event::Start(start) => {
                    let id = push_element(&mut elements, &open, &start, &reader, input)?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    push_element(&mut elements, &open, &start, &reader, input)?;
                }
                Event::End(_) => {
                    let Some(id) = open.pop() else {
                        return Err(MalformedInputError::new(
                            "closing tag without a matching opening tag",
                            reader.buffer_position(),
                            input,
                        ));
                    };
                    let end = elements.len();
                    elements[id.0].subtree_end = end;
                }
                Event::Text(text) => {
                    if open.is_empty() && !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(MalformedInputError::new(
                            "text outside of the root element",
                            reader.buffer_position(),
                            input,
                        ));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(id) = open.last() {
            return Err(MalformedInputError::new(
                format!("element `{}` is never closed", elements[id.0].name),
                input.len(),
                input,
            ));
        }
        if elements.is_empty() {
            return Err(MalformedInputError::new(
                "no root element",
                input.len(),
                input,
            ));
        }

        Ok(Self { elements })
    }

    /// Returns the root element.
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    /// Returns the element with the given identifier.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different document.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Returns the number of elements in this document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if this document has no elements. Parsed documents always have a root.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over all elements with the given local name, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ElementId> + 'a {
        self.ids().filter(move |&id| self.element(id).name == name)
    }

    /// Iterates over all elements with the given local name that carry the given attribute, in
    /// document order.
    pub fn elements_with_attribute<'a>(
        &'a self,
        name: &'a str,
        attribute: &'a str,
    ) -> impl Iterator<Item = ElementId> + 'a {
        self.elements_named(name)
            .filter(move |&id| self.element(id).attribute(attribute).is_some())
    }

    /// Returns the immediate parent of the given element.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).parent
    }

    /// Returns the immediate next sibling element of the given element.
    pub fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        self.following_siblings(id).next()
    }

    /// Iterates over the siblings following the given element, in document order.
    pub fn following_siblings(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        let element = self.element(id);
        let siblings = match element.parent {
            Some(parent) => &self.element(parent).children[element.sibling_index + 1..],
            None => &[],
        };
        siblings.iter().copied()
    }

    /// Iterates over all descendants of the given element, in document order.
    pub fn descendants(&self, id: ElementId) -> impl Iterator<Item = ElementId> + use<> {
        (id.0 + 1..self.elements[id.0].subtree_end).map(ElementId)
    }

    fn ids(&self) -> impl Iterator<Item = ElementId> + use<> {
        (0..self.elements.len()).map(ElementId)
    }
}

fn push_element(
    elements: &mut Vec<Element>,
    open: &[ElementId],
    start: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    input: &str,
) -> Result<ElementId, MalformedInputError> {
    let malformed = |message: String| {
        MalformedInputError::new(message, reader.buffer_position(), input)
    };

    let parent = open.last().copied();
    if parent.is_none() && !elements.is_empty() {
        return Err(malformed("more than one root element".to_owned()));
    }

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|error| malformed(error.to_string()))?;
        let key = decode_name(attribute.key.local_name().as_ref());
        let value = attribute
            .unescape_value()
            .map_err(|error| malformed(error.to_string()))?;
        attributes.push((key, value.into_owned()));
    }

    let id = ElementId(elements.len());
    let sibling_index = match parent {
        Some(parent) => {
            let children = &mut elements[parent.0].children;
            children.push(id);
            children.len() - 1
        }
        None => 0,
    };
    elements.push(Element {
        name: decode_name(start.local_name().as_ref()),
        attributes,
        parent,
        sibling_index,
        children: Vec::new(),
        // Overwritten when the closing tag is seen; empty elements have no descendants.
        subtree_end: id.0 + 1,
    });

    Ok(id)
}

// The input is a `str`, so names are always valid UTF-8 and this never allocates a replacement.
fn decode_name(name: &[u8]) -> String {
    match String::from_utf8_lossy(name) {
        Cow::Borrowed(name) => name.to_owned(),
        Cow::Owned(name) => name,
    }
}
