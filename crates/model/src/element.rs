//! Generic attributed tree
//!
//! Settings are persisted as XML, but upgrades and the codec work on this
//! minimal in-memory tree instead: named elements with ordered string
//! attributes and ordered child elements. Text content is not retained.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use randomness_core::{RandomnessError, RandomnessResult};

/// A named node with attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element without attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns this element with attribute `key` set to `value`
    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Returns this element with `child` appended
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// The value of attribute `key`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set attribute `key`, keeping its position if it already exists
    pub fn set_attribute(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Remove attribute `key`, returning its value
    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(index).1)
    }

    /// Rename attribute `from` to `to`, returning whether it existed
    pub fn rename_attribute(&mut self, from: &str, to: &str) -> bool {
        match self.attributes.iter_mut().find(|(k, _)| k == from) {
            Some((key, _)) => {
                *key = to.to_string();
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// The first child named `name`
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|it| it.name == name)
    }

    /// The first child named `name`, mutably
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|it| it.name == name)
    }

    /// All children named `name`
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |it| it.name == name)
    }

    /// Calls `f` on this element and every descendant, parents before children
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// This element and every descendant, parents before children
    pub fn descendants(&self) -> Vec<&Element> {
        let mut all = vec![self];
        for child in &self.children {
            all.extend(child.descendants());
        }
        all
    }

    // ========================================================================
    // XML
    // ========================================================================

    /// Parse the root element of an XML document
    pub fn parse(xml: &str) -> RandomnessResult<Element> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();

        loop {
            match reader.read_event().map_err(RandomnessError::xml)? {
                Event::Start(start) => stack.push(Self::from_start(&reader, &start)?),
                Event::Empty(start) => {
                    let element = Self::from_start(&reader, &start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| RandomnessError::xml("Unexpected closing tag."))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Eof => return Err(RandomnessError::xml("Document has no root element.")),
                _ => {}
            }
        }
    }

    fn from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> RandomnessResult<Element> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(RandomnessError::xml)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .decode_and_unescape_value(reader.decoder())
                .map_err(RandomnessError::xml)?;
            element.attributes.push((key, value.into_owned()));
        }
        Ok(element)
    }

    /// Serialize this element as an indented XML document
    pub fn to_xml(&self) -> RandomnessResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(RandomnessError::xml)?;
        self.write(&mut writer)?;

        String::from_utf8(writer.into_inner()).map_err(RandomnessError::xml)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> RandomnessResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(RandomnessError::xml)?;
            return Ok(());
        }

        writer.write_event(Event::Start(start)).map_err(RandomnessError::xml)?;
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(RandomnessError::xml)?;
        Ok(())
    }
}
