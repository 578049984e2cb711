//! XML property list documents and the merge step that grows them.
//!
//! A [`PlistDocument`] is always shaped `<plist><dict>…</dict></plist>`; the
//! first `dict` under `plist` is the *anchor* new entries are appended to.
//! Anything else found in an existing file (other children of `plist`,
//! comments, CDATA, attributes, the DOCTYPE) is carried through unchanged.

use std::{
    fs,
    io::{BufRead, ErrorKind, Write},
    path::Path,
};

use quick_xml::{
    Reader, Writer,
    escape::partial_escape,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{error::Error, traits::Parser};

const PLIST_DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An element holding a single text node, e.g. `<key>one</key>`.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut element = Self::new(name);
        if !text.is_empty() {
            element.children.push(Node::Text(text));
        }
        element
    }

    /// The first text or CDATA child.
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            Node::Text(text) | Node::CData(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Names of the `key` children of a `dict`, duplicates included.
    pub fn keys(&self) -> Vec<&str> {
        self.elements()
            .filter(|e| e.name == "key")
            .map(|e| e.text().unwrap_or_default())
            .collect()
    }

    /// The value element following the first `key` named `key`.
    pub fn value_for(&self, key: &str) -> Option<&Element> {
        let mut elements = self.elements();
        while let Some(element) = elements.next() {
            if element.name == "key" {
                let value = elements.next();
                if element.text() == Some(key) {
                    return value;
                }
            }
        }
        None
    }
}

/// Appends property list entries to a `dict` element.
///
/// Mirrors the shape of the written XML: `key` then its value.
pub struct DictBuilder<'a> {
    dict: &'a mut Element,
}

impl<'a> DictBuilder<'a> {
    pub fn new(dict: &'a mut Element) -> Self {
        Self { dict }
    }

    pub fn key(&mut self, name: &str) -> &mut Self {
        self.push(Element::with_text("key", name))
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.push(Element::with_text("string", value))
    }

    /// `<key>key</key><string>value</string>`.
    pub fn entry(&mut self, key: &str, value: &str) -> &mut Self {
        self.key(key).string(value)
    }

    /// Appends a nested `dict` filled by `build`.
    pub fn dict(&mut self, build: impl FnOnce(&mut DictBuilder<'_>)) -> &mut Self {
        let mut nested = Element::new("dict");
        build(&mut DictBuilder::new(&mut nested));
        self.push(nested)
    }

    fn push(&mut self, element: Element) -> &mut Self {
        self.dict.children.push(Node::Element(element));
        self
    }
}

/// An XML property list with a resolved anchor `dict`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlistDocument {
    doctype: Option<String>,
    prolog: Vec<String>,
    attributes: Vec<(String, String)>,
    leading: Vec<Node>,
    anchor: Element,
    trailing: Vec<Node>,
    epilog: Vec<String>,
    indent: usize,
}

impl Default for PlistDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PlistDocument {
    /// A fresh `<plist version="1.0"><dict/></plist>` document.
    pub fn new() -> Self {
        Self {
            doctype: Some(PLIST_DOCTYPE.to_string()),
            prolog: Vec::new(),
            attributes: vec![("version".to_string(), "1.0".to_string())],
            leading: Vec::new(),
            anchor: Element::new("dict"),
            trailing: Vec::new(),
            epilog: Vec::new(),
            indent: 4,
        }
    }

    /// Loads the document at `path`, or starts a new one if there is no file.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => Self::parse_bytes(bytes, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// The `dict` entries are appended to.
    pub fn anchor(&self) -> &Element {
        &self.anchor
    }

    /// A builder appending to the anchor.
    pub fn builder(&mut self) -> DictBuilder<'_> {
        DictBuilder::new(&mut self.anchor)
    }

    /// Number of `dict` elements directly under `plist`.
    pub fn root_dict_count(&self) -> usize {
        let others = self
            .leading
            .iter()
            .chain(&self.trailing)
            .filter(|node| matches!(node, Node::Element(e) if e.name == "dict"))
            .count();
        others + 1
    }

    fn parse_bytes(bytes: Vec<u8>, origin: &Path) -> Result<Self, Error> {
        let content = String::from_utf8(bytes)
            .map_err(|e| Error::malformed(origin, format!("not valid UTF-8: {}", e)))?;
        Self::parse(&content).map_err(|reason| Error::malformed(origin, reason))
    }

    /// Parses `content`, dropping whitespace-only text between elements.
    fn parse(content: &str) -> Result<Self, String> {
        let mut reader = Reader::from_str(content);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut doctype = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        // Whitespace-only text, kept only if it turns out to be the sole
        // content of a value element such as `<string> </string>`.
        let mut blank: Option<String> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| format!("{} (at byte {})", e, reader.error_position()))?;
            let pending = blank.take();
            match event {
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let element = element_from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| "unexpected closing tag".to_string())?;
                    if let Some(text) = pending {
                        if element.children.is_empty() && !is_container(&element.name) {
                            element.children.push(Node::Text(text));
                        }
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    if text.trim().is_empty() {
                        if !stack.is_empty() {
                            blank = Some(text.into_owned());
                        }
                        continue;
                    }
                    let parent = stack
                        .last_mut()
                        .ok_or_else(|| "text outside the root element".to_string())?;
                    parent.children.push(Node::Text(text.into_owned()));
                }
                Event::CData(e) => {
                    let parent = stack
                        .last_mut()
                        .ok_or_else(|| "CDATA outside the root element".to_string())?;
                    parent.children.push(Node::CData(lossy(&e)));
                }
                Event::Comment(e) => match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Comment(lossy(&e))),
                    None if root.is_none() => prolog.push(lossy(&e)),
                    None => epilog.push(lossy(&e)),
                },
                Event::DocType(e) => doctype = Some(lossy(&e).trim().to_string()),
                Event::Decl(_) | Event::PI(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("unclosed element <{}>", open.name));
        }
        let root = root.ok_or_else(|| "no root element".to_string())?;
        if root.name != "plist" {
            return Err(format!("root element is <{}>, expected <plist>", root.name));
        }

        let mut children = root.children;
        let position = children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.name == "dict"))
            .ok_or_else(|| "no <dict> under <plist>".to_string())?;
        let trailing = children.split_off(position + 1);
        let anchor = match children.pop() {
            Some(Node::Element(anchor)) => anchor,
            _ => return Err("no <dict> under <plist>".to_string()),
        };

        Ok(Self {
            doctype,
            prolog,
            attributes: root.attributes,
            leading: children,
            anchor,
            trailing,
            epilog,
            indent: 4,
        })
    }
}

fn is_container(name: &str) -> bool {
    matches!(name, "plist" | "dict" | "array")
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn element_from_start(start: &BytesStart) -> Result<Element, String> {
    let mut element = Element::new(lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element
            .attributes
            .push((lossy(attr.key.as_ref()), value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(format!("second root element <{}>", element.name)),
    }
    Ok(())
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), Error> {
    match node {
        Node::Element(element) => write_element(writer, element)?,
        Node::Text(text) => {
            check_chars(text)?;
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))))?
        }
        Node::CData(text) => {
            check_chars(text)?;
            writer.write_event(Event::CData(BytesCData::new(text.as_str())))?
        }
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

/// XML 1.0 has no escape for most control characters; they cannot be written.
fn check_chars(text: &str) -> Result<(), Error> {
    let is_xml_char = |c: char| {
        matches!(
            c,
            '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
        )
    };
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(Error::validation_error(format!(
            "character U+{:04X} cannot be written to a property list",
            u32::from(c)
        ))),
        None => Ok(()),
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), Error> {
    let start = BytesStart::new(element.name.as_str()).with_attributes(
        element
            .attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    );
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

impl Parser for PlistDocument {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_bytes(bytes, Path::new("<reader>"))
    }

    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::parse_bytes(fs::read(path)?, path)
    }

    /// Writes the document as UTF-8, indenting nested elements.
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', self.indent);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        if let Some(doctype) = &self.doctype {
            xml_writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
        }
        for comment in &self.prolog {
            xml_writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
        }

        let root = BytesStart::new("plist").with_attributes(
            self.attributes
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );
        xml_writer.write_event(Event::Start(root))?;
        for node in &self.leading {
            write_node(&mut xml_writer, node)?;
        }
        write_element(&mut xml_writer, &self.anchor)?;
        for node in &self.trailing {
            write_node(&mut xml_writer, node)?;
        }
        xml_writer.write_event(Event::End(BytesEnd::new("plist")))?;

        for comment in &self.epilog {
            xml_writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Loads-or-creates a property list, lets a builder append to its anchor and
/// writes the whole document back.
///
/// Every merge re-reads the file; nothing is cached between calls. An existing
/// file that cannot be parsed or has no `plist > dict` anchor fails with
/// [`Error::MalformedDocument`] and is left as it was. Entries are only ever
/// appended, so merging the same key twice leaves two `key` elements with that
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlistMerger {
    indent: usize,
}

impl Default for PlistMerger {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl PlistMerger {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    pub fn merge<P, F>(&self, path: P, build: F) -> Result<(), Error>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut DictBuilder<'_>) -> Result<(), Error>,
    {
        let path = path.as_ref();
        let mut document = PlistDocument::load_or_create(path)?.with_indent(self.indent);
        build(&mut document.builder())?;
        document.write_to(path)
    }
}
