//! Minimal XML element tree used by the message codec
//!
//! WeChat callback bodies are flat documents: a `<xml>` root holding leaf
//! elements, with an occasional wrapper (`Music`, `Articles/item`). This
//! module parses such documents into an owned tree and writes trees back out,
//! using `quick-xml` for tokenizing and escaping.
//!
//! ```rust,ignore
//! use wechat_oa_message::xml::XmlElement;
//!
//! let root = XmlElement::parse("<xml><Content><![CDATA[hi]]></Content></xml>")?;
//! assert_eq!(root.child_text("Content"), Some("hi"));
//! ```

use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::WechatError;

/// Name of the document root used by every WeChat callback payload
pub const ROOT: &str = "xml";

/// An element with its (already unescaped) text and ordered children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    text: String,
    cdata: bool,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leaf element written as escaped character data
    pub fn text_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Leaf element written as a CDATA section
    pub fn cdata_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            cdata: true,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text came from (or will be written as) CDATA
    pub fn is_cdata(&self) -> bool {
        self.cdata
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// First direct child with exactly this name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first direct child with exactly this name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(XmlElement::text)
    }

    /// All direct children with exactly this name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Parse a document and return its root element
    pub fn parse(input: &str) -> Result<XmlElement, WechatError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| WechatError::Xml(format!("{} at byte {}", e, reader.buffer_position())))?;

            match event {
                Event::Start(e) => {
                    if root.is_some() {
                        return Err(WechatError::Xml(
                            "content after document root".to_string(),
                        ));
                    }
                    stack.push(XmlElement::new(element_name(&e)?));
                }
                Event::Empty(e) => {
                    let element = XmlElement::new(element_name(&e)?);
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| WechatError::Xml(e.to_string()))?;
                    match stack.last_mut() {
                        Some(current) => current.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(WechatError::Xml(
                                "text outside of document root".to_string(),
                            ))
                        }
                    }
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|e| WechatError::Xml(format!("invalid UTF-8 in CDATA: {}", e)))?;
                    match stack.last_mut() {
                        Some(current) => {
                            current.text.push_str(text);
                            current.cdata = true;
                        }
                        None => {
                            return Err(WechatError::Xml(
                                "CDATA outside of document root".to_string(),
                            ))
                        }
                    }
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| WechatError::Xml("unbalanced end tag".to_string()))?;
                    // indentation between child elements is not content
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(WechatError::Xml(format!(
                "unexpected end of document inside <{}>",
                stack.last().map(XmlElement::name).unwrap_or_default()
            )));
        }

        root.ok_or_else(|| WechatError::Xml("document has no root element".to_string()))
    }

    /// Serialize this element (and its subtree) without an XML declaration
    pub fn to_xml_string(&self) -> Result<String, WechatError> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| WechatError::Xml(format!("invalid UTF-8 output: {}", e)))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), WechatError> {
        write_event(writer, Event::Start(BytesStart::new(self.name.as_str())))?;

        if let Some(c) = self.text.chars().find(|&c| !is_xml_char(c)) {
            return Err(WechatError::Xml(format!(
                "character U+{:04X} is not allowed in <{}>",
                c as u32, self.name
            )));
        }

        if !self.text.is_empty() || (self.cdata && self.children.is_empty()) {
            // "]]>" cannot appear inside a CDATA section
            if self.cdata && !self.text.contains("]]>") {
                write_event(writer, Event::CData(BytesCData::new(self.text.as_str())))?;
            } else {
                write_event(writer, Event::Text(BytesText::new(self.text.as_str())))?;
            }
        }

        for child in &self.children {
            child.write_to(writer)?;
        }

        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// `Char` production of XML 1.0; surrogates cannot occur in a `char`
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn element_name(start: &BytesStart<'_>) -> Result<String, WechatError> {
    std::str::from_utf8(start.name().as_ref())
        .map(str::to_string)
        .map_err(|e| WechatError::Xml(format!("invalid UTF-8 in element name: {}", e)))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), WechatError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(WechatError::Xml(
                "multiple root elements".to_string(),
            ))
        }
    }
    Ok(())
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), WechatError> {
    writer
        .write_event(event)
        .map_err(|e| WechatError::Xml(e.to_string()))
}
