//! Response document plumbing shared by fields, entities and transformations.
//!
//! Encoding goes through a single `quick_xml::Writer` so nested elements are
//! written in place. Decoding builds a small element tree (see [`document`])
//! that the transformation decoder walks.

mod document;

pub(crate) use document::Element;

use crate::error::Result;
use quick_xml::escape::partial_escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Write;

/// Types that encode themselves as a fragment of the response document.
pub trait ToXml {
    /// Write this value's element(s) to an existing writer
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()>;

    /// Encode to a standalone string (no XML declaration)
    fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_xml(&mut writer)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

/// Write element text. Only markup characters are escaped; no character
/// validity checking is done, so control characters pass through untouched.
pub(crate) fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    }
    Ok(())
}

/// Escape an attribute value for a double-quoted attribute. Tab, newline and
/// carriage return become character references so parsers do not normalize
/// them to spaces.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

/// Add `key="value"` to a start tag, escaping the value with [`escape_attribute`]
pub(crate) fn push_attribute(start: &mut BytesStart<'_>, key: &str, value: &str) {
    start.push_attribute(Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escape_attribute(value).into_bytes()),
    });
}

/// Write `<name>text</name>`. An empty text still yields an explicit end tag.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    write_text(writer, text)?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
