use crate::error::{Result, TransformError};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Deepest element nesting accepted. Response documents are six levels deep;
/// the limit keeps tree teardown within the stack.
pub(crate) const MAX_DEPTH: usize = 256;

/// Child of an element: either a nested element or a run of text
#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(String),
}

/// An element of a parsed document with its attributes and children in document order
#[derive(Debug, Clone)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Parse a whole document and return its root element
    pub fn parse(xml: &str) -> Result<Element> {
        let mut reader = Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(TransformError::Structure(format!(
                            "Elements nested deeper than {} levels",
                            MAX_DEPTH
                        )));
                    }
                    stack.push(Element::from_start(&e)?);
                }
                Ok(Event::Empty(e)) => {
                    let element = Element::from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        TransformError::Structure("Unexpected closing tag".to_string())
                    })?;
                    element.drop_layout_whitespace();
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    let text = unescape(utf8(e.as_ref())?)
                        .map_err(|e| TransformError::Structure(format!("Bad text content: {}", e)))?;
                    push_text(&mut stack, &text);
                }
                Ok(Event::CData(e)) => {
                    push_text(&mut stack, utf8(e.as_ref())?);
                }
                Ok(Event::GeneralRef(e)) => {
                    // Entity and character references arrive separately from the text around them
                    let reference = format!("&{};", utf8(e.as_ref())?);
                    let text = unescape(&reference).map_err(|e| {
                        TransformError::Structure(format!("Bad reference {}: {}", reference, e))
                    })?;
                    push_text(&mut stack, &text);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(TransformError::Structure(format!(
                        "XML parse error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(TransformError::Structure(format!(
                "Element <{}> is never closed",
                open.name
            )));
        }

        root.ok_or_else(|| TransformError::Structure("Document has no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Element> {
        let name = utf8(start.name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                TransformError::Structure(format!("Bad attribute on <{}>: {}", name, e))
            })?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = unescape(utf8(attr.value.as_ref())?)
                .map_err(|e| TransformError::Structure(format!("Bad attribute {}: {}", key, e)))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Whitespace between child elements is layout, not content.
    /// Leaf elements keep theirs.
    fn drop_layout_whitespace(&mut self) {
        let has_elements = self
            .children
            .iter()
            .any(|child| matches!(child, Node::Element(_)));
        if has_elements {
            self.children.retain(|child| match child {
                Node::Text(text) => !text.trim().is_empty(),
                Node::Element(_) => true,
            });
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute with the given name, if present
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child element with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Direct child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// This element and every element below it with the given name, in document order
    pub fn descendants_or_self<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            if element.name == name {
                found.push(element);
            }
            let children: Vec<&Element> = element.elements().collect();
            pending.extend(children.into_iter().rev());
        }
        found
    }

    /// Concatenated text of all descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut pending: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = pending.pop() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(e) => pending.extend(e.children.iter().rev()),
            }
        }
        out
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| TransformError::Structure(format!("Document is not valid UTF-8: {}", e)))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(TransformError::Structure(format!(
            "Second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) {
    // Text outside the root element (leading/trailing whitespace) is not content
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}
