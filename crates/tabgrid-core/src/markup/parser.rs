//! Fragment parsing on top of quick-xml.
//!
//! Input is browser-exported HTML, not XML, so the reader runs with end
//! name checking off and the builder papers over the usual HTML
//! looseness: void elements without closing tags, stray end tags, and
//! elements left open at the end of the fragment.

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

use super::{Element, Node, is_void};
use crate::error::{Result, TabgridError};

/// Parses an HTML fragment into a forest of nodes.
///
/// Whitespace between tags is kept verbatim so that serializing the
/// tree reproduces the source layout.
pub fn parse_fragment(html: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(html);
    reader.trim_text(false);
    reader.check_end_names(false);

    let mut builder = Builder::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let mut element = Element::new(&String::from_utf8_lossy(e.name().as_ref()));
                for attr in e.html_attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
                    let value = match attr.unescape_value() {
                        Ok(value) => value.into_owned(),
                        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                    };
                    element.set_attr(&key, &value);
                }
                if is_void(&element.tag) {
                    builder.append(Node::Element(element));
                } else {
                    builder.open(element);
                }
            }
            Ok(Event::Empty(e)) => {
                let mut element = Element::new(&String::from_utf8_lossy(e.name().as_ref()));
                for attr in e.html_attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
                    let value = match attr.unescape_value() {
                        Ok(value) => value.into_owned(),
                        Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                    };
                    element.set_attr(&key, &value);
                }
                builder.append(Node::Element(element));
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                builder.close(&tag);
            }
            Ok(Event::Text(text)) => builder.append(Node::Text(decode_text(&text))),
            Ok(Event::CData(data)) => {
                builder.append(Node::Text(
                    String::from_utf8_lossy(data.as_ref()).into_owned(),
                ));
            }
            Ok(Event::Comment(text)) => {
                builder.append(Node::Comment(
                    String::from_utf8_lossy(text.as_ref()).into_owned(),
                ));
            }
            Ok(Event::Decl(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(TabgridError::Markup {
                    offset: reader.buffer_position(),
                    message: err.to_string(),
                });
            }
        }
    }
    Ok(builder.finish())
}

fn decode_text(text: &BytesText) -> String {
    match text.unescape_with(resolve_html_entity) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(text.as_ref()).into_owned(),
    }
}

/// Entities beyond the XML predefined set that show up in exported
/// table markup.
fn resolve_html_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{00A0}"),
        _ => None,
    }
}

struct Builder {
    roots: Vec<Node>,
    stack: Vec<Element>,
}

impl Builder {
    fn new() -> Builder {
        Builder {
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        } else {
            self.roots.push(node);
        }
    }

    fn open(&mut self, element: Element) {
        self.stack.push(element);
    }

    /// Closes the nearest open element with this tag, implicitly
    /// closing anything opened inside it. Stray end tags are dropped.
    fn close(&mut self, tag: &str) {
        if !self.stack.iter().any(|el| el.tag == tag) {
            return;
        }
        while let Some(element) = self.stack.pop() {
            let matched = element.tag == tag;
            self.append(Node::Element(element));
            if matched {
                break;
            }
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(element) = self.stack.pop() {
            self.append(Node::Element(element));
        }
        self.roots
    }
}
