//! Markup tree for HTML fragments.
//!
//! Documents are small exported fragments (tables wrapped in a little
//! prose), so the tree is a plain enum rather than an arena. Tag and
//! attribute names are stored lowercased; attribute order is preserved
//! so that serialization is stable across snapshot round-trips.

mod clean;
mod parser;
mod writer;

pub use clean::clean_html;
pub use parser::parse_fragment;
pub use writer::write_nodes;

/// Elements that never carry children and never get a closing tag.
const VOID_TAGS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// One node of a parsed fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Element {
        Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Replaces the attribute in place, or appends it.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attrs.iter_mut().find(|(key, _)| key == name) {
            entry.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| key != name);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_whitespace().any(|token| token == class))
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        match self.attr("class") {
            Some(current) if !current.trim().is_empty() => {
                let joined = format!("{} {}", current, class);
                self.set_attr("class", &joined);
            }
            _ => self.set_attr("class", class),
        }
    }

    /// Removes one class token. The attribute itself is kept, possibly
    /// empty, matching how class list mutation behaves in a browser;
    /// the clean-export pass strips empty class attributes.
    pub fn remove_class(&mut self, class: &str) {
        let Some(current) = self.attr("class") else {
            return;
        };
        if !current.split_whitespace().any(|token| token == class) {
            return;
        }
        let remaining = current
            .split_whitespace()
            .filter(|token| *token != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", &remaining);
    }

    /// Looks up one property of the inline style attribute.
    pub fn style_property(&self, property: &str) -> Option<String> {
        let style = self.attr("style")?;
        for segment in style.split(';') {
            let Some((key, value)) = segment.split_once(':') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case(property) {
                return Some(value.trim().to_string());
            }
        }
        None
    }

    /// Replaces or appends one property of the inline style attribute,
    /// keeping the other properties intact.
    pub fn set_style_property(&mut self, property: &str, value: &str) {
        let mut properties: Vec<(String, String)> = Vec::new();
        if let Some(style) = self.attr("style") {
            for segment in style.split(';') {
                if let Some((key, val)) = segment.split_once(':') {
                    properties.push((key.trim().to_string(), val.trim().to_string()));
                }
            }
        }
        if let Some(entry) = properties
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(property))
        {
            entry.1 = value.to_string();
        } else {
            properties.push((property.to_string(), value.to_string()));
        }
        let serialized = properties
            .iter()
            .map(|(key, val)| format!("{}: {};", key, val))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("style", &serialized);
    }

    /// Concatenated text of all descendant text nodes.
    pub fn inner_text(&self) -> String {
        fn collect(nodes: &[Node], out: &mut String) {
            for node in nodes {
                match node {
                    Node::Text(text) => out.push_str(text),
                    Node::Element(el) => collect(&el.children, out),
                    Node::Comment(_) => {}
                }
            }
        }
        let mut out = String::new();
        collect(&self.children, &mut out);
        out
    }

    /// Replaces all children with a single text node, or clears them
    /// when the text is empty.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    /// First descendant with the given tag, in document order.
    pub fn find_descendant_mut(&mut self, tag: &str) -> Option<&mut Element> {
        for child in &mut self.children {
            if let Node::Element(el) = child {
                if el.is_tag(tag) {
                    return Some(el);
                }
                if let Some(found) = el.find_descendant_mut(tag) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Visits every element in the forest, pre-order.
pub fn for_each_element_mut(nodes: &mut [Node], f: &mut impl FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            for_each_element_mut(&mut el.children, f);
        }
    }
}

/// Read-only variant of [`for_each_element_mut`].
pub fn for_each_element(nodes: &[Node], f: &mut impl FnMut(&Element)) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el);
            for_each_element(&el.children, f);
        }
    }
}
