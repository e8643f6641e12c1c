//! XML Helper Module
//!
//! Minimal XML tree used to build serialized documents. Attribute and text values are
//! stored unescaped and escaped when the tree is serialized.

use indexmap::IndexMap;

/// XML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Tag(Tag),
    Text(Text),
    CR(CR),
    Declaration(Declaration),
}

/// XML Declaration node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Declaration {
    pub attrs: IndexMap<String, String>,
}

impl Declaration {
    pub fn new() -> Self {
        Declaration::default()
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }
}

/// XML Tag node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// XML Text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
}

impl Text {
    pub fn new(unescaped_value: impl Into<String>) -> Self {
        Text {
            value: unescaped_value.into(),
        }
    }
}

/// Line break followed by `indent` spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CR {
    pub indent: usize,
}

impl CR {
    pub fn new(indent: usize) -> Self {
        CR { indent }
    }
}

impl From<Tag> for Node {
    fn from(tag: Tag) -> Self {
        Node::Tag(tag)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<CR> for Node {
    fn from(cr: CR) -> Self {
        Node::CR(cr)
    }
}

impl From<Declaration> for Node {
    fn from(decl: Declaration) -> Self {
        Node::Declaration(decl)
    }
}

/// Serialize XML nodes to string
pub fn serialize(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        serialize_node(node, &mut out);
    }
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Tag(tag) => {
            out.push('<');
            out.push_str(&tag.name);
            serialize_attributes(&tag.attrs, out);
            if tag.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &tag.children {
                serialize_node(child, out);
            }
            out.push_str("</");
            out.push_str(&tag.name);
            out.push('>');
        }
        Node::Text(text) => out.push_str(&escape_xml(&text.value)),
        Node::CR(cr) => {
            out.push('\n');
            out.extend(std::iter::repeat(' ').take(cr.indent));
        }
        Node::Declaration(decl) => {
            out.push_str("<?xml");
            serialize_attributes(&decl.attrs, out);
            out.push_str(" ?>");
        }
    }
}

fn serialize_attributes(attrs: &IndexMap<String, String>, out: &mut String) {
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_xml(value));
        out.push('"');
    }
}

/// Drops every `CR` node, recursively
pub fn strip_line_breaks(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::CR(_) => None,
            Node::Tag(mut tag) => {
                tag.children = strip_line_breaks(tag.children);
                Some(Node::Tag(tag))
            }
            other => Some(other),
        })
        .collect()
}

/// Escape special XML characters
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
