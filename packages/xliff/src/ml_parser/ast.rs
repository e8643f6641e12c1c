//! ML Parser AST
//!
//! Markup tree produced by the XML parser.

use crate::parse_util::ParseSourceSpan;

/// Node type union
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
    Expansion(Expansion),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Element(el) => &el.source_span,
            Node::Text(text) => &text.source_span,
            Node::Comment(comment) => &comment.source_span,
            Node::Expansion(expansion) => &expansion.source_span,
        }
    }
}

/// Text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Text {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Text { value, source_span }
    }
}

/// Comment node. `value` is trimmed, `None` for an empty comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub value: Option<String>,
    pub source_span: ParseSourceSpan,
}

/// Expansion (ICU message format)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub switch_value: String,
    pub expansion_type: String,
    pub cases: Vec<ExpansionCase>,
    pub source_span: ParseSourceSpan,
}

/// Expansion case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionCase {
    pub value: String,
    pub expression: Vec<Node>,
    pub source_span: ParseSourceSpan,
}

/// Attribute node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Element node
///
/// `start_source_span` covers the opening tag. `end_source_span` covers the closing tag;
/// for a self-closing element it equals the opening tag, and it stays `None` for an
/// element that was never closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub is_self_closing: bool,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
    pub end_source_span: Option<ParseSourceSpan>,
}

impl Element {
    /// Value of the first attribute called `name`
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Raw source between the opening and the closing tag.
    /// Empty for self-closing and unclosed elements.
    pub fn inner_source(&self) -> &str {
        let end_span = match &self.end_source_span {
            Some(span) if !self.is_self_closing => span,
            _ => return "",
        };
        let content = &self.start_source_span.end.file.content;
        let start = self.start_source_span.end.offset;
        let end = end_span.start.offset;
        if start <= end && end <= content.len() {
            &content[start..end]
        } else {
            ""
        }
    }
}
