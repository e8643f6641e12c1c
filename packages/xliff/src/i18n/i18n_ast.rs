//! I18n AST Module
//!
//! Translatable message tree exchanged with the serializers. Nodes carry no
//! source positions: a decoded tree only has to reproduce placeholder identity,
//! nesting and ICU structure.

use indexmap::IndexMap;

/// Line indexes are 1 based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSpan {
    pub file_path: String,
    pub start_line: usize,
}

impl MessageSpan {
    pub fn new(file_path: impl Into<String>, start_line: usize) -> Self {
        MessageSpan {
            file_path: file_path.into(),
            start_line,
        }
    }
}

/// Represents an i18n message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub nodes: Vec<Node>,
    pub sources: Vec<MessageSpan>,
    pub description: Option<String>,
    pub meaning: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<String>, nodes: Vec<Node>) -> Self {
        Message {
            id: id.into(),
            nodes,
            sources: Vec::new(),
            description: None,
            meaning: None,
        }
    }

    pub fn with_source(mut self, source: MessageSpan) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = Some(meaning.into());
        self
    }
}

/// Enum representing all possible i18n AST node types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(Text),
    Container(Container),
    Icu(Icu),
    TagPlaceholder(TagPlaceholder),
    Placeholder(Placeholder),
    IcuPlaceholder(IcuPlaceholder),
    BlockPlaceholder(BlockPlaceholder),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub value: String,
}

impl Text {
    pub fn new(value: impl Into<String>) -> Self {
        Text {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub children: Vec<Node>,
}

impl Container {
    pub fn new(children: Vec<Node>) -> Self {
        Container { children }
    }
}

/// ICU `plural` / `select` expression.
///
/// `expression` is the switch expression as written in the source. Serializers print
/// `expression_placeholder` when set and fall back to `expression` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icu {
    pub expression: String,
    pub type_: String,
    pub cases: IndexMap<String, Node>,
    pub expression_placeholder: Option<String>,
}

impl Icu {
    pub fn new(expression: impl Into<String>, type_: impl Into<String>, cases: IndexMap<String, Node>) -> Self {
        Icu {
            expression: expression.into(),
            type_: type_.into(),
            cases,
            expression_placeholder: None,
        }
    }

    pub fn with_expression_placeholder(mut self, name: impl Into<String>) -> Self {
        self.expression_placeholder = Some(name.into());
        self
    }

    /// Name printed for the switch expression
    pub fn printed_expression(&self) -> &str {
        self.expression_placeholder
            .as_deref()
            .unwrap_or(&self.expression)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPlaceholder {
    pub tag: String,
    pub start_name: String,
    pub close_name: String,
    pub children: Vec<Node>,
    pub is_void: bool,
}

impl TagPlaceholder {
    pub fn new(
        tag: impl Into<String>,
        start_name: impl Into<String>,
        close_name: impl Into<String>,
        children: Vec<Node>,
        is_void: bool,
    ) -> Self {
        TagPlaceholder {
            tag: tag.into(),
            start_name: start_name.into(),
            close_name: close_name.into(),
            children,
            is_void,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub value: String,
    pub name: String,
}

impl Placeholder {
    pub fn new(value: impl Into<String>, name: impl Into<String>) -> Self {
        Placeholder {
            value: value.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcuPlaceholder {
    pub value: Icu,
    pub name: String,
}

impl IcuPlaceholder {
    pub fn new(value: Icu, name: impl Into<String>) -> Self {
        IcuPlaceholder {
            value,
            name: name.into(),
        }
    }
}

/// Control flow block (`@if`, `@for`, ...) lifted out of the translatable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlaceholder {
    pub name: String,
    pub parameters: Vec<String>,
    pub start_name: String,
    pub close_name: String,
    pub children: Vec<Node>,
}

impl BlockPlaceholder {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<String>,
        start_name: impl Into<String>,
        close_name: impl Into<String>,
        children: Vec<Node>,
    ) -> Self {
        BlockPlaceholder {
            name: name.into(),
            parameters,
            start_name: start_name.into(),
            close_name: close_name.into(),
            children,
        }
    }
}

impl From<Text> for Node {
    fn from(node: Text) -> Self {
        Node::Text(node)
    }
}

impl From<Container> for Node {
    fn from(node: Container) -> Self {
        Node::Container(node)
    }
}

impl From<Icu> for Node {
    fn from(node: Icu) -> Self {
        Node::Icu(node)
    }
}

impl From<TagPlaceholder> for Node {
    fn from(node: TagPlaceholder) -> Self {
        Node::TagPlaceholder(node)
    }
}

impl From<Placeholder> for Node {
    fn from(node: Placeholder) -> Self {
        Node::Placeholder(node)
    }
}

impl From<IcuPlaceholder> for Node {
    fn from(node: IcuPlaceholder) -> Self {
        Node::IcuPlaceholder(node)
    }
}

impl From<BlockPlaceholder> for Node {
    fn from(node: BlockPlaceholder) -> Self {
        Node::BlockPlaceholder(node)
    }
}
