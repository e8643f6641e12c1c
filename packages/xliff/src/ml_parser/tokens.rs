//! ML Parser Tokens
//!
//! Token stream produced by the lexer and consumed by the tree builder.

use crate::parse_util::ParseSourceSpan;

/// Token types for XML parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    TagOpenStart,
    TagOpenEnd,
    TagOpenEndVoid,
    TagClose,
    IncompleteTagOpen,
    Text,
    RawText,
    CommentStart,
    CommentEnd,
    CdataStart,
    CdataEnd,
    AttrName,
    AttrQuote,
    AttrValueText,
    DocType,
    ProcessingInstruction,
    ExpansionFormStart,
    ExpansionCaseValue,
    ExpansionCaseExpStart,
    ExpansionCaseExpEnd,
    ExpansionFormEnd,
    Eof,
}

/// A lexed token.
///
/// `parts` depends on the type:
/// - `TagOpenStart`, `IncompleteTagOpen`, `TagClose`, `AttrName`: `[name]`
/// - `Text`, `RawText`, `AttrValueText`, `AttrQuote`, `ExpansionCaseValue`: `[value]`
/// - everything else: `[]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub parts: Vec<String>,
    pub source_span: ParseSourceSpan,
}

impl Token {
    pub fn new(token_type: TokenType, parts: Vec<String>, source_span: ParseSourceSpan) -> Self {
        Token {
            token_type,
            parts,
            source_span,
        }
    }

    /// First part of the token, or the empty string.
    pub fn value(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }
}
