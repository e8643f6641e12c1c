//! XML Parser
//!
//! Entry point used by the XLIFF serializer for both the document and the
//! translated message content.

use super::lexer::TokenizeOptions;
use super::parser::{ParseTreeResult, Parser};

/// XML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser {
    parser: Parser,
}

impl XmlParser {
    pub fn new() -> Self {
        XmlParser {
            parser: Parser::new(),
        }
    }

    pub fn parse(&self, source: &str, url: &str, options: Option<TokenizeOptions>) -> ParseTreeResult {
        self.parser.parse(source, url, options.unwrap_or_default())
    }
}
