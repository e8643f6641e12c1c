//! ML Parser
//!
//! Builds the markup tree from the token stream. Elements are closed strictly in
//! order: a closing tag must match the innermost open element.

use super::ast::*;
use super::lexer::{tokenize_file, TokenizeOptions};
use super::tokens::{Token, TokenType};
use crate::parse_util::{ParseError, ParseSourceFile, ParseSourceSpan};
use std::sync::Arc;

/// Parse tree result
#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root_nodes, errors }
    }
}

/// Tokenizes and builds a tree in one pass. Lexer errors come first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    pub fn parse(&self, source: &str, url: &str, options: TokenizeOptions) -> ParseTreeResult {
        let file = Arc::new(ParseSourceFile::new(source.to_string(), url.to_string()));
        let tokenize_result = tokenize_file(file, options);

        let mut tree_builder = TreeBuilder::new(tokenize_result.tokens);
        tree_builder.build();

        let mut all_errors = tokenize_result.errors;
        all_errors.extend(tree_builder.errors);

        ParseTreeResult::new(tree_builder.root_nodes, all_errors)
    }
}

/// Internal tree builder. `tokens` always ends with an `Eof` token.
struct TreeBuilder {
    tokens: Vec<Token>,
    index: usize,
    element_stack: Vec<Element>,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    fn new(tokens: Vec<Token>) -> Self {
        TreeBuilder {
            tokens,
            index: 0,
            element_stack: Vec::new(),
            root_nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while self.peek().token_type != TokenType::Eof {
            match self.peek().token_type {
                TokenType::TagOpenStart | TokenType::IncompleteTagOpen => {
                    let token = self.advance();
                    self.consume_start_tag(token);
                }
                TokenType::TagClose => {
                    let token = self.advance();
                    self.consume_end_tag(token);
                }
                TokenType::CdataStart => {
                    self.advance();
                    self.consume_cdata();
                }
                TokenType::CommentStart => {
                    let token = self.advance();
                    self.consume_comment(token);
                }
                TokenType::Text | TokenType::RawText => {
                    let token = self.advance();
                    self.consume_text(token);
                }
                TokenType::ExpansionFormStart => {
                    let token = self.advance();
                    self.consume_expansion(token);
                }
                // Doc types, processing instructions and stray tokens carry no content
                _ => {
                    self.advance();
                }
            }
        }

        while let Some(el) = self.element_stack.pop() {
            self.errors.push(ParseError::new(
                el.source_span.clone(),
                format!("Unclosed element \"{}\"", el.name),
            ));
            self.add_to_parent(Node::Element(el));
        }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn advance_if(&mut self, token_type: TokenType) -> Option<Token> {
        if self.peek().token_type == token_type {
            Some(self.advance())
        } else {
            None
        }
    }

    fn add_error(&mut self, msg: &str, span: ParseSourceSpan) {
        self.errors.push(ParseError::new(span, msg));
    }

    fn add_to_parent(&mut self, node: Node) {
        match self.element_stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }

    fn consume_cdata(&mut self) {
        if let Some(text) = self.advance_if(TokenType::RawText) {
            self.consume_text(text);
        }
        self.advance_if(TokenType::CdataEnd);
    }

    fn consume_comment(&mut self, token: Token) {
        let text = self.advance_if(TokenType::RawText);
        let end = self.advance_if(TokenType::CommentEnd);
        let value = text.as_ref().map(|t| t.value().trim().to_string());
        let span_end = match (&end, &text) {
            (Some(end), _) => end.source_span.end.clone(),
            (None, Some(text)) => text.source_span.end.clone(),
            (None, None) => token.source_span.end.clone(),
        };
        let source_span = ParseSourceSpan::new(token.source_span.start.clone(), span_end);
        self.add_to_parent(Node::Comment(Comment { value, source_span }));
    }

    fn consume_text(&mut self, token: Token) {
        let value = token.value().to_string();
        if !value.is_empty() {
            self.add_to_parent(Node::Text(Text::new(value, token.source_span)));
        }
    }

    fn consume_expansion(&mut self, token: Token) {
        let switch_value = self.advance();
        let expansion_type = self.advance();
        let mut cases = Vec::new();

        // read =
        while self.peek().token_type == TokenType::ExpansionCaseValue {
            match self.parse_expansion_case() {
                Some(expansion_case) => cases.push(expansion_case),
                None => return, // error
            }
        }

        // read the final }
        if self.peek().token_type != TokenType::ExpansionFormEnd {
            let span = self.peek().source_span.clone();
            self.add_error("Invalid ICU message. Missing '}'.", span);
            return;
        }
        let end = self.advance();

        let source_span = ParseSourceSpan::new(token.source_span.start, end.source_span.end);
        self.add_to_parent(Node::Expansion(Expansion {
            switch_value: switch_value.value().to_string(),
            expansion_type: expansion_type.value().to_string(),
            cases,
            source_span,
        }));
    }

    fn parse_expansion_case(&mut self) -> Option<ExpansionCase> {
        let value = self.advance();

        // read {
        if self.peek().token_type != TokenType::ExpansionCaseExpStart {
            self.add_error("Invalid ICU message. Missing '{'.", value.source_span.clone());
            return None;
        }

        // read until }
        let start = self.advance();
        let mut exp = self.collect_expansion_exp_tokens(&start)?;
        let end = self.advance();
        exp.push(Token::new(TokenType::Eof, vec![], end.source_span.clone()));

        // parse everything in between { and }
        let mut expansion_case_parser = TreeBuilder::new(exp);
        expansion_case_parser.build();
        if !expansion_case_parser.errors.is_empty() {
            self.errors.extend(expansion_case_parser.errors);
            return None;
        }

        Some(ExpansionCase {
            value: value.value().to_string(),
            expression: expansion_case_parser.root_nodes,
            source_span: ParseSourceSpan::new(value.source_span.start, end.source_span.end),
        })
    }

    fn collect_expansion_exp_tokens(&mut self, start: &Token) -> Option<Vec<Token>> {
        let mut exp = Vec::new();
        let mut expansion_form_stack = vec![TokenType::ExpansionCaseExpStart];

        loop {
            let token_type = self.peek().token_type;

            if token_type == TokenType::ExpansionFormStart
                || token_type == TokenType::ExpansionCaseExpStart
            {
                expansion_form_stack.push(token_type);
            }

            if token_type == TokenType::ExpansionCaseExpEnd {
                if expansion_form_stack.last() == Some(&TokenType::ExpansionCaseExpStart) {
                    expansion_form_stack.pop();
                    if expansion_form_stack.is_empty() {
                        return Some(exp);
                    }
                } else {
                    self.add_error("Invalid ICU message. Missing '}'.", start.source_span.clone());
                    return None;
                }
            }

            if token_type == TokenType::ExpansionFormEnd {
                if expansion_form_stack.last() == Some(&TokenType::ExpansionFormStart) {
                    expansion_form_stack.pop();
                } else {
                    self.add_error("Invalid ICU message. Missing '}'.", start.source_span.clone());
                    return None;
                }
            }

            if token_type == TokenType::Eof {
                self.add_error("Invalid ICU message. Missing '}'.", start.source_span.clone());
                return None;
            }

            exp.push(self.advance());
        }
    }

    fn consume_start_tag(&mut self, start_token: Token) {
        let name = start_token.value().to_string();

        let mut attrs = Vec::new();
        while self.peek().token_type == TokenType::AttrName {
            let attr_name = self.advance();
            attrs.push(self.consume_attr(attr_name));
        }

        let mut is_self_closing = false;
        match self.peek().token_type {
            TokenType::TagOpenEndVoid => {
                self.advance();
                is_self_closing = true;
            }
            TokenType::TagOpenEnd => {
                self.advance();
            }
            _ => {}
        }

        let end = self.peek().source_span.start.clone();
        let span = ParseSourceSpan::new(start_token.source_span.start.clone(), end);
        let mut el = Element {
            name,
            attrs,
            children: Vec::new(),
            is_self_closing,
            source_span: span.clone(),
            start_source_span: span.clone(),
            end_source_span: None,
        };

        if is_self_closing {
            el.end_source_span = Some(span);
            self.add_to_parent(Node::Element(el));
        } else if start_token.token_type == TokenType::IncompleteTagOpen {
            self.errors.push(ParseError::new(
                span,
                format!("Opening tag \"{}\" not terminated.", el.name),
            ));
            self.add_to_parent(Node::Element(el));
        } else {
            self.element_stack.push(el);
        }
    }

    fn consume_attr(&mut self, attr_name: Token) -> Attribute {
        let mut end = attr_name.source_span.end.clone();

        // Consume any quote
        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end = quote.source_span.end;
        }

        let mut value = String::new();
        if let Some(value_token) = self.advance_if(TokenType::AttrValueText) {
            value = value_token.value().to_string();
            end = value_token.source_span.end.clone();
        }

        // Consume any quote
        if let Some(quote) = self.advance_if(TokenType::AttrQuote) {
            end = quote.source_span.end;
        }

        Attribute {
            name: attr_name.value().to_string(),
            value,
            source_span: ParseSourceSpan::new(attr_name.source_span.start, end),
        }
    }

    fn consume_end_tag(&mut self, token: Token) {
        let name = token.value();
        let matches_innermost = self
            .element_stack
            .last()
            .map(|el| el.name == name)
            .unwrap_or(false);

        if !matches_innermost {
            let msg = format!(
                "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag. For more info see https://www.w3.org/TR/html5/syntax.html#closing-elements-that-have-implied-end-tags",
                name
            );
            self.errors.push(ParseError::new(token.source_span, msg));
            return;
        }

        if let Some(mut el) = self.element_stack.pop() {
            el.source_span.end = token.source_span.end.clone();
            el.end_source_span = Some(token.source_span);
            self.add_to_parent(Node::Element(el));
        }
    }
}
