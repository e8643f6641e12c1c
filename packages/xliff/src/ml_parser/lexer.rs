//! ML Parser Lexer
//!
//! XML tokenizer. When `tokenize_expansion_forms` is set, ICU expansion forms
//! (`{count, plural, =0 {none} other {many}}`) are split into dedicated tokens.

use super::tokens::{Token, TokenType};
use crate::chars;
use crate::parse_util::{ParseError, ParseLocation, ParseSourceFile, ParseSourceSpan};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Tokenization result
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<ParseError>,
}

/// Tokenization options
#[derive(Debug, Clone, Default)]
pub struct TokenizeOptions {
    pub tokenize_expansion_forms: bool,
}

/// Main tokenization function
pub fn tokenize(source: &str, url: &str, options: TokenizeOptions) -> TokenizeResult {
    let file = Arc::new(ParseSourceFile::new(source.to_string(), url.to_string()));
    tokenize_file(file, options)
}

pub(crate) fn tokenize_file(file: Arc<ParseSourceFile>, options: TokenizeOptions) -> TokenizeResult {
    let mut tokenizer = Tokenizer::new(file, options);
    tokenizer.tokenize();

    TokenizeResult {
        tokens: merge_text_tokens(tokenizer.tokens),
        errors: tokenizer.errors,
    }
}

static CR_OR_CRLF_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").unwrap());

fn process_carriage_returns(content: &str) -> String {
    CR_OR_CRLF_REGEXP.replace_all(content, "\n").into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
    match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "nbsp" => Some("\u{00A0}"),
        _ => None,
    }
}

fn unexpected_character_error_msg(ch: char) -> String {
    let ch = if ch == chars::EOF {
        "EOF".to_string()
    } else {
        ch.to_string()
    };
    format!("Unexpected character \"{}\"", ch)
}

fn unknown_entity_error_msg(entity_src: &str) -> String {
    format!(
        "Unknown entity \"{}\" - use the \"&#<decimal>;\" or  \"&#x<hex>;\" syntax",
        entity_src
    )
}

fn is_name_end(ch: char) -> bool {
    chars::is_whitespace(ch)
        || ch == chars::GT
        || ch == chars::LT
        || ch == chars::SLASH
        || ch == chars::EQ
        || chars::is_quote(ch)
        || ch == chars::EOF
}

fn is_expansion_case_start(ch: char) -> bool {
    ch == chars::EQ || chars::is_ascii_letter(ch) || chars::is_digit(ch)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorState {
    peek: char,
    offset: usize,
    line: usize,
    column: usize,
}

/// Character cursor over a source file. Offsets are byte offsets.
struct Cursor {
    file: Arc<ParseSourceFile>,
    state: CursorState,
}

impl Cursor {
    fn new(file: Arc<ParseSourceFile>) -> Self {
        let mut cursor = Cursor {
            file,
            state: CursorState {
                peek: chars::EOF,
                offset: 0,
                line: 0,
                column: 0,
            },
        };
        cursor.update_peek();
        cursor
    }

    fn update_peek(&mut self) {
        self.state.peek = self.rest().chars().next().unwrap_or(chars::EOF);
    }

    fn peek(&self) -> char {
        self.state.peek
    }

    fn rest(&self) -> &str {
        &self.file.content[self.state.offset..]
    }

    fn is_eof(&self) -> bool {
        self.state.offset >= self.file.content.len()
    }

    fn advance(&mut self) {
        if self.is_eof() {
            return;
        }
        let ch = self.state.peek;
        if ch == chars::LF {
            self.state.line += 1;
            self.state.column = 0;
        } else {
            self.state.column += 1;
        }
        self.state.offset += ch.len_utf8();
        self.update_peek();
    }

    fn state(&self) -> CursorState {
        self.state
    }

    fn reset(&mut self, state: CursorState) {
        self.state = state;
    }

    fn get_chars(&self, start: &CursorState) -> String {
        self.file.content[start.offset..self.state.offset].to_string()
    }

    fn location(&self, state: &CursorState) -> ParseLocation {
        ParseLocation::new(self.file.clone(), state.offset, state.line, state.column)
    }

    fn get_span(&self, start: &CursorState) -> ParseSourceSpan {
        ParseSourceSpan::new(self.location(start), self.location(&self.state))
    }
}

type LexResult<T> = Result<T, ParseError>;

struct Tokenizer {
    cursor: Cursor,
    tokenize_icu: bool,
    current_token_start: Option<CursorState>,
    current_token_type: Option<TokenType>,
    expansion_case_stack: Vec<TokenType>,
    in_interpolation: bool,
    tokens: Vec<Token>,
    errors: Vec<ParseError>,
}

impl Tokenizer {
    fn new(file: Arc<ParseSourceFile>, options: TokenizeOptions) -> Self {
        Tokenizer {
            cursor: Cursor::new(file),
            tokenize_icu: options.tokenize_expansion_forms,
            current_token_start: None,
            current_token_type: None,
            expansion_case_stack: Vec::new(),
            in_interpolation: false,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn tokenize(&mut self) {
        while !self.cursor.is_eof() {
            let start = self.cursor.state();

            let result = if self.attempt_char_code(chars::LT) {
                if self.attempt_char_code(chars::BANG) {
                    if self.attempt_str("[CDATA[") {
                        self.consume_cdata(start)
                    } else if self.attempt_str("--") {
                        self.consume_comment(start)
                    } else {
                        self.consume_doc_type(start)
                    }
                } else if self.attempt_char_code(chars::QUESTION) {
                    self.consume_processing_instruction(start)
                } else if self.attempt_char_code(chars::SLASH) {
                    self.consume_tag_close(start)
                } else {
                    self.consume_tag_open(start);
                    Ok(())
                }
            } else if self.tokenize_icu {
                match self.tokenize_expansion_form() {
                    Ok(true) => Ok(()),
                    Ok(false) => {
                        self.consume_text();
                        Ok(())
                    }
                    Err(error) => Err(error),
                }
            } else {
                self.consume_text();
                Ok(())
            };

            if let Err(error) = result {
                self.handle_error(error);
            }

            // Guarantee progress after an error that consumed nothing
            if self.cursor.state().offset == start.offset && !self.cursor.is_eof() {
                self.cursor.advance();
            }
        }

        self.begin_token(TokenType::Eof);
        self.end_token(vec![]);
    }

    fn handle_error(&mut self, error: ParseError) {
        self.current_token_start = None;
        self.current_token_type = None;
        self.errors.push(error);
    }

    fn create_error(&self, msg: String, span: ParseSourceSpan) -> ParseError {
        let mut msg = msg;
        if self.is_in_expansion_form() {
            msg.push_str(" (Do you have an unescaped \"{\" in your template? Use \"{{ '{' }}\") to escape it.)");
        }
        ParseError::new(span, msg)
    }

    fn begin_token(&mut self, token_type: TokenType) {
        let start = self.cursor.state();
        self.begin_token_at(token_type, start);
    }

    fn begin_token_at(&mut self, token_type: TokenType, start: CursorState) {
        self.current_token_type = Some(token_type);
        self.current_token_start = Some(start);
    }

    fn end_token(&mut self, parts: Vec<String>) {
        let start = self
            .current_token_start
            .take()
            .unwrap_or_else(|| self.cursor.state());
        let token_type = self.current_token_type.take().unwrap_or(TokenType::Eof);
        let source_span = self.cursor.get_span(&start);
        self.tokens.push(Token::new(token_type, parts, source_span));
    }

    fn attempt_char_code(&mut self, char_code: char) -> bool {
        if !self.cursor.is_eof() && self.cursor.peek() == char_code {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    fn require_char_code(&mut self, char_code: char) -> LexResult<()> {
        let location = self.cursor.state();
        if self.attempt_char_code(char_code) {
            Ok(())
        } else {
            Err(self.create_error(
                unexpected_character_error_msg(self.cursor.peek()),
                self.cursor.get_span(&location),
            ))
        }
    }

    fn attempt_str(&mut self, s: &str) -> bool {
        if !self.cursor.rest().starts_with(s) {
            return false;
        }
        for _ in s.chars() {
            self.cursor.advance();
        }
        true
    }

    fn require_str(&mut self, s: &str) -> LexResult<()> {
        let location = self.cursor.state();
        if self.attempt_str(s) {
            Ok(())
        } else {
            Err(self.create_error(
                unexpected_character_error_msg(self.cursor.peek()),
                self.cursor.get_span(&location),
            ))
        }
    }

    fn attempt_char_code_until(&mut self, predicate: impl Fn(char) -> bool) {
        while !self.cursor.is_eof() && !predicate(self.cursor.peek()) {
            self.cursor.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.attempt_char_code_until(|ch| !chars::is_whitespace(ch));
    }

    fn read_until(&mut self, char_code: char) -> String {
        let start = self.cursor.state();
        self.attempt_char_code_until(|ch| ch == char_code);
        self.cursor.get_chars(&start)
    }

    fn read_char(&mut self) -> LexResult<char> {
        if self.cursor.is_eof() {
            let location = self.cursor.state();
            return Err(self.create_error(
                unexpected_character_error_msg(chars::EOF),
                self.cursor.get_span(&location),
            ));
        }
        let ch = self.cursor.peek();
        self.cursor.advance();
        Ok(ch)
    }

    fn consume_cdata(&mut self, start: CursorState) -> LexResult<()> {
        self.begin_token_at(TokenType::CdataStart, start);
        self.end_token(vec![]);
        self.consume_raw_text("]]>")?;
        self.begin_token(TokenType::CdataEnd);
        self.require_str("]]>")?;
        self.end_token(vec![]);
        Ok(())
    }

    fn consume_comment(&mut self, start: CursorState) -> LexResult<()> {
        self.begin_token_at(TokenType::CommentStart, start);
        self.end_token(vec![]);
        self.consume_raw_text("-->")?;
        self.begin_token(TokenType::CommentEnd);
        self.require_str("-->")?;
        self.end_token(vec![]);
        Ok(())
    }

    fn consume_raw_text(&mut self, end_marker: &str) -> LexResult<()> {
        self.begin_token(TokenType::RawText);
        let mut content = String::new();
        while !self.cursor.rest().starts_with(end_marker) {
            content.push(self.read_char()?);
        }
        self.end_token(vec![process_carriage_returns(&content)]);
        Ok(())
    }

    fn consume_doc_type(&mut self, start: CursorState) -> LexResult<()> {
        self.begin_token_at(TokenType::DocType, start);
        let content = self.read_until(chars::GT);
        self.require_char_code(chars::GT)?;
        self.end_token(vec![content]);
        Ok(())
    }

    fn consume_processing_instruction(&mut self, start: CursorState) -> LexResult<()> {
        self.begin_token_at(TokenType::ProcessingInstruction, start);
        let content_start = self.cursor.state();
        while !self.cursor.rest().starts_with("?>") {
            self.read_char()?;
        }
        let content = self.cursor.get_chars(&content_start);
        self.require_str("?>")?;
        self.end_token(vec![content]);
        Ok(())
    }

    /// Errors inside an open tag are not reported here: a `<` that does not start a name
    /// becomes text, and a started tag is downgraded to `IncompleteTagOpen` for the parser.
    fn consume_tag_open(&mut self, start: CursorState) {
        let open_token_index = self.tokens.len();
        if self.consume_tag_open_parts(start).is_err() {
            self.current_token_start = None;
            self.current_token_type = None;
            match self.tokens.get_mut(open_token_index) {
                Some(token) if token.token_type == TokenType::TagOpenStart => {
                    token.token_type = TokenType::IncompleteTagOpen;
                }
                _ => {
                    self.begin_token_at(TokenType::Text, start);
                    self.end_token(vec![chars::LT.to_string()]);
                }
            }
        }
    }

    fn consume_tag_open_parts(&mut self, start: CursorState) -> LexResult<()> {
        if !chars::is_ascii_letter(self.cursor.peek()) {
            let location = self.cursor.state();
            return Err(self.create_error(
                unexpected_character_error_msg(self.cursor.peek()),
                self.cursor.get_span(&location),
            ));
        }

        self.begin_token_at(TokenType::TagOpenStart, start);
        let name = self.consume_name()?;
        self.end_token(vec![name]);
        self.skip_whitespace();

        while !self.cursor.is_eof()
            && !matches!(self.cursor.peek(), chars::SLASH | chars::GT | chars::LT)
        {
            self.consume_attribute_name()?;
            self.skip_whitespace();
            if self.attempt_char_code(chars::EQ) {
                self.skip_whitespace();
                self.consume_attribute_value()?;
            }
            self.skip_whitespace();
        }

        self.consume_tag_open_end()
    }

    fn consume_name(&mut self) -> LexResult<String> {
        let start = self.cursor.state();
        self.attempt_char_code_until(is_name_end);
        if self.cursor.state().offset == start.offset {
            return Err(self.create_error(
                unexpected_character_error_msg(self.cursor.peek()),
                self.cursor.get_span(&start),
            ));
        }
        Ok(self.cursor.get_chars(&start))
    }

    fn consume_attribute_name(&mut self) -> LexResult<()> {
        let peek = self.cursor.peek();
        if chars::is_quote(peek) {
            let location = self.cursor.state();
            return Err(self.create_error(
                unexpected_character_error_msg(peek),
                self.cursor.get_span(&location),
            ));
        }
        self.begin_token(TokenType::AttrName);
        let name = self.consume_name()?;
        self.end_token(vec![name]);
        Ok(())
    }

    fn consume_attribute_value(&mut self) -> LexResult<()> {
        let peek = self.cursor.peek();
        if chars::is_quote(peek) {
            self.consume_quote(peek);
            self.begin_token(TokenType::AttrValueText);
            let mut value = String::new();
            while self.cursor.peek() != peek || self.cursor.is_eof() {
                if self.cursor.peek() == chars::AMPERSAND {
                    value.push_str(&self.read_entity()?);
                } else {
                    value.push(self.read_char()?);
                }
            }
            self.end_token(vec![process_carriage_returns(&value)]);
            self.consume_quote(peek);
        } else {
            self.begin_token(TokenType::AttrValueText);
            let start = self.cursor.state();
            self.attempt_char_code_until(is_name_end);
            let value = self.cursor.get_chars(&start);
            self.end_token(vec![value]);
        }
        Ok(())
    }

    fn consume_quote(&mut self, quote_char: char) {
        self.begin_token(TokenType::AttrQuote);
        self.cursor.advance();
        self.end_token(vec![quote_char.to_string()]);
    }

    fn consume_tag_open_end(&mut self) -> LexResult<()> {
        let token_type = if self.cursor.peek() == chars::SLASH {
            TokenType::TagOpenEndVoid
        } else {
            TokenType::TagOpenEnd
        };
        self.begin_token(token_type);
        if token_type == TokenType::TagOpenEndVoid {
            self.cursor.advance();
        }
        self.require_char_code(chars::GT)?;
        self.end_token(vec![]);
        Ok(())
    }

    fn consume_tag_close(&mut self, start: CursorState) -> LexResult<()> {
        self.begin_token_at(TokenType::TagClose, start);
        self.skip_whitespace();
        let name = self.consume_name()?;
        self.skip_whitespace();
        self.require_char_code(chars::GT)?;
        self.end_token(vec![name]);
        Ok(())
    }

    /// Reads an entity at the cursor and returns its decoded value.
    /// A named reference without `;` is not an entity and decodes to a literal `&`.
    fn read_entity(&mut self) -> LexResult<String> {
        let start = self.cursor.state();
        self.cursor.advance();

        if self.attempt_char_code(chars::HASH) {
            let is_hex = self.attempt_char_code('x') || self.attempt_char_code('X');
            let code_start = self.cursor.state();
            self.attempt_char_code_until(|ch| ch == chars::SEMICOLON || !chars::is_ascii_hex_digit(ch));
            if self.cursor.state().offset == code_start.offset {
                return Err(self.create_error(
                    unexpected_character_error_msg(self.cursor.peek()),
                    self.cursor.get_span(&code_start),
                ));
            }
            if self.cursor.peek() != chars::SEMICOLON {
                self.cursor.advance();
                let kind = if is_hex { "hexadecimal" } else { "decimal" };
                return Err(self.create_error(
                    format!(
                        "Unable to parse entity \"{}\" - {} character reference entities must end with \";\"",
                        self.cursor.get_chars(&start),
                        kind
                    ),
                    self.cursor.get_span(&start),
                ));
            }
            let digits = self.cursor.get_chars(&code_start);
            self.cursor.advance();
            let radix = if is_hex { 16 } else { 10 };
            return match u32::from_str_radix(&digits, radix).ok().and_then(char::from_u32) {
                Some(ch) => Ok(ch.to_string()),
                None => Err(self.create_error(
                    unknown_entity_error_msg(&self.cursor.get_chars(&start)),
                    self.cursor.get_span(&start),
                )),
            };
        }

        let name_start = self.cursor.state();
        self.attempt_char_code_until(|ch| ch == chars::SEMICOLON || !chars::is_ascii_letter(ch));
        if self.cursor.peek() != chars::SEMICOLON {
            self.cursor.reset(name_start);
            return Ok(chars::AMPERSAND.to_string());
        }
        let name = self.cursor.get_chars(&name_start);
        self.cursor.advance();
        match named_entity(&name) {
            Some(decoded) => Ok(decoded.to_string()),
            None => Err(self.create_error(
                unknown_entity_error_msg(&name),
                self.cursor.get_span(&start),
            )),
        }
    }

    fn consume_text(&mut self) {
        self.begin_token(TokenType::Text);
        let mut content = String::new();

        loop {
            if self.cursor.peek() == chars::AMPERSAND {
                match self.read_entity() {
                    Ok(decoded) => content.push_str(&decoded),
                    Err(error) => self.errors.push(error),
                }
            } else if self.cursor.rest().starts_with("{{") {
                self.in_interpolation = true;
                content.push_str("{{");
                self.cursor.advance();
                self.cursor.advance();
            } else if self.in_interpolation && self.cursor.rest().starts_with("}}") {
                self.in_interpolation = false;
                content.push_str("}}");
                self.cursor.advance();
                self.cursor.advance();
            } else {
                content.push(self.cursor.peek());
                self.cursor.advance();
            }

            if self.is_text_end() {
                break;
            }
        }

        self.in_interpolation = false;
        self.end_token(vec![process_carriage_returns(&content)]);
    }

    fn is_text_end(&self) -> bool {
        if self.cursor.is_eof() || self.is_tag_start() {
            return true;
        }
        if self.tokenize_icu && !self.in_interpolation {
            if self.is_expansion_form_start() {
                return true;
            }
            if self.cursor.peek() == chars::RBRACE && self.is_in_expansion_case() {
                return true;
            }
        }
        false
    }

    fn is_tag_start(&self) -> bool {
        let mut rest = self.cursor.rest().chars();
        if rest.next() != Some(chars::LT) {
            return false;
        }
        match rest.next() {
            Some(ch) => {
                chars::is_ascii_letter(ch)
                    || ch == chars::SLASH
                    || ch == chars::BANG
                    || ch == chars::QUESTION
            }
            None => false,
        }
    }

    fn is_expansion_form_start(&self) -> bool {
        self.cursor.peek() == chars::LBRACE && !self.cursor.rest().starts_with("{{")
    }

    fn is_in_expansion_case(&self) -> bool {
        self.expansion_case_stack.last() == Some(&TokenType::ExpansionCaseExpStart)
    }

    fn is_in_expansion_form(&self) -> bool {
        self.expansion_case_stack.last() == Some(&TokenType::ExpansionFormStart)
    }

    fn tokenize_expansion_form(&mut self) -> LexResult<bool> {
        if self.is_expansion_form_start() {
            self.consume_expansion_form_start()?;
            return Ok(true);
        }

        if is_expansion_case_start(self.cursor.peek()) && self.is_in_expansion_form() {
            self.consume_expansion_case_start()?;
            return Ok(true);
        }

        if self.cursor.peek() == chars::RBRACE {
            if self.is_in_expansion_case() {
                self.consume_expansion_case_end()?;
                return Ok(true);
            }
            if self.is_in_expansion_form() {
                self.consume_expansion_form_end()?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn consume_expansion_form_start(&mut self) -> LexResult<()> {
        self.begin_token(TokenType::ExpansionFormStart);
        self.require_char_code(chars::LBRACE)?;
        self.end_token(vec![]);
        self.expansion_case_stack.push(TokenType::ExpansionFormStart);

        self.begin_token(TokenType::RawText);
        let condition = self.read_until(chars::COMMA);
        self.end_token(vec![process_carriage_returns(&condition)]);
        self.require_char_code(chars::COMMA)?;
        self.skip_whitespace();

        self.begin_token(TokenType::RawText);
        let expansion_type = self.read_until(chars::COMMA);
        self.end_token(vec![expansion_type]);
        self.require_char_code(chars::COMMA)?;
        self.skip_whitespace();
        Ok(())
    }

    fn consume_expansion_case_start(&mut self) -> LexResult<()> {
        self.begin_token(TokenType::ExpansionCaseValue);
        let value = self.read_until(chars::LBRACE).trim().to_string();
        self.end_token(vec![value]);
        self.skip_whitespace();

        self.begin_token(TokenType::ExpansionCaseExpStart);
        self.require_char_code(chars::LBRACE)?;
        self.end_token(vec![]);
        self.skip_whitespace();

        self.expansion_case_stack.push(TokenType::ExpansionCaseExpStart);
        Ok(())
    }

    fn consume_expansion_case_end(&mut self) -> LexResult<()> {
        self.begin_token(TokenType::ExpansionCaseExpEnd);
        self.require_char_code(chars::RBRACE)?;
        self.end_token(vec![]);
        self.skip_whitespace();

        self.expansion_case_stack.pop();
        Ok(())
    }

    fn consume_expansion_form_end(&mut self) -> LexResult<()> {
        self.begin_token(TokenType::ExpansionFormEnd);
        self.require_char_code(chars::RBRACE)?;
        self.end_token(vec![]);

        self.expansion_case_stack.pop();
        Ok(())
    }
}

/// Merge consecutive text tokens into one
fn merge_text_tokens(src_tokens: Vec<Token>) -> Vec<Token> {
    let mut dst_tokens: Vec<Token> = Vec::with_capacity(src_tokens.len());

    for token in src_tokens {
        if let Some(last) = dst_tokens.last_mut() {
            if last.token_type == TokenType::Text && token.token_type == TokenType::Text {
                let merged = format!("{}{}", last.value(), token.value());
                last.parts = vec![merged];
                last.source_span.end = token.source_span.end;
                continue;
            }
        }
        dst_tokens.push(token);
    }

    dst_tokens
}
