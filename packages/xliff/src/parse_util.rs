//! Parse Utilities
//!
//! Source files, locations, spans and the error record every decode pass accumulates.

use crate::chars;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }
}

/// A position inside a source file. `offset` is a byte offset, `line` and `col` are 0 based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocation {
    pub file: Arc<ParseSourceFile>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: Arc<ParseSourceFile>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation { file, offset, line, col }
    }

    /// Return the source around the location
    /// Up to `max_chars` or `max_lines` on each side of the location
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> Option<(String, String)> {
        let content = &self.file.content;
        if content.is_empty() {
            return None;
        }
        let offset = self.offset.min(content.len());

        let mut start_offset = offset;
        let mut ctx_chars = 0;
        let mut ctx_lines = 0;
        for (idx, ch) in content[..offset].char_indices().rev() {
            if ctx_chars >= max_chars {
                break;
            }
            start_offset = idx;
            ctx_chars += 1;
            if ch == chars::LF {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        let mut end_offset = offset;
        ctx_chars = 0;
        ctx_lines = 0;
        for (idx, ch) in content[offset..].char_indices() {
            if ctx_chars >= max_chars {
                break;
            }
            end_offset = offset + idx + ch.len_utf8();
            ctx_chars += 1;
            if ch == chars::LF {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        Some((
            content[start_offset..offset].to_string(),
            content[offset..end_offset].to_string(),
        ))
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }

    /// The source text covered by the span.
    pub fn text(&self) -> &str {
        let content = &self.start.file.content;
        let end = self.end.offset.min(content.len());
        let start = self.start.offset.min(end);
        &content[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
        }
    }

    pub fn contextual_message(&self) -> String {
        match self.span.start.get_context(100, 3) {
            Some((before, after)) => format!("{} (\"{}[ERROR ->]{}\")", self.msg, before, after),
            None => self.msg.clone(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.contextual_message(), self.span.start)
    }
}
