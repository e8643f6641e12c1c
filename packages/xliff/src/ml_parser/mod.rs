//! ML Parser Module
//!
//! XML tokenizer and tree builder with ICU expansion form support.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod tokens;
pub mod xml_parser;

pub use ast::*;
pub use lexer::{tokenize, TokenizeOptions, TokenizeResult};
pub use parser::{ParseTreeResult, Parser};
pub use xml_parser::XmlParser;
