/*
 * Character Codes
 *
 * Characters the markup lexer dispatches on.
 */

//! Character constants used by the markup lexer

// Special characters
pub const EOF: char = '\0';
pub const TAB: char = '\t';
pub const LF: char = '\n';
pub const VTAB: char = '\x0B';
pub const FF: char = '\x0C';
pub const CR: char = '\r';
pub const SPACE: char = ' ';

// Punctuation
pub const BANG: char = '!';
pub const DQ: char = '"';
pub const HASH: char = '#';
pub const AMPERSAND: char = '&';
pub const SQ: char = '\'';
pub const COMMA: char = ',';
pub const MINUS: char = '-';
pub const SLASH: char = '/';
pub const SEMICOLON: char = ';';
pub const LT: char = '<';
pub const EQ: char = '=';
pub const GT: char = '>';
pub const QUESTION: char = '?';
pub const LBRACKET: char = '[';
pub const RBRACKET: char = ']';

// Braces
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

/// Check if character is whitespace
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == LF || ch == CR || ch == VTAB || ch == FF
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Check if character is ASCII letter
pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Check if character is ASCII hex digit
pub fn is_ascii_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

/// Check if character is a quote usable around attribute values
pub fn is_quote(ch: char) -> bool {
    ch == SQ || ch == DQ
}
