//! i18n XLIFF codec
//!
//! Reads and writes XLIFF 1.2 translation files to and from the i18n message tree

// Core modules
pub mod chars;
pub mod config;
pub mod parse_util;

// Parser modules
pub mod ml_parser;

// Message tree and serializers
pub mod i18n;

// Re-exports
pub use config::XliffOptions;
pub use i18n::serializers::xml_helper as xml;
pub use i18n::{LoadResult, Message, RawUnit, Serializer, Xliff, XliffError};

use indexmap::IndexMap;

/// Decodes every translation of an XLIFF document into i18n nodes, keyed by message id.
pub fn decode_messages(content: &str, url: &str) -> Result<LoadResult, XliffError> {
    Xliff::new().load(content, url)
}

/// Extracts the raw `target` markup and the `trans-unit` element of every unit.
pub fn decode_raw_units(content: &str, url: &str) -> Result<IndexMap<String, RawUnit>, XliffError> {
    Xliff::new().load_units(content, url)
}

/// Serializes `messages` as an XLIFF document, after the already written `existing_units`.
pub fn encode_document(messages: &[Message], locale: Option<&str>, existing_units: Vec<xml::Node>) -> String {
    Xliff::new().write_with_units(messages, locale, existing_units)
}

/// Returns the message id, or the SHA-1 digest of its content and meaning when it has none.
pub fn compute_message_digest(message: &Message) -> String {
    i18n::digest(message)
}
