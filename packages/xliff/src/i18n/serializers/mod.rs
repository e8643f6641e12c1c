//! Serializers Module
//!
//! Contains the i18n serialization formats

pub mod serializer;
pub mod xliff;
pub mod xml_helper;

// Re-export commonly used items
pub use serializer::{LoadResult, Serializer};
pub use xliff::{RawUnit, Xliff, XliffError};
pub use xml_helper::{escape_xml, serialize, Declaration, Node, Tag, Text, CR};
