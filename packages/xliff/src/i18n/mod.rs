//! I18n Module
//!
//! Message tree, message ids and the serializers that read and write them

pub mod digest;
pub mod i18n_ast;
pub mod serializers;

// Re-export commonly used items
pub use serializers::serializer::{LoadResult, Serializer};
pub use serializers::{RawUnit, Xliff, XliffError};

pub use i18n_ast::{
    BlockPlaceholder, Container, Icu, IcuPlaceholder, Message, MessageSpan, Node, Placeholder,
    TagPlaceholder, Text,
};

pub use digest::{compute_digest, digest, serialize_nodes, sha1};
