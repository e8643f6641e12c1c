//! Serializer Module
//!
//! Base trait for i18n serializers

use crate::i18n::i18n_ast::{Message, Node};
use indexmap::IndexMap;

/// Translations read back from a serialized file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadResult {
    pub locale: Option<String>,
    pub i18n_nodes_by_msg_id: IndexMap<String, Vec<Node>>,
}

/// Base trait for i18n serializers
pub trait Serializer {
    type Error: std::error::Error;

    /// Serialize messages to string format
    /// - The `id` contains the message id that the serializer is expected to use
    fn write(&self, messages: &[Message], locale: Option<&str>) -> String;

    /// Load messages from serialized content
    fn load(&self, content: &str, url: &str) -> Result<LoadResult, Self::Error>;

    /// Compute digest for a message
    fn digest(&self, message: &Message) -> String;
}
