//! Digest Module
//!
//! Message ids for messages that were not given one.

use crate::i18n::i18n_ast::{Icu, Message, Node};
use sha1::{Digest, Sha1};

/// Return the message id or compute it using the XLIFF1 digest.
pub fn digest(message: &Message) -> String {
    if !message.id.is_empty() {
        message.id.clone()
    } else {
        compute_digest(message)
    }
}

/// Compute the message id using the XLIFF1 digest.
pub fn compute_digest(message: &Message) -> String {
    let serialized_nodes = serialize_nodes(&message.nodes);
    let content = format!(
        "{}[{}]",
        serialized_nodes.join(""),
        message.meaning.as_deref().unwrap_or("")
    );
    sha1(&content)
}

/// Serialize the i18n ast to something xml-like in order to generate an UID.
pub fn serialize_nodes(nodes: &[Node]) -> Vec<String> {
    nodes.iter().map(serialize_node).collect()
}

fn serialize_node(node: &Node) -> String {
    match node {
        Node::Text(text) => text.value.clone(),
        Node::Container(container) => {
            format!("[{}]", serialize_nodes(&container.children).join(", "))
        }
        Node::Icu(icu) => serialize_icu(icu),
        Node::TagPlaceholder(ph) => {
            if ph.is_void {
                format!("<ph tag name=\"{}\"/>", ph.start_name)
            } else {
                format!(
                    "<ph tag name=\"{}\">{}</ph name=\"{}\">",
                    ph.start_name,
                    serialize_nodes(&ph.children).join(", "),
                    ph.close_name
                )
            }
        }
        Node::Placeholder(ph) => {
            if ph.value.is_empty() {
                format!("<ph name=\"{}\"/>", ph.name)
            } else {
                format!("<ph name=\"{}\">{}</ph>", ph.name, ph.value)
            }
        }
        Node::IcuPlaceholder(ph) => {
            format!("<ph icu name=\"{}\">{}</ph>", ph.name, serialize_icu(&ph.value))
        }
        Node::BlockPlaceholder(ph) => format!(
            "<ph block name=\"{}\">{}</ph name=\"{}\">",
            ph.start_name,
            serialize_nodes(&ph.children).join(", "),
            ph.close_name
        ),
    }
}

fn serialize_icu(icu: &Icu) -> String {
    let str_cases: Vec<String> = icu
        .cases
        .iter()
        .map(|(k, v)| format!("{} {{{}}}", k, serialize_node(v)))
        .collect();
    format!("{{{}, {}, {}}}", icu.expression, icu.type_, str_cases.join(", "))
}

/// SHA-1 of the UTF-8 bytes as lower-case hex
pub fn sha1(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
