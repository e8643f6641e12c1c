//! XLIFF Serializer Module
//!
//! XLIFF 1.2 format serializer
//! See https://docs.oasis-open.org/xliff/v1.2/os/xliff-core.html
//! See https://docs.oasis-open.org/xliff/v1.2/xliff-profile-html/xliff-profile-html-1.2.html

use crate::config::XliffOptions;
use crate::i18n::digest::digest;
use crate::i18n::i18n_ast::{self as i18n, Message};
use crate::i18n::serializers::serializer::{LoadResult, Serializer};
use crate::i18n::serializers::xml_helper as xml;
use crate::ml_parser::ast as ml;
use crate::ml_parser::lexer::TokenizeOptions;
use crate::ml_parser::xml_parser::XmlParser;
use crate::parse_util::ParseError;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, warn};

const VERSION: &str = "1.2";
const XMLNS: &str = "urn:oasis:names:tc:xliff:document:1.2";
const XLIFF_TAG: &str = "xliff";
const BODY_TAG: &str = "body";
const PLACEHOLDER_TAG: &str = "x";
const MARKER_TAG: &str = "mrk";
const FILE_TAG: &str = "file";
const SOURCE_TAG: &str = "source";
const SEGMENT_SOURCE_TAG: &str = "seg-source";
const ALT_TRANS_TAG: &str = "alt-trans";
const TARGET_TAG: &str = "target";
const UNIT_TAG: &str = "trans-unit";
const CONTEXT_GROUP_TAG: &str = "context-group";
const CONTEXT_TAG: &str = "context";
const NOTE_TAG: &str = "note";

/// Errors collected while decoding a document, reported together.
#[derive(Debug, Clone, Error)]
pub enum XliffError {
    #[error("xliff parse errors:\n{}", join_errors(.0))]
    Parse(Vec<ParseError>),
}

impl XliffError {
    pub fn errors(&self) -> &[ParseError] {
        match self {
            XliffError::Parse(errors) => errors,
        }
    }
}

fn join_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A `trans-unit` read back from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnit {
    /// Verbatim markup between `<target>` and `</target>`
    pub target: String,
    /// The whole `trans-unit` element, ready to be passed back to `Xliff::write_with_units`
    pub node: xml::Node,
}

/// XLIFF 1.2 serializer
#[derive(Debug, Clone, Default)]
pub struct Xliff {
    options: XliffOptions,
}

impl Xliff {
    pub fn new() -> Self {
        Xliff::default()
    }

    pub fn with_options(options: XliffOptions) -> Self {
        Xliff { options }
    }

    /// Serializes `messages` after `existing_units`, which are copied as they are.
    pub fn write_with_units(
        &self,
        messages: &[Message],
        locale: Option<&str>,
        existing_units: Vec<xml::Node>,
    ) -> String {
        let existing_count = existing_units.len();
        let mut trans_units: Vec<xml::Node> = Vec::new();

        for unit in existing_units {
            trans_units.push(xml::CR::new(6).into());
            trans_units.push(unit);
        }

        for message in messages {
            trans_units.push(xml::CR::new(6).into());
            trans_units.push(self.trans_unit(message).into());
        }

        trans_units.push(xml::CR::new(4).into());
        let body = xml::Tag::new(BODY_TAG).with_children(trans_units);

        let source_language = locale
            .filter(|locale| !locale.is_empty())
            .unwrap_or(self.options.default_source_language.as_str());
        let file = xml::Tag::new(FILE_TAG)
            .with_attr("source-language", source_language)
            .with_attr("datatype", "plaintext")
            .with_attr("original", self.options.original.as_str())
            .with_children(vec![
                xml::CR::new(4).into(),
                body.into(),
                xml::CR::new(2).into(),
            ]);

        let xliff = xml::Tag::new(XLIFF_TAG)
            .with_attr("version", VERSION)
            .with_attr("xmlns", XMLNS)
            .with_children(vec![
                xml::CR::new(2).into(),
                file.into(),
                xml::CR::new(0).into(),
            ]);

        let declaration = xml::Declaration::new()
            .with_attr("version", "1.0")
            .with_attr("encoding", "UTF-8");

        let mut nodes: Vec<xml::Node> = vec![
            declaration.into(),
            xml::CR::new(0).into(),
            xliff.into(),
            xml::CR::new(0).into(),
        ];
        if !self.options.pretty {
            nodes = xml::strip_line_breaks(nodes);
        }

        debug!(
            "Writing xliff document with {} existing and {} new trans-units",
            existing_count,
            messages.len()
        );
        xml::serialize(&nodes)
    }

    fn trans_unit(&self, message: &Message) -> xml::Tag {
        let mut children: Vec<xml::Node> = vec![
            xml::CR::new(8).into(),
            xml::Tag::new(SOURCE_TAG)
                .with_children(WriteVisitor.serialize(&message.nodes))
                .into(),
        ];

        for source in &message.sources {
            children.push(xml::CR::new(8).into());
            children.push(
                xml::Tag::new(CONTEXT_GROUP_TAG)
                    .with_attr("purpose", "location")
                    .with_children(vec![
                        xml::CR::new(10).into(),
                        xml::Tag::new(CONTEXT_TAG)
                            .with_attr("context-type", "sourcefile")
                            .with_child(xml::Text::new(source.file_path.as_str()))
                            .into(),
                        xml::CR::new(10).into(),
                        xml::Tag::new(CONTEXT_TAG)
                            .with_attr("context-type", "linenumber")
                            .with_child(xml::Text::new(source.start_line.to_string()))
                            .into(),
                        xml::CR::new(8).into(),
                    ])
                    .into(),
            );
        }

        if let Some(description) = non_empty(&message.description) {
            children.push(xml::CR::new(8).into());
            children.push(note("description", description).into());
        }

        if let Some(meaning) = non_empty(&message.meaning) {
            children.push(xml::CR::new(8).into());
            children.push(note("meaning", meaning).into());
        }

        children.push(xml::CR::new(6).into());

        xml::Tag::new(UNIT_TAG)
            .with_attr("id", message.id.as_str())
            .with_attr("datatype", "html")
            .with_children(children)
    }

    /// Reads every `trans-unit` of a document without decoding its translation.
    pub fn load_units(&self, content: &str, url: &str) -> Result<IndexMap<String, RawUnit>, XliffError> {
        let extracted = XliffParser::default().parse(content, url);
        if !extracted.errors.is_empty() {
            warn!(
                "Found {} errors while reading trans-units from {}",
                extracted.errors.len(),
                url
            );
            return Err(XliffError::Parse(extracted.errors));
        }
        Ok(extracted.units)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn note(from: &str, text: &str) -> xml::Tag {
    xml::Tag::new(NOTE_TAG)
        .with_attr("priority", "1")
        .with_attr("from", from)
        .with_child(xml::Text::new(text))
}

impl Serializer for Xliff {
    type Error = XliffError;

    fn write(&self, messages: &[Message], locale: Option<&str>) -> String {
        self.write_with_units(messages, locale, Vec::new())
    }

    fn load(&self, content: &str, url: &str) -> Result<LoadResult, XliffError> {
        let extracted = XliffParser::default().parse(content, url);
        let mut errors = extracted.errors;

        let mut i18n_nodes_by_msg_id = IndexMap::new();
        for (msg_id, unit) in extracted.units {
            let converted = XmlToI18n::default().convert(&unit.target, url);
            errors.extend(converted.errors);
            i18n_nodes_by_msg_id.insert(msg_id, converted.i18n_nodes);
        }

        if !errors.is_empty() {
            warn!("Found {} errors while loading {}", errors.len(), url);
            return Err(XliffError::Parse(errors));
        }

        debug!(
            "Loaded {} translations from {}",
            i18n_nodes_by_msg_id.len(),
            url
        );
        Ok(LoadResult {
            locale: extracted.locale,
            i18n_nodes_by_msg_id,
        })
    }

    fn digest(&self, message: &Message) -> String {
        digest(message)
    }
}

/// Converts i18n AST nodes to XLIFF XML nodes
struct WriteVisitor;

impl WriteVisitor {
    fn serialize(&self, nodes: &[i18n::Node]) -> Vec<xml::Node> {
        nodes.iter().flat_map(|node| self.visit(node)).collect()
    }

    fn visit(&self, node: &i18n::Node) -> Vec<xml::Node> {
        match node {
            i18n::Node::Text(text) => vec![xml::Text::new(text.value.as_str()).into()],
            i18n::Node::Container(container) => self.serialize(&container.children),
            i18n::Node::Icu(icu) => {
                let mut nodes: Vec<xml::Node> = vec![xml::Text::new(format!(
                    "{{{}, {}, ",
                    icu.printed_expression(),
                    icu.type_
                ))
                .into()];
                for (label, case) in &icu.cases {
                    nodes.push(xml::Text::new(format!("{} {{", label)).into());
                    nodes.extend(self.visit(case));
                    nodes.push(xml::Text::new("} ").into());
                }
                nodes.push(xml::Text::new("}").into());
                nodes
            }
            i18n::Node::TagPlaceholder(ph) => {
                let ctype = get_ctype_for_tag(&ph.tag);

                if ph.is_void {
                    // void tags have no children nor closing tags
                    return vec![placeholder(&ph.start_name, Some(ctype.as_str()), &format!("<{}/>", ph.tag)).into()];
                }

                let mut nodes: Vec<xml::Node> =
                    vec![placeholder(&ph.start_name, Some(ctype.as_str()), &format!("<{}>", ph.tag)).into()];
                nodes.extend(self.serialize(&ph.children));
                nodes.push(placeholder(&ph.close_name, Some(ctype.as_str()), &format!("</{}>", ph.tag)).into());
                nodes
            }
            i18n::Node::Placeholder(ph) => {
                vec![placeholder(&ph.name, None, &format!("{{{{{}}}}}", ph.value)).into()]
            }
            i18n::Node::IcuPlaceholder(ph) => {
                let cases: Vec<String> = ph
                    .value
                    .cases
                    .keys()
                    .map(|value| format!("{} {{...}}", value))
                    .collect();
                let equiv_text = format!(
                    "{{{}, {}, {}}}",
                    ph.value.expression,
                    ph.value.type_,
                    cases.join(" ")
                );
                vec![placeholder(&ph.name, None, &equiv_text).into()]
            }
            i18n::Node::BlockPlaceholder(ph) => {
                let ctype = get_ctype_for_block(&ph.name);
                let mut nodes: Vec<xml::Node> =
                    vec![placeholder(&ph.start_name, Some(ctype.as_str()), &format!("@{}", ph.name)).into()];
                nodes.extend(self.serialize(&ph.children));
                nodes.push(placeholder(&ph.close_name, Some(ctype.as_str()), "}").into());
                nodes
            }
        }
    }
}

fn placeholder(id: &str, ctype: Option<&str>, equiv_text: &str) -> xml::Tag {
    let tag = xml::Tag::new(PLACEHOLDER_TAG).with_attr("id", id);
    let tag = match ctype {
        Some(ctype) => tag.with_attr("ctype", ctype),
        None => tag,
    };
    tag.with_attr("equiv-text", equiv_text)
}

fn get_ctype_for_tag(tag: &str) -> String {
    match tag.to_lowercase().as_str() {
        "br" => "lb".to_string(),
        "img" => "image".to_string(),
        _ => format!("x-{}", tag),
    }
}

fn get_ctype_for_block(name: &str) -> String {
    let normalized: String = name
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                ch
            } else {
                '-'
            }
        })
        .collect();
    format!("x-{}", normalized)
}

struct ExtractedUnits {
    units: IndexMap<String, RawUnit>,
    locale: Option<String>,
    errors: Vec<ParseError>,
}

/// Extract messages as xml nodes from the xliff file
#[derive(Default)]
struct XliffParser {
    unit_ml_string: Option<String>,
    units: IndexMap<String, RawUnit>,
    locale: Option<String>,
    errors: Vec<ParseError>,
}

impl XliffParser {
    fn parse(mut self, xliff: &str, url: &str) -> ExtractedUnits {
        let parsed = XmlParser::new().parse(xliff, url, None);
        self.errors = parsed.errors;
        self.visit_all(&parsed.root_nodes);

        debug!("Extracted {} trans-units from {}", self.units.len(), url);
        ExtractedUnits {
            units: self.units,
            locale: self.locale,
            errors: self.errors,
        }
    }

    fn visit_all(&mut self, nodes: &[ml::Node]) {
        for node in nodes {
            if let ml::Node::Element(element) = node {
                self.visit_element(element);
            }
        }
    }

    fn visit_element(&mut self, element: &ml::Element) {
        match element.name.as_str() {
            UNIT_TAG => {
                self.unit_ml_string = None;
                let id = match element.attr("id") {
                    Some(id) => id.to_string(),
                    None => {
                        self.add_error(element, format!("<{}> misses the \"id\" attribute", UNIT_TAG));
                        return;
                    }
                };
                if self.units.contains_key(&id) {
                    self.add_error(element, format!("Duplicated translations for msg {}", id));
                    return;
                }
                self.visit_all(&element.children);
                match self.unit_ml_string.take() {
                    Some(target) => {
                        let node = element_to_xml(element);
                        self.units.insert(id, RawUnit { target, node });
                    }
                    None => self.add_error(element, format!("Message {} misses a translation", id)),
                }
            }

            // ignore those tags
            SOURCE_TAG | SEGMENT_SOURCE_TAG | ALT_TRANS_TAG => {}

            // the last target of a unit wins
            TARGET_TAG => {
                self.unit_ml_string = Some(element.inner_source().to_string());
            }

            FILE_TAG => {
                if let Some(locale) = element.attr("target-language") {
                    self.locale = Some(locale.to_string());
                }
                self.visit_all(&element.children);
            }

            _ => self.visit_all(&element.children),
        }
    }

    fn add_error(&mut self, element: &ml::Element, message: String) {
        self.errors
            .push(ParseError::new(element.source_span.clone(), message));
    }
}

/// Re-expresses a parsed element as an xml tree. Comments are dropped.
fn element_to_xml(element: &ml::Element) -> xml::Node {
    let mut tag = xml::Tag::new(element.name.as_str());
    for attr in &element.attrs {
        tag = tag.with_attr(attr.name.as_str(), attr.value.as_str());
    }
    let children = element.children.iter().filter_map(|child| match child {
        ml::Node::Element(el) => Some(element_to_xml(el)),
        ml::Node::Text(text) => Some(xml::Text::new(text.value.as_str()).into()),
        ml::Node::Expansion(expansion) => {
            Some(xml::Text::new(expansion.source_span.text()).into())
        }
        ml::Node::Comment(_) => None,
    });
    tag.with_children(children.collect::<Vec<_>>()).into()
}

struct ConvertResult {
    i18n_nodes: Vec<i18n::Node>,
    errors: Vec<ParseError>,
}

/// Convert ml nodes (xliff syntax) to i18n nodes
#[derive(Default)]
struct XmlToI18n {
    errors: Vec<ParseError>,
}

impl XmlToI18n {
    fn convert(mut self, message: &str, url: &str) -> ConvertResult {
        let xml_icu = XmlParser::new().parse(
            message,
            url,
            Some(TokenizeOptions {
                tokenize_expansion_forms: true,
            }),
        );
        self.errors = xml_icu.errors;

        let i18n_nodes = if !self.errors.is_empty() || xml_icu.root_nodes.is_empty() {
            Vec::new()
        } else {
            self.visit_all(&xml_icu.root_nodes)
        };

        ConvertResult {
            i18n_nodes,
            errors: self.errors,
        }
    }

    fn visit_all(&mut self, nodes: &[ml::Node]) -> Vec<i18n::Node> {
        let mut result = Vec::new();
        for node in nodes {
            result.extend(self.visit(node));
        }
        result
    }

    fn visit(&mut self, node: &ml::Node) -> Vec<i18n::Node> {
        match node {
            ml::Node::Text(text) => vec![i18n::Text::new(text.value.as_str()).into()],
            ml::Node::Element(el) => self.visit_element(el),
            ml::Node::Expansion(icu) => vec![self.visit_expansion(icu).into()],
            ml::Node::Comment(_) => Vec::new(),
        }
    }

    fn visit_element(&mut self, el: &ml::Element) -> Vec<i18n::Node> {
        match el.name.as_str() {
            PLACEHOLDER_TAG => match el.attr("id") {
                Some(name) => vec![i18n::Placeholder::new("", name).into()],
                None => {
                    self.add_error(el, format!("<{}> misses the \"id\" attribute", PLACEHOLDER_TAG));
                    Vec::new()
                }
            },
            MARKER_TAG => self.visit_all(&el.children),
            _ => {
                self.add_error(el, "Unexpected tag".to_string());
                Vec::new()
            }
        }
    }

    fn visit_expansion(&mut self, icu: &ml::Expansion) -> i18n::Icu {
        let mut case_map = IndexMap::new();
        for icu_case in &icu.cases {
            let nodes = self.visit_all(&icu_case.expression);
            case_map.insert(
                icu_case.value.clone(),
                i18n::Container::new(nodes).into(),
            );
        }
        i18n::Icu::new(icu.switch_value.as_str(), icu.expansion_type.as_str(), case_map)
    }

    fn add_error(&mut self, el: &ml::Element, message: String) {
        self.errors
            .push(ParseError::new(el.source_span.clone(), message));
    }
}
