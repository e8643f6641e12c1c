/**
 * XLIFF Serializer Tests
 *
 * Writing messages, loading translations and reading raw trans-units
 */

use i18n_xliff::i18n::{
    BlockPlaceholder, Container, Icu, IcuPlaceholder, Message, MessageSpan, Node, Placeholder,
    TagPlaceholder, Text,
};
use i18n_xliff::{compute_message_digest, LoadResult, Serializer, Xliff, XliffError, XliffOptions};
use indexmap::IndexMap;

fn xliff_with_units(units: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="en" target-language="fr" datatype="plaintext" original="ng2.template">
    <body>
{}
    </body>
  </file>
</xliff>
"#,
        units
    )
}

fn load(units: &str) -> Result<LoadResult, XliffError> {
    Xliff::new().load(&xliff_with_units(units), "file://messages.fr.xlf")
}

fn error_messages(err: &XliffError) -> Vec<String> {
    err.errors().iter().map(|e| e.msg.clone()).collect()
}

/// Markup written inside the first `<source>` element
fn source_of(document: &str) -> &str {
    let start = document.find("<source>").map(|i| i + "<source>".len()).unwrap_or(0);
    let end = document.find("</source>").unwrap_or(document.len());
    &document[start..end]
}

fn cases(entries: Vec<(&str, Node)>) -> IndexMap<String, Node> {
    entries
        .into_iter()
        .map(|(label, node)| (label.to_string(), node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod write {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_write_a_valid_xliff_file() {
            let message = Message::new(
                "m1",
                vec![
                    Text::new("hello ").into(),
                    TagPlaceholder::new(
                        "b",
                        "START_BOLD_TEXT",
                        "CLOSE_BOLD_TEXT",
                        vec![Text::new("world").into()],
                        false,
                    )
                    .into(),
                    Placeholder::new("name", "INTERPOLATION").into(),
                ],
            )
            .with_source(MessageSpan::new("file.ts", 2))
            .with_description("d")
            .with_meaning("m");

            let expected = r#"<?xml version="1.0" encoding="UTF-8" ?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="en" datatype="plaintext" original="ng2.template">
    <body>
      <trans-unit id="m1" datatype="html">
        <source>hello <x id="START_BOLD_TEXT" ctype="x-b" equiv-text="&lt;b&gt;"/>world<x id="CLOSE_BOLD_TEXT" ctype="x-b" equiv-text="&lt;/b&gt;"/><x id="INTERPOLATION" equiv-text="{{name}}"/></source>
        <context-group purpose="location">
          <context context-type="sourcefile">file.ts</context>
          <context context-type="linenumber">2</context>
        </context-group>
        <note priority="1" from="description">d</note>
        <note priority="1" from="meaning">m</note>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;
            assert_eq!(Xliff::new().write(&[message], None), expected);
        }

        #[test]
        fn should_write_an_empty_body_without_messages() {
            let expected = r#"<?xml version="1.0" encoding="UTF-8" ?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="de" datatype="plaintext" original="ng2.template">
    <body>
    </body>
  </file>
</xliff>
"#;
            assert_eq!(Xliff::new().write(&[], Some("de")), expected);
        }

        #[test]
        fn should_fall_back_to_the_default_language_for_an_empty_locale() {
            let document = Xliff::new().write(&[Message::new("a", vec![])], Some(""));
            assert!(document.contains(
                "<file source-language=\"en\" datatype=\"plaintext\" original=\"ng2.template\">"
            ));
        }

        #[test]
        fn should_write_one_context_group_per_source() {
            let message = Message::new("m", vec![Text::new("x").into()])
                .with_source(MessageSpan::new("a.html", 1))
                .with_source(MessageSpan::new("b.html", 20));
            let document = Xliff::new().write(&[message], None);
            assert_eq!(document.matches("<context-group purpose=\"location\">").count(), 2);
            assert!(document.contains("<context context-type=\"sourcefile\">b.html</context>"));
            assert!(document.contains("<context context-type=\"linenumber\">20</context>"));
        }

        #[test]
        fn should_skip_empty_notes() {
            let message = Message::new("m", vec![Text::new("x").into()])
                .with_description("")
                .with_meaning("");
            let document = Xliff::new().write(&[message], None);
            assert!(!document.contains("<note"));
        }

        #[test]
        fn should_write_an_empty_source_as_self_closing() {
            let document = Xliff::new().write(&[Message::new("m", vec![])], None);
            assert!(document.contains("<source/>"));
        }

        #[test]
        fn should_escape_text() {
            let message = Message::new("m", vec![Text::new("a < b & 'c'").into()]);
            let document = Xliff::new().write(&[message], None);
            assert_eq!(source_of(&document), "a &lt; b &amp; &apos;c&apos;");
        }

        #[test]
        fn should_honor_options() {
            let options = XliffOptions {
                default_source_language: "fr".to_string(),
                original: "app.template".to_string(),
                pretty: false,
            };
            let message = Message::new("a", vec![Text::new("x").into()]);
            assert_eq!(
                Xliff::with_options(options).write(&[message], None),
                "<?xml version=\"1.0\" encoding=\"UTF-8\" ?><xliff version=\"1.2\" xmlns=\"urn:oasis:names:tc:xliff:document:1.2\"><file source-language=\"fr\" datatype=\"plaintext\" original=\"app.template\"><body><trans-unit id=\"a\" datatype=\"html\"><source>x</source></trans-unit></body></file></xliff>"
            );
        }
    }

    mod placeholders {
        use super::*;
        use pretty_assertions::assert_eq;

        fn write_source(nodes: Vec<Node>) -> String {
            let document = Xliff::new().write(&[Message::new("m", nodes)], None);
            source_of(&document).to_string()
        }

        #[test]
        fn should_write_void_tags() {
            let source = write_source(vec![
                TagPlaceholder::new("br", "LINE_BREAK", "", vec![], true).into(),
                TagPlaceholder::new("img", "TAG_IMG", "", vec![], true).into(),
            ]);
            assert_eq!(
                source,
                "<x id=\"LINE_BREAK\" ctype=\"lb\" equiv-text=\"&lt;br/&gt;\"/><x id=\"TAG_IMG\" ctype=\"image\" equiv-text=\"&lt;img/&gt;\"/>"
            );
        }

        #[test]
        fn should_write_blocks() {
            let source = write_source(vec![BlockPlaceholder::new(
                "if",
                vec!["cond".to_string()],
                "START_BLOCK_IF",
                "CLOSE_BLOCK_IF",
                vec![Text::new("shown").into()],
            )
            .into()]);
            assert_eq!(
                source,
                "<x id=\"START_BLOCK_IF\" ctype=\"x-if\" equiv-text=\"@if\"/>shown<x id=\"CLOSE_BLOCK_IF\" ctype=\"x-if\" equiv-text=\"}\"/>"
            );
        }

        #[test]
        fn should_normalize_block_names_in_ctype() {
            let source = write_source(vec![BlockPlaceholder::new(
                "else if",
                vec![],
                "START_BLOCK_ELSE_IF",
                "CLOSE_BLOCK_ELSE_IF",
                vec![],
            )
            .into()]);
            assert!(source.contains("ctype=\"x-else-if\""));
            assert!(source.contains("equiv-text=\"@else if\""));
        }

        #[test]
        fn should_write_icu_placeholders() {
            let icu = Icu::new(
                "count",
                "plural",
                cases(vec![
                    ("=0", Text::new("none").into()),
                    ("other", Text::new("many").into()),
                ]),
            );
            let source = write_source(vec![IcuPlaceholder::new(icu, "ICU").into()]);
            assert_eq!(
                source,
                "<x id=\"ICU\" equiv-text=\"{count, plural, =0 {...} other {...}}\"/>"
            );
        }

        #[test]
        fn should_write_icu_messages_inline() {
            let icu = Icu::new(
                "count",
                "plural",
                cases(vec![
                    ("=0", Container::new(vec![Text::new("none").into()]).into()),
                    (
                        "other",
                        Container::new(vec![
                            Placeholder::new("count", "INTERPOLATION").into(),
                            Text::new(" items").into(),
                        ])
                        .into(),
                    ),
                ]),
            )
            .with_expression_placeholder("VAR_PLURAL");
            let source = write_source(vec![icu.into()]);
            assert_eq!(
                source,
                "{VAR_PLURAL, plural, =0 {none} other {<x id=\"INTERPOLATION\" equiv-text=\"{{count}}\"/> items} }"
            );
        }
    }

    mod load {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_load_translations_and_locale() {
            let result = load(
                r#"      <trans-unit id="1" datatype="html">
        <source>hello <x id="INTERPOLATION"/></source>
        <target>bonjour <x id="INTERPOLATION"/> !</target>
      </trans-unit>"#,
            )
            .unwrap();
            assert_eq!(result.locale.as_deref(), Some("fr"));
            assert_eq!(
                result.i18n_nodes_by_msg_id["1"],
                vec![
                    Text::new("bonjour ").into(),
                    Placeholder::new("", "INTERPOLATION").into(),
                    Text::new(" !").into(),
                ]
            );
        }

        #[test]
        fn should_keep_document_order() {
            let result = load(
                r#"<trans-unit id="b"><target>B</target></trans-unit>
<trans-unit id="a"><target>A</target></trans-unit>"#,
            )
            .unwrap();
            let ids: Vec<&str> = result.i18n_nodes_by_msg_id.keys().map(String::as_str).collect();
            assert_eq!(ids, vec!["b", "a"]);
        }

        #[test]
        fn should_return_no_locale_without_target_language() {
            let result = Xliff::new()
                .load(
                    "<xliff><file><body><trans-unit id=\"1\"><target>x</target></trans-unit></body></file></xliff>",
                    "file://t.xlf",
                )
                .unwrap();
            assert_eq!(result.locale, None);
            assert_eq!(result.i18n_nodes_by_msg_id["1"], vec![Text::new("x").into()]);
        }

        #[test]
        fn should_flatten_markers() {
            let result = load(
                r#"<trans-unit id="1"><target><mrk mtype="seg" mid="0">a</mrk>b</target></trans-unit>"#,
            )
            .unwrap();
            assert_eq!(
                result.i18n_nodes_by_msg_id["1"],
                vec![Text::new("a").into(), Text::new("b").into()]
            );
        }

        #[test]
        fn should_decode_entities() {
            let result = load(r#"<trans-unit id="1"><target>a &amp; b &lt;c&gt;</target></trans-unit>"#)
                .unwrap();
            assert_eq!(
                result.i18n_nodes_by_msg_id["1"],
                vec![Text::new("a & b <c>").into()]
            );
        }

        #[test]
        fn should_load_icu_messages() {
            let result = load(
                r#"<trans-unit id="1"><target>{VAR_PLURAL, plural, =0 {zero} other {<x id="INTERPOLATION"/> items}}</target></trans-unit>"#,
            )
            .unwrap();
            let expected = Icu::new(
                "VAR_PLURAL",
                "plural",
                cases(vec![
                    ("=0", Container::new(vec![Text::new("zero").into()]).into()),
                    (
                        "other",
                        Container::new(vec![
                            Placeholder::new("", "INTERPOLATION").into(),
                            Text::new(" items").into(),
                        ])
                        .into(),
                    ),
                ]),
            );
            assert_eq!(result.i18n_nodes_by_msg_id["1"], vec![expected.into()]);
        }

        #[test]
        fn should_load_empty_targets() {
            let result = load(
                r#"<trans-unit id="1"><target/></trans-unit>
<trans-unit id="2"><target></target></trans-unit>"#,
            )
            .unwrap();
            assert!(result.i18n_nodes_by_msg_id["1"].is_empty());
            assert!(result.i18n_nodes_by_msg_id["2"].is_empty());
        }

        #[test]
        fn should_keep_the_last_target_of_a_unit() {
            let result = load(
                r#"<trans-unit id="1"><target>one</target><target>two</target></trans-unit>"#,
            )
            .unwrap();
            assert_eq!(result.i18n_nodes_by_msg_id["1"], vec![Text::new("two").into()]);
        }

        #[test]
        fn should_ignore_sources_and_alternate_translations() {
            let result = load(
                r#"<trans-unit id="1">
  <source>hello</source>
  <seg-source><mrk mtype="seg">hello</mrk></seg-source>
  <target>bonjour</target>
  <alt-trans><target>salut</target></alt-trans>
</trans-unit>"#,
            )
            .unwrap();
            assert_eq!(result.i18n_nodes_by_msg_id["1"], vec![Text::new("bonjour").into()]);
        }

        #[test]
        fn should_ignore_comments_in_targets() {
            let result = load(r#"<trans-unit id="1"><target>a<!-- note -->b</target></trans-unit>"#)
                .unwrap();
            assert_eq!(
                result.i18n_nodes_by_msg_id["1"],
                vec![Text::new("a").into(), Text::new("b").into()]
            );
        }
    }

    mod load_errors {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_report_duplicated_translations() {
            let err = load(
                r#"<trans-unit id="1"><target>a</target></trans-unit>
<trans-unit id="1"><target>b</target></trans-unit>"#,
            )
            .unwrap_err();
            assert_eq!(error_messages(&err), vec!["Duplicated translations for msg 1"]);
        }

        #[test]
        fn should_report_missing_translations() {
            let err = load(r#"<trans-unit id="1"><source>a</source></trans-unit>"#).unwrap_err();
            assert_eq!(error_messages(&err), vec!["Message 1 misses a translation"]);
        }

        #[test]
        fn should_report_missing_ids() {
            let err = load(r#"<trans-unit><target>a</target></trans-unit>"#).unwrap_err();
            assert_eq!(
                error_messages(&err),
                vec!["<trans-unit> misses the \"id\" attribute"]
            );
        }

        #[test]
        fn should_report_placeholders_without_ids() {
            let err = load(r#"<trans-unit id="1"><target>a<x/></target></trans-unit>"#).unwrap_err();
            assert_eq!(error_messages(&err), vec!["<x> misses the \"id\" attribute"]);
        }

        #[test]
        fn should_report_unexpected_tags() {
            let err = load(r#"<trans-unit id="1"><target><b>a</b></target></trans-unit>"#).unwrap_err();
            assert_eq!(error_messages(&err), vec!["Unexpected tag"]);
        }

        #[test]
        fn should_report_malformed_documents() {
            let err = Xliff::new()
                .load("<xliff><file></xliff>", "file://t.xlf")
                .unwrap_err();
            assert!(!err.errors().is_empty());
        }

        #[test]
        fn should_collect_errors_from_every_unit() {
            let err = load(
                r#"<trans-unit id="1"><target><b>a</b></target></trans-unit>
<trans-unit id="2"></trans-unit>
<trans-unit id="3"><target><i>c</i></target></trans-unit>"#,
            )
            .unwrap_err();
            assert_eq!(
                error_messages(&err),
                vec!["Message 2 misses a translation", "Unexpected tag", "Unexpected tag"]
            );
        }

        #[test]
        fn should_list_every_error_in_the_message() {
            let err = load(
                r#"<trans-unit id="1"></trans-unit>
<trans-unit id="2"></trans-unit>"#,
            )
            .unwrap_err();
            let rendered = err.to_string();
            assert!(rendered.starts_with("xliff parse errors:\n"));
            assert!(rendered.contains("Message 1 misses a translation"));
            assert!(rendered.contains("Message 2 misses a translation"));
            assert!(rendered.contains("file://messages.fr.xlf@"));
        }
    }

    mod load_units {
        use super::*;
        use pretty_assertions::assert_eq;
        use i18n_xliff::xml;

        #[test]
        fn should_return_raw_targets() {
            let units = Xliff::new()
                .load_units(
                    &xliff_with_units(
                        r#"<trans-unit id="1"><source>a</source><target>x &amp; <x id="PH"/></target></trans-unit>
<trans-unit id="2"><target/></trans-unit>"#,
                    ),
                    "file://t.xlf",
                )
                .unwrap();
            assert_eq!(units["1"].target, "x &amp; <x id=\"PH\"/>");
            assert_eq!(units["2"].target, "");
        }

        #[test]
        fn should_return_the_unit_element() {
            let units = Xliff::new()
                .load_units(
                    &xliff_with_units(
                        r#"<trans-unit id="1" datatype="html"><!-- c --><target>x</target></trans-unit>"#,
                    ),
                    "file://t.xlf",
                )
                .unwrap();
            let expected: xml::Node = xml::Tag::new("trans-unit")
                .with_attr("id", "1")
                .with_attr("datatype", "html")
                .with_child(xml::Tag::new("target").with_child(xml::Text::new("x")))
                .into();
            assert_eq!(units["1"].node, expected);
        }

        #[test]
        fn should_not_decode_targets() {
            let units = Xliff::new()
                .load_units(
                    &xliff_with_units(r#"<trans-unit id="1"><target><b>a</b></target></trans-unit>"#),
                    "file://t.xlf",
                )
                .unwrap();
            assert_eq!(units["1"].target, "<b>a</b>");
        }

        #[test]
        fn should_report_structural_errors() {
            let err = Xliff::new()
                .load_units(
                    &xliff_with_units(r#"<trans-unit id="1"></trans-unit>"#),
                    "file://t.xlf",
                )
                .unwrap_err();
            assert_eq!(error_messages(&err), vec!["Message 1 misses a translation"]);
        }
    }

    mod digest {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn should_use_the_message_id() {
            let message = Message::new("custom-id", vec![Text::new("hello").into()]);
            assert_eq!(Xliff::new().digest(&message), "custom-id");
        }

        #[test]
        fn should_compute_an_id_from_content_and_meaning() {
            let message = Message::new("", vec![Text::new("hello").into()]);
            assert_eq!(
                Xliff::new().digest(&message),
                "a079cbe048d3eee20822f5bc6fbcbf576b1586a7"
            );
            assert_eq!(
                compute_message_digest(&message.with_meaning("greeting")),
                "c5e228b8b4a30c6038804025bf800aa6a21d0668"
            );
        }
    }
}
