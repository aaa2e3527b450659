// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `RuleTree` as a playlist.

use crate::{
    errors::SerializeError,
    rules::{Property, RuleNode, RuleTree},
};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};
use serde::{Deserialize, Serialize};
use std::io;

static PLAYLIST_TAG: &str = "Playlist";
static RULE_TAG: &str = "Rule";
static PROPERTY_TAG: &str = "Property";

static PLAYLIST_VERSION: &str = "2.0";
static ROOT_RULE_NAME: &str = "Includes";

/// Options controlling how a playlist is written.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SerializeOptions {
    /// The number of spaces to indent each nesting level by. `0` writes the playlist on a single
    /// line.
    pub indent: usize,

    /// Whether to start the playlist with an XML declaration.
    pub xml_declaration: bool,
}

impl SerializeOptions {
    /// The default indentation width.
    pub const DEFAULT_INDENT: usize = 2;

    /// Options that write the playlist on a single line, without a declaration.
    pub fn compact() -> Self {
        Self {
            indent: 0,
            xml_declaration: false,
        }
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: Self::DEFAULT_INDENT,
            xml_declaration: false,
        }
    }
}

pub(crate) fn serialize_tree(
    tree: &RuleTree,
    writer: impl io::Write,
    options: &SerializeOptions,
) -> Result<(), SerializeError> {
    let mut writer = if options.indent == 0 {
        Writer::new(writer)
    } else {
        Writer::new_with_indent(writer, b' ', options.indent)
    };

    if options.xml_declaration {
        let decl = BytesDecl::new("1.0", Some("utf-8"), None);
        writer.write_event(Event::Decl(decl))?;
    }

    let mut playlist_tag = BytesStart::new(PLAYLIST_TAG);
    playlist_tag.push_attribute(("Version", PLAYLIST_VERSION));
    writer.write_event(Event::Start(playlist_tag))?;

    serialize_node(tree.root(), Some(ROOT_RULE_NAME), &mut writer)?;

    writer.write_event(Event::End(BytesEnd::new(PLAYLIST_TAG)))?;

    if options.indent > 0 {
        // Add a trailing newline.
        writer.write_indent()?;
    }
    Ok(())
}

fn serialize_node(
    node: &RuleNode,
    name: Option<&str>,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let (match_kind, children) = match node {
        RuleNode::Any(children) => ("Any", children),
        RuleNode::All(children) => ("All", children),
        RuleNode::Property(property) => return serialize_property(property, writer),
    };

    let mut rule_tag = BytesStart::new(RULE_TAG);
    if let Some(name) = name {
        rule_tag.push_attribute(("Name", name));
    }
    rule_tag.push_attribute(("Match", match_kind));
    writer.write_event(Event::Start(rule_tag))?;

    for child in children {
        serialize_node(child, None, writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new(RULE_TAG)))?;
    Ok(())
}

fn serialize_property(
    property: &Property,
    writer: &mut Writer<impl io::Write>,
) -> Result<(), SerializeError> {
    let mut property_tag = BytesStart::new(PROPERTY_TAG);
    property_tag.push_attribute(("Name", property.name().as_str()));
    if let Some(value) = property.value() {
        property_tag.push_attribute(("Value", value));
    }
    writer.write_event(Event::Empty(property_tag))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hierarchy::{FailedTest, TestHierarchy, test_helpers::failed_test},
        rules::ProjectGrouping,
    };
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn render(tests: &[FailedTest], options: &SerializeOptions) -> String {
        let hierarchy = TestHierarchy::from_tests(tests);
        let tree =
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest).expect("tree compiles");
        let bytes = tree.to_bytes(options).expect("serializing to a Vec succeeds");
        String::from_utf8(bytes).expect("playlist is UTF-8")
    }

    fn login_test() -> FailedTest {
        failed_test(
            "e1",
            "Acme.Tests.LoginScenario",
            "Login_InvalidPassword",
            "Login_InvalidPassword in LoginScenario",
        )
    }

    #[test]
    fn compact_playlist() {
        let output = render(&[login_test()], &SerializeOptions::compact());
        let expected = concat!(
            r#"<Playlist Version="2.0">"#,
            r#"<Rule Name="Includes" Match="Any">"#,
            r#"<Rule Match="All">"#,
            r#"<Property Name="Solution"/>"#,
            r#"<Rule Match="Any">"#,
            r#"<Rule Match="All">"#,
            r#"<Property Name="Project" Value="Acme.Tests"/>"#,
            r#"<Rule Match="Any">"#,
            r#"<Rule Match="All">"#,
            r#"<Property Name="Namespace" Value="Acme.Tests"/>"#,
            r#"<Rule Match="Any">"#,
            r#"<Rule Match="All">"#,
            r#"<Property Name="Class" Value="LoginScenario"/>"#,
            r#"<Rule Match="Any">"#,
            r#"<Rule Match="All">"#,
            r#"<Property Name="TestWithNormalizedFullyQualifiedName" Value="Acme.Tests.LoginScenario.Login_InvalidPassword"/>"#,
            r#"<Rule Match="Any">"#,
            r#"<Property Name="DisplayName" Value="Login_InvalidPassword"/>"#,
            "</Rule></Rule></Rule></Rule></Rule></Rule></Rule></Rule></Rule></Rule></Rule>",
            "</Playlist>",
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn indented_playlist() {
        let options = SerializeOptions {
            indent: 2,
            xml_declaration: true,
        };
        let output = render(&[login_test()], &options);

        assert!(
            output.starts_with(indoc! {r#"
                <?xml version="1.0" encoding="utf-8"?>
                <Playlist Version="2.0">
                  <Rule Name="Includes" Match="Any">
                    <Rule Match="All">
                      <Property Name="Solution"/>
                      <Rule Match="Any">
            "#}),
            "unexpected start of playlist:\n{output}"
        );
        assert!(
            output.ends_with(indoc! {r#"
                      </Rule>
                    </Rule>
                  </Rule>
                </Playlist>
            "#}),
            "unexpected end of playlist:\n{output}"
        );
    }

    #[test]
    fn values_are_escaped() {
        let tests = [failed_test(
            "e1",
            "Acme.Tests.Generic",
            "Compare",
            "Compare(a < b && c) in Generic",
        )];
        let output = render(&tests, &SerializeOptions::compact());
        assert!(
            output.contains(r#"<Property Name="DisplayName" Value="Compare(a &lt; b &amp;&amp; c)"/>"#),
            "display name is escaped:\n{output}"
        );
    }

    #[test]
    fn default_options() {
        assert_eq!(
            SerializeOptions::default(),
            SerializeOptions {
                indent: 2,
                xml_declaration: false,
            }
        );
    }
}
