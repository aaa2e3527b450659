// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The playlist rule tree.
//!
//! A playlist selects tests through nested rules: an `All` rule is the conjunction of its
//! children, an `Any` rule their disjunction, and a property is a condition on one attribute of a
//! test. A test is selected if it satisfies at least one path from the root to a `DisplayName`
//! property.

use crate::{
    errors::{NoFailures, SerializeError},
    hierarchy::{ClassGroup, FailedTest, TestHierarchy},
    serialize::{SerializeOptions, serialize_tree},
};
use serde::{Deserialize, Serialize};
use std::{fmt, io};

/// The name of a property condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PropertyName {
    /// The solution. Written without a value, so it matches every test.
    Solution,
    /// The test project.
    Project,
    /// The namespace.
    Namespace,
    /// The unqualified class name.
    Class,
    /// The fully qualified method name.
    TestWithNormalizedFullyQualifiedName,
    /// The display name.
    DisplayName,
}

impl PropertyName {
    /// Returns the name as written in the playlist.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solution => "Solution",
            Self::Project => "Project",
            Self::Namespace => "Namespace",
            Self::Class => "Class",
            Self::TestWithNormalizedFullyQualifiedName => "TestWithNormalizedFullyQualifiedName",
            Self::DisplayName => "DisplayName",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property condition: a name and an optional value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    name: PropertyName,
    value: Option<String>,
}

impl Property {
    /// Returns the name of this property.
    pub fn name(&self) -> PropertyName {
        self.name
    }

    /// Returns the value of this property, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns true if the test satisfies this condition. Properties without a value match
    /// everything.
    pub fn matches(&self, test: &TestProperties<'_>) -> bool {
        match &self.value {
            Some(value) => test.get(self.name) == Some(value.as_str()),
            None => true,
        }
    }
}

/// A node of the rule tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RuleNode {
    /// Matches if any child matches.
    Any(Vec<RuleNode>),
    /// Matches if every child matches.
    All(Vec<RuleNode>),
    /// A single condition.
    Property(Property),
}

impl RuleNode {
    /// Creates an `Any` rule.
    pub fn any(children: impl IntoIterator<Item = RuleNode>) -> Self {
        Self::Any(children.into_iter().collect())
    }

    /// Creates an `All` rule.
    pub fn all(children: impl IntoIterator<Item = RuleNode>) -> Self {
        Self::All(children.into_iter().collect())
    }

    /// Creates a property condition with a value.
    pub fn property(name: PropertyName, value: impl Into<String>) -> Self {
        Self::Property(Property {
            name,
            value: Some(value.into()),
        })
    }

    /// Creates a property condition without a value.
    pub fn flag(name: PropertyName) -> Self {
        Self::Property(Property { name, value: None })
    }

    /// Returns the property if this node is one.
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Self::Property(property) => Some(property),
            Self::Any(_) | Self::All(_) => None,
        }
    }

    /// Returns true if this node selects the given test.
    pub fn selects(&self, test: &TestProperties<'_>) -> bool {
        match self {
            Self::Any(children) => children.iter().any(|child| child.selects(test)),
            Self::All(children) => children.iter().all(|child| child.selects(test)),
            Self::Property(property) => property.matches(test),
        }
    }
}

/// The attributes of a test that property conditions are evaluated against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TestProperties<'a> {
    /// The test project.
    pub project: &'a str,
    /// The namespace.
    pub namespace: &'a str,
    /// The unqualified class name.
    pub class: &'a str,
    /// The fully qualified method name.
    pub fully_qualified_name: &'a str,
    /// The display name.
    pub display_name: &'a str,
}

impl<'a> TestProperties<'a> {
    /// Returns the properties of a failed test.
    pub fn of(test: &'a FailedTest) -> Self {
        Self {
            project: test.key().project(),
            namespace: test.key().namespace(),
            class: test.key().short_class_name(),
            fully_qualified_name: test.fully_qualified_name(),
            display_name: test.display_name(),
        }
    }

    fn get(&self, name: PropertyName) -> Option<&'a str> {
        match name {
            PropertyName::Solution => None,
            PropertyName::Project => Some(self.project),
            PropertyName::Namespace => Some(self.namespace),
            PropertyName::Class => Some(self.class),
            PropertyName::TestWithNormalizedFullyQualifiedName => Some(self.fully_qualified_name),
            PropertyName::DisplayName => Some(self.display_name),
        }
    }
}

/// How failed tests are grouped under project and namespace rules.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectGrouping {
    /// Take the project and namespace from the first failed test, and place every class under
    /// them. Assumes a report covers a single test project.
    #[default]
    FirstTest,

    /// One project rule per project, and one namespace rule per namespace within it.
    PerProject,
}

/// A compiled rule tree, ready to be serialized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleTree {
    root: RuleNode,
    unplaced_test_count: usize,
}

impl RuleTree {
    /// Compiles the rule tree for the given failed tests.
    ///
    /// Returns [`NoFailures`] if the hierarchy is empty.
    pub fn compile(
        hierarchy: &TestHierarchy<'_>,
        grouping: ProjectGrouping,
    ) -> Result<Self, NoFailures> {
        let first = hierarchy.first_test().ok_or(NoFailures)?;

        let (projects, unplaced_test_count) = match grouping {
            ProjectGrouping::FirstTest => {
                let key = first.key();
                let namespace = namespace_rule(key.namespace(), hierarchy.classes());
                let project = project_rule(key.project(), [namespace]);
                // Tests from other projects or namespaces are placed under the first test's
                // project and namespace, where a test runner will not find them.
                let unplaced = hierarchy
                    .classes()
                    .filter(|class| {
                        class.key().project() != key.project()
                            || class.key().namespace() != key.namespace()
                    })
                    .map(ClassGroup::len)
                    .sum();
                (vec![project], unplaced)
            }
            ProjectGrouping::PerProject => {
                let projects = hierarchy
                    .by_project()
                    .into_iter()
                    .map(|(project, namespaces)| {
                        let namespaces = namespaces.into_iter().map(|(namespace, classes)| {
                            namespace_rule(namespace, classes.into_iter())
                        });
                        project_rule(project, namespaces)
                    })
                    .collect();
                (projects, 0)
            }
        };

        let root = RuleNode::any([RuleNode::all([
            RuleNode::flag(PropertyName::Solution),
            RuleNode::any(projects),
        ])]);

        Ok(Self {
            root,
            unplaced_test_count,
        })
    }

    /// Returns the root rule.
    pub fn root(&self) -> &RuleNode {
        &self.root
    }

    /// Returns the number of failed tests that this tree cannot select because they belong to a
    /// different project or namespace than the first failed test.
    ///
    /// Always zero for [`ProjectGrouping::PerProject`].
    pub fn unplaced_test_count(&self) -> usize {
        self.unplaced_test_count
    }

    /// Returns true if the tree selects the given test.
    pub fn selects(&self, test: &TestProperties<'_>) -> bool {
        self.root.selects(test)
    }

    /// Returns every root-to-leaf selection path: the conjunction of property conditions that
    /// leads to each `DisplayName` leaf, in document order.
    pub fn selection_paths(&self) -> Vec<Vec<&Property>> {
        let mut paths = Vec::new();
        collect_paths(&self.root, &mut Vec::new(), &mut paths);
        paths
    }

    /// Serializes this tree as a playlist to the given writer.
    pub fn serialize(
        &self,
        writer: impl io::Write,
        options: &SerializeOptions,
    ) -> Result<(), SerializeError> {
        serialize_tree(self, writer, options)
    }

    /// Serializes this tree as a playlist to a byte vector.
    pub fn to_bytes(&self, options: &SerializeOptions) -> Result<Vec<u8>, SerializeError> {
        let mut buf = Vec::new();
        self.serialize(&mut buf, options)?;
        Ok(buf)
    }
}

fn project_rule(project: &str, namespaces: impl IntoIterator<Item = RuleNode>) -> RuleNode {
    RuleNode::all([
        RuleNode::property(PropertyName::Project, project),
        RuleNode::any(namespaces),
    ])
}

fn namespace_rule<'a, 'b: 'a>(
    namespace: &str,
    classes: impl Iterator<Item = &'a ClassGroup<'b>>,
) -> RuleNode {
    RuleNode::all([
        RuleNode::property(PropertyName::Namespace, namespace),
        RuleNode::any(classes.map(class_rule)),
    ])
}

fn class_rule(class: &ClassGroup<'_>) -> RuleNode {
    RuleNode::all([
        RuleNode::property(PropertyName::Class, class.key().short_class_name()),
        RuleNode::any(class.tests().map(method_rule)),
    ])
}

fn method_rule(test: &FailedTest) -> RuleNode {
    RuleNode::all([
        RuleNode::property(
            PropertyName::TestWithNormalizedFullyQualifiedName,
            test.fully_qualified_name(),
        ),
        RuleNode::any([RuleNode::property(
            PropertyName::DisplayName,
            test.display_name(),
        )]),
    ])
}

fn collect_paths<'a>(
    node: &'a RuleNode,
    prefix: &mut Vec<&'a Property>,
    paths: &mut Vec<Vec<&'a Property>>,
) {
    match node {
        RuleNode::Property(property) => {
            if property.name == PropertyName::DisplayName {
                let mut path = prefix.clone();
                path.push(property);
                paths.push(path);
            }
        }
        RuleNode::Any(children) => {
            for child in children {
                collect_paths(child, prefix, paths);
            }
        }
        RuleNode::All(children) => {
            let len = prefix.len();
            prefix.extend(
                children
                    .iter()
                    .filter_map(RuleNode::as_property)
                    .filter(|property| property.name != PropertyName::DisplayName),
            );
            for child in children {
                match child {
                    RuleNode::Property(property) if property.name != PropertyName::DisplayName => {}
                    _ => collect_paths(child, prefix, paths),
                }
            }
            prefix.truncate(len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::test_helpers::failed_test;
    use indexmap::IndexSet;
    use pretty_assertions::assert_eq;
    use proptest::{collection::vec, prelude::*};

    fn login_test() -> FailedTest {
        failed_test(
            "e1",
            "Acme.Tests.LoginScenario",
            "Login_InvalidPassword",
            "Login_InvalidPassword in LoginScenario",
        )
    }

    #[test]
    fn single_failed_test() {
        let tests = vec![login_test()];
        let hierarchy = TestHierarchy::from_tests(&tests);
        let tree =
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest).expect("tree compiles");

        let expected = RuleNode::any([RuleNode::all([
            RuleNode::flag(PropertyName::Solution),
            RuleNode::any([RuleNode::all([
                RuleNode::property(PropertyName::Project, "Acme.Tests"),
                RuleNode::any([RuleNode::all([
                    RuleNode::property(PropertyName::Namespace, "Acme.Tests"),
                    RuleNode::any([RuleNode::all([
                        RuleNode::property(PropertyName::Class, "LoginScenario"),
                        RuleNode::any([RuleNode::all([
                            RuleNode::property(
                                PropertyName::TestWithNormalizedFullyQualifiedName,
                                "Acme.Tests.LoginScenario.Login_InvalidPassword",
                            ),
                            RuleNode::any([RuleNode::property(
                                PropertyName::DisplayName,
                                "Login_InvalidPassword",
                            )]),
                        ])]),
                    ])]),
                ])]),
            ])]),
        ])]);
        assert_eq!(tree.root(), &expected);
        assert_eq!(tree.unplaced_test_count(), 0);
        assert!(tree.selects(&TestProperties::of(&tests[0])));
    }

    #[test]
    fn same_class_shares_branch() {
        let tests = vec![
            login_test(),
            failed_test(
                "e2",
                "Acme.Tests.LoginScenario",
                "Login_Locked",
                "Login_Locked in LoginScenario",
            ),
        ];
        let hierarchy = TestHierarchy::from_tests(&tests);
        let tree =
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest).expect("tree compiles");

        let classes = class_rules(&tree);
        assert_eq!(classes.len(), 1, "one class branch");
        let RuleNode::All(class_children) = classes[0] else {
            panic!("class rule is an All rule");
        };
        assert_eq!(class_children.len(), 2);
        let RuleNode::Any(methods) = &class_children[1] else {
            panic!("class rule holds an Any rule");
        };
        assert_eq!(methods.len(), 2, "two method branches");
        assert_eq!(tree.selection_paths().len(), 2);
    }

    #[test]
    fn no_failures() {
        let hierarchy = TestHierarchy::from_tests(&[]);
        assert_eq!(
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest),
            Err(NoFailures)
        );
        assert_eq!(
            RuleTree::compile(&hierarchy, ProjectGrouping::PerProject),
            Err(NoFailures)
        );
    }

    #[test]
    fn selection_path_conditions() {
        let tests = vec![login_test()];
        let hierarchy = TestHierarchy::from_tests(&tests);
        let tree =
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest).expect("tree compiles");

        let paths = tree.selection_paths();
        assert_eq!(paths.len(), 1);
        let conditions: Vec<_> = paths[0]
            .iter()
            .map(|property| (property.name(), property.value()))
            .collect();
        assert_eq!(
            conditions,
            vec![
                (PropertyName::Solution, None),
                (PropertyName::Project, Some("Acme.Tests")),
                (PropertyName::Namespace, Some("Acme.Tests")),
                (PropertyName::Class, Some("LoginScenario")),
                (
                    PropertyName::TestWithNormalizedFullyQualifiedName,
                    Some("Acme.Tests.LoginScenario.Login_InvalidPassword")
                ),
                (PropertyName::DisplayName, Some("Login_InvalidPassword")),
            ]
        );
    }

    #[test]
    fn multiple_projects() {
        let tests = vec![
            login_test(),
            failed_test("e2", "Billing.Tests.Invoice", "Totals", "Totals in Invoice"),
            failed_test("e3", "Acme.Tests.Signup", "Email", "Email in Signup"),
        ];
        let hierarchy = TestHierarchy::from_tests(&tests);

        let first =
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest).expect("tree compiles");
        assert_eq!(first.unplaced_test_count(), 1);
        assert!(first.selects(&TestProperties::of(&tests[0])));
        assert!(!first.selects(&TestProperties::of(&tests[1])));
        assert!(first.selects(&TestProperties::of(&tests[2])));

        let per_project =
            RuleTree::compile(&hierarchy, ProjectGrouping::PerProject).expect("tree compiles");
        assert_eq!(per_project.unplaced_test_count(), 0);
        for test in &tests {
            assert!(per_project.selects(&TestProperties::of(test)));
        }
        let projects: Vec<_> = per_project
            .selection_paths()
            .iter()
            .map(|path| path[1].value())
            .collect();
        assert_eq!(
            projects,
            vec![Some("Acme.Tests"), Some("Acme.Tests"), Some("Billing.Tests")]
        );
    }

    #[test]
    fn groupings_agree_for_one_project() {
        let tests = vec![
            login_test(),
            failed_test("e2", "Acme.Tests.Signup", "Email", "Email in Signup"),
        ];
        let hierarchy = TestHierarchy::from_tests(&tests);
        assert_eq!(
            RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest),
            RuleTree::compile(&hierarchy, ProjectGrouping::PerProject),
        );
    }

    // Walks down the fixed single-project shape to the class rules.
    fn class_rules(tree: &RuleTree) -> Vec<&RuleNode> {
        let mut node = tree.root();
        // Any -> All(solution) -> Any -> All(project) -> Any -> All(namespace) -> Any(classes)
        for _ in 0..3 {
            let RuleNode::Any(children) = node else {
                panic!("expected Any rule");
            };
            let RuleNode::All(children) = &children[0] else {
                panic!("expected All rule");
            };
            node = &children[1];
        }
        let RuleNode::Any(classes) = node else {
            panic!("expected Any rule of classes");
        };
        classes.iter().collect()
    }

    proptest! {
        // N distinct failed tests across K classes produce exactly N selection paths, one per
        // test, and K class branches. Methods are drawn from a small pool so that data rows of
        // the same method (same fully qualified name, distinct display names) are common.
        #[test]
        fn one_path_per_test(
            class_count in 1..6usize,
            rows in vec((0..6usize, 0..4usize, 0..3usize), 1..24),
        ) {
            let mut seen = IndexSet::new();
            let mut classes = IndexSet::new();
            let mut tests = Vec::new();
            for (index, (class, method, row)) in rows.into_iter().enumerate() {
                let class = format!("Class{}", class % class_count);
                let class_name = format!("Acme.Tests.{class}");
                let method = format!("Method{method}");
                let display_name = format!("{method} ({row})");
                // Exact repeats are merged; they are covered by the hierarchy tests.
                if !seen.insert(format!("{class_name}.{method}/{display_name}")) {
                    continue;
                }
                classes.insert(class.clone());
                tests.push(failed_test(
                    &format!("e{index}"),
                    &class_name,
                    &method,
                    &format!("{display_name} in {class}"),
                ));
            }

            let hierarchy = TestHierarchy::from_tests(&tests);
            let tree = RuleTree::compile(&hierarchy, ProjectGrouping::FirstTest)
                .expect("tree compiles");
            prop_assert_eq!(class_rules(&tree).len(), classes.len());

            let paths = tree.selection_paths();
            prop_assert_eq!(paths.len(), tests.len());

            let mut leaves: Vec<_> = paths
                .iter()
                .map(|path| path.last().and_then(|leaf| leaf.value()).unwrap_or_default())
                .collect();
            let mut display_names: Vec<_> = tests.iter().map(FailedTest::display_name).collect();
            leaves.sort_unstable();
            display_names.sort_unstable();
            prop_assert_eq!(leaves, display_names);

            for test in &tests {
                let properties = TestProperties::of(test);
                prop_assert!(tree.selects(&properties));
                let matching = paths
                    .iter()
                    .filter(|path| path.iter().all(|property| property.matches(&properties)))
                    .count();
                prop_assert_eq!(matching, 1, "test {} has one path", test.fully_qualified_name());
            }
        }
    }
}
