// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Naming hierarchy for failed tests.
//!
//! Test class names follow the convention `<Product>.<Tests>.<Class>[...]`: the first segment is
//! the product root, the second is the tests component, and the third is the class (scenario)
//! name.

use crate::{errors::InvalidNameFormat, resolve::ResolvedExecution};
use indexmap::IndexMap;
use trx_playlist_metadata::FailedTestSummary;

/// The suffix appended to the product root to form the project name.
pub const PROJECT_SUFFIX: &str = ".Tests";

/// The project, namespace and class a test belongs to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct NameKey {
    project: String,
    namespace: String,
    short_class_name: String,
}

impl NameKey {
    /// Derives the naming key from a fully qualified, dot-separated class name.
    ///
    /// For `Acme.Tests.LoginScenario` the project is `Acme.Tests`, the namespace is `Acme.Tests`
    /// and the class is `LoginScenario`. Segments after the third are ignored.
    pub fn parse(class_name: &str) -> Result<Self, InvalidNameFormat> {
        let segments: Vec<_> = class_name.split('.').collect();
        match segments.as_slice() {
            [root, tests, class, ..]
                if !root.is_empty() && !tests.is_empty() && !class.is_empty() =>
            {
                Ok(Self {
                    project: format!("{root}{PROJECT_SUFFIX}"),
                    namespace: format!("{root}.{tests}"),
                    short_class_name: (*class).to_owned(),
                })
            }
            _ => Err(InvalidNameFormat::new(
                class_name,
                segments.iter().filter(|segment| !segment.is_empty()).count(),
            )),
        }
    }

    /// Returns the project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the unqualified class name.
    pub fn short_class_name(&self) -> &str {
        &self.short_class_name
    }
}

/// Derives a test's display name from its test-unit name by stripping the `" in <class>"` suffix.
///
/// If the suffix is absent, the test-unit name is returned unchanged.
pub fn display_name<'a>(test_unit_name: &'a str, short_class_name: &str) -> &'a str {
    test_unit_name
        .strip_suffix(short_class_name)
        .and_then(|rest| rest.strip_suffix(" in "))
        .unwrap_or(test_unit_name)
}

/// A failed test, with its full naming hierarchy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailedTest {
    execution_id: String,
    test_unit_name: String,
    fully_qualified_name: String,
    key: NameKey,
    display_name: String,
}

impl FailedTest {
    /// Builds a failed test from a resolved execution record.
    pub fn from_resolved(resolved: ResolvedExecution<'_>) -> Result<Self, InvalidNameFormat> {
        let key = NameKey::parse(resolved.method.class_name())?;
        let display_name = display_name(resolved.test_unit_name, key.short_class_name()).to_owned();
        Ok(Self {
            execution_id: resolved.execution_id.to_owned(),
            test_unit_name: resolved.test_unit_name.to_owned(),
            fully_qualified_name: resolved.method.fully_qualified_name(),
            key,
            display_name,
        })
    }

    /// Returns the execution identifier.
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Returns the test-unit name, as recorded in the report.
    pub fn test_unit_name(&self) -> &str {
        &self.test_unit_name
    }

    /// Returns the fully qualified method name.
    pub fn fully_qualified_name(&self) -> &str {
        &self.fully_qualified_name
    }

    /// Returns the project, namespace and class of this test.
    pub fn key(&self) -> &NameKey {
        &self.key
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns a machine-readable summary of this test.
    pub fn to_summary(&self) -> FailedTestSummary {
        FailedTestSummary::new(
            &self.execution_id,
            self.key.project(),
            self.key.namespace(),
            self.key.short_class_name(),
            &self.fully_qualified_name,
            &self.display_name,
        )
    }
}

/// Failed tests grouped by class.
///
/// Classes are kept in the order they were first seen, and so are the tests within a class.
#[derive(Clone, Debug)]
pub struct TestHierarchy<'a> {
    classes: IndexMap<&'a NameKey, ClassGroup<'a>>,
    first: Option<&'a FailedTest>,
}

impl<'a> TestHierarchy<'a> {
    /// Groups the given tests by `(project, namespace, class)`.
    ///
    /// A test listed more than once in the same class is kept once. Data rows of one method share
    /// a fully qualified name but have distinct display names, so each row is kept.
    pub fn from_tests(tests: &'a [FailedTest]) -> Self {
        let mut classes: IndexMap<&'a NameKey, ClassGroup<'a>> = IndexMap::new();
        for test in tests {
            classes
                .entry(test.key())
                .or_insert_with(|| ClassGroup {
                    key: test.key(),
                    tests: IndexMap::new(),
                })
                .tests
                .entry((test.fully_qualified_name(), test.display_name()))
                .or_insert(test);
        }

        Self {
            classes,
            first: tests.first(),
        }
    }

    /// Returns true if there are no tests.
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Returns the first failed test, in report order.
    pub fn first_test(&self) -> Option<&'a FailedTest> {
        self.first
    }

    /// Iterates over the class groups, in first-seen order.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = &ClassGroup<'a>> {
        self.classes.values()
    }

    /// Returns the number of distinct tests across all classes.
    pub fn test_count(&self) -> usize {
        self.classes.values().map(ClassGroup::len).sum()
    }

    /// Groups classes by project, then by namespace, each in first-seen order.
    pub fn by_project(&self) -> IndexMap<&'a str, IndexMap<&'a str, Vec<&ClassGroup<'a>>>> {
        let mut projects: IndexMap<&'a str, IndexMap<&'a str, Vec<&ClassGroup<'a>>>> =
            IndexMap::new();
        for class in self.classes.values() {
            projects
                .entry(class.key.project())
                .or_default()
                .entry(class.key.namespace())
                .or_default()
                .push(class);
        }
        projects
    }
}

/// The failed tests of one class.
#[derive(Clone, Debug)]
pub struct ClassGroup<'a> {
    key: &'a NameKey,
    // Keyed by fully qualified name and display name.
    tests: IndexMap<(&'a str, &'a str), &'a FailedTest>,
}

impl<'a> ClassGroup<'a> {
    /// Returns the project, namespace and class of this group.
    pub fn key(&self) -> &'a NameKey {
        self.key
    }

    /// Iterates over the tests in this class, in first-seen order.
    pub fn tests(&self) -> impl ExactSizeIterator<Item = &'a FailedTest> + '_ {
        self.tests.values().copied()
    }

    /// Returns the number of tests in this class.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if this class has no tests. Groups built from tests never are.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
