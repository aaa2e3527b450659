// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading TRX reports.
//!
//! A TRX report records each test twice. Outcome records (`UnitTestResult` under `Results`) carry
//! the pass/fail result, and execution records (`Execution` under `TestDefinitions/UnitTest`) tie
//! the same execution identifier to the test method's class and name:
//!
//! ```xml
//! <TestRun>
//!   <TestDefinitions>
//!     <UnitTest name="Login_InvalidPassword in LoginScenario" id="...">
//!       <Execution id="e1" />
//!       <TestMethod className="Acme.Tests.LoginScenario" name="Login_InvalidPassword" />
//!     </UnitTest>
//!   </TestDefinitions>
//!   <Results>
//!     <UnitTestResult executionId="e1" outcome="Failed" />
//!   </Results>
//! </TestRun>
//! ```
//!
//! The two streams are ordered independently.

use crate::{
    document::{Document, ElementId},
    errors::ReadReportError,
    outcome::{Outcome, OutcomeRecord},
};

static UNIT_TEST_RESULT_TAG: &str = "UnitTestResult";
static EXECUTION_TAG: &str = "Execution";

static EXECUTION_ID_ATTR: &str = "executionId";
static PARENT_EXECUTION_ID_ATTR: &str = "parentExecutionId";
static OUTCOME_ATTR: &str = "outcome";
static TEST_NAME_ATTR: &str = "testName";
static ID_ATTR: &str = "id";
static NAME_ATTR: &str = "name";
static CLASS_NAME_ATTR: &str = "className";

/// A parsed TRX report: its outcome records and execution records, each in document order.
#[derive(Clone, Debug)]
pub struct Report {
    outcomes: Vec<OutcomeRecord>,
    executions: Vec<ExecutionRecord>,
}

impl Report {
    /// Loads a report from its raw text.
    pub fn load(input: &str) -> Result<Self, ReadReportError> {
        let document = Document::parse(input)?;
        Self::from_document(&document)
    }

    /// Collects the outcome and execution records from an already-parsed document.
    pub fn from_document(document: &Document) -> Result<Self, ReadReportError> {
        let outcomes = collect_outcomes(document)?;
        let executions = document
            .elements_with_attribute(EXECUTION_TAG, ID_ATTR)
            .map(|id| ExecutionRecord::from_element(document, id))
            .collect();

        Ok(Self {
            outcomes,
            executions,
        })
    }

    /// Returns the outcome records, in document order.
    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    /// Returns the execution records, in document order.
    pub fn executions(&self) -> &[ExecutionRecord] {
        &self.executions
    }
}

fn collect_outcomes(document: &Document) -> Result<Vec<OutcomeRecord>, ReadReportError> {
    let mut outcomes = Vec::new();
    for id in document.elements_named(UNIT_TEST_RESULT_TAG) {
        let element = document.element(id);

        // Inner results of data-driven tests are summarized by their enclosing result, and their
        // execution ids have no `Execution` element of their own.
        if element.attribute(PARENT_EXECUTION_ID_ATTR).is_some() {
            continue;
        }

        let outcome = Outcome::from_attribute(element.attribute(OUTCOME_ATTR).unwrap_or_default());
        match element.attribute(EXECUTION_ID_ATTR) {
            Some(execution_id) => outcomes.push(OutcomeRecord::new(execution_id, outcome)),
            None if outcome.is_failure() => {
                return Err(ReadReportError::MissingExecutionId {
                    test_name: element.attribute(TEST_NAME_ATTR).map(str::to_owned),
                });
            }
            // A result that didn't fail and can't be correlated doesn't matter.
            None => {}
        }
    }
    Ok(outcomes)
}

/// The class and method that an execution ran.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MethodDescriptor {
    class_name: String,
    method_name: String,
}

impl MethodDescriptor {
    /// Creates a new method descriptor.
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }

    /// Returns the fully qualified, dot-separated class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Returns the method name.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Returns the fully qualified method name: `<class name>.<method name>`.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }
}

/// A structural execution entry in the report.
///
/// The test name and method descriptor are looked up when the report is loaded, but their
/// absence is only an error once a failed test needs them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionRecord {
    execution_id: String,
    test_unit_name: Option<String>,
    method: Option<MethodDescriptor>,
}

impl ExecutionRecord {
    /// Creates a new execution record.
    pub fn new(
        execution_id: impl Into<String>,
        test_unit_name: Option<String>,
        method: Option<MethodDescriptor>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            test_unit_name,
            method,
        }
    }

    fn from_element(document: &Document, id: ElementId) -> Self {
        let execution_id = document
            .element(id)
            .attribute(ID_ATTR)
            .unwrap_or_default()
            .to_owned();
        let test_unit_name = document
            .parent(id)
            .and_then(|parent| document.element(parent).attribute(NAME_ATTR))
            .map(str::to_owned);

        // The descriptor is normally the `TestMethod` element that follows `Execution` within
        // the same `UnitTest`. Fall back to looking below the `Execution` element.
        let method = document
            .following_siblings(id)
            .chain(document.descendants(id))
            .map(|candidate| document.element(candidate))
            .find(|candidate| candidate.has_attributes(&[CLASS_NAME_ATTR, NAME_ATTR]))
            .map(|descriptor| {
                MethodDescriptor::new(
                    descriptor.attribute(CLASS_NAME_ATTR).unwrap_or_default(),
                    descriptor.attribute(NAME_ATTR).unwrap_or_default(),
                )
            });

        Self {
            execution_id,
            test_unit_name,
            method,
        }
    }

    /// Returns the execution identifier.
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Returns the name of the test unit that owns this execution, if present.
    pub fn test_unit_name(&self) -> Option<&str> {
        self.test_unit_name.as_deref()
    }

    /// Returns the method descriptor, if present.
    pub fn method(&self) -> Option<&MethodDescriptor> {
        self.method.as_ref()
    }
}
