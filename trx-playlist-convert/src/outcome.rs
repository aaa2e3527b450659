// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outcome records and failure extraction.

use crate::report::Report;
use std::fmt;

/// The result of a single test execution, as recorded in the report.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// The test passed.
    Passed,

    /// The test failed.
    Failed,

    /// Any other outcome, such as `NotExecuted` or `Inconclusive`. Carries the original text.
    Other(String),
}

impl Outcome {
    /// Parses an outcome from the text of an `outcome` attribute.
    ///
    /// Matching is exact: only `Passed` and `Failed` are recognized.
    pub fn from_attribute(value: &str) -> Self {
        match value {
            "Passed" => Self::Passed,
            "Failed" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns true if this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "Passed"),
            Self::Failed => write!(f, "Failed"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

/// The outcome of one test execution, keyed by its execution identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutcomeRecord {
    execution_id: String,
    outcome: Outcome,
}

impl OutcomeRecord {
    /// Creates a new outcome record.
    pub fn new(execution_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            execution_id: execution_id.into(),
            outcome,
        }
    }

    /// Returns the execution identifier.
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}

/// Returns the failed outcome records in the report, in document order.
pub fn extract_failures(report: &Report) -> impl Iterator<Item = &OutcomeRecord> {
    report
        .outcomes()
        .iter()
        .filter(|record| record.outcome.is_failure())
}
