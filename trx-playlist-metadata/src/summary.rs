// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// Root element of the output of `trx-playlist list-failures --message-format json`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct FailureListSummary {
    /// The number of outcome records found in the report, failed or not.
    pub outcome_count: usize,

    /// The failed tests, in the order their outcome records appear in the report.
    pub failed_tests: Vec<FailedTestSummary>,
}

impl FailureListSummary {
    /// Creates a new summary.
    pub fn new(outcome_count: usize, failed_tests: Vec<FailedTestSummary>) -> Self {
        Self {
            outcome_count,
            failed_tests,
        }
    }

    /// Parses this summary from a JSON string.
    pub fn parse_json(json: impl AsRef<str>) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json.as_ref())
    }
}

/// A single failed test, with the naming hierarchy used to build the playlist.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct FailedTestSummary {
    /// The execution identifier correlating the outcome and execution records.
    pub execution_id: String,

    /// The test project, e.g. `Acme.Tests`.
    pub project: String,

    /// The namespace, e.g. `Acme.Tests`.
    pub namespace: String,

    /// The unqualified class name, e.g. `LoginScenario`.
    pub class_name: String,

    /// The fully qualified method name, e.g. `Acme.Tests.LoginScenario.Login_InvalidPassword`.
    pub fully_qualified_name: String,

    /// The display name, e.g. `Login_InvalidPassword`.
    pub display_name: String,
}

impl FailedTestSummary {
    /// Creates a new summary for a single failed test.
    pub fn new(
        execution_id: impl Into<String>,
        project: impl Into<String>,
        namespace: impl Into<String>,
        class_name: impl Into<String>,
        fully_qualified_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            project: project.into(),
            namespace: namespace.into(),
            class_name: class_name.into(),
            fully_qualified_name: fully_qualified_name.into(),
            display_name: display_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_kebab_case_json() {
        let json = r#"{
            "outcome-count": 3,
            "failed-tests": [
                {
                    "execution-id": "e1",
                    "project": "Acme.Tests",
                    "namespace": "Acme.Tests",
                    "class-name": "LoginScenario",
                    "fully-qualified-name": "Acme.Tests.LoginScenario.Login_InvalidPassword",
                    "display-name": "Login_InvalidPassword"
                }
            ]
        }"#;

        let summary = FailureListSummary::parse_json(json).expect("summary is valid JSON");
        assert_eq!(
            summary,
            FailureListSummary::new(
                3,
                vec![FailedTestSummary::new(
                    "e1",
                    "Acme.Tests",
                    "Acme.Tests",
                    "LoginScenario",
                    "Acme.Tests.LoginScenario.Login_InvalidPassword",
                    "Login_InvalidPassword",
                )],
            )
        );
    }
}
