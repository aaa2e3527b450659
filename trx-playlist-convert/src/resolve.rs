// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlating outcome records with execution records.
//!
//! The outcome and execution streams of a report are ordered independently, so records are
//! matched only by execution identifier, through an index built once per report.

use crate::{
    errors::{MissingDescriptorPart, ResolveError},
    outcome::OutcomeRecord,
    report::{ExecutionRecord, MethodDescriptor, Report},
};
use indexmap::IndexMap;

/// An index from execution identifier to the execution records carrying it.
#[derive(Clone, Debug)]
pub struct ExecutionIndex<'report> {
    by_id: IndexMap<&'report str, IndexEntry<'report>>,
}

#[derive(Clone, Copy, Debug)]
enum IndexEntry<'report> {
    Unique(&'report ExecutionRecord),
    Duplicate(usize),
}

impl<'report> ExecutionIndex<'report> {
    /// Builds the index over all execution records in the report.
    pub fn new(report: &'report Report) -> Self {
        let mut by_id: IndexMap<&'report str, IndexEntry<'report>> = IndexMap::new();
        for record in report.executions() {
            by_id
                .entry(record.execution_id())
                .and_modify(|entry| {
                    *entry = match *entry {
                        IndexEntry::Unique(_) => IndexEntry::Duplicate(2),
                        IndexEntry::Duplicate(count) => IndexEntry::Duplicate(count + 1),
                    }
                })
                .or_insert(IndexEntry::Unique(record));
        }
        Self { by_id }
    }

    /// Returns the number of distinct execution identifiers in the index.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the report has no execution records.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Resolves an outcome record to the single execution record with the same identifier.
    ///
    /// Fails if no record, or more than one record, carries the identifier, or if the record
    /// lacks the naming metadata needed downstream.
    pub fn resolve(
        &self,
        outcome: &OutcomeRecord,
    ) -> Result<ResolvedExecution<'report>, ResolveError> {
        let execution_id = outcome.execution_id();
        let record = match self.by_id.get(execution_id) {
            Some(IndexEntry::Unique(record)) => *record,
            Some(IndexEntry::Duplicate(match_count)) => {
                return Err(ResolveError::UnresolvedExecution {
                    execution_id: execution_id.to_owned(),
                    match_count: *match_count,
                });
            }
            None => {
                return Err(ResolveError::UnresolvedExecution {
                    execution_id: execution_id.to_owned(),
                    match_count: 0,
                });
            }
        };

        let missing = |missing| ResolveError::MissingDescriptor {
            execution_id: execution_id.to_owned(),
            missing,
        };
        let method = record
            .method()
            .ok_or_else(|| missing(MissingDescriptorPart::MethodDescriptor))?;
        let test_unit_name = record
            .test_unit_name()
            .ok_or_else(|| missing(MissingDescriptorPart::TestUnitName))?;

        Ok(ResolvedExecution {
            execution_id: record.execution_id(),
            test_unit_name,
            method,
        })
    }
}

/// An execution record that was matched to a failed outcome, with its naming metadata present.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedExecution<'report> {
    /// The execution identifier.
    pub execution_id: &'report str,

    /// The name of the test unit that owns the execution.
    pub test_unit_name: &'report str,

    /// The class and method the execution ran.
    pub method: &'report MethodDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{Outcome, extract_failures};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolve_by_identifier_not_position() {
        // Results are listed in the opposite order from the definitions, and a passing test sits
        // in between.
        let report = Report::load(indoc! {r#"
            <TestRun>
              <TestDefinitions>
                <UnitTest name="First in Alpha">
                  <Execution id="e1" />
                  <TestMethod className="Acme.Tests.Alpha" name="First" />
                </UnitTest>
                <UnitTest name="Middle in Alpha">
                  <Execution id="e2" />
                  <TestMethod className="Acme.Tests.Alpha" name="Middle" />
                </UnitTest>
                <UnitTest name="Last in Beta">
                  <Execution id="e3" />
                  <TestMethod className="Acme.Tests.Beta" name="Last" />
                </UnitTest>
              </TestDefinitions>
              <Results>
                <UnitTestResult executionId="e3" outcome="Failed" />
                <UnitTestResult executionId="e2" outcome="Passed" />
                <UnitTestResult executionId="e1" outcome="Failed" />
              </Results>
            </TestRun>
        "#})
        .expect("report loads");
        let index = ExecutionIndex::new(&report);
        assert_eq!(index.len(), 3);

        let resolved: Vec<_> = extract_failures(&report)
            .map(|failure| {
                let resolved = index.resolve(failure).expect("failure resolves");
                (
                    resolved.execution_id,
                    resolved.test_unit_name,
                    resolved.method.fully_qualified_name(),
                )
            })
            .collect();
        assert_eq!(
            resolved,
            vec![
                ("e3", "Last in Beta", "Acme.Tests.Beta.Last".to_owned()),
                ("e1", "First in Alpha", "Acme.Tests.Alpha.First".to_owned()),
            ]
        );
    }

    #[test]
    fn duplicate_identifier_is_unresolved() {
        let report = Report::load(indoc! {r#"
            <TestRun>
              <UnitTest name="A in Alpha">
                <Execution id="dup" />
                <TestMethod className="Acme.Tests.Alpha" name="A" />
              </UnitTest>
              <UnitTest name="B in Alpha">
                <Execution id="dup" />
                <TestMethod className="Acme.Tests.Alpha" name="B" />
              </UnitTest>
              <UnitTest name="C in Alpha">
                <Execution id="dup" />
                <TestMethod className="Acme.Tests.Alpha" name="C" />
              </UnitTest>
            </TestRun>
        "#})
        .expect("report loads");
        let index = ExecutionIndex::new(&report);

        let err = index
            .resolve(&OutcomeRecord::new("dup", Outcome::Failed))
            .expect_err("duplicate ids never resolve");
        assert!(
            matches!(
                &err,
                ResolveError::UnresolvedExecution { execution_id, match_count: 3 }
                    if execution_id == "dup"
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn unknown_identifier_is_unresolved() {
        let report = Report::load("<TestRun/>").expect("report loads");
        let index = ExecutionIndex::new(&report);
        assert!(index.is_empty());

        let err = index
            .resolve(&OutcomeRecord::new("missing", Outcome::Failed))
            .expect_err("unknown ids never resolve");
        assert!(
            matches!(err, ResolveError::UnresolvedExecution { match_count: 0, .. }),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn missing_descriptor() {
        let report = Report::load(indoc! {r#"
            <TestRun>
              <UnitTest name="NoMethod">
                <Execution id="e1" />
                <Owners />
              </UnitTest>
              <UnitTest>
                <Execution id="e2" />
                <TestMethod className="Acme.Tests.Alpha" name="Unnamed" />
              </UnitTest>
            </TestRun>
        "#})
        .expect("report loads");
        let index = ExecutionIndex::new(&report);

        let err = index
            .resolve(&OutcomeRecord::new("e1", Outcome::Failed))
            .expect_err("e1 has no descriptor");
        assert!(
            matches!(
                err,
                ResolveError::MissingDescriptor {
                    missing: MissingDescriptorPart::MethodDescriptor,
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );

        let err = index
            .resolve(&OutcomeRecord::new("e2", Outcome::Failed))
            .expect_err("e2 has no test name");
        assert!(
            matches!(
                err,
                ResolveError::MissingDescriptor {
                    missing: MissingDescriptorPart::TestUnitName,
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
    }
}
