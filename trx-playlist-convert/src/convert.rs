// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversion pipeline: report text in, playlist bytes out.

use crate::{
    config::PlaylistConfig,
    errors::{ConvertError, NoFailures},
    hierarchy::{FailedTest, TestHierarchy},
    outcome::extract_failures,
    report::Report,
    resolve::ExecutionIndex,
    rules::{ProjectGrouping, RuleTree},
    serialize::SerializeOptions,
};
use camino::Utf8Path;
use std::convert::Infallible;
use tracing::{debug, trace};
use trx_playlist_metadata::FailureListSummary;

/// The file name suggested for playlists without a named source report.
pub const DEFAULT_PLAYLIST_FILE_NAME: &str = "output.playlist";

/// The extension of playlist files.
pub const PLAYLIST_EXTENSION: &str = "playlist";

/// Returns the file name to suggest for a playlist generated from the given report path.
///
/// This is `<report stem>.playlist`, or [`DEFAULT_PLAYLIST_FILE_NAME`] if the report was read from
/// standard input or has no file name.
pub fn suggested_file_name(source: Option<&Utf8Path>) -> String {
    match source.and_then(Utf8Path::file_stem) {
        Some(stem) if !stem.is_empty() => format!("{stem}.{PLAYLIST_EXTENSION}"),
        _ => DEFAULT_PLAYLIST_FILE_NAME.to_owned(),
    }
}

/// Options for a conversion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConvertOptions {
    /// How failed tests are grouped under project and namespace rules.
    pub grouping: ProjectGrouping,

    /// How the playlist is written.
    pub serialize: SerializeOptions,
}

impl From<&PlaylistConfig> for ConvertOptions {
    fn from(config: &PlaylistConfig) -> Self {
        Self {
            grouping: config.grouping,
            serialize: config.serialize_options(),
        }
    }
}

/// Converts TRX reports into playlists.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Creates a new converter with the given options.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Returns the options this converter uses.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Resolves every failed outcome in the report to a [`FailedTest`], in outcome order.
    ///
    /// The first failure that can't be resolved or named aborts resolution.
    pub fn resolve_failures(&self, report: &Report) -> Result<Vec<FailedTest>, ConvertError> {
        let index = ExecutionIndex::new(report);
        debug!(
            outcomes = report.outcomes().len(),
            executions = index.len(),
            "indexed report"
        );

        extract_failures(report)
            .map(|failure| -> Result<_, ConvertError> {
                let resolved = index.resolve(failure)?;
                let test = FailedTest::from_resolved(resolved)?;
                trace!(
                    execution_id = test.execution_id(),
                    name = test.fully_qualified_name(),
                    "resolved failed test"
                );
                Ok(test)
            })
            .collect()
    }

    /// Converts the report text into a playlist.
    ///
    /// `source` is the path the report was read from, if any, and determines the suggested file
    /// name of the playlist.
    pub fn convert(
        &self,
        input: &str,
        source: Option<&Utf8Path>,
    ) -> Result<Conversion, ConvertError> {
        let report = Report::load(input)?;
        let outcome_count = report.outcomes().len();
        let failed_tests = self.resolve_failures(&report)?;

        let hierarchy = TestHierarchy::from_tests(&failed_tests);
        let tree = RuleTree::compile(&hierarchy, self.options.grouping)
            .map_err(|NoFailures| ConvertError::NoFailures { outcome_count })?;
        debug!(
            failed = failed_tests.len(),
            distinct = hierarchy.test_count(),
            classes = hierarchy.classes().len(),
            unplaced = tree.unplaced_test_count(),
            "compiled rule tree"
        );

        let bytes = tree.to_bytes(&self.options.serialize)?;

        Ok(Conversion {
            outcome_count,
            failed_tests,
            tree,
            bytes,
            suggested_file_name: suggested_file_name(source),
        })
    }

    /// Lists the failed tests in the report without building a playlist.
    ///
    /// A report without failures produces an empty list rather than an error.
    pub fn list_failures(&self, input: &str) -> Result<FailureListSummary, ConvertError> {
        let report = Report::load(input)?;
        let failed_tests = self.resolve_failures(&report)?;
        Ok(FailureListSummary::new(
            report.outcomes().len(),
            failed_tests.iter().map(FailedTest::to_summary).collect(),
        ))
    }
}

/// The result of a successful conversion.
#[derive(Clone, Debug)]
pub struct Conversion {
    outcome_count: usize,
    failed_tests: Vec<FailedTest>,
    tree: RuleTree,
    bytes: Vec<u8>,
    suggested_file_name: String,
}

impl Conversion {
    /// Returns the number of outcome records in the report.
    pub fn outcome_count(&self) -> usize {
        self.outcome_count
    }

    /// Returns the failed tests, in outcome order.
    pub fn failed_tests(&self) -> &[FailedTest] {
        &self.failed_tests
    }

    /// Returns the compiled rule tree.
    pub fn tree(&self) -> &RuleTree {
        &self.tree
    }

    /// Returns the rendered playlist.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the suggested file name for the playlist.
    pub fn suggested_file_name(&self) -> &str {
        &self.suggested_file_name
    }

    /// Hands the rendered playlist to a sink.
    pub fn write_to<S: PlaylistSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.accept(&self.bytes, &self.suggested_file_name)
    }
}

/// A destination for rendered playlists.
pub trait PlaylistSink {
    /// The error returned if the playlist can't be written.
    type Error;

    /// Accepts a rendered playlist along with the file name suggested for it.
    fn accept(&mut self, bytes: &[u8], suggested_file_name: &str) -> Result<(), Self::Error>;
}

impl PlaylistSink for Vec<u8> {
    type Error = Infallible;

    fn accept(&mut self, bytes: &[u8], _suggested_file_name: &str) -> Result<(), Self::Error> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}
