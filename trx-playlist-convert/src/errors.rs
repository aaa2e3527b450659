// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while converting a TRX report into a playlist.

use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use miette::{Diagnostic, SourceSpan};
use std::{fmt, io};
use thiserror::Error;

/// The report text is not well-formed markup.
///
/// This is a [`Diagnostic`]: render it with [`miette::Report::with_source_code`] and the report
/// text to point at the offending location.
#[derive(Clone, Debug, Error, Diagnostic)]
#[error("report is not well-formed: {message}")]
pub struct MalformedInputError {
    message: String,
    #[label("error occurred here")]
    span: SourceSpan,
}

impl MalformedInputError {
    pub(crate) fn new(
        message: impl Into<String>,
        offset: impl TryInto<usize>,
        input: &str,
    ) -> Self {
        // Clamp so that the span always lies within the source text.
        let offset = offset
            .try_into()
            .unwrap_or(usize::MAX)
            .min(input.len());
        Self {
            message: message.into(),
            span: SourceSpan::from((offset, 0)),
        }
    }

    /// Returns a description of what went wrong.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the byte offset into the report text at which the error was detected.
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}

/// An error that occurred while loading a [`Report`](crate::report::Report).
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ReadReportError {
    /// The report text is not well-formed markup.
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),

    /// A failed outcome record has no `executionId` attribute, so it cannot be correlated with
    /// the test that produced it.
    #[error(
        "failed result{} has no `executionId` attribute",
        .test_name.as_deref().map(|name| format!(" for `{name}`")).unwrap_or_default()
    )]
    MissingExecutionId {
        /// The `testName` attribute of the result, if present.
        test_name: Option<String>,
    },
}

/// An error that occurred while resolving a failed outcome to its execution record.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// The execution identifier matched zero, or more than one, execution records.
    #[error(
        "execution `{execution_id}` matched {match_count} execution records (expected exactly 1)"
    )]
    UnresolvedExecution {
        /// The identifier that was looked up.
        execution_id: String,

        /// The number of execution records carrying this identifier.
        match_count: usize,
    },

    /// The execution record was found, but part of its naming metadata is absent.
    #[error("execution `{execution_id}` has no {missing}")]
    MissingDescriptor {
        /// The identifier that was looked up.
        execution_id: String,

        /// The metadata that is missing.
        missing: MissingDescriptorPart,
    },
}

/// The part of an execution record's naming metadata that was not found.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MissingDescriptorPart {
    /// No element carrying `className` and `name` attributes was found next to or below the
    /// `Execution` element.
    MethodDescriptor,

    /// The parent of the `Execution` element has no `name` attribute.
    TestUnitName,
}

impl fmt::Display for MissingDescriptorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodDescriptor => write!(f, "method descriptor (`className` and `name`)"),
            Self::TestUnitName => write!(f, "test name (`name` on the parent element)"),
        }
    }
}

/// A fully qualified class name has fewer than the three dot-separated segments required to
/// derive the project, namespace and class.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error(
    "class name `{class_name}` has {segment_count} dot-separated segments (expected at least 3)"
)]
pub struct InvalidNameFormat {
    class_name: String,
    segment_count: usize,
}

impl InvalidNameFormat {
    pub(crate) fn new(class_name: impl Into<String>, segment_count: usize) -> Self {
        Self {
            class_name: class_name.into(),
            segment_count,
        }
    }

    /// Returns the class name that could not be split.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

/// The report contained no failed tests, so there is nothing to put in a playlist.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("no failed tests to compile into a playlist")]
pub struct NoFailures;

/// An error that occurs while serializing a [`RuleTree`](crate::rules::RuleTree).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// Writing to the underlying writer failed.
    #[error("error writing playlist")]
    Io(#[from] io::Error),

    /// The XML writer reported an error.
    #[error("error serializing playlist")]
    Xml(#[from] quick_xml::Error),
}

/// An error that occurred while converting a report into a playlist.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// The report could not be read.
    #[error("failed to read report")]
    ReadReport(#[from] ReadReportError),

    /// A failed outcome could not be resolved to its test.
    #[error("failed to resolve failed test")]
    Resolve(#[from] ResolveError),

    /// A failed test's class name could not be split into a naming hierarchy.
    #[error("failed to derive naming hierarchy")]
    InvalidNameFormat(#[from] InvalidNameFormat),

    /// The report is valid but contains no failed tests.
    #[error("report contains no failed tests ({outcome_count} results in total)")]
    NoFailures {
        /// The number of results in the report, none of which failed.
        outcome_count: usize,
    },

    /// The playlist could not be serialized.
    #[error("failed to serialize playlist")]
    Serialize(#[from] SerializeError),
}

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse trx-playlist config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}
