// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Value enums for command-line options.

use crate::{ExpectedError, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::io;
use trx_playlist_convert::{config::NoFailuresBehavior, rules::ProjectGrouping};

/// No failures behavior options.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum NoFailuresBehaviorOpt {
    /// Silently exit with code 0.
    Pass,

    /// Produce a warning and exit with code 0.
    Warn,

    /// Produce an error message and exit with code 4.
    #[clap(alias = "error")]
    Fail,
}

impl From<NoFailuresBehaviorOpt> for NoFailuresBehavior {
    fn from(opt: NoFailuresBehaviorOpt) -> Self {
        match opt {
            NoFailuresBehaviorOpt::Pass => Self::Pass,
            NoFailuresBehaviorOpt::Warn => Self::Warn,
            NoFailuresBehaviorOpt::Fail => Self::Fail,
        }
    }
}

/// Project grouping options.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum GroupingOpt {
    /// Place every failed test under the project and namespace of the first failed test.
    FirstTest,

    /// Group failed tests under their own project and namespace.
    PerProject,
}

impl From<GroupingOpt> for ProjectGrouping {
    fn from(opt: GroupingOpt) -> Self {
        match opt {
            GroupingOpt::FirstTest => Self::FirstTest,
            GroupingOpt::PerProject => Self::PerProject,
        }
    }
}

/// Message format options for `list-failures`.
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum MessageFormatOpts {
    /// A human-readable output format.
    #[default]
    Human,

    /// JSON with no whitespace.
    Json,

    /// JSON, prettified.
    JsonPretty,
}

impl MessageFormatOpts {
    pub(crate) fn to_output_format(self, verbose: bool) -> OutputFormat {
        match self {
            Self::Human => OutputFormat::Human { verbose },
            Self::Json => OutputFormat::Serializable(SerializableFormat::Json),
            Self::JsonPretty => OutputFormat::Serializable(SerializableFormat::JsonPretty),
        }
    }
}

/// Output formats for the failure list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OutputFormat {
    /// A human-readable output format.
    Human {
        /// Whether to produce verbose output.
        verbose: bool,
    },

    /// Machine-readable output.
    Serializable(SerializableFormat),
}

/// A serialized, machine-readable output format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SerializableFormat {
    /// JSON with no whitespace.
    Json,

    /// JSON, prettified.
    JsonPretty,
}

impl SerializableFormat {
    /// Write this data in the given format to the writer.
    pub(crate) fn to_writer(self, value: &impl Serialize, writer: impl io::Write) -> Result<()> {
        match self {
            Self::Json => serde_json::to_writer(writer, value),
            Self::JsonPretty => serde_json::to_writer_pretty(writer, value),
        }
        .map_err(|err| ExpectedError::SerializeFailureListFailed { err })
    }
}
