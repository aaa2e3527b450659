// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::{error::Error, io, path::PathBuf};
use thiserror::Error;
use tracing::error;
use trx_playlist_convert::errors::{
    ConfigParseError, ConfigParseErrorKind, ConvertError, MalformedInputError, ReadReportError,
    ResolveError,
};
use trx_playlist_metadata::TrxPlaylistExitCode;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error: bad input or an unwritable destination, rather than a bug in trx-playlist.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    GetCurrentDirFailed {
        #[source]
        err: io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 { path: PathBuf },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("failed to read report")]
    ReadInputFailed {
        input_name: String,
        #[source]
        err: io::Error,
    },
    #[error("report is not well-formed")]
    MalformedInput {
        input_name: String,
        input: String,
        #[source]
        err: MalformedInputError,
    },
    #[error("conversion failed")]
    ConvertFailed {
        input_name: String,
        #[source]
        err: ConvertError,
    },
    #[error("report contains no failed tests")]
    NoFailures {
        input_name: String,
        outcome_count: usize,
    },
    #[error("failed to write playlist")]
    WritePlaylistFailed {
        destination: Utf8PathBuf,
        #[source]
        err: io::Error,
    },
    #[error("failed to write output")]
    WriteOutputFailed {
        #[source]
        err: io::Error,
    },
    #[error("failed to serialize failure list")]
    SerializeFailureListFailed {
        #[source]
        err: serde_json::Error,
    },
    #[error("failed to serialize config")]
    SerializeConfigFailed {
        #[source]
        err: toml::ser::Error,
    },
}

impl ExpectedError {
    pub(crate) fn read_input_failed(input_name: impl Into<String>, err: io::Error) -> Self {
        Self::ReadInputFailed {
            input_name: input_name.into(),
            err,
        }
    }

    /// Wraps a conversion error, keeping the report text around for errors that point into it.
    pub(crate) fn convert_failed(
        input_name: impl Into<String>,
        input: impl Into<String>,
        err: ConvertError,
    ) -> Self {
        let input_name = input_name.into();
        match err {
            ConvertError::ReadReport(ReadReportError::Malformed(err)) => Self::MalformedInput {
                input_name,
                input: input.into(),
                err,
            },
            ConvertError::NoFailures { outcome_count } => Self::NoFailures {
                input_name,
                outcome_count,
            },
            err => Self::ConvertFailed { input_name, err },
        }
    }

    pub(crate) fn write_playlist_failed(
        destination: impl Into<Utf8PathBuf>,
        err: io::Error,
    ) -> Self {
        Self::WritePlaylistFailed {
            destination: destination.into(),
            err,
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::GetCurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. }
            | Self::ReadInputFailed { .. } => TrxPlaylistExitCode::SETUP_ERROR,
            Self::MalformedInput { .. } => TrxPlaylistExitCode::MALFORMED_INPUT,
            Self::ConvertFailed { err, .. } => match err {
                ConvertError::ReadReport(_) => TrxPlaylistExitCode::MALFORMED_INPUT,
                ConvertError::Resolve(ResolveError::UnresolvedExecution { .. }) => {
                    TrxPlaylistExitCode::UNRESOLVED_EXECUTION
                }
                ConvertError::Resolve(ResolveError::MissingDescriptor { .. }) => {
                    TrxPlaylistExitCode::MISSING_DESCRIPTOR
                }
                ConvertError::InvalidNameFormat(_) => TrxPlaylistExitCode::INVALID_NAME_FORMAT,
                ConvertError::NoFailures { .. } => TrxPlaylistExitCode::NO_FAILURES,
                ConvertError::Serialize(_) => TrxPlaylistExitCode::WRITE_OUTPUT_ERROR,
                // Error kinds added in the future.
                _ => 1,
            },
            Self::NoFailures { .. } => TrxPlaylistExitCode::NO_FAILURES,
            Self::WritePlaylistFailed { .. }
            | Self::WriteOutputFailed { .. }
            | Self::SerializeFailureListFailed { .. }
            | Self::SerializeConfigFailed { .. } => TrxPlaylistExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::GetCurrentDirFailed { err } => {
                error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { path } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    path.display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                match err.kind() {
                    ConfigParseErrorKind::DeserializeError(deserialize_err) => {
                        error!(
                            "failed to parse config file `{}` at `{}`",
                            err.config_file().style(styles.bold),
                            deserialize_err.path().style(styles.bold),
                        );
                        Some(deserialize_err.inner() as &dyn Error)
                    }
                    _ => {
                        error!(
                            "failed to read config file `{}`",
                            err.config_file().style(styles.bold),
                        );
                        err.source()
                    }
                }
            }
            Self::ReadInputFailed { input_name, err } => {
                error!("failed to read report `{}`", input_name.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::MalformedInput {
                input_name,
                input,
                err,
            } => {
                error!(
                    "report `{}` is not well-formed",
                    input_name.style(styles.bold)
                );
                let report = miette::Report::new(err.clone())
                    .with_source_code(miette::NamedSource::new(input_name, input.clone()));
                error!(target: NO_HEADING_TARGET, "{report:?}");
                None
            }
            Self::ConvertFailed { input_name, err } => {
                error!(
                    "failed to convert report `{}`: {err}",
                    input_name.style(styles.bold)
                );
                err.source()
            }
            Self::NoFailures {
                input_name,
                outcome_count,
            } => {
                error!(
                    "report `{}` contains no failed tests ({} {} in total)",
                    input_name.style(styles.bold),
                    outcome_count.style(styles.bold),
                    if *outcome_count == 1 { "result" } else { "results" },
                );
                error!(
                    target: NO_HEADING_TARGET,
                    "{}",
                    "(hint: use `--no-failures pass` or `--no-failures warn` to succeed anyway)"
                        .style(styles.warning_text)
                );
                None
            }
            Self::WritePlaylistFailed { destination, err } => {
                error!(
                    "failed to write playlist to `{}`",
                    destination.style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::WriteOutputFailed { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
            Self::SerializeFailureListFailed { err } => {
                error!("failed to serialize failure list");
                Some(err as &dyn Error)
            }
            Self::SerializeConfigFailed { err } => {
                error!("failed to serialize config");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
