// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `convert`, `list-failures` and `show-config` commands.

use super::value_enums::{GroupingOpt, MessageFormatOpts, NoFailuresBehaviorOpt, OutputFormat};
use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputWriter, StdoutStyles},
    sink::{DestinationSink, OutputDestination},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use itertools::Itertools;
use owo_colors::OwoColorize;
use std::io::{self, Read, Write};
use tracing::{info, warn};
use trx_playlist_convert::{
    config::{NoFailuresBehavior, TrxPlaylistConfig},
    convert::{ConvertOptions, Converter},
    errors::ConvertError,
};
use trx_playlist_metadata::FailureListSummary;

static STDIN_ARG: &str = "-";

#[derive(Debug, Args)]
pub(super) struct ConvertOpts {
    /// The TRX report to convert, or `-` to read it from standard input
    #[arg(value_name = "REPORT")]
    report: Utf8PathBuf,

    /// Where to write the playlist: a file, an existing directory, or `-` for standard output
    /// [default: the current directory]
    #[arg(long, short, value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    /// Behavior if the report contains no failed tests [default: fail]
    #[arg(long, value_enum, value_name = "ACTION")]
    no_failures: Option<NoFailuresBehaviorOpt>,

    /// How failed tests are grouped under project and namespace rules [default: first-test]
    #[arg(long, value_enum)]
    grouping: Option<GroupingOpt>,

    /// Indentation width for the playlist, or 0 to write it on one line [default: 2]
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Start the playlist with an XML declaration
    #[arg(long)]
    xml_declaration: bool,
}

impl ConvertOpts {
    pub(super) fn exec(
        self,
        cwd: &Utf8Path,
        mut config: TrxPlaylistConfig,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let playlist_config = config.playlist_mut();
        if let Some(no_failures) = self.no_failures {
            playlist_config.no_failures = no_failures.into();
        }
        if let Some(grouping) = self.grouping {
            playlist_config.grouping = grouping.into();
        }
        if let Some(indent) = self.indent {
            playlist_config.indent = indent;
        }
        if self.xml_declaration {
            playlist_config.xml_declaration = true;
        }

        let input = ReportInput::read(&self.report, cwd)?;
        let converter = Converter::new(ConvertOptions::from(config.playlist()));
        let conversion = match converter.convert(&input.text, input.source()) {
            Ok(conversion) => conversion,
            Err(ConvertError::NoFailures { outcome_count }) => {
                return match config.playlist().no_failures {
                    NoFailuresBehavior::Pass => Ok(0),
                    NoFailuresBehavior::Warn => {
                        warn!(
                            "report `{}` contains no failed tests, not writing a playlist",
                            input.name
                        );
                        Ok(0)
                    }
                    NoFailuresBehavior::Fail => Err(ExpectedError::NoFailures {
                        input_name: input.name,
                        outcome_count,
                    }),
                };
            }
            Err(err) => return Err(ExpectedError::convert_failed(input.name, input.text, err)),
        };

        let unplaced = conversion.tree().unplaced_test_count();
        if unplaced > 0 {
            warn!(
                "{unplaced} failed {} in other projects or namespaces will not be selected \
                 by the playlist (use `--grouping per-project` to include {})",
                plural::tests_str(unplaced),
                if unplaced == 1 { "it" } else { "them" },
            );
        }

        let destination = OutputDestination::from_arg(self.output.as_deref(), cwd);
        let mut sink = DestinationSink::new(destination, output_writer);
        conversion.write_to(&mut sink)?;

        if let Some(path) = sink.written_to() {
            let failed = conversion.failed_tests().len();
            info!(
                "wrote playlist for {failed} failed {} to {}",
                plural::tests_str(failed),
                path.strip_prefix(cwd).unwrap_or(path),
            );
        }

        Ok(0)
    }
}

#[derive(Debug, Args)]
pub(super) struct ListFailuresOpts {
    /// The TRX report to read, or `-` to read it from standard input
    #[arg(value_name = "REPORT")]
    report: Utf8PathBuf,

    /// Output format
    #[arg(
        short = 'T',
        long,
        value_enum,
        default_value_t,
        value_name = "FMT"
    )]
    message_format: MessageFormatOpts,
}

impl ListFailuresOpts {
    pub(super) fn exec(
        self,
        cwd: &Utf8Path,
        config: &TrxPlaylistConfig,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let input = ReportInput::read(&self.report, cwd)?;
        let converter = Converter::new(ConvertOptions::from(config.playlist()));
        let summary = converter
            .list_failures(&input.text)
            .map_err(|err| ExpectedError::convert_failed(input.name, input.text, err))?;

        let mut writer = output_writer.stdout_writer();
        match self.message_format.to_output_format(output.verbose) {
            OutputFormat::Human { verbose } => {
                write_human(&summary, &output.stdout_styles(), verbose, &mut writer)
                    .map_err(|err| ExpectedError::WriteOutputFailed { err })?;
            }
            OutputFormat::Serializable(format) => {
                format.to_writer(&summary, &mut writer)?;
                writeln!(writer).map_err(|err| ExpectedError::WriteOutputFailed { err })?;
            }
        }
        writer
            .flush()
            .map_err(|err| ExpectedError::WriteOutputFailed { err })?;

        Ok(0)
    }
}

/// Prints the effective configuration as TOML.
pub(super) fn show_config(
    config: &TrxPlaylistConfig,
    output_writer: &mut OutputWriter,
) -> Result<i32> {
    let toml = config
        .to_toml()
        .map_err(|err| ExpectedError::SerializeConfigFailed { err })?;

    let mut writer = output_writer.stdout_writer();
    writer
        .write_all(toml.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|err| ExpectedError::WriteOutputFailed { err })?;
    Ok(0)
}

fn write_human(
    summary: &FailureListSummary,
    styles: &StdoutStyles,
    verbose: bool,
    mut writer: impl Write,
) -> io::Result<()> {
    let failed = summary.failed_tests.len();
    write!(
        writer,
        "{} failed {} out of {} {}",
        failed.style(styles.count),
        plural::tests_str(failed),
        summary.outcome_count.style(styles.count),
        plural::results_str(summary.outcome_count),
    )?;
    if failed == 0 {
        return writeln!(writer);
    }
    writeln!(writer, ":")?;

    // Failures are printed in report order, so a class can appear more than once.
    for ((namespace, class_name), tests) in &summary
        .failed_tests
        .iter()
        .chunk_by(|test| (&test.namespace, &test.class_name))
    {
        writeln!(
            writer,
            "{}:",
            format!("{namespace}.{class_name}").style(styles.class_name)
        )?;
        for test in tests {
            writeln!(writer, "    {}", test.display_name.style(styles.test_name))?;
            if verbose {
                writeln!(writer, "      project: {}", test.project)?;
                writeln!(writer, "      name: {}", test.fully_qualified_name)?;
                writeln!(writer, "      execution id: {}", test.execution_id)?;
            }
        }
    }
    Ok(())
}

/// A report read from a file or from standard input.
struct ReportInput {
    name: String,
    path: Option<Utf8PathBuf>,
    text: String,
}

impl ReportInput {
    fn read(report: &Utf8Path, cwd: &Utf8Path) -> Result<Self> {
        if report.as_str() == STDIN_ARG {
            let mut text = String::new();
            io::stdin()
                .lock()
                .read_to_string(&mut text)
                .map_err(|err| ExpectedError::read_input_failed("<stdin>", err))?;
            return Ok(Self {
                name: "<stdin>".to_owned(),
                path: None,
                text,
            });
        }

        let path = cwd.join(report);
        let text = std::fs::read_to_string(&path)
            .map_err(|err| ExpectedError::read_input_failed(report.as_str(), err))?;
        Ok(Self {
            name: report.to_string(),
            path: Some(path),
            text,
        })
    }

    fn source(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }
}

mod plural {
    pub(super) fn tests_str(count: usize) -> &'static str {
        if count == 1 { "test" } else { "tests" }
    }

    pub(super) fn results_str(count: usize) -> &'static str {
        if count == 1 { "result" } else { "results" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use trx_playlist_metadata::FailedTestSummary;

    #[test]
    fn human_output_groups_consecutive_classes() {
        let summary = FailureListSummary::new(
            5,
            vec![
                FailedTestSummary::new(
                    "e1",
                    "Acme.Tests",
                    "Acme.Tests",
                    "CartTests",
                    "Acme.Tests.Cart.CartTests.AddItem",
                    "AddItem",
                ),
                FailedTestSummary::new(
                    "e2",
                    "Acme.Tests",
                    "Acme.Tests",
                    "CartTests",
                    "Acme.Tests.Cart.CartTests.RemoveItem",
                    "RemoveItem",
                ),
                FailedTestSummary::new(
                    "e3",
                    "Acme.Tests",
                    "Acme.Tests",
                    "LoginScenario",
                    "Acme.Tests.LoginScenario.Login_Locked",
                    "Login_Locked",
                ),
            ],
        );

        let mut out = Vec::new();
        write_human(&summary, &StdoutStyles::default(), false, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            indoc! {"
                3 failed tests out of 5 results:
                Acme.Tests.CartTests:
                    AddItem
                    RemoveItem
                Acme.Tests.LoginScenario:
                    Login_Locked
            "}
        );

        let mut out = Vec::new();
        write_human(&summary, &StdoutStyles::default(), true, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(
            out.contains(concat!(
                "    Login_Locked\n",
                "      project: Acme.Tests\n",
                "      name: Acme.Tests.LoginScenario.Login_Locked\n",
                "      execution id: e3\n",
            )),
            "verbose output:\n{out}"
        );
    }
}
