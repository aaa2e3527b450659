// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use super::commands::{ConvertOpts, ListFailuresOpts, show_config};
use crate::{
    ExpectedError, Result,
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Subcommand};
use trx_playlist_convert::config::{DefaultConfigWarnings, TrxPlaylistConfig};

/// Turn the failed tests of a TRX report into a Visual Studio playlist.
///
/// The playlist reruns exactly the tests that failed, grouped by project, namespace and class.
#[derive(Debug, clap::Parser)]
#[command(version, styles = clap_styles::style(), max_term_width = 100)]
pub struct TrxPlaylistApp {
    #[clap(flatten)]
    output: OutputOpts,

    #[clap(flatten)]
    config_opts: ConfigOpts,

    #[clap(subcommand)]
    command: Command,
}

impl TrxPlaylistApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    ///
    /// Returns the exit code.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let cwd = current_dir()?;
        self.exec_in(&cwd, output, output_writer)
    }

    fn exec_in(
        self,
        cwd: &Utf8Path,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        let config = self.config_opts.make_config(cwd)?;
        match self.command {
            Command::Convert(opts) => opts.exec(cwd, config, output_writer),
            Command::ListFailures(opts) => opts.exec(cwd, &config, output, output_writer),
            Command::ShowConfig => show_config(&config, output_writer),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a playlist that reruns the failed tests of a report.
    Convert(ConvertOpts),

    /// List the failed tests of a report without writing a playlist.
    ListFailures(ListFailuresOpts),

    /// Show the effective configuration.
    ShowConfig,
}

/// Configuration options.
#[derive(Debug, Args)]
#[command(next_help_heading = "Config options")]
struct ConfigOpts {
    /// Config file [default: .config/trx-playlist.toml in the current directory, if present].
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,
}

impl ConfigOpts {
    fn make_config(&self, cwd: &Utf8Path) -> Result<TrxPlaylistConfig> {
        let config_file = self.config_file.as_ref().map(|file| cwd.join(file));
        TrxPlaylistConfig::from_sources(config_file.as_deref(), cwd, &mut DefaultConfigWarnings)
            .map_err(ExpectedError::from)
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|err| ExpectedError::GetCurrentDirFailed { err })?;
    Utf8PathBuf::try_from(cwd).map_err(|err| ExpectedError::CurrentDirInvalidUtf8 {
        path: err.into_path_buf(),
    })
}
