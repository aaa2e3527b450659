// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use trx_playlist::{OutputWriter, TrxPlaylistApp};

fn main() -> Result<()> {
    color_eyre::install()?;
    let ansi_support = enable_ansi_support::enable_ansi_support();

    let opts = TrxPlaylistApp::parse();
    let output = opts.init_output();
    if let Err(error_code) = ansi_support {
        tracing::debug!("could not enable ANSI escape codes (error code {error_code})");
    }

    match opts.exec(output, &mut OutputWriter::default()) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            error.display_to_stderr(&output.stderr_styles());
            std::process::exit(error.process_exit_code())
        }
    }
}
