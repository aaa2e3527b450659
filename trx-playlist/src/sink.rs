// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destinations for rendered playlists.

use crate::{errors::ExpectedError, output::OutputWriter};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use tracing::debug;
use trx_playlist_convert::convert::PlaylistSink;

/// Where a playlist is written, as requested on the command line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputDestination {
    /// Standard output.
    Stdout,

    /// A directory: the playlist is written inside it, under its suggested file name.
    Dir(Utf8PathBuf),

    /// A specific file.
    File(Utf8PathBuf),
}

impl OutputDestination {
    /// Interprets the `--output` argument. `-` is standard output, an existing directory receives
    /// the playlist under its suggested name, and no argument at all means the current directory.
    pub(crate) fn from_arg(output: Option<&Utf8Path>, cwd: &Utf8Path) -> Self {
        match output {
            None => Self::Dir(cwd.to_owned()),
            Some(path) if path.as_str() == "-" => Self::Stdout,
            Some(path) => {
                let path = cwd.join(path);
                if path.is_dir() {
                    Self::Dir(path)
                } else {
                    Self::File(path)
                }
            }
        }
    }
}

/// Writes playlists to an [`OutputDestination`].
///
/// Files are written atomically: the playlist is written to a temporary file in the same
/// directory, then renamed over the destination.
pub(crate) struct DestinationSink<'a> {
    destination: OutputDestination,
    output_writer: &'a mut OutputWriter,
    written_to: Option<Utf8PathBuf>,
}

impl<'a> DestinationSink<'a> {
    pub(crate) fn new(destination: OutputDestination, output_writer: &'a mut OutputWriter) -> Self {
        Self {
            destination,
            output_writer,
            written_to: None,
        }
    }

    /// Returns the file the playlist was written to, or `None` if it was written to standard
    /// output or not written yet.
    pub(crate) fn written_to(&self) -> Option<&Utf8Path> {
        self.written_to.as_deref()
    }
}

impl PlaylistSink for DestinationSink<'_> {
    type Error = ExpectedError;

    fn accept(&mut self, bytes: &[u8], suggested_file_name: &str) -> Result<(), Self::Error> {
        let path = match &self.destination {
            OutputDestination::Stdout => {
                let mut writer = self.output_writer.stdout_writer();
                return writer
                    .write_all(bytes)
                    .and_then(|()| writer.flush())
                    .map_err(|err| ExpectedError::WriteOutputFailed { err });
            }
            OutputDestination::Dir(dir) => dir.join(suggested_file_name),
            OutputDestination::File(file) => file.clone(),
        };

        debug!("writing playlist to {path}");
        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(bytes))
            .map_err(|err| {
                let err = match err {
                    atomicwrites::Error::Internal(err) | atomicwrites::Error::User(err) => err,
                };
                ExpectedError::write_playlist_failed(&path, err)
            })?;

        self.written_to = Some(path);
        Ok(())
    }
}
