// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `trx-playlist` failures.
///
/// A conversion may fail for a variety of reasons. This structure documents the exit codes that
/// may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TrxPlaylistExitCode {}

impl TrxPlaylistExitCode {
    /// No errors occurred and trx-playlist exited normally.
    pub const OK: i32 = 0;

    /// The report was valid but contained no failed tests, and `--no-failures fail` was in
    /// effect.
    pub const NO_FAILURES: i32 = 4;

    /// A user issue happened while setting up the conversion: an unreadable input file or an
    /// invalid config.
    pub const SETUP_ERROR: i32 = 96;

    /// The report was not well-formed markup, or an outcome record was missing its identifier.
    pub const MALFORMED_INPUT: i32 = 101;

    /// A failed outcome's execution identifier matched zero, or more than one, execution records.
    pub const UNRESOLVED_EXECUTION: i32 = 102;

    /// A resolved execution record had no method descriptor or no test name.
    pub const MISSING_DESCRIPTOR: i32 = 103;

    /// A test's class name had fewer than three dot-separated segments.
    pub const INVALID_NAME_FORMAT: i32 = 104;

    /// Writing the playlist or other data to its destination produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}
