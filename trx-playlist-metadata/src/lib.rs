// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Structured access to the machine-readable output of `trx-playlist`.
//!
//! This crate documents the process exit codes produced by `trx-playlist`, and the JSON shape
//! printed by `trx-playlist list-failures --message-format json`.

mod exit_codes;
mod summary;

pub use exit_codes::*;
pub use summary::*;
