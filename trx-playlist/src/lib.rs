// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn the failed tests of a TRX test report into a Visual Studio playlist.
//!
//! `trx-playlist convert results.trx` writes `results.playlist`, which reruns exactly the tests
//! that failed when opened in Visual Studio's Test Explorer.
//!
//! The conversion itself lives in the `trx-playlist-convert` crate. This crate is the
//! command-line front end.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;
mod sink;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
